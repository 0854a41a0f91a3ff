// ABOUTME: Selector-based text extraction and the compiled selector cache.

pub mod compiled;
pub mod select;

pub use compiled::{get_or_compile, precompile_selectors};
pub use select::extract_texts;
