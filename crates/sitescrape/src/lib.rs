// ABOUTME: Main library entry point for sitescrape, a selector-driven HTML text scraper.
// ABOUTME: Re-exports the public API: Scraper, ScraperBuilder, JobOutcome, errors, and the summarizer bridge.

//! sitescrape - fetch web pages, extract the text of elements matching a CSS
//! selector, and persist one extracted string per line.
//!
//! # Example
//!
//! ```no_run
//! use sitescrape::Scraper;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scraper = Scraper::builder().output_dir("outputs").build()?;
//!     let outcomes = scraper
//!         .run_paired_batch(&["https://example.com", "https://example.org"], &["h1", "p"])
//!         .await?;
//!     for outcome in &outcomes {
//!         println!("{}", outcome);
//!     }
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod error;
pub mod extractors;
pub mod job;
pub mod options;
pub mod resource;
pub mod result;
pub mod scraper;
pub mod summarize;

pub use crate::error::{BatchError, ErrorCode, ScrapeError};
pub use crate::extractors::extract_texts;
pub use crate::options::{Options, OutputLayout, ScraperBuilder};
pub use crate::result::{Artifact, BatchSummary, JobFailure, JobOutcome};
pub use crate::scraper::Scraper;
pub use crate::summarize::{ProcessSummarizer, SummarizeError, Summarizer, SummaryReport};
