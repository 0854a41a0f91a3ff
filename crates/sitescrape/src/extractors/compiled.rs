// ABOUTME: Process-wide cache of compiled CSS selectors shared by every job.
// ABOUTME: Invalid selectors are cached too, so a bad pattern is only parsed once.

//! Selector caching for batches that reuse the same pattern across many sites.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use once_cell::sync::Lazy;
use scraper::Selector;

static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Selector>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Gets or compiles a CSS selector, caching the result.
///
/// Returns `None` if the selector does not compile.
pub fn get_or_compile(css: &str) -> Option<Selector> {
    {
        let cache = SELECTOR_CACHE.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
    }

    let compiled = compile(css);
    let mut cache = SELECTOR_CACHE
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    cache.entry(css.to_string()).or_insert(compiled).clone()
}

/// Compiles every selector of a batch up front and returns the ones that failed.
pub fn precompile_selectors<I, S>(selectors: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cache = SELECTOR_CACHE
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    let mut invalid = Vec::new();
    for css in selectors {
        let css = css.as_ref();
        let entry = cache
            .entry(css.to_string())
            .or_insert_with(|| compile(css));
        if entry.is_none() && !invalid.iter().any(|s| s == css) {
            invalid.push(css.to_string());
        }
    }
    invalid
}

fn compile(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::debug!(selector = css, error = %e, "selector failed to compile");
            None
        }
    }
}
