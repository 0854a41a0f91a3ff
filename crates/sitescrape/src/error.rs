// ABOUTME: Error types for sitescrape: ErrorCode, the per-job ScrapeError, and BatchError.
// ABOUTME: ScrapeError carries a category, the site, the failing operation, and an optional cause.

use std::fmt;

use serde::Serialize;

/// Categories of job failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidUrl,
    Network,
    Selector,
    NoResults,
    Persistence,
    Cancelled,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Network => "network error",
            ErrorCode::Selector => "invalid selector",
            ErrorCode::NoResults => "no results found",
            ErrorCode::Persistence => "persistence error",
            ErrorCode::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Error raised inside a single scrape job.
///
/// Never escapes the job boundary: the job runner turns it into a
/// [`JobFailure`](crate::result::JobFailure).
#[derive(Debug, thiserror::Error)]
pub struct ScrapeError {
    pub code: ErrorCode,
    pub site: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ScrapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sitescrape: {} {}: {}", self.op, self.site, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ScrapeError {
    fn new(
        code: ErrorCode,
        site: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            site: site.into(),
            op: op.into(),
            source,
        }
    }

    pub fn invalid_url(
        site: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::InvalidUrl, site, op, source)
    }

    pub fn network(
        site: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Network, site, op, source)
    }

    pub fn selector(
        site: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Selector, site, op, source)
    }

    pub fn no_results(site: impl Into<String>, op: impl Into<String>) -> Self {
        Self::new(ErrorCode::NoResults, site, op, None)
    }

    pub fn persistence(
        site: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Persistence, site, op, source)
    }

    pub fn cancelled(site: impl Into<String>, op: impl Into<String>) -> Self {
        Self::new(ErrorCode::Cancelled, site, op, None)
    }

    /// Human-readable reason without the `sitescrape: <op> <site>` prefix.
    pub fn reason(&self) -> String {
        match self.source {
            Some(ref src) => format!("{}: {}", self.code, src),
            None => self.code.to_string(),
        }
    }

    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    pub fn is_network(&self) -> bool {
        self.code == ErrorCode::Network
    }

    pub fn is_no_results(&self) -> bool {
        self.code == ErrorCode::NoResults
    }

    pub fn is_cancelled(&self) -> bool {
        self.code == ErrorCode::Cancelled
    }
}

/// Errors raised before a batch starts.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BatchError {
    /// Paired batch where the two lists differ in length. No job was run.
    #[error("length mismatch: {sites} sites but {selectors} selectors")]
    LengthMismatch { sites: usize, selectors: usize },
}
