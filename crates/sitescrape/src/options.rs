// ABOUTME: Configuration for sitescrape: OutputLayout, Options, and the ScraperBuilder.
// ABOUTME: Output locations are derived here so every job targets an explicit path.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::scraper::Scraper;

/// File name used by [`OutputLayout::Shared`].
pub const SHARED_OUTPUT_FILE: &str = "output.txt";

/// How jobs map to artifact files inside the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputLayout {
    /// One artifact per job: `output-<n>-<host>.txt`.
    #[default]
    PerJob,
    /// Every job writes `output.txt`; each job overwrites the previous one.
    Shared,
}

impl fmt::Display for OutputLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputLayout::PerJob => "per-job",
            OutputLayout::Shared => "shared",
        };
        write!(f, "{}", s)
    }
}

/// Configuration options for a [`Scraper`].
#[derive(Debug, Clone)]
pub struct Options {
    pub timeout: Duration,
    pub user_agent: String,
    pub headers: HashMap<String, String>,
    pub http_client: Option<reqwest::Client>,
    pub accept_error_status: bool,
    pub output_dir: PathBuf,
    pub output_layout: OutputLayout,
    pub concurrency: usize,
    pub cancellation_token: Option<CancellationToken>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: "sitescrape/0.1".to_string(),
            headers: HashMap::new(),
            http_client: None,
            accept_error_status: false,
            output_dir: PathBuf::from("outputs"),
            output_layout: OutputLayout::PerJob,
            concurrency: 1,
            cancellation_token: None,
        }
    }
}

impl Options {
    /// Artifact path for the job at `index` (0-based) scraping `site`.
    pub fn output_path(&self, index: usize, site: &str) -> PathBuf {
        match self.output_layout {
            OutputLayout::Shared => self.output_dir.join(SHARED_OUTPUT_FILE),
            OutputLayout::PerJob => per_job_path(&self.output_dir, index, site),
        }
    }
}

fn per_job_path(dir: &Path, index: usize, site: &str) -> PathBuf {
    let host = url::Url::parse(site)
        .ok()
        .and_then(|u| u.host_str().map(slugify))
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "site".to_string());
    dir.join(format!("output-{}-{}.txt", index + 1, host))
}

fn slugify(host: &str) -> String {
    host.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Builder for constructing [`Scraper`] instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ScraperBuilder {
    opts: Options,
}

impl ScraperBuilder {
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Use a custom HTTP client. Timeout and user agent are then the client's own.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Treat non-2xx responses as documents instead of network failures.
    pub fn accept_error_status(mut self, accept: bool) -> Self {
        self.opts.accept_error_status = accept;
        self
    }

    /// Directory that receives artifacts.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.opts.output_dir = dir.into();
        self
    }

    pub fn output_layout(mut self, layout: OutputLayout) -> Self {
        self.opts.output_layout = layout;
        self
    }

    /// Maximum number of jobs in flight during a batch. Clamped to at least 1.
    pub fn concurrency(mut self, n: usize) -> Self {
        self.opts.concurrency = n.max(1);
        self
    }

    /// Token that aborts in-flight fetches when cancelled.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.opts.cancellation_token = Some(token);
        self
    }

    /// Build the Scraper with the configured options.
    pub fn build(self) -> Result<Scraper, reqwest::Error> {
        Scraper::new(self.opts)
    }
}

impl Default for ScraperBuilder {
    fn default() -> Self {
        Self::new()
    }
}
