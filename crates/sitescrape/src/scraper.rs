// ABOUTME: The Scraper handle: HTTP client, options, cancellation token, and the shared-output lock.
// ABOUTME: Job and batch operations are implemented on it in job.rs and batch.rs.

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::ScrapeError;
use crate::options::{Options, ScraperBuilder};
use crate::resource::{fetch, FetchOptions};

/// Fetches sites, extracts selector text, and writes artifacts.
pub struct Scraper {
    pub(crate) opts: Options,
    pub(crate) http_client: reqwest::Client,
    pub(crate) cancel: CancellationToken,
    /// Held across write, validate and delete when jobs share one artifact path.
    pub(crate) write_lock: Mutex<()>,
}

impl Scraper {
    pub fn builder() -> ScraperBuilder {
        ScraperBuilder::new()
    }

    /// Create a new Scraper with the given options. `concurrency` is clamped to at least 1.
    pub fn new(mut opts: Options) -> Result<Self, reqwest::Error> {
        opts.concurrency = opts.concurrency.max(1);
        let http_client = match opts.http_client.clone() {
            Some(client) => client,
            None => reqwest::Client::builder()
                .user_agent(&opts.user_agent)
                .timeout(opts.timeout)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()?,
        };
        let cancel = opts.cancellation_token.clone().unwrap_or_default();

        Ok(Self {
            opts,
            http_client,
            cancel,
            write_lock: Mutex::new(()),
        })
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Token that aborts in-flight fetches. Cancelling it is permanent for this Scraper.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Fetch `site` and return its document text, racing the cancellation token.
    pub async fn fetch_document(&self, site: &str) -> Result<String, ScrapeError> {
        let fetch_opts = FetchOptions {
            headers: self.opts.headers.clone(),
            accept_error_status: self.opts.accept_error_status,
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ScrapeError::cancelled(site, "Fetch")),
            fetched = fetch(&self.http_client, site, &fetch_opts) => fetched.map(|r| r.document()),
        }
    }
}
