// ABOUTME: Batch Coordinator: expands sites against a shared selector or a positional selector list.
// ABOUTME: Jobs run on a bounded pool; outcomes come back in input order, one per site.

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::error::BatchError;
use crate::extractors::precompile_selectors;
use crate::result::{BatchSummary, JobOutcome};
use crate::scraper::Scraper;

impl Scraper {
    /// Scrape every site with the same selector.
    pub async fn run_batch<S: AsRef<str>>(&self, sites: &[S], selector: &str) -> Vec<JobOutcome> {
        self.warn_invalid(precompile_selectors([selector]));
        let jobs = sites.iter().map(|site| (site.as_ref(), selector)).collect();
        self.run_jobs(jobs).await
    }

    /// Scrape `sites[i]` with `selectors[i]`.
    ///
    /// Pairing is positional: a site listed twice runs twice, once per selector.
    /// Fails before running anything if the lists differ in length.
    pub async fn run_paired_batch<S, T>(
        &self,
        sites: &[S],
        selectors: &[T],
    ) -> Result<Vec<JobOutcome>, BatchError>
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        if sites.len() != selectors.len() {
            return Err(BatchError::LengthMismatch {
                sites: sites.len(),
                selectors: selectors.len(),
            });
        }

        self.warn_invalid(precompile_selectors(selectors.iter().map(|s| s.as_ref())));
        let jobs = sites
            .iter()
            .zip(selectors)
            .map(|(site, selector)| (site.as_ref(), selector.as_ref()))
            .collect();
        Ok(self.run_jobs(jobs).await)
    }

    async fn run_jobs(&self, jobs: Vec<(&str, &str)>) -> Vec<JobOutcome> {
        info!(
            jobs = jobs.len(),
            concurrency = self.opts.concurrency,
            layout = %self.opts.output_layout,
            "starting batch"
        );

        let outcomes: Vec<JobOutcome> = stream::iter(jobs.into_iter().enumerate())
            .map(|(index, (site, selector))| async move {
                let output = self.opts.output_path(index, site);
                self.run_job_at(site, selector, &output).await
            })
            .buffered(self.opts.concurrency)
            .collect()
            .await;

        let summary = BatchSummary::from_outcomes(&outcomes);
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "batch finished"
        );
        outcomes
    }

    fn warn_invalid(&self, invalid: Vec<String>) {
        for selector in invalid {
            warn!(selector = %selector, "selector does not compile; its jobs will fail");
        }
    }
}
