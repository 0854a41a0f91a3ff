// ABOUTME: Job Runner: fetch, extract, persist, and validate one (site, selector) pair.
// ABOUTME: Every error becomes a JobFailure; empty results never leave an artifact behind.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::ScrapeError;
use crate::extractors::extract_texts;
use crate::options::OutputLayout;
use crate::result::{Artifact, JobFailure, JobOutcome};
use crate::scraper::Scraper;

impl Scraper {
    /// Run one job, writing to the configured output location for a single job.
    pub async fn run_job(&self, site: &str, selector: &str) -> JobOutcome {
        let output = self.opts.output_path(0, site);
        self.run_job_at(site, selector, &output).await
    }

    /// Run one job, writing its artifact to `output`.
    pub async fn run_job_at(&self, site: &str, selector: &str, output: &Path) -> JobOutcome {
        info!(site, selector, "scraping");
        match self.try_job(site, selector, output).await {
            Ok(artifact) => {
                info!(
                    site,
                    path = %artifact.path.display(),
                    lines = artifact.lines,
                    "scrape complete"
                );
                JobOutcome::Success(artifact)
            }
            Err(err) => {
                warn!(site, selector, error = %err, "scrape failed");
                JobOutcome::Failure(JobFailure::new(site, selector, &err))
            }
        }
    }

    async fn try_job(
        &self,
        site: &str,
        selector: &str,
        output: &Path,
    ) -> Result<Artifact, ScrapeError> {
        let document = self.fetch_document(site).await?;
        let texts = extract_texts(&document, selector).ok_or_else(|| {
            ScrapeError::selector(
                site,
                "Extract",
                Some(anyhow::anyhow!("could not parse selector {:?}", selector)),
            )
        })?;
        drop(document);

        let _guard = match self.opts.output_layout {
            OutputLayout::Shared => Some(self.write_lock.lock().await),
            OutputLayout::PerJob => None,
        };

        debug!(site, path = %output.display(), "saving results");
        write_artifact(output, &texts).map_err(|e| {
            ScrapeError::persistence(
                site,
                "Persist",
                Some(anyhow::anyhow!("writing {}: {}", output.display(), e)),
            )
        })?;

        if texts.iter().all(String::is_empty) {
            remove_artifact(output).map_err(|e| {
                ScrapeError::persistence(
                    site,
                    "Persist",
                    Some(anyhow::anyhow!("removing {}: {}", output.display(), e)),
                )
            })?;
            return Err(ScrapeError::no_results(site, "Job"));
        }

        Ok(Artifact {
            site: site.to_string(),
            selector: selector.to_string(),
            path: output.to_path_buf(),
            lines: texts.len(),
        })
    }
}

/// Write `lines` to `path`, one per line, replacing any previous file atomically.
pub fn write_artifact(path: &Path, lines: &[String]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = temp_artifact(dir, path)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        for line in lines {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Temp file for `target` that keeps the target's mode, or 0644 (under the umask) for new files.
fn temp_artifact(dir: &Path, target: &Path) -> io::Result<tempfile::NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".sitescrape-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(target)
            .map(|m| m.permissions().mode() & 0o7777)
            .unwrap_or(0o644);
        builder.permissions(fs::Permissions::from_mode(mode));
    }
    #[cfg(not(unix))]
    let _ = target;
    builder.tempfile_in(dir)
}

fn remove_artifact(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
