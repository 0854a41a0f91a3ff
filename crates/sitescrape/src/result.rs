// ABOUTME: Job outcomes: Artifact on success, JobFailure otherwise, plus batch tallies.
// ABOUTME: Serializable so the CLI can report outcomes as JSON.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::{ErrorCode, ScrapeError};

/// A persisted extraction result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub site: String,
    pub selector: String,
    pub path: PathBuf,
    pub lines: usize,
}

/// Why a job produced no artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobFailure {
    pub site: String,
    pub selector: String,
    pub code: ErrorCode,
    pub reason: String,
}

impl JobFailure {
    pub fn new(site: &str, selector: &str, err: &ScrapeError) -> Self {
        Self {
            site: site.to_string(),
            selector: selector.to_string(),
            code: err.code,
            reason: err.reason(),
        }
    }
}

/// Result of one (site, selector) job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobOutcome {
    Success(Artifact),
    Failure(JobFailure),
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success(_))
    }

    pub fn site(&self) -> &str {
        match self {
            JobOutcome::Success(a) => &a.site,
            JobOutcome::Failure(f) => &f.site,
        }
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            JobOutcome::Success(a) => Some(a),
            JobOutcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&JobFailure> {
        match self {
            JobOutcome::Success(_) => None,
            JobOutcome::Failure(f) => Some(f),
        }
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Success(a) => write!(
                f,
                "ok {} -> {} ({} lines)",
                a.site,
                a.path.display(),
                a.lines
            ),
            JobOutcome::Failure(fail) => write!(f, "failed {}: {}", fail.site, fail.reason),
        }
    }
}

/// Success/failure counts for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[JobOutcome]) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            total: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<JobOutcome> {
        vec![
            JobOutcome::Success(Artifact {
                site: "https://a.example".to_string(),
                selector: "h1".to_string(),
                path: PathBuf::from("outputs/output-1-a_example.txt"),
                lines: 2,
            }),
            JobOutcome::Failure(JobFailure::new(
                "nope",
                "h1",
                &ScrapeError::invalid_url("nope", "Fetch", None),
            )),
        ]
    }

    #[test]
    fn display_lines() {
        let outcomes = sample();
        assert_eq!(
            outcomes[0].to_string(),
            "ok https://a.example -> outputs/output-1-a_example.txt (2 lines)"
        );
        assert_eq!(outcomes[1].to_string(), "failed nope: invalid URL");
    }

    #[test]
    fn summary_counts() {
        let summary = BatchSummary::from_outcomes(&sample());
        assert_eq!(
            summary,
            BatchSummary {
                total: 2,
                succeeded: 1,
                failed: 1
            }
        );
    }

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_value(&sample()).unwrap();
        assert_eq!(json[0]["status"], "success");
        assert_eq!(json[0]["lines"], 2);
        assert_eq!(json[1]["status"], "failure");
        assert_eq!(json[1]["code"], "invalid_url");
    }
}
