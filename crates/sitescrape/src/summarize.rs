// ABOUTME: Summarizer Bridge: runs an external summarization program and relays its stdout.
// ABOUTME: Best effort: failures are logged and recorded, partial output is always returned.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{info, warn};

/// Failures while running a summarizer.
#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("failed to start summarizer: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("summarizer stdout was not captured")]
    MissingStdout,

    #[error("failed reading summarizer output: {0}")]
    Io(#[source] std::io::Error),

    #[error("summarizer timed out after {0:?}")]
    Timeout(Duration),

    #[error("summarizer exited with {0}")]
    ExitStatus(ExitStatus),
}

/// Everything a summarizer run produced.
#[derive(Debug, Default)]
pub struct SummaryReport {
    /// Captured lines joined with `\n`. Partial when `error` is set.
    pub output: String,
    pub error: Option<SummarizeError>,
}

impl SummaryReport {
    pub fn is_clean(&self) -> bool {
        self.error.is_none()
    }
}

/// A source of summaries for the scraped output.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize_report(&self) -> SummaryReport;

    /// The summary text, ignoring how the run ended.
    async fn summarize(&self) -> String {
        self.summarize_report().await.output
    }
}

/// Runs an external program and captures its standard output line by line.
#[derive(Debug, Clone)]
pub struct ProcessSummarizer {
    script: PathBuf,
    interpreter: Option<String>,
    current_dir: Option<PathBuf>,
    timeout: Option<Duration>,
    echo: bool,
}

impl ProcessSummarizer {
    /// Run `script` as an executable with no arguments.
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            interpreter: None,
            current_dir: None,
            timeout: None,
            echo: true,
        }
    }

    /// Run the script through an interpreter, e.g. `python3 summarizer.py`.
    pub fn interpreter(mut self, program: impl Into<String>) -> Self {
        self.interpreter = Some(program.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Kill the process and stop reading once `limit` has elapsed.
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Print each captured line to stdout as it arrives (default on).
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    fn command(&self) -> Command {
        let mut cmd = match &self.interpreter {
            Some(program) => {
                let mut cmd = Command::new(program);
                cmd.arg(&self.script);
                cmd
            }
            None => Command::new(&self.script),
        };
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, lines: &mut Vec<String>) -> Result<(), SummarizeError> {
        let mut child = self.command().spawn().map_err(SummarizeError::Spawn)?;
        let stdout = child.stdout.take().ok_or(SummarizeError::MissingStdout)?;

        let status = {
            let pump = pump(&mut child, stdout, lines, self.echo);
            match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, pump).await {
                    Ok(status) => status,
                    Err(_) => Err(SummarizeError::Timeout(limit)),
                },
                None => pump.await,
            }
        };

        if let Err(SummarizeError::Timeout(_)) = status {
            if let Err(e) = child.kill().await {
                warn!(error = %e, "failed to kill summarizer");
            }
        }

        let status = status?;
        if status.success() {
            Ok(())
        } else {
            Err(SummarizeError::ExitStatus(status))
        }
    }
}

async fn pump(
    child: &mut Child,
    stdout: ChildStdout,
    lines: &mut Vec<String>,
    echo: bool,
) -> Result<ExitStatus, SummarizeError> {
    let mut reader = BufReader::new(stdout).lines();
    while let Some(line) = reader.next_line().await.map_err(SummarizeError::Io)? {
        if echo {
            println!("{}", line);
        }
        lines.push(line);
    }
    child.wait().await.map_err(SummarizeError::Io)
}

#[async_trait]
impl Summarizer for ProcessSummarizer {
    async fn summarize_report(&self) -> SummaryReport {
        info!(script = %self.script.display(), "summarizing scraped data");
        let mut lines = Vec::new();
        let result = self.run(&mut lines).await;
        let output = lines.join("\n");

        match result {
            Ok(()) => {
                info!(lines = lines.len(), "summary complete");
                SummaryReport {
                    output,
                    error: None,
                }
            }
            Err(err) => {
                warn!(error = %err, lines = lines.len(), "summarizer did not finish cleanly");
                SummaryReport {
                    output,
                    error: Some(err),
                }
            }
        }
    }
}
