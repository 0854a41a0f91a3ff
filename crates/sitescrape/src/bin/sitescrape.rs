// ABOUTME: CLI binary for sitescrape.
// ABOUTME: Scrapes sites with a shared or per-site selector, reports outcomes, optionally summarizes.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use sitescrape::{
    BatchError, BatchSummary, JobOutcome, OutputLayout, ProcessSummarizer, Scraper, Summarizer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "sitescrape")]
#[command(about = "Extract the text of matching elements from web pages, one line per match")]
struct Args {
    /// CSS selector. Give one to share it across all sites, or one per site to pair positionally.
    #[arg(short = 's', long = "selector", required = true)]
    selectors: Vec<String>,

    /// Directory that receives the output files
    #[arg(short = 'o', long = "output-dir", default_value = "outputs")]
    output_dir: PathBuf,

    /// Write every job to <output-dir>/output.txt instead of one file per job
    #[arg(long = "shared-output")]
    shared_output: bool,

    /// Maximum number of sites fetched at once
    #[arg(short = 'j', long = "concurrency", default_value_t = 1)]
    concurrency: usize,

    /// Request timeout in seconds
    #[arg(long = "timeout", default_value_t = 30)]
    timeout: u64,

    /// User-Agent header sent with every request
    #[arg(long = "user-agent")]
    user_agent: Option<String>,

    /// Extract from non-2xx responses instead of failing the job
    #[arg(long = "accept-error-status")]
    accept_error_status: bool,

    /// Print outcomes as JSON
    #[arg(long = "json")]
    json_output: bool,

    /// Summarizer program to run after scraping
    #[arg(long = "summarizer")]
    summarizer: Option<PathBuf>,

    /// Interpreter for the summarizer, e.g. python3
    #[arg(long = "interpreter", requires = "summarizer")]
    interpreter: Option<String>,

    /// Kill the summarizer after this many seconds
    #[arg(long = "summary-timeout", requires = "summarizer")]
    summary_timeout: Option<u64>,

    /// Sites to scrape
    #[arg(required = true)]
    sites: Vec<String>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_outcomes(outcomes: &[JobOutcome], json_output: bool) -> anyhow::Result<()> {
    if json_output {
        let report = serde_json::json!({
            "outcomes": outcomes,
            "summary": BatchSummary::from_outcomes(outcomes),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for outcome in outcomes {
            println!("{}", outcome);
        }
    }
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let mut builder = Scraper::builder()
        .output_dir(&args.output_dir)
        .concurrency(args.concurrency)
        .timeout(Duration::from_secs(args.timeout))
        .accept_error_status(args.accept_error_status);
    if args.shared_output {
        builder = builder.output_layout(OutputLayout::Shared);
    }
    if let Some(ua) = &args.user_agent {
        builder = builder.user_agent(ua);
    }
    let scraper = builder.build()?;

    let token = scraper.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling in-flight fetches");
            token.cancel();
        }
    });

    let outcomes = if args.selectors.len() == 1 {
        scraper.run_batch(&args.sites, &args.selectors[0]).await
    } else {
        match scraper.run_paired_batch(&args.sites, &args.selectors).await {
            Ok(outcomes) => outcomes,
            Err(err @ BatchError::LengthMismatch { .. }) => {
                eprintln!("error: {}", err);
                return Ok(ExitCode::from(2));
            }
        }
    };

    print_outcomes(&outcomes, args.json_output)?;

    if let Some(script) = &args.summarizer {
        let mut summarizer = ProcessSummarizer::new(script);
        if let Some(interpreter) = &args.interpreter {
            summarizer = summarizer.interpreter(interpreter);
        }
        if let Some(secs) = args.summary_timeout {
            summarizer = summarizer.timeout(Duration::from_secs(secs));
        }
        summarizer.summarize().await;
    }

    if outcomes.iter().all(JobOutcome::is_success) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
