//! navroll CLI binary.
//!
//! Reads the scheme registry, fetches NAV histories, and writes the monthly
//! rolling return report. Runs with no arguments; every flag overrides a
//! default.

mod integration;

use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use integration::paths::RunPaths;
use integration::pipeline::{DEFAULT_CONCURRENCY, PipelineConfig, run_batch};
use navroll::SchemeRegistry;
use navroll_data::{MfApiClient, MfApiConfig};
use navroll_output::{ExportFormat, ReportBuilder, RunLog, write_report};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Excel workbook with one sheet per category
    #[default]
    Xlsx,
    /// Flat CSV table
    Csv,
    /// Compact JSON
    Json,
    /// Indented JSON
    PrettyJson,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Xlsx => Self::Xlsx,
            FormatArg::Csv => Self::Csv,
            FormatArg::Json => Self::Json,
            FormatArg::PrettyJson => Self::PrettyJson,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "navroll")]
#[command(about = "Monthly rolling returns for a registry of mutual-fund schemes", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding scheme_codes.json, app_log.txt and outputs/
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Scheme registry file
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Directory the report is written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Run log file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Reference date for anchor resolution (default: today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    as_of: Option<NaiveDate>,

    /// Report format
    #[arg(long, value_enum, default_value_t = FormatArg::Xlsx)]
    format: FormatArg,

    /// Maximum concurrent NAV fetches
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// Re-attempts after a transient fetch failure
    #[arg(long, default_value = "1")]
    retries: u32,

    /// NAV API base URL
    #[arg(long)]
    api_base_url: Option<String>,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let json_logging = std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json_logging {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let paths = RunPaths::resolve(cli.base_dir, cli.registry, cli.output_dir, cli.log_file);
    let log = RunLog::open(&paths.log_file)?;
    log.info("Starting rolling returns run.");
    tracing::debug!(base_dir = %paths.base_dir.display(), "resolved run paths");

    let registry = match SchemeRegistry::load(&paths.registry) {
        Ok(registry) => registry,
        Err(e) => {
            log.error(format!("FATAL: {e}"));
            return Err(e.into());
        }
    };
    log.info(format!(
        "Loaded {} ({} AMCs, {} schemes).",
        paths.registry.display(),
        registry.amcs().len(),
        registry.len()
    ));

    let mut api_config = MfApiConfig {
        timeout: Duration::from_secs(cli.timeout_secs),
        retries: cli.retries,
        ..MfApiConfig::default()
    };
    if let Some(base_url) = cli.api_base_url {
        api_config.base_url = base_url;
    }
    let client = match MfApiClient::with_config(api_config) {
        Ok(client) => client,
        Err(e) => {
            log.error(format!("FATAL: {e}"));
            return Err(e.into());
        }
    };

    let as_of = cli.as_of.unwrap_or_else(|| Local::now().date_naive());
    let config = PipelineConfig {
        as_of,
        concurrency: cli.concurrency,
    };

    let progress = (!cli.no_progress).then(|| {
        let pb = ProgressBar::new(registry.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        pb
    });

    let outcome = run_batch(&client, &registry, &config, &log, progress.as_ref()).await;

    if let Some(pb) = &progress {
        pb.finish_with_message("Done");
    }

    for failure in &outcome.failures {
        tracing::debug!(
            scheme = %failure.entry.label(),
            code = %failure.entry.scheme_code,
            error = %failure.error,
            "excluded from report"
        );
    }

    let summary = outcome.summary;
    let report = ReportBuilder::new(as_of)
        .summary(summary)
        .results(outcome.results)
        .build();

    let artifact = match write_report(&report, &paths.output_dir, cli.format.into()) {
        Ok(path) => path,
        Err(e) => {
            log.error(format!("FATAL: {e}"));
            return Err(e.into());
        }
    };

    println!("{}", report.to_ascii_table());
    log.info(format!("Summary: {summary}"));
    log.info(format!("SUCCESS: Report generated at {}", artifact.display()));

    Ok(())
}
