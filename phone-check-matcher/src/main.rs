mod candidates;
mod dedup;
mod loader;
mod matcher;
mod pipeline;

use clap::Parser;
use phone_check::dto::{DEFAULT_BASE_FILE, DEFAULT_CHECK_FILE};
use phone_check::report::{make_run_report, Status};
use std::path::PathBuf;
use std::process;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Matches base-file phone numbers against a check file and writes the
/// deduplicated matches.
#[derive(Parser, Debug)]
#[command(name = "phone-check")]
struct Args {
    /// Base file: one phone per line, optionally `"label"<TAB>"phone"`
    #[arg(default_value = DEFAULT_BASE_FILE)]
    base_file: PathBuf,

    /// Check file: one phone per line
    #[arg(default_value = DEFAULT_CHECK_FILE)]
    check_file: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let start = Instant::now();
    let result = match pipeline::build_config(args.base_file, args.check_file) {
        Ok(config) => pipeline::run(&config).await,
        Err(err) => Err(err),
    };
    let report = make_run_report(result);
    let rendered = serde_json::to_string(&report).unwrap_or_else(|err| err.to_string());

    if report.status != Status::Ok {
        error!("Run failed: {}", rendered);
        process::exit(report.status.code());
    }
    info!("Run report: {}", rendered);
    println!("{}", pipeline::format_execution_time(start.elapsed()));
    println!("Done!");
}
