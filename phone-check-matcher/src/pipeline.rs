use crate::dedup;
use crate::loader;
use phone_check::dto::MatchConfig;
use phone_check::error::ServiceError;
use phone_check::util;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::fs;
use tracing::info;

pub const RESULT_FILE_VAR: &str = "PHONE_CHECK_RESULT_FILE";
pub const CLEANED_FILE_VAR: &str = "PHONE_CHECK_CLEANED_FILE";
pub const BATCH_SIZE_VAR: &str = "PHONE_CHECK_BATCH_SIZE";
pub const PROGRESS_INTERVAL_VAR: &str = "PHONE_CHECK_PROGRESS_INTERVAL";
pub const MALFORMED_ROWS_VAR: &str = "PHONE_CHECK_MALFORMED_ROWS";
pub const OUTPUT_FORMAT_VAR: &str = "PHONE_CHECK_OUTPUT_FORMAT";

/// Builds the run configuration from the two input paths and environment overrides.
pub fn build_config(base_file: PathBuf, check_file: PathBuf) -> Result<MatchConfig, ServiceError> {
    let defaults = MatchConfig::default();
    let config = MatchConfig {
        base_file,
        check_file,
        result_file: util::env_or(RESULT_FILE_VAR, defaults.result_file)?,
        cleaned_result_file: util::env_or(CLEANED_FILE_VAR, defaults.cleaned_result_file)?,
        batch_size: util::env_or(BATCH_SIZE_VAR, defaults.batch_size)?,
        progress_interval: util::env_or(PROGRESS_INTERVAL_VAR, defaults.progress_interval)?,
        malformed_rows: util::env_or(MALFORMED_ROWS_VAR, defaults.malformed_rows)?,
        output_format: util::env_or(OUTPUT_FORMAT_VAR, defaults.output_format)?,
    };
    validate(&config)?;
    Ok(config)
}

fn validate(config: &MatchConfig) -> Result<(), ServiceError> {
    if config.batch_size == 0 {
        return Err(ServiceError::invalid_config("batch size must be positive"));
    }
    if config.progress_interval == 0 {
        return Err(ServiceError::invalid_config(
            "progress interval must be positive",
        ));
    }
    Ok(())
}

///
/// Runs loader, matcher and deduplicator in order and returns a JSON summary.
///
/// The result file is truncated first so one run never sees matches left by
/// a previous one; within the run it is only appended to.
///
pub async fn run(config: &MatchConfig) -> Result<Value, ServiceError> {
    validate(config)?;
    fs::metadata(&config.check_file)
        .await
        .map_err(|err| ServiceError::reading(&config.check_file, err))?;
    let mut result = util::create_output(&config.result_file).await?;
    util::finish(&mut result, &config.result_file).await?;
    drop(result);

    let start = Instant::now();
    let loaded = loader::load_and_match(config).await?;
    info!(
        "Loaded and matched in {:.4} secs",
        start.elapsed().as_secs_f64()
    );

    let start = Instant::now();
    let deduped =
        dedup::remove_duplicates(&config.result_file, &config.cleaned_result_file).await?;
    info!("Deduplicated in {:.4} secs", start.elapsed().as_secs_f64());

    Ok(json!({
        "records": loaded.records,
        "blankLines": loaded.blank_lines,
        "malformedSkipped": loaded.malformed_skipped,
        "malformedCaptured": loaded.malformed_captured,
        "batches": loaded.batches,
        "queryLines": loaded.matches.query_lines,
        "matchLines": loaded.matches.match_lines,
        "cleanedLines": deduped.lines_written,
        "resultFile": config.result_file,
        "cleanedResultFile": config.cleaned_result_file,
    }))
}

pub fn format_execution_time(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!(
        "Execution time: {} hours, {} minutes, {} seconds",
        secs / 3600,
        secs / 60 % 60,
        secs % 60
    )
}
