use crate::candidates::CandidateSet;
use futures::{pin_mut, Stream, TryStreamExt};
use phone_check::dto::{match_line, MatchConfig, OutputFormat};
use phone_check::error::ServiceError;
use phone_check::util;
use std::io;
use std::ops::AddAssign;
use tokio::io::AsyncWrite;
use tracing::info;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MatchStats {
    /// Check-file lines scanned
    pub query_lines: u64,
    /// Check-file lines found in the candidate batch
    pub matched_queries: u64,
    /// Lines appended to the result file
    pub match_lines: u64,
}

impl AddAssign for MatchStats {
    fn add_assign(&mut self, other: Self) {
        self.query_lines += other.query_lines;
        self.matched_queries += other.matched_queries;
        self.match_lines += other.match_lines;
    }
}

///
/// Scans the check file from the start and appends a match line to the
/// result file for every query found in `candidates`.
///
/// Query lines are trimmed before lookup; bytes that are not valid UTF-8 are
/// replaced rather than failing the scan. In the labeled format one line is
/// written per label of the matched phone; in the phone-only format the
/// bare phone is written once per matching query line.
///
pub async fn check_and_save(
    candidates: &CandidateSet,
    config: &MatchConfig,
) -> Result<MatchStats, ServiceError> {
    let reader = util::open_input(&config.check_file).await?;
    let stats = save_matches(candidates, config, util::byte_lines(reader)).await?;

    info!(
        queries = stats.query_lines,
        matched = stats.matched_queries,
        lines = stats.match_lines,
        "Batch checked"
    );
    Ok(stats)
}

/// Appends matches for `queries`, flushing what was produced even when the
/// scan fails partway.
async fn save_matches<S>(
    candidates: &CandidateSet,
    config: &MatchConfig,
    queries: S,
) -> Result<MatchStats, ServiceError>
where
    S: Stream<Item = io::Result<Vec<u8>>>,
{
    let mut writer = util::open_append(&config.result_file).await?;
    let scanned = write_matches(candidates, config, queries, &mut writer).await;
    let finished = util::finish(&mut writer, &config.result_file).await;
    let stats = scanned?;
    finished?;
    Ok(stats)
}

async fn write_matches<S, W>(
    candidates: &CandidateSet,
    config: &MatchConfig,
    queries: S,
    writer: &mut W,
) -> Result<MatchStats, ServiceError>
where
    S: Stream<Item = io::Result<Vec<u8>>>,
    W: AsyncWrite + Unpin,
{
    pin_mut!(queries);
    let mut stats = MatchStats::default();
    while let Some(query) = queries
        .try_next()
        .await
        .map_err(|err| ServiceError::reading(&config.check_file, err))?
    {
        stats.query_lines += 1;
        let query = String::from_utf8_lossy(&query);
        let phone = query.trim();
        let Some(labels) = candidates.get(phone) else {
            continue;
        };
        stats.matched_queries += 1;
        match config.output_format {
            OutputFormat::Labeled => {
                for label in labels {
                    let line = match_line(label.as_deref(), phone);
                    util::write_line(writer, &config.result_file, &line).await?;
                    stats.match_lines += 1;
                }
            }
            OutputFormat::PhoneOnly => {
                util::write_line(writer, &config.result_file, phone).await?;
                stats.match_lines += 1;
            }
        }
    }
    Ok(stats)
}
