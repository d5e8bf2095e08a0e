use crate::candidates::CandidateSet;
use crate::matcher::{self, MatchStats};
use csv::{ReaderBuilder, StringRecord};
use futures::{pin_mut, TryStreamExt};
use phone_check::dto::{CandidateRecord, MalformedRowPolicy, MatchConfig};
use phone_check::error::ServiceError;
use phone_check::util;
use std::mem;
use tracing::{debug, info};

/// Outcome of parsing one base-file line.
#[derive(Debug, PartialEq)]
pub enum Row {
    Blank,
    Candidate(CandidateRecord),
    /// A malformed line kept verbatim as an unlabeled phone value.
    Captured(CandidateRecord),
    /// A malformed line dropped by policy.
    Skipped,
}

///
/// Tokenizes base-file lines of the form `phone` or `"label"\t"phone"`.
///
/// Fields are split on tabs only; quote characters anywhere in a field are
/// stripped. Lines with a field that opens a quote and never closes it,
/// invalid UTF-8 or an empty phone field are malformed and handled by the
/// configured policy.
///
pub struct RowParser {
    builder: ReaderBuilder,
    record: StringRecord,
    policy: MalformedRowPolicy,
}

impl RowParser {
    pub fn new(policy: MalformedRowPolicy) -> Self {
        let mut builder = ReaderBuilder::new();
        builder
            .delimiter(b'\t')
            .quoting(false)
            .has_headers(false)
            .flexible(true);
        RowParser {
            builder,
            record: StringRecord::new(),
            policy,
        }
    }

    pub fn parse(&mut self, line: &[u8]) -> Row {
        if line.iter().all(u8::is_ascii_whitespace) {
            return Row::Blank;
        }
        if let Some(record) = self.tokenize(line) {
            return Row::Candidate(record);
        }
        match self.policy {
            MalformedRowPolicy::Skip => Row::Skipped,
            MalformedRowPolicy::CaptureRaw => {
                let raw = String::from_utf8_lossy(line).trim().to_string();
                Row::Captured(CandidateRecord::new(None, raw))
            }
        }
    }

    fn tokenize(&mut self, line: &[u8]) -> Option<CandidateRecord> {
        let mut reader = self.builder.from_reader(line);
        match reader.read_record(&mut self.record) {
            Ok(true) => {}
            _ => return None,
        }
        if self.record.iter().any(is_unterminated) {
            return None;
        }
        let (label, phone) = match self.record.len() {
            0 => return None,
            1 => (None, clean_field(&self.record[0])),
            _ => (
                Some(clean_field(&self.record[0])),
                clean_field(&self.record[1]),
            ),
        };
        if phone.is_empty() {
            return None;
        }
        Some(CandidateRecord::new(label, phone))
    }
}

fn is_unterminated(field: &str) -> bool {
    field
        .trim()
        .strip_prefix('"')
        .is_some_and(|rest| !rest.contains('"'))
}

fn clean_field(field: &str) -> String {
    field.replace('"', "").trim().to_string()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub records: u64,
    pub blank_lines: u64,
    pub malformed_skipped: u64,
    pub malformed_captured: u64,
    pub batches: u64,
    pub matches: MatchStats,
}

///
/// Streams the base file into candidate batches and matches each batch
/// against the check file.
///
/// Every `batch_size` records the current batch is handed to the matcher and
/// replaced with an empty one, so memory is bounded by the batch rather than
/// the whole base file. A non-empty trailing batch is flushed at end of input.
///
pub async fn load_and_match(config: &MatchConfig) -> Result<LoadStats, ServiceError> {
    let reader = util::open_input(&config.base_file).await?;
    let lines = util::byte_lines(reader);
    pin_mut!(lines);

    let mut parser = RowParser::new(config.malformed_rows);
    let mut batch = CandidateSet::new();
    let mut stats = LoadStats::default();
    let mut line_no = 0u64;

    while let Some(line) = lines
        .try_next()
        .await
        .map_err(|err| ServiceError::reading(&config.base_file, err))?
    {
        line_no += 1;
        let record = match parser.parse(&line) {
            Row::Blank => {
                stats.blank_lines += 1;
                continue;
            }
            Row::Candidate(record) => record,
            Row::Captured(record) => {
                debug!(line = line_no, "Captured malformed row verbatim");
                stats.malformed_captured += 1;
                record
            }
            Row::Skipped => {
                debug!(line = line_no, "Skipped malformed row");
                stats.malformed_skipped += 1;
                continue;
            }
        };
        batch.insert(record);
        stats.records += 1;

        if stats.records % config.progress_interval == 0 {
            report_progress(stats.records);
        }
        if stats.records % config.batch_size == 0 {
            flush(&mut batch, config, &mut stats).await?;
        }
    }

    if !batch.is_empty() {
        flush(&mut batch, config, &mut stats).await?;
    }
    info!(
        records = stats.records,
        batches = stats.batches,
        skipped = stats.malformed_skipped,
        captured = stats.malformed_captured,
        "Base file loaded"
    );
    Ok(stats)
}

async fn flush(
    batch: &mut CandidateSet,
    config: &MatchConfig,
    stats: &mut LoadStats,
) -> Result<(), ServiceError> {
    let candidates = mem::take(batch);
    stats.batches += 1;
    info!(
        batch = stats.batches,
        phones = candidates.phones(),
        pairs = candidates.pairs(),
        "Checking batch against {}",
        config.check_file.display()
    );
    let matched = matcher::check_and_save(&candidates, config).await?;
    stats.matches += matched;
    Ok(())
}

fn report_progress(records: u64) {
    if records % 1_000_000 == 0 {
        info!("Read {} million phone numbers...", records / 1_000_000);
    } else {
        info!("Read {} phone numbers...", records);
    }
}
