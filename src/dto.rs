use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_BASE_FILE: &str = "input.csv";
pub const DEFAULT_CHECK_FILE: &str = "check.txt";
pub const DEFAULT_RESULT_FILE: &str = "result.txt";
pub const DEFAULT_CLEANED_RESULT_FILE: &str = "cleaned_result.txt";
pub const DEFAULT_BATCH_SIZE: u64 = 10_000_000;
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1_000_000;

/// What the loader does with a base-file row it cannot tokenize.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedRowPolicy {
    /// Drop the row and keep loading.
    Skip,
    /// Keep the raw line text as an unlabeled phone value.
    #[default]
    CaptureRaw,
}

impl FromStr for MalformedRowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "skip" => Ok(MalformedRowPolicy::Skip),
            "capture-raw" => Ok(MalformedRowPolicy::CaptureRaw),
            other => Err(format!(
                "unknown malformed row policy '{}', expected 'skip' or 'capture-raw'",
                other
            )),
        }
    }
}

/// How a match line is rendered in the result file.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// `label; phone;`, one line per label.
    #[default]
    Labeled,
    /// The bare phone number, one line per matching query line.
    PhoneOnly,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "labeled" => Ok(OutputFormat::Labeled),
            "phone-only" => Ok(OutputFormat::PhoneOnly),
            other => Err(format!(
                "unknown output format '{}', expected 'labeled' or 'phone-only'",
                other
            )),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchConfig {
    pub base_file: PathBuf,
    pub check_file: PathBuf,
    pub result_file: PathBuf,
    pub cleaned_result_file: PathBuf,
    /// Records accumulated before the candidate batch is flushed.
    pub batch_size: u64,
    /// Records between two progress messages.
    pub progress_interval: u64,
    pub malformed_rows: MalformedRowPolicy,
    pub output_format: OutputFormat,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            base_file: PathBuf::from(DEFAULT_BASE_FILE),
            check_file: PathBuf::from(DEFAULT_CHECK_FILE),
            result_file: PathBuf::from(DEFAULT_RESULT_FILE),
            cleaned_result_file: PathBuf::from(DEFAULT_CLEANED_RESULT_FILE),
            batch_size: DEFAULT_BATCH_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            malformed_rows: MalformedRowPolicy::default(),
            output_format: OutputFormat::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CandidateRecord {
    pub label: Option<String>,
    pub phone: String,
}

impl CandidateRecord {
    pub fn new(label: Option<String>, phone: String) -> Self {
        let label = label.filter(|l| !l.is_empty());
        CandidateRecord { label, phone }
    }
}

impl fmt::Display for CandidateRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&match_line(self.label.as_deref(), &self.phone))
    }
}

/// Renders one labeled match line; an absent label leaves the first field empty.
pub fn match_line(label: Option<&str>, phone: &str) -> String {
    format!("{}; {};", label.unwrap_or_default(), phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_renders_label_and_phone() {
        let rec = CandidateRecord::new(Some("Ivan".into()), "79991234567".into());
        assert_eq!(rec.to_string(), "Ivan; 79991234567;");
    }

    #[test]
    fn missing_or_empty_label_renders_empty_field() {
        let none = CandidateRecord::new(None, "79991234567".into());
        let empty = CandidateRecord::new(Some(String::new()), "79991234567".into());
        assert_eq!(none.to_string(), "; 79991234567;");
        assert_eq!(none, empty);
    }

    #[test]
    fn policy_and_format_parse_from_env_strings() {
        assert_eq!("skip".parse::<MalformedRowPolicy>(), Ok(MalformedRowPolicy::Skip));
        assert_eq!(" capture-raw ".parse::<MalformedRowPolicy>(), Ok(MalformedRowPolicy::CaptureRaw));
        assert!("drop".parse::<MalformedRowPolicy>().is_err());
        assert_eq!("phone-only".parse::<OutputFormat>(), Ok(OutputFormat::PhoneOnly));
        assert!("csv".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn config_deserializes_camel_case() {
        let config: MatchConfig = serde_json::from_str(
            r#"{
                "baseFile": "base.csv",
                "checkFile": "q.txt",
                "resultFile": "r.txt",
                "cleanedResultFile": "c.txt",
                "batchSize": 5,
                "progressInterval": 2,
                "malformedRows": "skip",
                "outputFormat": "phone-only"
            }"#,
        )
        .unwrap();
        assert_eq!(config.base_file, PathBuf::from("base.csv"));
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.malformed_rows, MalformedRowPolicy::Skip);
        assert_eq!(config.output_format, OutputFormat::PhoneOnly);
    }
}
