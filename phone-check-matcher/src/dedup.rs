use futures::{pin_mut, TryStreamExt};
use phone_check::error::ServiceError;
use phone_check::util;
use rustc_hash::FxHashSet;
use std::path::Path;
use tracing::info;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DedupStats {
    pub lines_read: u64,
    pub lines_written: u64,
}

///
/// Copies `input` to `output` keeping only the first occurrence of each line.
///
/// Memory grows with the number of distinct lines, not with the input size.
///
pub async fn remove_duplicates(input: &Path, output: &Path) -> Result<DedupStats, ServiceError> {
    let reader = util::open_input(input).await?;
    let mut writer = util::create_output(output).await?;
    let lines = util::lines(reader);
    pin_mut!(lines);

    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut stats = DedupStats::default();
    while let Some(line) = lines
        .try_next()
        .await
        .map_err(|err| ServiceError::reading(input, err))?
    {
        stats.lines_read += 1;
        if seen.contains(&line) {
            continue;
        }
        util::write_line(&mut writer, output, &line).await?;
        stats.lines_written += 1;
        seen.insert(line);
    }
    util::finish(&mut writer, output).await?;

    info!(
        read = stats.lines_read,
        written = stats.lines_written,
        "Removed {} duplicate lines",
        stats.lines_read - stats.lines_written
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn keeps_first_occurrence_order() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("result.txt");
        let output = dir.path().join("cleaned.txt");
        fs::write(&input, "A\nB\nA\nC\nB\n").unwrap();

        let stats = remove_duplicates(&input, &output).await.unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "A\nB\nC\n");
        assert_eq!(
            stats,
            DedupStats {
                lines_read: 5,
                lines_written: 3,
            }
        );
    }

    #[tokio::test]
    async fn second_pass_is_identity() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("result.txt");
        let once = dir.path().join("once.txt");
        let twice = dir.path().join("twice.txt");
        fs::write(&input, "x; 1;\n; 2;\nx; 1;\r\n; 2;\ny; 1;\n").unwrap();

        remove_duplicates(&input, &once).await.unwrap();
        remove_duplicates(&once, &twice).await.unwrap();

        let once = fs::read_to_string(&once).unwrap();
        assert_eq!(once, "x; 1;\n; 2;\ny; 1;\n");
        assert_eq!(fs::read_to_string(&twice).unwrap(), once);
    }

    #[tokio::test]
    async fn empty_input_gives_empty_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("result.txt");
        let output = dir.path().join("cleaned.txt");
        fs::write(&input, "").unwrap();

        let stats = remove_duplicates(&input, &output).await.unwrap();

        assert_eq!(stats, DedupStats::default());
        assert_eq!(fs::read_to_string(&output).unwrap(), "");
    }

    #[tokio::test]
    async fn output_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("result.txt");
        let output = dir.path().join("cleaned.txt");
        fs::write(&input, "A\n").unwrap();
        fs::write(&output, "stale\nstale\n").unwrap();

        remove_duplicates(&input, &output).await.unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "A\n");
    }
}
