use crate::error::ServiceError;
use futures::stream::{self, Stream};
use std::env;
use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

/// Reads `name` from the environment, falling back to `default` when unset.
pub fn env_or<T>(name: &str, default: T) -> Result<T, ServiceError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(name) {
        Ok(val) => T::from_str(val.trim()).map_err(|err| {
            ServiceError::invalid_config(format!(
                "Unable to parse environment variable '{}' = '{}': {}",
                name, val, err
            ))
        }),
        Err(_) => Ok(default),
    }
}

pub async fn open_input(path: &Path) -> Result<BufReader<File>, ServiceError> {
    File::open(path)
        .await
        .map(BufReader::new)
        .map_err(|err| ServiceError::reading(path, err))
}

/// Opens `path` for appending, creating it when missing.
pub async fn open_append(path: &Path) -> Result<BufWriter<File>, ServiceError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map(BufWriter::new)
        .map_err(|err| ServiceError::writing(path, err))
}

/// Creates `path`, truncating any previous contents.
pub async fn create_output(path: &Path) -> Result<BufWriter<File>, ServiceError> {
    File::create(path)
        .await
        .map(BufWriter::new)
        .map_err(|err| ServiceError::writing(path, err))
}

pub async fn write_line<W>(writer: &mut W, path: &Path, line: &str) -> Result<(), ServiceError>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(line.as_bytes())
        .await
        .map_err(|err| ServiceError::writing(path, err))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|err| ServiceError::writing(path, err))
}

pub async fn finish<W>(writer: &mut W, path: &Path) -> Result<(), ServiceError>
where
    W: AsyncWrite + Unpin,
{
    writer
        .flush()
        .await
        .map_err(|err| ServiceError::writing(path, err))
}

const BOM: &str = "\u{feff}";

/// Streams UTF-8 lines without their `\n` / `\r\n` terminators or a leading BOM.
pub fn lines<R>(reader: R) -> impl Stream<Item = io::Result<String>>
where
    R: AsyncBufRead + Unpin,
{
    stream::try_unfold((reader.lines(), true), |(mut lines, first)| async move {
        let line = lines.next_line().await?.map(|mut line| {
            if first && line.starts_with(BOM) {
                line.drain(..BOM.len());
            }
            (line, (lines, false))
        });
        Ok::<_, io::Error>(line)
    })
}

/// Streams raw lines as bytes, for inputs that may not be valid UTF-8.
///
/// Terminators and a leading UTF-8 BOM are removed.
pub fn byte_lines<R>(reader: R) -> impl Stream<Item = io::Result<Vec<u8>>>
where
    R: AsyncBufRead + Unpin,
{
    stream::try_unfold((reader, true), |(mut reader, first)| async move {
        let mut buf = Vec::new();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok::<_, io::Error>(None);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        if first && buf.starts_with(BOM.as_bytes()) {
            buf.drain(..BOM.len());
        }
        Ok(Some((buf, (reader, false))))
    })
}
