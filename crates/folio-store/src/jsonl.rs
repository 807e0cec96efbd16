//! JSON Lines framing shared by the append-only logs.
//!
//! Each record is one `serde_json` object terminated by `\n`. JSON string
//! escaping guarantees a record never contains a raw newline, so the framing
//! is self-delimiting whatever text the record carries.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum JsonlError {
    #[error("log i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode record: {0}")]
    Serialize(String),

    #[error("invalid record at line {line}: {message}")]
    Corrupt { line: usize, message: String },
}

/// Append one record as a single complete line.
///
/// Callers must hold the per-log lock. A torn tail left by an interrupted
/// writer is truncated before the new record is written.
pub(crate) fn append_record<T: Serialize>(path: &Path, record: &T) -> Result<(), JsonlError> {
    let mut line =
        serde_json::to_vec(record).map_err(|e| JsonlError::Serialize(e.to_string()))?;
    line.push(b'\n');

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)?;
    repair_torn_tail(&mut file)?;
    file.write_all(&line)?;
    file.sync_data()?;
    Ok(())
}

/// Read every record in append order. A missing file is an empty log.
///
/// An unterminated final line is an append still in flight (or one that never
/// finished) and is skipped. Any other unparsable line is corruption.
pub(crate) fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, JsonlError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let terminated = bytes.last() == Some(&b'\n');
    let lines: Vec<&[u8]> = bytes.split(|b| *b == b'\n').collect();
    let last_index = lines.len().saturating_sub(1);

    let mut records = Vec::new();
    for (index, line) in lines.into_iter().enumerate() {
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match serde_json::from_slice::<T>(line) {
            Ok(record) => records.push(record),
            Err(_) if index == last_index && !terminated => {
                tracing::warn!(
                    path = %path.display(),
                    bytes = line.len(),
                    "skipping unterminated trailing record"
                );
            }
            Err(err) => {
                return Err(JsonlError::Corrupt {
                    line: index + 1,
                    message: err.to_string(),
                });
            }
        }
    }
    Ok(records)
}

fn repair_torn_tail(file: &mut File) -> io::Result<()> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(());
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    if last[0] == b'\n' {
        return Ok(());
    }

    let mut contents = Vec::with_capacity(len as usize);
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut contents)?;
    let keep = contents
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |pos| pos + 1);
    tracing::warn!(
        dropped = contents.len() - keep,
        "truncating torn record at end of log"
    );
    file.set_len(keep as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Row {
        text: String,
    }

    fn row(text: &str) -> Row {
        Row {
            text: text.to_string(),
        }
    }

    fn temp_path(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "folio-jsonl-{prefix}-{}-{unique}.jsonl",
            std::process::id()
        ))
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let path = temp_path("missing");
        let rows: Vec<Row> = read_records(&path).expect("missing log should read");
        assert!(rows.is_empty());
    }

    #[test]
    fn unterminated_tail_is_skipped_then_repaired() {
        let path = temp_path("torn");
        fs::write(&path, b"{\"text\":\"kept\"}\n{\"text\":\"tor").expect("fixture should write");

        let rows: Vec<Row> = read_records(&path).expect("torn tail should be tolerated");
        assert_eq!(rows, vec![row("kept")]);

        append_record(&path, &row("next")).expect("append should repair the tail");
        let rows: Vec<Row> = read_records(&path).expect("repaired log should read");
        assert_eq!(rows, vec![row("kept"), row("next")]);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn garbage_in_the_middle_is_corruption() {
        let path = temp_path("corrupt");
        fs::write(&path, b"{\"text\":\"a\"}\nnot json\n{\"text\":\"b\"}\n")
            .expect("fixture should write");

        match read_records::<Row>(&path) {
            Err(err @ JsonlError::Corrupt { line: 2, .. }) => {
                assert!(err.to_string().starts_with("invalid record at line 2: "));
            }
            other => panic!("expected corrupt log error, got {other:?}"),
        }

        let _ = fs::remove_file(path);
    }

    #[test]
    fn io_failures_convert_and_display() {
        let path = temp_path("dir");
        fs::create_dir_all(&path).expect("fixture dir should be created");

        let err = read_records::<Row>(&path).expect_err("a directory is not a log");
        assert!(matches!(err, JsonlError::Io(_)));
        assert!(err.to_string().starts_with("log i/o failed: "));

        let _ = fs::remove_dir_all(path);
    }
}
