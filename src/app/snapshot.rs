// chargelog - app/snapshot.rs
//
// Snapshot file loading. Stands in for the dashboard backend's periodic
// fetch: one file, one charger, one line per captured log record.

use crate::core::model::LogRecord;
use crate::util::constants::MAX_SNAPSHOT_SIZE;
use crate::util::error::SnapshotError;
use std::fs;
use std::path::Path;

/// Load a snapshot file into log records.
///
/// Each line is `<timestamp><whitespace><message>`. Size and encoding are
/// validated up front; line-level oddities degrade per `parse_snapshot`.
pub fn load_snapshot(path: &Path) -> Result<Vec<LogRecord>, SnapshotError> {
    let metadata = fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SnapshotError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            SnapshotError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    if !metadata.is_file() {
        return Err(SnapshotError::NotFound {
            path: path.to_path_buf(),
        });
    }
    if metadata.len() > MAX_SNAPSHOT_SIZE {
        return Err(SnapshotError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: MAX_SNAPSHOT_SIZE,
        });
    }

    let bytes = fs::read(path).map_err(|e| SnapshotError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let content = std::str::from_utf8(&bytes).map_err(|e| SnapshotError::InvalidEncoding {
        path: path.to_path_buf(),
        source: e,
    })?;

    let records = parse_snapshot(content);
    tracing::info!(
        path = %path.display(),
        records = records.len(),
        "Snapshot loaded"
    );
    Ok(records)
}

/// Split snapshot content into records.
///
/// The first whitespace run on each line separates timestamp from message.
/// Blank lines are skipped; a line with no separator becomes a record with
/// an empty timestamp (it still participates in text filtering and sorts
/// after timestamped records).
pub fn parse_snapshot(content: &str) -> Vec<LogRecord> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| match line.split_once(char::is_whitespace) {
            Some((timestamp, message)) => LogRecord::new(timestamp, message.trim_start()),
            None => LogRecord::new("", line),
        })
        .collect()
}
