// chargelog - core/export.rs
//
// CSV export of a log snapshot. Independent of the active filters: the
// dashboard always exports the full snapshot held at click time.
// Core layer: writes to any Write trait object.

use crate::core::classify;
use crate::core::direction;
use crate::core::frame;
use crate::core::model::{LogRecord, MessageType};
use crate::util::constants::CSV_HEADER;
use crate::util::error::ExportError;
use serde_json::json;
use std::io::Write;

/// Export records to CSV, one row per exportable record, in the order
/// given (the view controller hands the snapshot most-recent-first).
///
/// Columns: CPID, RecieveTime, UniqueID, MsgFlow, Command, PayloadData.
/// Records whose flow cannot be derived are silently dropped: a line with
/// no direction adds no tabular value. Returns the number of rows written.
pub fn export_csv<W: Write>(
    records: &[LogRecord],
    charge_point_id: &str,
    writer: W,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(CSV_HEADER)
        .map_err(|e| ExportError::Csv { source: e })?;

    let mut count = 0;
    let mut dropped = 0;
    for record in records {
        let Some(row) = derive_row(record) else {
            dropped += 1;
            continue;
        };

        csv_writer
            .write_record([
                charge_point_id,
                record.timestamp.as_str(),
                row.unique_id.as_str(),
                row.flow,
                row.command.as_str(),
                row.payload.as_str(),
            ])
            .map_err(|e| ExportError::Csv { source: e })?;
        count += 1;
    }

    csv_writer
        .flush()
        .map_err(|e| ExportError::Io { source: e })?;

    tracing::debug!(rows = count, dropped, "CSV export complete");
    Ok(count)
}

struct ExportRow {
    unique_id: String,
    flow: &'static str,
    command: String,
    payload: String,
}

/// Derive the tabular columns for one record, or `None` when the record
/// has no derivable flow.
fn derive_row(record: &LogRecord) -> Option<ExportRow> {
    let parsed = frame::parse_frame(&record.message);
    let flow = direction::resolve(&record.message, parsed.as_ref()).flow_label()?;

    match parsed {
        Some(f) => {
            let payload = match f.message_type {
                MessageType::CallError => json!({
                    "errorCode": f.error_code,
                    "errorDescription": f.error_description,
                    "errorDetails": f.error_details,
                })
                .to_string(),
                _ => f.payload.as_ref().map(|p| p.to_string()).unwrap_or_default(),
            };
            Some(ExportRow {
                unique_id: f.unique_id.clone(),
                flow,
                command: classify::command_label(&f),
                payload,
            })
        }
        None => {
            // Parse failed but the marker gave us a flow; salvage whatever
            // text follows it, or drop the record when there is nothing.
            let salvage = frame::salvage_text(&record.message)?;
            Some(ExportRow {
                unique_id: String::new(),
                flow,
                command: classify::RAW_ACTION.to_string(),
                payload: salvage.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn export(records: &[LogRecord]) -> (usize, String) {
        let mut buf = Vec::new();
        let count = export_csv(records, "CP001", &mut buf).unwrap();
        (count, String::from_utf8(buf).unwrap())
    }

    #[test]
    fn test_header_row() {
        let (_, output) = export(&[]);
        assert!(output.starts_with("CPID,RecieveTime,UniqueID,MsgFlow,Command,PayloadData"));
    }

    #[test]
    fn test_call_result_pair_rows() {
        let records = vec![
            LogRecord::new(
                "2024-03-01T10:00:02Z",
                r#"CP->CS: [3,"42",{"status":"Accepted"}]"#,
            ),
            LogRecord::new(
                "2024-03-01T10:00:01Z",
                r#"CS->CP: [2,"42","RemoteStartTransaction",{"idTag":"ABC"}]"#,
            ),
        ];
        let (count, output) = export(&records);
        assert_eq!(count, 2);

        let lines: Vec<&str> = output.lines().collect();
        // Most-recent-first input order is preserved: reply row first.
        assert!(lines[1].contains("42"));
        assert!(lines[1].contains("CP->CS"));
        assert!(lines[1].contains("StatusResponse"));
        assert!(lines[2].contains("42"));
        assert!(lines[2].contains("CS->CP"));
        assert!(lines[2].contains("RemoteStartTransaction"));
    }

    #[test]
    fn test_error_frame_row() {
        let records = vec![LogRecord::new(
            "2024-03-01T10:00:01Z",
            r#"CS->CP: [4,"7","NotSupported","unknown action",{}]"#,
        )];
        let (count, output) = export(&records);
        assert_eq!(count, 1);
        assert!(output.contains("Error"));
        assert!(output.contains("NotSupported"));
    }

    #[test]
    fn test_raw_row_salvages_text() {
        let records = vec![LogRecord::new(
            "2024-03-01T10:00:01Z",
            "Received: handshake banner v1.6",
        )];
        let (count, output) = export(&records);
        assert_eq!(count, 1);
        assert!(output.contains("Raw"));
        assert!(output.contains("handshake banner v1.6"));
        assert!(output.contains("CP->CS"));
    }

    #[test]
    fn test_record_without_flow_is_dropped() {
        let records = vec![
            LogRecord::new("2024-03-01T10:00:01Z", "internal scheduler tick"),
            LogRecord::new("2024-03-01T10:00:02Z", r#"CP->CS: [2,"1","Heartbeat",{}]"#),
        ];
        let (count, output) = export(&records);
        assert_eq!(count, 1);
        assert!(!output.contains("scheduler"));
    }

    #[test]
    fn test_quoting_of_embedded_commas_and_quotes() {
        let records = vec![LogRecord::new(
            "2024-03-01T10:00:01Z",
            r#"CP->CS: [2,"9","DataTransfer",{"data":"a,b \"quoted\""}]"#,
        )];
        let (_, output) = export(&records);
        // The payload cell contains commas and quotes, so the csv writer
        // must wrap it and double the embedded quotes.
        let payload_cell = output
            .lines()
            .nth(1)
            .and_then(|l| l.split("DataTransfer,").nth(1))
            .expect("payload cell");
        assert!(payload_cell.starts_with('"'));
        assert!(payload_cell.contains(r#""""#));
    }

    #[test]
    fn test_cpid_column() {
        let records = vec![LogRecord::new(
            "2024-03-01T10:00:01Z",
            r#"CP->CS: [2,"1","Heartbeat",{}]"#,
        )];
        let (_, output) = export(&records);
        assert!(output.lines().nth(1).unwrap().starts_with("CP001,"));
    }
}
