// chargelog - core/frame.rs
//
// Transport frame extraction from raw log lines.
// Core layer: pure string-in, Option-out. A line that carries no frame is
// not an error; the whole pipeline degrades to plain-text handling.

use crate::core::model::{Direction, MessageType, ParsedFrame};
use crate::util::constants;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Regex locating the first transport marker in a log line: the two
/// directional markers, or the two legacy send/receive markers written by
/// older gateway builds.
fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"\b(CP->CS|CS->CP|Sent|Received)\b").expect("marker regex: invalid pattern")
    })
}

/// Find the first transport marker and return its direction plus the byte
/// offset just past the marker.
fn find_marker(message: &str) -> Option<(Direction, usize)> {
    let m = marker_regex().find(message)?;
    let direction = match m.as_str() {
        constants::MARKER_CP_TO_CS | constants::MARKER_LEGACY_RECEIVED => {
            Direction::ChargerToServer
        }
        constants::MARKER_CS_TO_CP | constants::MARKER_LEGACY_SENT => Direction::ServerToCharger,
        _ => return None,
    };
    Some((direction, m.end()))
}

/// Direction claimed by an explicit transport marker, if any.
///
/// The legacy markers are written from the server's point of view:
/// "Sent" is server-to-charger, "Received" is charger-to-server.
pub fn marker_direction(message: &str) -> Option<Direction> {
    find_marker(message).map(|(direction, _)| direction)
}

/// Text following the transport marker, stripped of separator punctuation.
///
/// Used by the exporter to salvage a payload column for lines whose frame
/// failed to parse. `None` when there is no marker or nothing follows it.
pub fn salvage_text(message: &str) -> Option<&str> {
    let (_, end) = find_marker(message)?;
    let rest = message[end..].trim_start_matches([':', '-', ' ', '\t']).trim_end();
    if rest.is_empty() {
        None
    } else {
        Some(rest)
    }
}

/// Extract the protocol envelope from one log line.
///
/// Locates a transport marker, then parses the first JSON array after it.
/// Trailing text after the array is tolerated (gateway lines often append
/// latency notes). Returns `None` for anything unparseable: missing
/// marker, malformed JSON, wrong arity, unknown type id.
pub fn parse_frame(message: &str) -> Option<ParsedFrame> {
    let (_, marker_end) = find_marker(message)?;
    let rest = &message[marker_end..];
    let array_start = rest.find('[')?;
    let json_slice = &rest[array_start..];

    // Prefix parse: stop at the end of the first complete JSON value so
    // trailing text does not poison the frame.
    let mut stream = serde_json::Deserializer::from_str(json_slice).into_iter::<Value>();
    let value = match stream.next() {
        Some(Ok(v)) => v,
        Some(Err(e)) => {
            tracing::debug!(error = %e, "Frame array failed to parse; treating as plain text");
            return None;
        }
        None => return None,
    };
    let arr = value.as_array()?;

    let message_type = MessageType::from_wire(arr.first()?.as_u64()?)?;
    let unique_id = coerce_id(arr.get(1)?)?;

    match message_type {
        MessageType::Call => {
            // [2, id, action, payload]
            let action = arr.get(2)?.as_str()?.to_string();
            Some(ParsedFrame {
                message_type,
                unique_id,
                action: Some(action),
                payload: arr.get(3).cloned(),
                error_code: None,
                error_description: None,
                error_details: None,
            })
        }
        MessageType::CallResult => {
            // [3, id, payload]
            Some(ParsedFrame {
                message_type,
                unique_id,
                action: None,
                payload: arr.get(2).cloned(),
                error_code: None,
                error_description: None,
                error_details: None,
            })
        }
        MessageType::CallError => {
            // [4, id, errorCode, errorDescription, errorDetails]
            Some(ParsedFrame {
                message_type,
                unique_id,
                action: None,
                payload: None,
                error_code: arr.get(2).and_then(|v| v.as_str()).map(str::to_string),
                error_description: arr.get(3).and_then(|v| v.as_str()).map(str::to_string),
                error_details: arr.get(4).cloned(),
            })
        }
    }
}

/// Coerce the wire unique id to a string. Gateways emit both string and
/// numeric ids; anything else is malformed.
fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
