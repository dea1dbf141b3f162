// chargelog - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

// =============================================================================
// Log Record (input unit, as fetched from the dashboard backend)
// =============================================================================

/// One captured transport log line for a charge point.
///
/// Records are immutable: the engine only inspects them, never rewrites
/// them. Every filtered or exported view hands back the same records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// ISO-8601 timestamp string as captured. Interpreted as UTC when the
    /// string carries no zone marker.
    pub timestamp: String,

    /// Full log message text, including any transport marker and frame.
    pub message: String,
}

impl LogRecord {
    pub fn new(timestamp: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            message: message.into(),
        }
    }

    /// Parse the timestamp string into a UTC instant.
    ///
    /// Tries RFC 3339 first, then zone-less ISO-8601 variants (`T` or space
    /// separator, optional fractional seconds) interpreted as UTC. Returns
    /// `None` when nothing matches; such records sort after timestamped
    /// ones rather than being dropped.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        let trimmed = self.timestamp.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Some(dt.into());
        }

        let normalised = trimmed.replace('T', " ");
        NaiveDateTime::parse_from_str(&normalised, "%Y-%m-%d %H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(&normalised, "%Y-%m-%d %H:%M:%S"))
            .ok()
            .map(|ndt| ndt.and_utc())
    }
}

// =============================================================================
// Protocol frame types
// =============================================================================

/// The three frame kinds of the request/reply protocol.
///
/// The numeric values are the wire literals in the first array element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MessageType {
    /// `[2, id, action, payload]`: a named command.
    Call,
    /// `[3, id, payload]`: success reply; never repeats the command name.
    CallResult,
    /// `[4, id, errorCode, errorDescription, errorDetails]`: error reply.
    CallError,
}

impl MessageType {
    /// Map a wire type id to a frame kind. Unknown ids yield `None` and the
    /// whole frame degrades to absence.
    pub fn from_wire(id: u64) -> Option<Self> {
        match id {
            2 => Some(Self::Call),
            3 => Some(Self::CallResult),
            4 => Some(Self::CallError),
            _ => None,
        }
    }
}

/// Protocol envelope extracted from one log line.
///
/// Absent (the parse returns `None`) when the line carries no recognisable
/// marker or the embedded array fails to parse; absence is not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFrame {
    pub message_type: MessageType,

    /// Identifier pairing a reply with its originating request. Coerced to
    /// string; unique only within one round trip, not across a charger's
    /// lifetime.
    pub unique_id: String,

    /// Command name. Present and authoritative for Call frames only.
    pub action: Option<String>,

    /// Structured payload for Call and CallResult frames.
    pub payload: Option<Value>,

    /// Error triple, CallError frames only.
    pub error_code: Option<String>,
    pub error_description: Option<String>,
    pub error_details: Option<Value>,
}

// =============================================================================
// Direction
// =============================================================================

/// Who originated a frame. Every record resolves to exactly one class;
/// `Unknown` matches neither direction filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    ChargerToServer,
    ServerToCharger,
    Unknown,
}

impl Direction {
    /// Fixed flow literal for the CSV MsgFlow column. `None` for Unknown;
    /// such records carry no tabular value and are dropped from exports.
    pub fn flow_label(&self) -> Option<&'static str> {
        match self {
            Self::ChargerToServer => Some(crate::util::constants::MARKER_CP_TO_CS),
            Self::ServerToCharger => Some(crate::util::constants::MARKER_CS_TO_CP),
            Self::Unknown => None,
        }
    }
}

// =============================================================================
// Filter specifiers
// =============================================================================

/// One selectable filter. `ShowAll` is mutually exclusive with every other
/// specifier; the active state is a set of the remaining variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterSpecifier {
    /// Bypass filtering entirely; the view is the snapshot verbatim.
    ShowAll,

    /// Match Call frames whose action equals this name, plus their
    /// correlated replies.
    Action(String),

    /// Match frames resolved to this direction.
    Direction(Direction),

    /// Match connection/handshake lifecycle lines (text predicate).
    Connection,

    /// Match error/failure lines, including protocol CallError frames.
    Error,
}

/// Active filter state: the two-state machine owned by the view controller.
///
/// `Specific` always holds a non-empty set; removing the last member
/// reverts to `ShowAll`. The transition logic lives in `app::state`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSelection {
    ShowAll,
    Specific(HashSet<FilterSpecifier>),
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self::ShowAll
    }
}

impl FilterSelection {
    /// True when the state is `ShowAll`.
    pub fn is_show_all(&self) -> bool {
        matches!(self, Self::ShowAll)
    }

    /// Iterate the active specific filters (none for `ShowAll`).
    pub fn iter_active(&self) -> impl Iterator<Item = &FilterSpecifier> {
        match self {
            Self::ShowAll => None,
            Self::Specific(set) => Some(set.iter()),
        }
        .into_iter()
        .flatten()
    }
}

// =============================================================================
// Filtered view
// =============================================================================

/// Result of one refresh cycle: the filtered records plus the count pair
/// for status display ("filtered of total").
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    pub records: Vec<LogRecord>,
    pub total: usize,
    pub filtered: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_from_wire() {
        assert_eq!(MessageType::from_wire(2), Some(MessageType::Call));
        assert_eq!(MessageType::from_wire(3), Some(MessageType::CallResult));
        assert_eq!(MessageType::from_wire(4), Some(MessageType::CallError));
        assert_eq!(MessageType::from_wire(5), None);
        assert_eq!(MessageType::from_wire(0), None);
    }

    #[test]
    fn test_parsed_timestamp_rfc3339() {
        let r = LogRecord::new("2024-01-15T14:30:22Z", "msg");
        let ts = r.parsed_timestamp().unwrap();
        assert_eq!(
            ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            "2024-01-15 14:30:22"
        );
    }

    #[test]
    fn test_parsed_timestamp_offset_converted_to_utc() {
        let r = LogRecord::new("2024-01-15T14:30:22+05:30", "msg");
        let ts = r.parsed_timestamp().unwrap();
        assert_eq!(
            ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            "2024-01-15 09:00:22"
        );
    }

    #[test]
    fn test_parsed_timestamp_zoneless_assumed_utc() {
        let r = LogRecord::new("2024-01-15T14:30:22", "msg");
        let ts = r.parsed_timestamp().unwrap();
        assert_eq!(
            ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            "2024-01-15 14:30:22"
        );
    }

    #[test]
    fn test_parsed_timestamp_space_separator_with_millis() {
        let r = LogRecord::new("2024-01-15 14:30:22.123", "msg");
        assert!(r.parsed_timestamp().is_some());
    }

    #[test]
    fn test_parsed_timestamp_garbage_is_none() {
        assert!(LogRecord::new("not-a-date", "msg").parsed_timestamp().is_none());
        assert!(LogRecord::new("", "msg").parsed_timestamp().is_none());
    }

    #[test]
    fn test_flow_label() {
        assert_eq!(Direction::ChargerToServer.flow_label(), Some("CP->CS"));
        assert_eq!(Direction::ServerToCharger.flow_label(), Some("CS->CP"));
        assert_eq!(Direction::Unknown.flow_label(), None);
    }

    #[test]
    fn test_filter_selection_default_is_show_all() {
        assert!(FilterSelection::default().is_show_all());
    }
}
