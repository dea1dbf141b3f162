// chargelog - core/classify.rs
//
// Action classification. Call frames carry their action literally; replies
// never repeat it, so CallResult frames are classified by payload shape
// through an ordered, first-match-wins rule table. The same shapes back the
// response-matcher used by the correlator to verify that a reply is
// consistent with a candidate action.
//
// Both tables are data: adding a command means adding an entry, not
// touching correlation logic.

use crate::core::model::{MessageType, ParsedFrame};
use serde_json::{Map, Value};

/// Synthetic action assigned to CallError frames. Matches the error filter
/// and any correlation key, never a specific action filter directly.
pub const ERROR_ACTION: &str = "Error";

/// Command label for records whose frame failed to parse but still carry
/// salvageable text after the transport marker.
pub const RAW_ACTION: &str = "Raw";

type ShapeFn = fn(&Map<String, Value>) -> bool;

// =============================================================================
// CallResult classification
// =============================================================================

/// Heuristic classification of a CallResult payload.
///
/// Always heuristic: the protocol omits the action name on replies, so the
/// best the engine can do is recognise well-known confirmation shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    Heartbeat,
    Authorize,
    StartTransaction,
    StopTransaction,
    MeterValues,
    Status,
    /// Catch-all for payloads no rule recognises. Never an error.
    Generic,
}

impl ResponseKind {
    /// Display/export label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Heartbeat => "HeartbeatResponse",
            Self::Authorize => "AuthorizeResponse",
            Self::StartTransaction => "StartTransactionResponse",
            Self::StopTransaction => "StopTransactionResponse",
            Self::MeterValues => "MeterValuesResponse",
            Self::Status => "StatusResponse",
            Self::Generic => "Response",
        }
    }
}

/// Ordered classification rules for CallResult payloads. First match wins;
/// the order is load-bearing and must not be rearranged (rule 4 only sees
/// payloads rule 2 already passed over, and so on).
static RESULT_RULES: &[(ShapeFn, ResponseKind)] = &[
    (shape_only_current_time, ResponseKind::Heartbeat),
    (shape_status_id_tag_no_txn, ResponseKind::Authorize),
    (shape_status_with_txn, ResponseKind::StartTransaction),
    (shape_id_tag_no_txn, ResponseKind::StopTransaction),
    (shape_empty, ResponseKind::MeterValues),
    (shape_only_status, ResponseKind::Status),
];

/// Classify a CallResult payload by shape.
///
/// Missing or non-object payloads land in the catch-all bucket.
pub fn classify_result(payload: Option<&Value>) -> ResponseKind {
    let obj = match payload {
        Some(Value::Object(map)) => map,
        _ => return ResponseKind::Generic,
    };
    for (matches, kind) in RESULT_RULES {
        if matches(obj) {
            return *kind;
        }
    }
    ResponseKind::Generic
}

/// The command label for a parsed frame: literal action for Call frames
/// (authoritative), heuristic confirmation label for CallResult, the
/// synthetic error action for CallError.
pub fn command_label(frame: &ParsedFrame) -> String {
    match frame.message_type {
        MessageType::Call => frame.action.clone().unwrap_or_else(|| "Call".to_string()),
        MessageType::CallResult => classify_result(frame.payload.as_ref()).label().to_string(),
        MessageType::CallError => ERROR_ACTION.to_string(),
    }
}

// =============================================================================
// Response matcher
// =============================================================================

/// One entry of the response-matcher table: the confirmation shape a named
/// command is expected to produce.
pub struct ResponseShape {
    pub action: &'static str,
    pub matches: ShapeFn,
}

/// Expected confirmation shapes for the known command set.
///
/// Built from the same shape predicates as the classification rules so the
/// two views of the protocol cannot drift apart. Commands replying with a
/// bare `{status}` body share one predicate.
static RESPONSE_SHAPES: &[ResponseShape] = &[
    // Charger-originated commands
    ResponseShape { action: "BootNotification", matches: shape_has_current_time },
    ResponseShape { action: "Heartbeat", matches: shape_only_current_time },
    ResponseShape { action: "Authorize", matches: shape_id_tag_no_txn },
    ResponseShape { action: "StartTransaction", matches: shape_has_txn },
    ResponseShape { action: "StopTransaction", matches: shape_empty_or_id_tag },
    ResponseShape { action: "MeterValues", matches: shape_empty },
    ResponseShape { action: "StatusNotification", matches: shape_empty },
    ResponseShape { action: "FirmwareStatusNotification", matches: shape_empty },
    ResponseShape { action: "DiagnosticsStatusNotification", matches: shape_empty },
    ResponseShape { action: "DataTransfer", matches: shape_has_status },
    // Server-originated commands
    ResponseShape { action: "RemoteStartTransaction", matches: shape_has_status },
    ResponseShape { action: "RemoteStopTransaction", matches: shape_has_status },
    ResponseShape { action: "GetConfiguration", matches: shape_configuration },
    ResponseShape { action: "ChangeConfiguration", matches: shape_has_status },
    ResponseShape { action: "ClearCache", matches: shape_has_status },
    ResponseShape { action: "Reset", matches: shape_has_status },
    ResponseShape { action: "SendLocalList", matches: shape_has_status },
    ResponseShape { action: "ClearLocalList", matches: shape_has_status },
    ResponseShape { action: "GetLocalListVersion", matches: shape_list_version },
    ResponseShape { action: "TriggerMessage", matches: shape_has_status },
    ResponseShape { action: "ChangeAvailability", matches: shape_has_status },
    ResponseShape { action: "ReserveNow", matches: shape_has_status },
    ResponseShape { action: "CancelReservation", matches: shape_has_status },
    ResponseShape { action: "SetChargingProfile", matches: shape_has_status },
    ResponseShape { action: "ClearChargingProfile", matches: shape_has_status },
    ResponseShape { action: "GetCompositeSchedule", matches: shape_has_status },
    ResponseShape { action: "UpdateFirmware", matches: shape_empty },
    ResponseShape { action: "GetDiagnostics", matches: shape_diagnostics },
    ResponseShape { action: "UnlockConnector", matches: shape_has_status },
];

/// Is a CallResult payload consistent with being the reply to `action`?
///
/// Unrecognised actions default to permissive: a correlation key is better
/// evidence than a shape table that has not caught up with the command set.
pub fn action_matches_result(action: &str, payload: Option<&Value>) -> bool {
    let empty = Map::new();
    let obj = match payload {
        Some(Value::Object(map)) => map,
        _ => &empty,
    };
    for shape in RESPONSE_SHAPES {
        if shape.action == action {
            return (shape.matches)(obj);
        }
    }
    true
}

// =============================================================================
// Shape predicates
// =============================================================================

fn shape_only_current_time(obj: &Map<String, Value>) -> bool {
    obj.len() == 1 && obj.contains_key("currentTime")
}

fn shape_has_current_time(obj: &Map<String, Value>) -> bool {
    obj.contains_key("currentTime")
}

fn shape_status_id_tag_no_txn(obj: &Map<String, Value>) -> bool {
    obj.contains_key("status")
        && obj.contains_key("idTagInfo")
        && !obj.contains_key("transactionId")
}

fn shape_status_with_txn(obj: &Map<String, Value>) -> bool {
    obj.contains_key("status") && obj.contains_key("transactionId")
}

fn shape_id_tag_no_txn(obj: &Map<String, Value>) -> bool {
    obj.contains_key("idTagInfo") && !obj.contains_key("transactionId")
}

fn shape_has_txn(obj: &Map<String, Value>) -> bool {
    obj.contains_key("transactionId")
}

fn shape_empty(obj: &Map<String, Value>) -> bool {
    obj.is_empty()
}

fn shape_empty_or_id_tag(obj: &Map<String, Value>) -> bool {
    shape_empty(obj) || shape_id_tag_no_txn(obj)
}

fn shape_only_status(obj: &Map<String, Value>) -> bool {
    obj.len() == 1 && obj.contains_key("status")
}

fn shape_has_status(obj: &Map<String, Value>) -> bool {
    obj.contains_key("status")
}

fn shape_configuration(obj: &Map<String, Value>) -> bool {
    obj.contains_key("configurationKey") || obj.contains_key("unknownKey")
}

fn shape_list_version(obj: &Map<String, Value>) -> bool {
    obj.contains_key("listVersion")
}

fn shape_diagnostics(obj: &Map<String, Value>) -> bool {
    shape_empty(obj) || obj.contains_key("fileName")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify(payload: serde_json::Value) -> ResponseKind {
        classify_result(Some(&payload))
    }

    #[test]
    fn test_rule_order_heartbeat() {
        assert_eq!(classify(json!({"currentTime": "t"})), ResponseKind::Heartbeat);
    }

    #[test]
    fn test_rule_order_authorize() {
        assert_eq!(
            classify(json!({"status": "Accepted", "idTagInfo": {}})),
            ResponseKind::Authorize
        );
    }

    #[test]
    fn test_rule_order_start_transaction() {
        assert_eq!(
            classify(json!({"status": "Accepted", "transactionId": 7})),
            ResponseKind::StartTransaction
        );
        // transactionId beats idTagInfo because rule 3 precedes rule 4
        assert_eq!(
            classify(json!({"status": "Accepted", "transactionId": 7, "idTagInfo": {}})),
            ResponseKind::StartTransaction
        );
    }

    #[test]
    fn test_rule_order_stop_transaction() {
        assert_eq!(classify(json!({"idTagInfo": {}})), ResponseKind::StopTransaction);
    }

    #[test]
    fn test_rule_order_empty_is_meter_values() {
        assert_eq!(classify(json!({})), ResponseKind::MeterValues);
    }

    #[test]
    fn test_rule_order_status_only() {
        assert_eq!(classify(json!({"status": "Accepted"})), ResponseKind::Status);
    }

    #[test]
    fn test_unrecognised_payload_is_generic() {
        // BootNotification confirmation: extra fields break every exact rule.
        assert_eq!(
            classify(json!({"currentTime": "t", "interval": 1, "status": "Accepted"})),
            ResponseKind::Generic
        );
        assert_eq!(classify(json!({"foo": "bar"})), ResponseKind::Generic);
    }

    #[test]
    fn test_missing_or_non_object_payload_is_generic() {
        assert_eq!(classify_result(None), ResponseKind::Generic);
        assert_eq!(classify_result(Some(&json!("str"))), ResponseKind::Generic);
        assert_eq!(classify_result(Some(&json!([1, 2]))), ResponseKind::Generic);
    }

    #[test]
    fn test_boot_confirmation_matches_boot_but_not_heartbeat() {
        let payload = json!({"currentTime": "t", "interval": 1, "status": "Accepted"});
        assert!(action_matches_result("BootNotification", Some(&payload)));
        assert!(!action_matches_result("Heartbeat", Some(&payload)));
    }

    #[test]
    fn test_heartbeat_matches_exact_shape_only() {
        let exact = json!({"currentTime": "t"});
        assert!(action_matches_result("Heartbeat", Some(&exact)));
    }

    #[test]
    fn test_status_reply_commands() {
        let status = json!({"status": "Accepted"});
        assert!(action_matches_result("Reset", Some(&status)));
        assert!(action_matches_result("RemoteStartTransaction", Some(&status)));
        assert!(!action_matches_result("Reset", Some(&json!({"other": 1}))));
    }

    #[test]
    fn test_stop_transaction_accepts_empty_and_id_tag() {
        assert!(action_matches_result("StopTransaction", Some(&json!({}))));
        assert!(action_matches_result("StopTransaction", Some(&json!({"idTagInfo": {}}))));
        assert!(!action_matches_result(
            "StopTransaction",
            Some(&json!({"transactionId": 1, "idTagInfo": {}}))
        ));
    }

    #[test]
    fn test_empty_body_commands() {
        assert!(action_matches_result("MeterValues", Some(&json!({}))));
        assert!(action_matches_result("StatusNotification", Some(&json!({}))));
        assert!(!action_matches_result("MeterValues", Some(&json!({"status": "x"}))));
    }

    #[test]
    fn test_unknown_action_is_permissive() {
        assert!(action_matches_result("FutureCommand", Some(&json!({"anything": true}))));
        assert!(action_matches_result("FutureCommand", None));
    }

    #[test]
    fn test_command_label() {
        let call = crate::core::frame::parse_frame(r#"CP->CS: [2,"1","Reset",{}]"#).unwrap();
        assert_eq!(command_label(&call), "Reset");

        let result = crate::core::frame::parse_frame(r#"CS->CP: [3,"1",{"status":"Accepted"}]"#)
            .unwrap();
        assert_eq!(command_label(&result), "StatusResponse");

        let err = crate::core::frame::parse_frame(r#"CS->CP: [4,"1","GenericError","d",{}]"#)
            .unwrap();
        assert_eq!(command_label(&err), "Error");
    }
}
