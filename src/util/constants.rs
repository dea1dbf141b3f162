// chargelog - util/constants.rs
//
// Single source of truth for named constants, protocol literals, and limits.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "chargelog";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when neither RUST_LOG, --debug, nor the config
/// file specifies a level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Transport markers
// =============================================================================

/// Directional marker: frame travelled from the charge point to the server.
pub const MARKER_CP_TO_CS: &str = "CP->CS";

/// Directional marker: frame travelled from the server to the charge point.
pub const MARKER_CS_TO_CP: &str = "CS->CP";

/// Legacy marker written by older gateway builds. The log is recorded on the
/// server side, so "Sent" means server-to-charger.
pub const MARKER_LEGACY_SENT: &str = "Sent";

/// Legacy counterpart of [`MARKER_LEGACY_SENT`]: charger-to-server.
pub const MARKER_LEGACY_RECEIVED: &str = "Received";

// =============================================================================
// CSV export
// =============================================================================

/// Export header row. "RecieveTime" is misspelt on purpose: downstream
/// tooling consumes this exact literal.
pub const CSV_HEADER: [&str; 6] = [
    "CPID",
    "RecieveTime",
    "UniqueID",
    "MsgFlow",
    "Command",
    "PayloadData",
];

/// Charge point ID written to the CPID column when none is configured.
pub const DEFAULT_CHARGE_POINT_ID: &str = "unknown";

// =============================================================================
// Filter vocabularies
// =============================================================================

/// Built-in connection/handshake vocabulary for the Connection system filter.
/// Matched case-insensitively as substrings; "connect" deliberately covers
/// connected, connection, disconnect, and reconnect.
pub const CONNECTION_TERMS: [&str; 5] = ["connect", "socket", "handshake", "online", "offline"];

/// Built-in error/failure vocabulary for the Error system filter.
/// "fail" covers failed/failure, "reject" covers rejected/rejection.
pub const ERROR_TERMS: [&str; 6] = ["error", "fail", "reject", "timeout", "fault", "not supported"];

// =============================================================================
// Known command set
// =============================================================================

/// Commands initiated by the charge point.
pub const CHARGER_ACTIONS: [&str; 10] = [
    "BootNotification",
    "StatusNotification",
    "Heartbeat",
    "Authorize",
    "StartTransaction",
    "StopTransaction",
    "MeterValues",
    "DataTransfer",
    "FirmwareStatusNotification",
    "DiagnosticsStatusNotification",
];

/// Commands initiated by the server.
pub const SERVER_ACTIONS: [&str; 19] = [
    "RemoteStartTransaction",
    "RemoteStopTransaction",
    "GetConfiguration",
    "ChangeConfiguration",
    "ClearCache",
    "Reset",
    "SendLocalList",
    "ClearLocalList",
    "GetLocalListVersion",
    "TriggerMessage",
    "ChangeAvailability",
    "ReserveNow",
    "CancelReservation",
    "SetChargingProfile",
    "ClearChargingProfile",
    "GetCompositeSchedule",
    "UpdateFirmware",
    "GetDiagnostics",
    "UnlockConnector",
];

// =============================================================================
// Snapshot limits
// =============================================================================

/// Maximum snapshot file size accepted by the loader. A dashboard snapshot
/// for a single charger is a few megabytes at most; anything beyond this is
/// the wrong file, not a big log.
pub const MAX_SNAPSHOT_SIZE: u64 = 256 * 1024 * 1024; // 256 MB

/// Maximum number of extra vocabulary terms accepted from a config file.
pub const MAX_CONFIG_TERMS: usize = 256;
