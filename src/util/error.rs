// chargelog - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// The pure core degrades to absence instead of erroring (a log line that
// carries no frame is not a failure); these types cover the I/O shell:
// snapshot loading, configuration, and export writing.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all chargelog operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum ChargelogError {
    /// Snapshot file loading failed.
    Snapshot(SnapshotError),

    /// Export operation failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for ChargelogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snapshot(e) => write!(f, "Snapshot error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ChargelogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Snapshot(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot errors
// ---------------------------------------------------------------------------

/// Errors related to snapshot file loading.
#[derive(Debug)]
pub enum SnapshotError {
    /// The snapshot file does not exist or is not a regular file.
    NotFound { path: PathBuf },

    /// The snapshot file exceeds the maximum accepted size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// File content is not valid UTF-8.
    InvalidEncoding {
        path: PathBuf,
        source: std::str::Utf8Error,
    },

    /// I/O error reading the snapshot file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => {
                write!(f, "Snapshot '{}' does not exist", path.display())
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Snapshot '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::InvalidEncoding { path, source } => {
                write!(f, "'{}': invalid UTF-8 encoding: {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "'{}': I/O error: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidEncoding { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<SnapshotError> for ChargelogError {
    fn from(e: SnapshotError) -> Self {
        Self::Snapshot(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// CSV serialisation error.
    Csv { source: csv::Error },

    /// I/O error flushing the export writer.
    Io { source: io::Error },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv { source } => write!(f, "CSV export error: {source}"),
            Self::Io { source } => write!(f, "Export I/O error: {source}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Csv { source } => Some(source),
            Self::Io { source } => Some(source),
        }
    }
}

impl From<ExportError> for ChargelogError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading the config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for ChargelogError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for chargelog results.
pub type Result<T> = std::result::Result<T, ChargelogError>;
