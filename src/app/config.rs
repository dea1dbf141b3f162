// chargelog - app/config.rs
//
// Optional TOML configuration. Everything has a built-in default; the
// config file only ever adds vocabulary terms or overrides labels, so a
// missing file is not an error.

use crate::util::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Known tracing levels accepted in `[logging] level`.
const KNOWN_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application configuration as deserialized from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Extra vocabulary for the text-based system filters. Additive only:
/// built-in terms are always active.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    #[serde(default)]
    pub connection_terms: Vec<String>,

    #[serde(default)]
    pub error_terms: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Charge point ID written to the CPID column.
    pub charge_point_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Tracing level: trace, debug, info, warn, or error.
    pub level: Option<String>,
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config = parse_config(&content, path)?;
    tracing::debug!(path = %path.display(), "Config loaded");
    Ok(config)
}

/// Parse and validate config content. `source_path` is for error messages
/// only, never for I/O.
pub fn parse_config(content: &str, source_path: &Path) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content).map_err(|e| ConfigError::TomlParse {
        path: source_path.to_path_buf(),
        source: e,
    })?;

    if let Some(level) = config.logging.level.as_deref() {
        if !KNOWN_LEVELS.contains(&level) {
            return Err(ConfigError::ValueOutOfRange {
                field: "logging.level".to_string(),
                value: level.to_string(),
                expected: KNOWN_LEVELS.join(", "),
            });
        }
    }

    if let Some(cpid) = config.export.charge_point_id.as_deref() {
        if cpid.trim().is_empty() {
            return Err(ConfigError::ValueOutOfRange {
                field: "export.charge_point_id".to_string(),
                value: cpid.to_string(),
                expected: "a non-empty identifier".to_string(),
            });
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(content: &str) -> Result<AppConfig, ConfigError> {
        parse_config(content, &PathBuf::from("test.toml"))
    }

    #[test]
    fn test_empty_config_is_all_defaults() {
        let config = parse("").unwrap();
        assert!(config.filter.connection_terms.is_empty());
        assert!(config.export.charge_point_id.is_none());
        assert!(config.logging.level.is_none());
    }

    #[test]
    fn test_full_config() {
        let config = parse(
            r#"
[filter]
connection_terms = ["keepalive"]
error_terms = ["gave up"]

[export]
charge_point_id = "CP-0042"

[logging]
level = "debug"
"#,
        )
        .unwrap();
        assert_eq!(config.filter.connection_terms, vec!["keepalive"]);
        assert_eq!(config.export.charge_point_id.as_deref(), Some("CP-0042"));
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_unknown_level_rejected() {
        let result = parse("[logging]\nlevel = \"loud\"\n");
        assert!(matches!(result, Err(ConfigError::ValueOutOfRange { .. })));
    }

    #[test]
    fn test_blank_charge_point_id_rejected() {
        let result = parse("[export]\ncharge_point_id = \"  \"\n");
        assert!(matches!(result, Err(ConfigError::ValueOutOfRange { .. })));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let result = parse("[filter\nbroken");
        assert!(matches!(result, Err(ConfigError::TomlParse { .. })));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = parse("[filter]\nconection_terms = []\n");
        assert!(matches!(result, Err(ConfigError::TomlParse { .. })));
    }
}
