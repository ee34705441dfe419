//! Configuration loading.
//!
//! The config is a JSON document deserialized into [`ReconcileConfig`]; every
//! field is optional. The path comes from `LARDER_CONFIG` or the caller.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;

use larder_core::DomainError;
use larder_reconciliation::ReconcileConfig;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "LARDER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(#[from] DomainError),
}

/// Parse and validate a config document.
pub fn parse_config(json: &str) -> Result<ReconcileConfig, ConfigError> {
    let config: ReconcileConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<ReconcileConfig, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&raw)?;
    tracing::info!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Load from the file named by `LARDER_CONFIG`, or defaults when it is unset.
pub fn from_env() -> Result<ReconcileConfig, ConfigError> {
    from_env_value(std::env::var_os(CONFIG_ENV))
}

fn from_env_value(value: Option<OsString>) -> Result<ReconcileConfig, ConfigError> {
    match value {
        Some(path) if !path.is_empty() => load_config(PathBuf::from(path)),
        _ => Ok(ReconcileConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::{ItemId, Quantity, Unit};

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("larder-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn unset_or_empty_env_falls_back_to_defaults() {
        assert_eq!(from_env_value(None).unwrap(), ReconcileConfig::default());
        assert_eq!(from_env_value(Some(OsString::new())).unwrap(), ReconcileConfig::default());
    }

    #[test]
    fn loads_from_the_named_file() {
        let path = temp_file(
            "config.json",
            r#"{ "purchase_increments": { "eggs": { "amount": 6, "unit": "piece" } } }"#,
        );
        let config = from_env_value(Some(path.clone().into_os_string())).unwrap();
        assert_eq!(
            config.purchase_increments.get(&ItemId::new("eggs")),
            Some(&Quantity::new(6.0, Unit::Piece))
        );
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_config("/nonexistent/larder.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn invalid_values_are_rejected_after_parsing() {
        let err = parse_config(r#"{ "expiry_windows": { "critical_days": 5, "warning_days": 1 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(matches!(parse_config("{ not json"), Err(ConfigError::Parse(_))));
    }
}
