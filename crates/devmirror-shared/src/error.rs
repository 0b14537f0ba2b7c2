//! Error types for DevMirror.rs

use thiserror::Error;

/// Main error type for DevMirror.rs operations
#[derive(Debug, Error)]
pub enum DevMirrorError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Storage error: {message}")]
    Storage { message: String },
}

/// Result type alias for DevMirror operations
pub type Result<T> = std::result::Result<T, DevMirrorError>;

/// Snapshot analysis errors
///
/// The only terminal failure of the pipeline is a snapshot that does not parse.
/// Everything else degrades to zero-valued metrics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("Invalid code: {message}")]
    InvalidCode {
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },
}

impl AnalysisError {
    /// Build an `InvalidCode` error without position information
    pub fn invalid_code(message: impl Into<String>) -> Self {
        AnalysisError::InvalidCode {
            message: message.into(),
            line: None,
            column: None,
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// History persistence errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid subject id: {subject}")]
    InvalidSubject { subject: String },

    #[error("Corrupt history for {subject}: {message}")]
    CorruptHistory { subject: String, message: String },

    #[error("Storage directory unavailable: {path}: {message}")]
    DirectoryUnavailable { path: String, message: String },
}

impl From<ConfigError> for DevMirrorError {
    fn from(error: ConfigError) -> Self {
        DevMirrorError::Config {
            message: error.to_string(),
        }
    }
}

impl From<config::ConfigError> for DevMirrorError {
    fn from(error: config::ConfigError) -> Self {
        DevMirrorError::Config {
            message: error.to_string(),
        }
    }
}

impl From<toml::ser::Error> for DevMirrorError {
    fn from(error: toml::ser::Error) -> Self {
        DevMirrorError::Config {
            message: error.to_string(),
        }
    }
}

impl From<StorageError> for DevMirrorError {
    fn from(error: StorageError) -> Self {
        DevMirrorError::Storage {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_error_converts() {
        let err: DevMirrorError = AnalysisError::invalid_code("expected `}`").into();
        assert_eq!(err.to_string(), "Analysis error: Invalid code: expected `}`");
    }

    #[test]
    fn test_config_error_message() {
        let err: DevMirrorError = ConfigError::InvalidValue {
            key: "scoring.depth_weight".to_string(),
            value: "-1".to_string(),
        }
        .into();
        assert!(matches!(err, DevMirrorError::Config { .. }));
        assert!(err.to_string().contains("scoring.depth_weight"));
    }

    #[test]
    fn test_storage_error_keeps_cause() {
        let err: DevMirrorError = StorageError::DirectoryUnavailable {
            path: "/srv/history".to_string(),
            message: "Permission denied (os error 13)".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Storage error: Storage directory unavailable: /srv/history: Permission denied (os error 13)"
        );
    }
}
