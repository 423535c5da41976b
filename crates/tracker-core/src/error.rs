use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the machine tracker.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// A stored record could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be written to disk.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed or produced.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A storage key did not match the `YYYY-MM-DD_H` layout.
    #[error("Invalid timestamp key: {0}")]
    InvalidTimestamp(String),

    /// A storage key cannot be mapped onto the storage medium.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// A date string was not a valid `YYYY-MM-DD` calendar date.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A carton code is not one of the known product codes.
    #[error("Unknown carton type: {0}")]
    UnknownCarton(String),

    /// An inventory status string is not one of the known categories.
    #[error("Unknown inventory status: {0}")]
    UnknownInventory(String),

    /// A machine name could not be parsed.
    #[error("Invalid machine name: {0}")]
    InvalidMachine(String),

    /// Raw reading input was rejected before any metric was computed.
    #[error("Invalid reading: {0}")]
    InvalidReading(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the tracker crates.
pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = TrackerError::FileRead {
            path: PathBuf::from("/data/2025-01-10_8.json"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("2025-01-10_8.json"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_file_write() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = TrackerError::FileWrite {
            path: PathBuf::from("/data/2025-01-10_8.json"),
            source: io_err,
        };
        assert!(err.to_string().starts_with("Failed to write file"));
    }

    #[test]
    fn test_error_display_invalid_timestamp() {
        let err = TrackerError::InvalidTimestamp("2025-01-10-08".to_string());
        assert_eq!(err.to_string(), "Invalid timestamp key: 2025-01-10-08");
    }

    #[test]
    fn test_error_display_unknown_carton() {
        let err = TrackerError::UnknownCarton("Z99Z".to_string());
        assert_eq!(err.to_string(), "Unknown carton type: Z99Z");
    }

    #[test]
    fn test_error_display_unknown_inventory() {
        let err = TrackerError::UnknownInventory("Shrunk".to_string());
        assert_eq!(err.to_string(), "Unknown inventory status: Shrunk");
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: TrackerError = json_err.into();
        assert!(err.to_string().starts_with("Failed to parse JSON"));
    }

    #[test]
    fn test_error_display_config() {
        let err = TrackerError::Config("username is required to record".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: username is required to record"
        );
    }
}
