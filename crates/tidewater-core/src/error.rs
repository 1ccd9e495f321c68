//! Error types for Tidewater

use thiserror::Error;

/// The main error type for Tidewater operations
#[derive(Debug, Error)]
pub enum TidewaterError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Asset error: {0}")]
    AssetError(String),

    #[error("Import error: {0}")]
    ImportError(String),
}

/// Result type alias for Tidewater operations
pub type Result<T> = std::result::Result<T, TidewaterError>;

impl From<toml::de::Error> for TidewaterError {
    fn from(err: toml::de::Error) -> Self {
        TidewaterError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for TidewaterError {
    fn from(err: toml::ser::Error) -> Self {
        TidewaterError::TomlSerError(err.to_string())
    }
}
