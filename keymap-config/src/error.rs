//! Error type of the keymap tools.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for configuration and conversion operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read '{}': {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{}': {source}", .path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON from '{}': {source}", .path.display())]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize JSON: {0}")]
    JsonWrite(#[from] serde_json::Error),

    /// `keyboard.toml` could not be merged or deserialized
    #[error("Failed to load '{}': {source}", .path.display())]
    TomlParse {
        path: PathBuf,
        #[source]
        source: config::ConfigError,
    },

    #[error("Failed to serialize TOML: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    /// Validation error with context
    #[error("Validation error in '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value '{value}' for '{field}', expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    /// A scanned `keymap.c` snippet or keycode expression was malformed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Malformed keymap data, such as a layer list that is neither a grid nor flat
    #[error("{0}")]
    Keymap(String),

    #[error("Failed to execute '{command}': {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed with exit code {code}: {stderr}")]
    CommandFailed { code: i32, stderr: String },

    /// Failed with nothing on stderr
    #[error("Command failed with exit code {0}")]
    CommandExit(i32),
}

impl ConfigError {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}
