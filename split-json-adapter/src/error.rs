//! Error types for split JSON adapter operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using AdapterError.
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Errors that can occur while reading or writing a split JSON directory.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// The default value is not a JSON object.
    #[error("default value must be an object, found {found}")]
    InvalidDefaultValue { found: &'static str },

    /// A record handed to `write` is not a JSON object.
    #[error("record must be an object, found {found}")]
    InvalidRecord { found: &'static str },

    /// A record key cannot be stored as a file of the data directory.
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// Failed to create the data directory.
    #[error("failed to create directory '{path}': {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to list the data directory.
    #[error("failed to read directory '{path}': {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read file.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content could not be deserialized.
    #[error("failed to decode '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// A value could not be serialized for writing.
    #[error("failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: CodecError,
    },

    /// A script module failed to evaluate or did not produce data.
    #[error("script '{path}' failed: {message}")]
    Script { path: PathBuf, message: String },

    /// The secondary-dialect transpiler failed.
    #[error("failed to transpile '{path}': {message}")]
    Transpile { path: PathBuf, message: String },

    /// Configuration could not be extracted.
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl AdapterError {
    /// Create a DirectoryCreation error.
    pub fn directory_creation(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreation {
            path: path.into(),
            source,
        }
    }

    /// Create a DirectoryRead error.
    pub fn directory_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryRead {
            path: path.into(),
            source,
        }
    }

    /// Create a FileRead error.
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Create a FileWrite error.
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Create an InvalidKey error.
    pub fn invalid_key(key: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason,
        }
    }

    /// Create a Script error.
    pub fn script(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Script {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a Transpile error.
    pub fn transpile(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Transpile {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<figment::Error> for AdapterError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

/// Errors reported by a [`Codec`](crate::codec::Codec).
#[derive(Error, Debug)]
pub enum CodecError {
    /// JSON encoding or decoding failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A custom codec rejected the input.
    #[error("{message}")]
    Custom { message: String },
}

impl CodecError {
    /// Create a Custom error.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }
}

/// Name of the JSON type of `value`, for error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invalid_default_value_display() {
        let err = AdapterError::InvalidDefaultValue { found: "array" };
        assert_eq!(err.to_string(), "default value must be an object, found array");
    }

    #[test]
    fn test_file_read_carries_path_and_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = AdapterError::file_read("/data/user.json", io);
        let display = err.to_string();
        assert!(display.contains("/data/user.json"));
        assert!(display.contains("denied"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_codec_error_from_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: CodecError = parse_err.into();
        assert!(matches!(err, CodecError::Json(_)));
    }

    #[test]
    fn test_json_type_name() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!([1])), "array");
        assert_eq!(json_type_name(&json!({})), "object");
        assert_eq!(json_type_name(&json!("s")), "string");
    }
}
