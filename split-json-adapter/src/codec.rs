//! Pluggable serialization of record values to file text.

use crate::error::CodecError;
use serde::Serialize;
use serde_json::Value;

/// Default indentation of the pretty JSON codec.
pub const DEFAULT_INDENT: usize = 4;

/// Converts values to and from file contents.
///
/// The same codec is used for every plain JSON category and for normalizing
/// values produced by script modules.
pub trait Codec: Send + Sync {
    /// Encode a value as text.
    fn serialize(&self, value: &Value) -> Result<String, CodecError>;

    /// Decode text into a value.
    fn deserialize(&self, text: &str) -> Result<Value, CodecError>;

    /// Pass a value through `serialize` then `deserialize`, leaving pure data.
    fn round_trip(&self, value: &Value) -> Result<Value, CodecError> {
        let text = self.serialize(value)?;
        self.deserialize(&text)
    }
}

/// Human-diffable indented JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonCodec {
    indent: usize,
}

impl JsonCodec {
    /// Pretty JSON with `indent` spaces per level; `0` writes compact JSON.
    pub fn new(indent: usize) -> Self {
        Self { indent }
    }
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::new(DEFAULT_INDENT)
    }
}

impl Codec for JsonCodec {
    fn serialize(&self, value: &Value) -> Result<String, CodecError> {
        if self.indent == 0 {
            return Ok(serde_json::to_string(value)?);
        }

        let indent = " ".repeat(self.indent);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut buf = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut serializer)?;
        String::from_utf8(buf).map_err(|e| CodecError::custom(e.to_string()))
    }

    fn deserialize(&self, text: &str) -> Result<Value, CodecError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// A codec assembled from two closures.
///
/// ```
/// use split_json_adapter::{Codec, CodecError, FnCodec};
///
/// let codec = FnCodec::new(
///     |value| Ok(serde_json::to_string(value)?),
///     |text| serde_json::from_str(text.trim()).map_err(CodecError::from),
/// );
/// let text = codec.serialize(&serde_json::json!({"a": 1})).unwrap();
/// assert_eq!(text, r#"{"a":1}"#);
/// ```
pub struct FnCodec<S, D> {
    serialize: S,
    deserialize: D,
}

impl<S, D> FnCodec<S, D>
where
    S: Fn(&Value) -> Result<String, CodecError> + Send + Sync,
    D: Fn(&str) -> Result<Value, CodecError> + Send + Sync,
{
    pub fn new(serialize: S, deserialize: D) -> Self {
        Self {
            serialize,
            deserialize,
        }
    }
}

impl<S, D> Codec for FnCodec<S, D>
where
    S: Fn(&Value) -> Result<String, CodecError> + Send + Sync,
    D: Fn(&str) -> Result<Value, CodecError> + Send + Sync,
{
    fn serialize(&self, value: &Value) -> Result<String, CodecError> {
        (self.serialize)(value)
    }

    fn deserialize(&self, text: &str) -> Result<Value, CodecError> {
        (self.deserialize)(text)
    }
}

impl<S, D> std::fmt::Debug for FnCodec<S, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnCodec").finish_non_exhaustive()
    }
}
