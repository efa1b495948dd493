//! Loading code modules as data.
//!
//! A module source evaluates a file and returns its default export as a JSON
//! value. Every call evaluates the file from scratch, so edits made between
//! two reads are always observed.

use crate::codec::Codec;
use crate::error::{AdapterError, Result};
use serde_json::Value;
use std::path::Path;

/// Evaluates a module file and returns its default export.
pub trait ModuleSource: Send + Sync {
    /// Load the module at `path`, bypassing any cache.
    fn load(&self, path: &Path) -> Result<Value>;
}

impl<F> ModuleSource for F
where
    F: Fn(&Path) -> Result<Value> + Send + Sync,
{
    fn load(&self, path: &Path) -> Result<Value> {
        self(path)
    }
}

/// Load a module and strip anything the codec cannot represent.
pub fn load_normalized(source: &dyn ModuleSource, codec: &dyn Codec, path: &Path) -> Result<Value> {
    let value = source.load(path)?;
    codec.round_trip(&value).map_err(|e| AdapterError::Decode {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{FnCodec, JsonCodec};
    use crate::error::CodecError;
    use serde_json::json;

    #[test]
    fn test_closure_is_a_module_source() {
        let source = |path: &Path| -> Result<Value> {
            Ok(json!({"loaded": path.display().to_string()}))
        };
        let value = load_normalized(&source, &JsonCodec::default(), Path::new("a.js")).unwrap();
        assert_eq!(value, json!({"loaded": "a.js"}));
    }

    #[test]
    fn test_normalization_uses_codec() {
        let source = |_: &Path| -> Result<Value> { Ok(json!(1)) };
        let codec = FnCodec::new(
            |value| Ok(serde_json::to_string(value)?),
            |_| Ok(json!("decoded")),
        );
        let value = load_normalized(&source, &codec, Path::new("a.js")).unwrap();
        assert_eq!(value, json!("decoded"));
    }

    #[test]
    fn test_normalization_failure_reports_path() {
        let source = |_: &Path| -> Result<Value> { Ok(json!(1)) };
        let codec = FnCodec::new(
            |_| Err(CodecError::custom("nope")),
            |_| Ok(Value::Null),
        );
        let err = load_normalized(&source, &codec, Path::new("bad.js")).unwrap_err();
        assert!(err.to_string().contains("bad.js"));
    }
}
