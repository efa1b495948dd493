//! Construction options for [`SplitJsonAdapter`](crate::SplitJsonAdapter).

use crate::codec::{Codec, JsonCodec};
use crate::module_source::ModuleSource;
use crate::probe::DynamicScripts;
use crate::quickjs::QuickJsModuleSource;
use serde_json::Value;
use std::sync::Arc;

/// Options recognized when an adapter is constructed.
#[derive(Clone)]
pub struct AdapterOptions {
    pub(crate) default_value: Value,
    pub(crate) codec: Arc<dyn Codec>,
    pub(crate) scripts: Arc<dyn ModuleSource>,
    pub(crate) dynamic_scripts: DynamicScripts,
    pub(crate) dynamic_source: Option<Arc<dyn ModuleSource>>,
}

impl AdapterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mandatory keys and their fallback values. Must be a JSON object;
    /// anything else is rejected when the adapter is built.
    pub fn with_default_value(mut self, value: Value) -> Self {
        self.default_value = value;
        self
    }

    /// Serialize/deserialize pair applied to every data file.
    pub fn with_codec(mut self, codec: impl Codec + 'static) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    /// Loader for `.js` modules.
    pub fn with_scripts(mut self, source: impl ModuleSource + 'static) -> Self {
        self.scripts = Arc::new(source);
        self
    }

    /// Policy for `.ts` modules when no custom loader is given.
    pub fn with_dynamic_scripts(mut self, mode: DynamicScripts) -> Self {
        self.dynamic_scripts = mode;
        self
    }

    /// Loader for `.ts` modules. Setting one enables the dynamic categories
    /// without probing the host.
    pub fn with_dynamic_source(mut self, source: impl ModuleSource + 'static) -> Self {
        self.dynamic_source = Some(Arc::new(source));
        self
    }

    pub fn default_value(&self) -> &Value {
        &self.default_value
    }

    pub fn dynamic_scripts(&self) -> DynamicScripts {
        self.dynamic_scripts
    }
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            default_value: Value::Object(Default::default()),
            codec: Arc::new(JsonCodec::default()),
            scripts: Arc::new(QuickJsModuleSource::new()),
            dynamic_scripts: DynamicScripts::default(),
            dynamic_source: None,
        }
    }
}

impl std::fmt::Debug for AdapterOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterOptions")
            .field("default_value", &self.default_value)
            .field("dynamic_scripts", &self.dynamic_scripts)
            .field("custom_dynamic_source", &self.dynamic_source.is_some())
            .finish_non_exhaustive()
    }
}
