//! Declarative adapter configuration layered with figment.
//!
//! Sources, later overriding earlier:
//! 1. built-in defaults
//! 2. an optional config file (`.toml`, `.yaml`/`.yml` or `.json`)
//! 3. environment variables prefixed `SPLIT_JSON_`

use crate::adapter::SplitJsonAdapter;
use crate::codec::{JsonCodec, DEFAULT_INDENT};
use crate::error::{AdapterError, Result};
use crate::options::AdapterOptions;
use crate::probe::DynamicScripts;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Prefix of environment variables read by [`AdapterConfig::load`].
pub const ENV_PREFIX: &str = "SPLIT_JSON_";

/// Adapter settings as read from files and the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Directory holding one file per key.
    pub directory: PathBuf,
    /// Indentation of written files; 0 writes compact JSON.
    pub indent: usize,
    /// Policy for `.ts` modules.
    pub dynamic_scripts: DynamicScripts,
    /// Mandatory keys and their fallback values.
    pub default_value: Value,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            indent: DEFAULT_INDENT,
            dynamic_scripts: DynamicScripts::default(),
            default_value: Value::Object(Default::default()),
        }
    }
}

impl AdapterConfig {
    /// Load configuration from defaults, `config_file` and the environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(config_file)?.extract()?;
        debug!("Loaded adapter configuration for '{}'", config.directory.display());
        Ok(config)
    }

    /// Build the layered figment without extracting it.
    pub fn figment(config_file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = config_file {
            figment = figment.merge(Self::file_provider(path)?);
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().into())))
    }

    fn file_provider(path: &Path) -> Result<Figment> {
        if !path.is_file() {
            return Err(AdapterError::file_read(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
            ));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        trace!("Loading config file '{}'", path.display());

        Ok(match extension.as_deref() {
            Some("yaml") | Some("yml") => Figment::from(Yaml::file(path)),
            Some("json") => Figment::from(Json::file(path)),
            _ => Figment::from(Toml::file(path)),
        })
    }

    /// Consume the configuration, producing construction options.
    pub fn into_options(self) -> AdapterOptions {
        AdapterOptions::new()
            .with_default_value(self.default_value)
            .with_codec(JsonCodec::new(self.indent))
            .with_dynamic_scripts(self.dynamic_scripts)
    }

    /// Build an adapter over the configured directory.
    pub fn open(self) -> Result<SplitJsonAdapter> {
        let directory = self.directory.clone();
        SplitJsonAdapter::new(directory, self.into_options())
    }
}
