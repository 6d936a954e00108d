// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_OSD_DURATION_MS, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKER_THREADS, MAX_WORKER_THREADS,
};
use crate::config::options::{OptionType, ValueKind};
use crate::config::store::UpdateKind;
use crate::errors::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Top-level engine configuration.
///
/// Everything is optional; an empty document yields the built-in option
/// table and default worker settings.
///
/// # Example
/// ```yaml
/// worker_threads: 4
/// queue_capacity: 32
/// osd_duration_ms: 1500
/// options:
///   - name: brightness
///     type: int
///     default: "0"
///     min: -100
///     max: 100
/// profiles:
///   quiet:
///     description: "Lower the volume"
///     options:
///       volume: "30"
/// set:
///   pause: "yes"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default)]
    pub queue_capacity: Option<usize>,
    #[serde(default)]
    pub osd_duration_ms: Option<u64>,
    /// Options added on top of the built-in table.
    #[serde(default)]
    pub options: Vec<OptionDef>,
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
    /// Initial assignments, applied as if given on the command line.
    #[serde(default)]
    pub set: BTreeMap<String, String>,
}

impl EngineConfig {
    pub fn get_worker_threads(&self) -> usize {
        self.worker_threads
            .unwrap_or(DEFAULT_WORKER_THREADS)
            .clamp(1, MAX_WORKER_THREADS)
    }

    pub fn get_queue_capacity(&self) -> usize {
        self.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY).max(1)
    }

    pub fn get_osd_duration_ms(&self) -> u64 {
        self.osd_duration_ms.unwrap_or(DEFAULT_OSD_DURATION_MS)
    }
}

/// Named bundle of option assignments applied by `apply-profile`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

/// Declaration of one option.
///
/// Aliases carry `alias_of` and take the target's type; their own `type`
/// field is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionDef {
    pub name: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: ValueKind,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub choices: Vec<String>,
    /// Do not expose this option as a property.
    #[serde(default)]
    pub no_property: bool,
    #[serde(default)]
    pub update: Vec<UpdateKind>,
    #[serde(default)]
    pub alias_of: Option<String>,
    #[serde(default)]
    pub deprecation: Option<String>,
}

fn default_kind() -> ValueKind {
    ValueKind::String
}

impl OptionDef {
    pub fn new(name: &str, ty: OptionType) -> Self {
        Self {
            name: name.to_string(),
            kind: ty.kind,
            default: None,
            min: ty.min,
            max: ty.max,
            choices: ty.choices,
            no_property: false,
            update: Vec::new(),
            alias_of: None,
            deprecation: None,
        }
    }

    pub fn alias(name: &str, target: &str, deprecation: Option<&str>) -> Self {
        Self {
            alias_of: Some(target.to_string()),
            deprecation: deprecation.map(str::to_string),
            ..Self::new(name, OptionType::string())
        }
    }

    pub fn default_value(mut self, text: &str) -> Self {
        self.default = Some(text.to_string());
        self
    }

    pub fn updates(mut self, kind: UpdateKind) -> Self {
        self.update.push(kind);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.no_property = true;
        self
    }

    pub fn option_type(&self) -> OptionType {
        OptionType {
            kind: self.kind,
            min: self.min,
            max: self.max,
            choices: self.choices.clone(),
        }
    }
}

/// Serialization format of a config document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Load an engine configuration from a `.yaml`/`.yml` or `.toml` file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    load_config_str(&content, ConfigFormat::from_path(path))
}

pub fn load_config_str(content: &str, format: ConfigFormat) -> Result<EngineConfig, ConfigError> {
    if content.trim().is_empty() {
        return Ok(EngineConfig::default());
    }
    let config = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Toml => toml::from_str(content)?,
    };
    Ok(config)
}
