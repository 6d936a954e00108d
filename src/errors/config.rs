// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors while loading or validating the engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("duplicate option definition: '{0}'")]
    DuplicateOption(String),

    #[error("option '{name}': {source}")]
    Option {
        name: String,
        #[source]
        source: OptionError,
    },

    #[error("profile '{profile}' references unknown option '{option}'")]
    UnknownProfileOption { profile: String, option: String },

    #[error("worker pool setup failed: {0}")]
    Runtime(String),
}

/// Errors from the option store: lookup, parsing and range validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptionError {
    #[error("unknown option '{0}'")]
    Unknown(String),

    #[error("cannot parse '{value}' as {kind}")]
    Parse { kind: &'static str, value: String },

    #[error("value {value} out of range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },

    #[error("'{value}' is not one of: {choices}")]
    InvalidChoice { value: String, choices: String },

    #[error("value type does not match option type {0}")]
    TypeMismatch(&'static str),

    #[error("file-local option change requires active playback")]
    NotPlaying,

    #[error("unknown profile '{0}'")]
    UnknownProfile(String),

    /// The property mapped onto the option refused the value.
    #[error("option '{name}' rejected by its property: {reason}")]
    Rejected { name: String, reason: String },
}
