// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod defaults;
mod loader;
mod options;
mod store;

pub mod consts;
#[cfg(test)]
mod integration_tests;

pub use defaults::builtin_option_defs;
pub use loader::{load_config, load_config_str, ConfigFormat, EngineConfig, OptionDef, Profile};
pub use options::{OptionType, OptionValue, ValueKind};
pub use store::{OptionEntry, OptionStore, SetFlags, UpdateFlags, UpdateKind};
