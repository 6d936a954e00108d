// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The option store: ground truth for every option value.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

use crate::config::loader::{OptionDef, Profile};
use crate::config::options::{OptionType, OptionValue};
use crate::errors::{ConfigError, OptionError};

/// Subsystems that must react when an option changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateKind {
    Volume,
    Audio,
    Osd,
    Term,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateFlags(u32);

impl UpdateFlags {
    pub const NONE: UpdateFlags = UpdateFlags(0);
    pub const VOLUME: UpdateFlags = UpdateFlags(1);
    pub const AUDIO: UpdateFlags = UpdateFlags(1 << 1);
    pub const OSD: UpdateFlags = UpdateFlags(1 << 2);
    pub const TERM: UpdateFlags = UpdateFlags(1 << 3);
    pub const INPUT: UpdateFlags = UpdateFlags(1 << 4);

    pub fn contains(self, other: UpdateFlags) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub fn union(self, other: UpdateFlags) -> UpdateFlags {
        UpdateFlags(self.0 | other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn from_kinds(kinds: &[UpdateKind]) -> Self {
        kinds.iter().fold(UpdateFlags::NONE, |acc, k| {
            acc.union(match k {
                UpdateKind::Volume => UpdateFlags::VOLUME,
                UpdateKind::Audio => UpdateFlags::AUDIO,
                UpdateKind::Osd => UpdateFlags::OSD,
                UpdateKind::Term => UpdateFlags::TERM,
                UpdateKind::Input => UpdateFlags::INPUT,
            })
        })
    }
}

/// Provenance of an option write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetFlags(u32);

impl SetFlags {
    pub const NONE: SetFlags = SetFlags(0);
    /// Changed while running (property or command), not from startup config.
    pub const RUNTIME: SetFlags = SetFlags(1);
    /// Remember the previous value and restore it when the file ends.
    pub const BACKUP: SetFlags = SetFlags(1 << 1);
    pub const FROM_CMDLINE: SetFlags = SetFlags(1 << 2);

    pub fn contains(self, other: SetFlags) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub fn union(self, other: SetFlags) -> SetFlags {
        SetFlags(self.0 | other.0)
    }
}

#[derive(Debug, Clone)]
pub struct OptionEntry {
    pub name: String,
    pub ty: OptionType,
    pub value: OptionValue,
    pub default: OptionValue,
    pub no_property: bool,
    pub update: UpdateFlags,
    pub alias_of: Option<String>,
    pub deprecation: Option<String>,
    pub set_from_cmdline: bool,
    pub set_locally: bool,
    pub changed_at_runtime: bool,
}

impl OptionEntry {
    pub fn is_alias(&self) -> bool {
        self.alias_of.is_some()
    }
}

#[derive(Debug, Default)]
pub struct OptionStore {
    entries: Vec<OptionEntry>,
    index: HashMap<String, usize>,
    profiles: BTreeMap<String, Profile>,
    backups: Vec<(usize, OptionValue)>,
}

const MAX_ALIAS_DEPTH: usize = 8;

impl OptionStore {
    pub fn from_defs<I>(defs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = OptionDef>,
    {
        let mut store = OptionStore::default();
        for def in defs {
            store.add_def(def)?;
        }
        Ok(store)
    }

    pub fn add_def(&mut self, def: OptionDef) -> Result<(), ConfigError> {
        if self.index.contains_key(&def.name) {
            return Err(ConfigError::DuplicateOption(def.name));
        }
        let ty = def.option_type();
        let default = match &def.default {
            Some(text) => ty.parse(text).map_err(|source| ConfigError::Option {
                name: def.name.clone(),
                source,
            })?,
            None => ty.zero(),
        };
        self.index.insert(def.name.clone(), self.entries.len());
        self.entries.push(OptionEntry {
            name: def.name,
            ty,
            value: default.clone(),
            default,
            no_property: def.no_property,
            update: UpdateFlags::from_kinds(&def.update),
            alias_of: def.alias_of,
            deprecation: def.deprecation,
            set_from_cmdline: false,
            set_locally: false,
            changed_at_runtime: false,
        });
        Ok(())
    }

    pub fn add_profile(&mut self, name: &str, profile: Profile) {
        self.profiles.insert(name.to_string(), profile);
    }

    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn profiles(&self) -> impl Iterator<Item = (&String, &Profile)> {
        self.profiles.iter()
    }

    /// Raw entry, aliases are not followed.
    pub fn entry(&self, name: &str) -> Option<&OptionEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    fn resolve_index(&self, name: &str) -> Option<usize> {
        let mut idx = *self.index.get(name)?;
        for _ in 0..MAX_ALIAS_DEPTH {
            match &self.entries[idx].alias_of {
                Some(target) => idx = *self.index.get(target)?,
                None => return Some(idx),
            }
        }
        None
    }

    /// Entry with aliases followed to their target.
    pub fn resolve(&self, name: &str) -> Option<&OptionEntry> {
        self.resolve_index(name).map(|i| &self.entries[i])
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.resolve(name).map(|e| &e.value)
    }

    pub fn get_flag(&self, name: &str) -> bool {
        self.get(name).and_then(OptionValue::as_flag).unwrap_or(false)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(OptionValue::as_f64)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(OptionValue::as_str)
    }

    /// Writes `value` after validating it against the option type. Returns
    /// the update flags of the option so the caller can notify subsystems.
    pub fn set(&mut self, name: &str, value: OptionValue, flags: SetFlags) -> Result<UpdateFlags, OptionError> {
        let raw = self.entry(name).ok_or_else(|| OptionError::Unknown(name.to_string()))?;
        if let Some(msg) = &raw.deprecation {
            warn!(option = %name, "Option '{}' is deprecated: {}", name, msg);
        }
        let idx = self
            .resolve_index(name)
            .ok_or_else(|| OptionError::Unknown(name.to_string()))?;
        let value = self.entries[idx].ty.check(value)?;

        if flags.contains(SetFlags::BACKUP) && !self.backups.iter().any(|(i, _)| *i == idx) {
            let previous = self.entries[idx].value.clone();
            self.backups.push((idx, previous));
        }

        let entry = &mut self.entries[idx];
        entry.value = value;
        entry.set_locally |= flags.contains(SetFlags::BACKUP);
        entry.set_from_cmdline |= flags.contains(SetFlags::FROM_CMDLINE);
        entry.changed_at_runtime |= flags.contains(SetFlags::RUNTIME);
        Ok(entry.update)
    }

    pub fn set_string(&mut self, name: &str, text: &str, flags: SetFlags) -> Result<UpdateFlags, OptionError> {
        let entry = self
            .resolve(name)
            .ok_or_else(|| OptionError::Unknown(name.to_string()))?;
        let value = entry.ty.parse(text)?;
        self.set(name, value, flags)
    }

    pub fn has_backup(&self, name: &str) -> bool {
        self.resolve_index(name)
            .map(|idx| self.backups.iter().any(|(i, _)| *i == idx))
            .unwrap_or(false)
    }

    /// Drains file-local backups, returning `(name, previous value)` pairs in
    /// reverse order of backup.
    pub fn take_backups(&mut self) -> Vec<(String, OptionValue)> {
        let backups = std::mem::take(&mut self.backups);
        backups
            .into_iter()
            .rev()
            .map(|(idx, value)| {
                self.entries[idx].set_locally = false;
                (self.entries[idx].name.clone(), value)
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
