// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bridge between the option store and the property layer.
//!
//! The option store holds every value. Properties generated from options
//! read and write it through [`generic_option`]; writes that bypass the
//! property layer (startup config, profiles, per-file options) go through
//! [`Core::on_set_option`] so observers hear about them the same way.

use std::sync::Arc;

use crate::config::{OptionValue, SetFlags, UpdateFlags};
use crate::engine::Core;
use crate::errors::{OptionError, PropertyError};
use crate::observability::messages::{property::OptionChanged, StructuredLog};
use crate::properties::dispatch::{dispatch, property_do};
use crate::properties::{PropertyAction, PropertyDescriptor, PropertyReply, PropertyResult};

/// Accessor mapping a property onto the option with the same name.
pub fn generic_option(prop: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let entry = core.options.resolve(&prop.name).ok_or(PropertyError::Unknown)?;
    match action {
        PropertyAction::GetType => Ok(PropertyReply::Type(entry.ty.clone())),
        PropertyAction::Get => Ok(PropertyReply::Value(entry.value.clone())),
        PropertyAction::Set(value) => {
            let flags = core.option_write_flags.unwrap_or(SetFlags::RUNTIME);
            core.write_option(&prop.name, value.clone(), flags)
                .map_err(|e| PropertyError::failed(e.to_string()))?;
            Ok(PropertyReply::Done)
        }
        _ => Err(PropertyError::NotImplemented),
    }
}

impl Core {
    /// Writes an option and lets dependent subsystems react.
    pub fn write_option(&mut self, name: &str, value: OptionValue, flags: SetFlags) -> Result<UpdateFlags, OptionError> {
        let update = self.options.set(name, value, flags)?;
        self.apply_option_update(update);
        Ok(update)
    }

    /// Entry point for option writes that do not come from a property.
    ///
    /// Options with a hand-written property are routed through it so its
    /// side effects run; everything else is written directly after
    /// notifying observers.
    pub fn on_set_option(&mut self, name: &str, value: OptionValue, flags: SetFlags) -> Result<(), OptionError> {
        let registry = Arc::clone(&self.properties);
        let direct = registry.find(name).map_or(true, |d| d.is_option);
        if !direct {
            match dispatch(self, name, &PropertyAction::GetType) {
                Err(PropertyError::Unknown) => {}
                Err(e) => {
                    return Err(OptionError::Rejected {
                        name: name.to_string(),
                        reason: e.to_string(),
                    })
                }
                Ok(_) => {
                    // The accessor's own write keeps the caller's provenance.
                    let outer = self.option_write_flags.replace(flags);
                    let result = property_do(self, name, &PropertyAction::Set(value));
                    self.option_write_flags = outer;
                    result.map_err(|e| OptionError::Rejected {
                        name: name.to_string(),
                        reason: e.to_string(),
                    })?;
                    OptionChanged {
                        option: name,
                        via_property: true,
                    }
                    .log();
                    return Ok(());
                }
            }
        }
        self.write_option(name, value, flags)?;
        self.notify_property(name);
        OptionChanged {
            option: name,
            via_property: false,
        }
        .log();
        Ok(())
    }

    /// Parses `text` with the option's type and applies it like
    /// [`Core::on_set_option`].
    pub fn on_set_option_string(&mut self, name: &str, text: &str, flags: SetFlags) -> Result<(), OptionError> {
        let entry = self
            .options
            .resolve(name)
            .ok_or_else(|| OptionError::Unknown(name.to_string()))?;
        let value = entry.ty.parse(text)?;
        self.on_set_option(name, value, flags)
    }

    fn apply_option_update(&mut self, update: UpdateFlags) {
        if update.contains(UpdateFlags::VOLUME) {
            let volume = self.options.get_f64("volume").unwrap_or(100.0);
            let muted = self.options.get_flag("mute");
            if let Some(ao) = self.player.audio_out.as_mut() {
                ao.gain = if muted { 0.0 } else { volume / 100.0 };
            }
        }
        if update.contains(UpdateFlags::AUDIO) {
            self.player.audio_reload_requested = true;
            self.wake();
        }
        if update.contains(UpdateFlags::OSD) || update.contains(UpdateFlags::TERM) {
            self.wake();
        }
    }
}
