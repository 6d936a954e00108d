// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{OptionType, OptionValue, SetFlags};
use crate::engine::Core;
use crate::errors::PropertyError;
use crate::events::EventKind;
use crate::player::TrackKind;
use crate::properties::builtin::time::property_time;
use crate::properties::helpers::{read_list, read_sub, ro_opt_str, ro_str, SubProp};
use crate::properties::{generic_option, PropertyAction, PropertyDescriptor, PropertyReply, PropertyResult};
use crate::utils::format_time;

pub(super) fn descriptors() -> Vec<PropertyDescriptor> {
    vec![
        PropertyDescriptor::new("volume", volume),
        PropertyDescriptor::new("mute", mute),
        PropertyDescriptor::new("ao-volume", ao_volume),
        PropertyDescriptor::new("ao-mute", ao_mute),
        PropertyDescriptor::new("audio-delay", audio_delay),
        PropertyDescriptor::new("aid", aid),
        PropertyDescriptor::new("af", audio_filters),
        PropertyDescriptor::new("ab-loop-a", ab_loop),
        PropertyDescriptor::new("ab-loop-b", ab_loop),
        PropertyDescriptor::new("audio-device", audio_device),
        PropertyDescriptor::new("audio-device-list", audio_device_list),
        PropertyDescriptor::new("current-ao", current_ao),
        PropertyDescriptor::new("audio-params", audio_params),
        PropertyDescriptor::new("audio-codec-name", audio_codec_name),
    ]
}

fn volume(prop: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    match action {
        PropertyAction::GetConstrictedType => {
            let max = core.options.get_f64("volume-max").unwrap_or(100.0);
            Ok(PropertyReply::Type(OptionType::double().with_range(0.0, max)))
        }
        PropertyAction::Print => {
            let volume = core.options.get_f64("volume").ok_or(PropertyError::Unavailable)?;
            Ok(PropertyReply::Text(format!("{:.0}", volume)))
        }
        _ => generic_option(prop, action, core),
    }
}

fn mute(prop: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    match action {
        PropertyAction::GetConstrictedType => Ok(PropertyReply::Type(OptionType::flag())),
        _ => generic_option(prop, action, core),
    }
}

fn ao_volume(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let ao = core.player.audio_out.as_mut().ok_or(PropertyError::NotImplemented)?;
    match action {
        PropertyAction::Set(value) => {
            let volume = value
                .as_f64()
                .ok_or_else(|| PropertyError::failed("ao-volume expects a number"))?;
            ao.volume = volume.clamp(0.0, 100.0);
            Ok(PropertyReply::Done)
        }
        PropertyAction::Get => Ok(PropertyReply::Value(OptionValue::Double(ao.volume))),
        PropertyAction::GetType => Ok(PropertyReply::Type(OptionType::double().with_range(0.0, 100.0))),
        PropertyAction::Print => Ok(PropertyReply::Text(format!("{:.0}", ao.volume))),
        _ => Err(PropertyError::NotImplemented),
    }
}

fn ao_mute(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let ao = core.player.audio_out.as_mut().ok_or(PropertyError::NotImplemented)?;
    match action {
        PropertyAction::Set(value) => {
            ao.muted = value
                .as_flag()
                .ok_or_else(|| PropertyError::failed("ao-mute expects a flag"))?;
            Ok(PropertyReply::Done)
        }
        PropertyAction::Get => Ok(PropertyReply::Value(OptionValue::Flag(ao.muted))),
        PropertyAction::GetType => Ok(PropertyReply::Type(OptionType::flag())),
        _ => Err(PropertyError::NotImplemented),
    }
}

fn audio_delay(prop: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    match action {
        PropertyAction::Print => {
            let delay = core.options.get_f64("audio-delay").ok_or(PropertyError::Unavailable)?;
            Ok(PropertyReply::Text(format!("{} ms", (delay * 1000.0).round() as i64)))
        }
        PropertyAction::Set(_) => {
            let reply = generic_option(prop, action, core)?;
            core.wake();
            Ok(reply)
        }
        _ => generic_option(prop, action, core),
    }
}

/// Next selection when cycling through `kind`, "no track" included as a
/// stop between the last and the first track.
fn next_track(core: &Core, kind: TrackKind, direction: i64) -> Option<i64> {
    let ids: Vec<i64> = core.player.tracks_of(kind).map(|t| t.id).collect();
    let current = core
        .player
        .selected_track(kind)
        .and_then(|t| ids.iter().position(|&id| id == t.id))
        .map_or(-1, |p| p as i64);
    let slots = ids.len() as i64 + 1;
    let next = (current + 1 + direction).rem_euclid(slots) - 1;
    usize::try_from(next).ok().map(|i| ids[i])
}

fn default_track(core: &Core, kind: TrackKind) -> Option<i64> {
    let mut tracks = core.player.tracks_of(kind);
    let first = core.player.tracks_of(kind).next().map(|t| t.id);
    tracks.find(|t| t.default).map(|t| t.id).or(first)
}

fn switch_track(core: &mut Core, kind: TrackKind, id: Option<i64>) -> PropertyResult {
    if !core.player.select_track(kind, id) {
        return Err(PropertyError::failed(format!("no {} track with id {:?}", kind, id)));
    }
    let stored = match id {
        Some(id) => OptionValue::Int(id),
        None => OptionValue::Choice("no".to_string()),
    };
    core.options
        .set("aid", stored, SetFlags::RUNTIME)
        .map_err(|e| PropertyError::failed(e.to_string()))?;
    core.notify(EventKind::TrackSwitched, None);
    core.wake();
    Ok(PropertyReply::Done)
}

fn aid(prop: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let kind = TrackKind::Audio;
    let initialized = core.player.playback_initialized;
    match action {
        PropertyAction::Get if initialized => {
            let value = match core.player.selected_track(kind) {
                Some(t) => OptionValue::Int(t.id),
                None => OptionValue::Choice("no".to_string()),
            };
            Ok(PropertyReply::Value(value))
        }
        PropertyAction::Print => {
            if let Some(track) = core.player.selected_track(kind).filter(|_| initialized) {
                let lang = track.lang.as_deref().unwrap_or("unknown");
                let text = match &track.title {
                    Some(title) => format!("({}) {} (\"{}\")", track.id, lang, title),
                    None => format!("({}) {}", track.id, lang),
                };
                return Ok(PropertyReply::Text(text));
            }
            let auto = !initialized && core.options.get_str("aid") == Some("auto");
            Ok(PropertyReply::Text(if auto { "auto" } else { "no" }.to_string()))
        }
        PropertyAction::Switch { inc, .. } if initialized => {
            let direction = if *inc >= 0.0 { 1 } else { -1 };
            let next = next_track(core, kind, direction);
            switch_track(core, kind, next)
        }
        PropertyAction::Switch { .. } => {
            let next = if core.options.get_str("aid") == Some("no") { "auto" } else { "no" };
            generic_option(prop, &PropertyAction::Set(OptionValue::Choice(next.to_string())), core)
        }
        PropertyAction::Set(value) if initialized => {
            let target = match value {
                OptionValue::Int(id) => Some(*id),
                OptionValue::Choice(c) | OptionValue::Str(c) if c == "no" => None,
                OptionValue::Choice(c) | OptionValue::Str(c) if c == "auto" => default_track(core, kind),
                other => return Err(PropertyError::failed(format!("invalid track selection {:?}", other))),
            };
            switch_track(core, kind, target)
        }
        _ => generic_option(prop, action, core),
    }
}

fn audio_filters(prop: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    match action {
        PropertyAction::Print => {
            let filters = core.options.get("af").and_then(OptionValue::as_list).unwrap_or(&[]);
            let text = if filters.is_empty() {
                "(empty)".to_string()
            } else {
                filters.join("\n")
            };
            Ok(PropertyReply::Text(text))
        }
        _ => generic_option(prop, action, core),
    }
}

fn ab_loop(prop: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let current = match core.options.get(&prop.name) {
        Some(OptionValue::Time(t)) => *t,
        _ => None,
    };
    match action {
        PropertyAction::KeyAction { .. } => property_time(action, current.ok_or(PropertyError::Unavailable)?),
        PropertyAction::Print => Ok(PropertyReply::Text(match current {
            Some(t) => format_time(t, false),
            None => "no".to_string(),
        })),
        PropertyAction::Set(_) => {
            let reply = generic_option(prop, action, core)?;
            core.wake();
            Ok(reply)
        }
        _ => generic_option(prop, action, core),
    }
}

fn audio_device(prop: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    if let PropertyAction::Print = action {
        let name = core.options.get_str("audio-device").unwrap_or("auto");
        let text = core
            .player
            .audio_devices
            .iter()
            .find(|d| d.name == name)
            .map_or(name, |d| d.description.as_str());
        return Ok(PropertyReply::Text(text.to_string()));
    }
    generic_option(prop, action, core)
}

fn audio_device_list(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let devices = core.player.audio_devices.clone();
    read_list(action, devices.len(), |i, action| {
        let device = &devices[i];
        read_sub(
            action,
            &[
                SubProp::str("name", device.name.as_str()),
                SubProp::str("description", device.description.as_str()),
            ],
        )
    })
}

fn current_ao(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    ro_opt_str(action, core.player.audio_out.as_ref().map(|ao| ao.driver.as_str()))
}

fn channel_layout(channels: i64) -> String {
    match channels {
        1 => "mono".to_string(),
        2 => "stereo".to_string(),
        6 => "5.1".to_string(),
        8 => "7.1".to_string(),
        n => format!("{}ch", n),
    }
}

fn audio_params(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let ao = core.player.audio_out.as_ref().ok_or(PropertyError::Unavailable)?;
    read_sub(
        action,
        &[
            SubProp::new("samplerate", OptionValue::Int(ao.samplerate)),
            SubProp::new("channel-count", OptionValue::Int(ao.channels)),
            SubProp::str("channels", channel_layout(ao.channels)),
            SubProp::str("format", ao.format.as_str()),
        ],
    )
}

fn audio_codec_name(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    match core.player.selected_track(TrackKind::Audio).and_then(|t| t.codec.clone()) {
        Some(codec) => ro_str(action, &codec),
        None => Err(PropertyError::Unavailable),
    }
}
