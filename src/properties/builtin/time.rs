// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{OptionType, OptionValue};
use crate::engine::Core;
use crate::errors::PropertyError;
use crate::player::{SeekKind, SeekPrecision};
use crate::properties::{PropertyAction, PropertyDescriptor, PropertyReply, PropertyResult};
use crate::utils::format_time;

pub(super) fn descriptors() -> Vec<PropertyDescriptor> {
    vec![
        PropertyDescriptor::new("duration", duration),
        PropertyDescriptor::new("time-pos", time_pos),
        PropertyDescriptor::new("time-start", time_start),
        PropertyDescriptor::new("time-remaining", time_remaining),
        PropertyDescriptor::new("playtime-remaining", playtime_remaining),
        PropertyDescriptor::new("playback-time", playback_time),
        PropertyDescriptor::new("audio-pts", audio_pts),
    ]
}

/// Read-only time value. `<name>/full` prints with milliseconds.
pub(super) fn property_time(action: &PropertyAction, time: f64) -> PropertyResult {
    match action {
        PropertyAction::Get => Ok(PropertyReply::Value(OptionValue::Time(Some(time)))),
        PropertyAction::GetType => Ok(PropertyReply::Type(OptionType::time())),
        PropertyAction::Print => Ok(PropertyReply::Text(format_time(time, false))),
        PropertyAction::KeyAction { key, action } if key == "full" => match action.as_ref() {
            PropertyAction::Print => Ok(PropertyReply::Text(format_time(time, true))),
            PropertyAction::Get | PropertyAction::GetType => property_time(action, time),
            _ => Err(PropertyError::NotImplemented),
        },
        PropertyAction::KeyAction { .. } => Err(PropertyError::Unknown),
        _ => Err(PropertyError::NotImplemented),
    }
}

fn seek_target(value: &OptionValue) -> Result<f64, PropertyError> {
    value
        .as_f64()
        .ok_or_else(|| PropertyError::failed("expected a time value"))
}

fn duration(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let duration = core.player.duration.ok_or(PropertyError::Unavailable)?;
    property_time(action, duration)
}

fn time_pos(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    if !core.player.playback_initialized {
        return Err(PropertyError::Unavailable);
    }
    if let PropertyAction::Set(value) = action {
        core.queue_seek(SeekKind::Absolute, seek_target(value)?, SeekPrecision::Default);
        return Ok(PropertyReply::Done);
    }
    let pos = core.player.time_pos.ok_or(PropertyError::Unavailable)?;
    property_time(action, pos)
}

fn time_start(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    if !core.player.playback_initialized {
        return Err(PropertyError::Unavailable);
    }
    property_time(action, core.player.start_time)
}

fn time_remaining(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let remaining = core.player.remaining().ok_or(PropertyError::Unavailable)?;
    property_time(action, remaining)
}

fn playtime_remaining(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let remaining = core.player.remaining().ok_or(PropertyError::Unavailable)?;
    let speed = core.options.get_f64("speed").unwrap_or(1.0);
    property_time(action, remaining / speed)
}

fn playback_time(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    if !core.player.playback_initialized {
        return Err(PropertyError::Unavailable);
    }
    if let PropertyAction::Set(value) = action {
        let target = seek_target(value)? + core.player.start_time;
        core.queue_seek(SeekKind::Absolute, target, SeekPrecision::Default);
        return Ok(PropertyReply::Done);
    }
    let time = core.player.playing_time().ok_or(PropertyError::Unavailable)?;
    property_time(action, time)
}

fn audio_pts(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let pts = core.player.audio_pts.ok_or(PropertyError::Unavailable)?;
    property_time(action, pts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing;
    use crate::properties::dispatch;

    #[test]
    fn test_property_time_table() {
        let full = |a| PropertyAction::key("full", a);
        let cases = vec![
            (PropertyAction::Print, Ok(PropertyReply::Text("00:01:05".into()))),
            (full(PropertyAction::Print), Ok(PropertyReply::Text("00:01:05.500".into()))),
            (full(PropertyAction::Get), Ok(PropertyReply::Value(OptionValue::Time(Some(65.5))))),
            (PropertyAction::key("half", PropertyAction::Get), Err(PropertyError::Unknown)),
            (PropertyAction::Multiply(2.0), Err(PropertyError::NotImplemented)),
        ];
        for (action, expected) in cases {
            assert_eq!(property_time(&action, 65.5), expected, "{}", action.name());
        }
    }

    #[test]
    fn test_time_properties_while_playing() {
        let mut core = testing::core();
        assert_eq!(dispatch(&mut core, "duration", &PropertyAction::Get), Err(PropertyError::Unavailable));

        testing::playing(&mut core);
        core.player.time_pos = Some(30.0);
        core.options.set_string("speed", "2", Default::default()).unwrap();

        let text = |core: &mut Core, name: &str| dispatch(core, name, &PropertyAction::Print).and_then(|r| r.into_text());
        assert_eq!(text(&mut core, "duration").as_deref(), Ok("00:02:00"));
        assert_eq!(text(&mut core, "time-remaining").as_deref(), Ok("00:01:30"));
        assert_eq!(text(&mut core, "playtime-remaining").as_deref(), Ok("00:00:45"));
        assert_eq!(text(&mut core, "duration/full").as_deref(), Ok("00:02:00.000"));
    }

    #[test]
    fn test_setting_position_queues_absolute_seek() {
        let mut core = testing::core();
        testing::playing(&mut core);
        dispatch(&mut core, "time-pos", &PropertyAction::SetString("1:00".into())).unwrap();
        let seek = core.player.pending_seek.unwrap();
        assert_eq!((seek.kind, seek.amount), (SeekKind::Absolute, 60.0));
    }
}
