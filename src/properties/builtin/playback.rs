// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{OptionType, OptionValue};
use crate::engine::Core;
use crate::errors::PropertyError;
use crate::events::EventKind;
use crate::player::{SeekKind, SeekPrecision, StopPlay};
use crate::properties::helpers::{ro_flag, ro_int, ro_opt_str, ro_str};
use crate::properties::{generic_option, PropertyAction, PropertyDescriptor, PropertyReply, PropertyResult};
use crate::utils::format_file_size;

pub(super) fn descriptors() -> Vec<PropertyDescriptor> {
    vec![
        PropertyDescriptor::new("speed", speed),
        PropertyDescriptor::new("pause", pause),
        PropertyDescriptor::new("core-idle", core_idle),
        PropertyDescriptor::new("idle-active", idle_active),
        PropertyDescriptor::new("eof-reached", eof_reached),
        PropertyDescriptor::new("seeking", seeking),
        PropertyDescriptor::new("playback-abort", playback_abort),
        PropertyDescriptor::new("seekable", seekable),
        PropertyDescriptor::new("partially-seekable", partially_seekable),
        PropertyDescriptor::new("percent-pos", percent_pos),
        PropertyDescriptor::new("path", path),
        PropertyDescriptor::new("filename", filename),
        PropertyDescriptor::new("media-title", media_title),
        PropertyDescriptor::new("file-size", file_size),
        PropertyDescriptor::new("decoder-frame-drop-count", frame_drops),
        PropertyDescriptor::new("avsync", avsync),
        PropertyDescriptor::new("cache-speed", cache_speed),
        PropertyDescriptor::new("chapter", chapter),
    ]
}

fn speed(prop: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    match action {
        PropertyAction::Print => {
            let speed = core.options.get_f64("speed").ok_or(PropertyError::Unavailable)?;
            Ok(PropertyReply::Text(format!("{:.2}", speed)))
        }
        _ => generic_option(prop, action, core),
    }
}

fn pause(prop: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let PropertyAction::Set(value) = action else {
        return generic_option(prop, action, core);
    };
    let paused = value
        .as_flag()
        .ok_or_else(|| PropertyError::failed("pause expects a flag"))?;
    let was_paused = core.options.get_flag("pause");
    generic_option(prop, action, core)?;
    if core.player.playback_initialized && paused != was_paused {
        let kind = if paused { EventKind::Pause } else { EventKind::Unpause };
        core.notify(kind, None);
    }
    Ok(PropertyReply::Done)
}

fn core_idle(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let idle = !core.player.playback_initialized || core.player.core_idle || core.options.get_flag("pause");
    ro_flag(action, idle)
}

fn idle_active(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    ro_flag(action, core.is_idle)
}

fn eof_reached(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    if !core.player.playback_initialized {
        return Err(PropertyError::Unavailable);
    }
    ro_flag(action, core.player.eof_reached)
}

fn seeking(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    if !core.player.playback_initialized {
        return Err(PropertyError::Unavailable);
    }
    ro_flag(action, !core.player.restart_complete)
}

fn playback_abort(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let aborting = core.player.playlist.current().is_none() || core.player.stop_play != StopPlay::KeepPlaying;
    ro_flag(action, aborting)
}

fn seekable(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let demuxer = core.player.demuxer.as_ref().ok_or(PropertyError::Unavailable)?;
    ro_flag(action, demuxer.seekable)
}

fn partially_seekable(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let demuxer = core.player.demuxer.as_ref().ok_or(PropertyError::Unavailable)?;
    ro_flag(action, demuxer.partially_seekable)
}

fn percent_pos(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    if !core.player.playback_initialized {
        return Err(PropertyError::Unavailable);
    }
    match action {
        PropertyAction::Set(value) => {
            let pos = value
                .as_f64()
                .ok_or_else(|| PropertyError::failed("percent-pos expects a number"))?;
            core.queue_seek(SeekKind::Factor, pos / 100.0, SeekPrecision::Default);
            Ok(PropertyReply::Done)
        }
        PropertyAction::Get => {
            let pos = core.player.percent_pos().ok_or(PropertyError::Unavailable)?;
            Ok(PropertyReply::Value(OptionValue::Double(pos)))
        }
        PropertyAction::GetType => Ok(PropertyReply::Type(OptionType::double().with_range(0.0, 100.0))),
        PropertyAction::Print => {
            let pos = core.player.percent_pos().ok_or(PropertyError::Unavailable)?;
            Ok(PropertyReply::Text(format!("{:.0}", pos)))
        }
        _ => Err(PropertyError::NotImplemented),
    }
}

fn path(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    ro_opt_str(action, core.player.filename())
}

pub(super) fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

fn filename(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let name = core
        .player
        .filename()
        .map(|f| basename(f).to_string())
        .ok_or(PropertyError::Unavailable)?;
    match action {
        PropertyAction::KeyAction { key, action } if key == "no-ext" => ro_str(action, strip_extension(&name)),
        PropertyAction::KeyAction { .. } => Err(PropertyError::Unknown),
        _ => ro_str(action, &name),
    }
}

fn media_title(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    if let Some(title) = core.options.get_str("title").filter(|t| !t.is_empty()) {
        return ro_str(action, title);
    }
    if let Some(title) = core.player.media_title.as_deref() {
        return ro_str(action, title);
    }
    if let Some(title) = core.player.demuxer.as_ref().and_then(|d| d.metadata.get("title")) {
        return ro_str(action, title);
    }
    ro_opt_str(action, core.player.filename().map(basename))
}

fn file_size(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let size = core
        .player
        .demuxer
        .as_ref()
        .and_then(|d| d.file_size)
        .ok_or(PropertyError::Unavailable)?;
    match action {
        PropertyAction::Print => Ok(PropertyReply::Text(format_file_size(size))),
        _ => ro_int(action, size),
    }
}

fn frame_drops(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    if !core.player.playback_initialized {
        return Err(PropertyError::Unavailable);
    }
    ro_int(action, core.player.dropped_frames)
}

fn avsync(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let diff = core.player.av_difference.ok_or(PropertyError::Unavailable)?;
    match action {
        PropertyAction::Print => Ok(PropertyReply::Text(format!("{:7.3}", diff))),
        PropertyAction::Get => Ok(PropertyReply::Value(OptionValue::Double(diff))),
        PropertyAction::GetType => Ok(PropertyReply::Type(OptionType::double())),
        _ => Err(PropertyError::NotImplemented),
    }
}

fn cache_speed(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let speed = core
        .player
        .demuxer
        .as_ref()
        .and_then(|d| d.cache_speed)
        .ok_or(PropertyError::Unavailable)?;
    match action {
        PropertyAction::Print => Ok(PropertyReply::Text(format!("{}/s", format_file_size(speed)))),
        _ => ro_int(action, speed),
    }
}

fn chapter(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    if !core.player.playback_initialized || core.player.chapters.is_empty() {
        return Err(PropertyError::Unavailable);
    }
    let count = core.player.chapters.len();
    let current = core.player.current_chapter().map_or(-1, |c| c as i64);
    match action {
        PropertyAction::Get => Ok(PropertyReply::Value(OptionValue::Int(current))),
        PropertyAction::GetType => Ok(PropertyReply::Type(
            OptionType::int().with_range(-1.0, count as f64 - 1.0),
        )),
        PropertyAction::Print => {
            let Some(chapter) = usize::try_from(current).ok().and_then(|c| core.player.chapters.get(c)) else {
                return Ok(PropertyReply::Text("(unavailable)".to_string()));
            };
            Ok(PropertyReply::Text(format!("({}) {}/{}", current + 1, chapter.title, count)))
        }
        PropertyAction::Set(value) => {
            let index = value
                .as_int()
                .ok_or_else(|| PropertyError::failed("chapter expects an integer"))?
                .clamp(0, count as i64 - 1) as usize;
            let time = core.player.chapters[index].time;
            core.queue_seek(SeekKind::Absolute, time, SeekPrecision::Default);
            Ok(PropertyReply::Done)
        }
        _ => Err(PropertyError::NotImplemented),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing;
    use crate::properties::dispatch;

    fn print(core: &mut Core, name: &str) -> Result<String, PropertyError> {
        dispatch(core, name, &PropertyAction::Print)?.into_text()
    }

    #[test]
    fn test_unavailable_without_playback() {
        let mut core = testing::core();
        for name in ["eof-reached", "seeking", "percent-pos", "seekable", "filename", "chapter"] {
            assert_eq!(
                dispatch(&mut core, name, &PropertyAction::Get),
                Err(PropertyError::Unavailable),
                "{}",
                name
            );
        }
        assert_eq!(print(&mut core, "core-idle").as_deref(), Ok("yes"));
        assert_eq!(print(&mut core, "playback-abort").as_deref(), Ok("yes"));
    }

    #[test]
    fn test_printed_forms() {
        let mut core = testing::core();
        testing::playing(&mut core);
        core.player.time_pos = Some(30.0);
        core.player.av_difference = Some(0.25);

        assert_eq!(print(&mut core, "speed").as_deref(), Ok("1.00"));
        assert_eq!(print(&mut core, "percent-pos").as_deref(), Ok("25"));
        assert_eq!(print(&mut core, "filename").as_deref(), Ok("movie.mkv"));
        assert_eq!(print(&mut core, "filename/no-ext").as_deref(), Ok("movie"));
        assert_eq!(print(&mut core, "file-size").as_deref(), Ok("2.000 MiB"));
        assert_eq!(print(&mut core, "avsync").as_deref(), Ok("  0.250"));
        assert_eq!(print(&mut core, "chapter").as_deref(), Ok("(1) Opening/2"));
        assert_eq!(
            dispatch(&mut core, "filename/bogus", &PropertyAction::Get),
            Err(PropertyError::Unknown)
        );
    }

    #[test]
    fn test_media_title_fallback_chain() {
        let mut core = testing::core();
        testing::playing(&mut core);
        assert_eq!(print(&mut core, "media-title").as_deref(), Ok("Demo Movie"));

        if let Some(demuxer) = core.player.demuxer.as_mut() {
            demuxer.metadata = Default::default();
        }
        assert_eq!(print(&mut core, "media-title").as_deref(), Ok("movie.mkv"));

        core.options.set_string("title", "Override", Default::default()).unwrap();
        assert_eq!(print(&mut core, "media-title").as_deref(), Ok("Override"));
    }

    #[test]
    fn test_percent_pos_set_queues_factor_seek() {
        let mut core = testing::core();
        testing::playing(&mut core);
        dispatch(&mut core, "percent-pos", &PropertyAction::SetString("50".into())).unwrap();
        let seek = core.player.pending_seek.unwrap();
        assert_eq!(seek.kind, SeekKind::Factor);
        assert_eq!(seek.amount, 0.5);
    }

    #[test]
    fn test_pause_emits_lifecycle_event_when_playing() {
        let (mut core, hub) = testing::core_with_hub();
        let mut client = hub.connect("ui");
        testing::playing(&mut core);

        dispatch(&mut core, "pause", &PropertyAction::Set(OptionValue::Flag(true))).unwrap();
        let events: Vec<_> = client.drain().into_iter().map(|e| e.event).collect();
        assert!(events.contains(&crate::events::ClientEvent::Lifecycle {
            kind: EventKind::Pause,
            payload: None
        }));
        assert_eq!(print(&mut core, "core-idle").as_deref(), Ok("yes"));
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("/media/a/b.mkv"), "b.mkv");
        assert_eq!(basename("http://host/stream/"), "stream");
        assert_eq!(basename("plain"), "plain");
        assert_eq!(strip_extension(".hidden"), ".hidden");
    }
}
