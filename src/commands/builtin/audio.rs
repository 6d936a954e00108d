// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use parking_lot::MutexGuard;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::commands::ExecutionContext;
use crate::config::OptionValue;
use crate::engine::{Core, CoreGuard};
use crate::errors::CommandError;
use crate::events::EventKind;
use crate::player::{Track, TrackKind};
use crate::properties::{property_do, PropertyAction};

const KIND: TrackKind = TrackKind::Audio;

fn abort_token(ctx: &ExecutionContext) -> CancellationToken {
    ctx.abort
        .as_ref()
        .map(|h| h.token().clone())
        .unwrap_or_default()
}

/// `-1` addresses the selected track.
fn track_id(core: &Core, id: i64) -> Option<i64> {
    if id == -1 {
        return core.player.selected_track(KIND).map(|t| t.id);
    }
    core.player.track(KIND, id).map(|t| t.id)
}

fn select(core: &mut Core, id: i64) {
    if let Err(e) = property_do(core, "aid", &PropertyAction::Set(OptionValue::Int(id))) {
        warn!(track = id, error = %e, "Could not select audio track");
    }
}

/// Opens `url` with the core lock released.
fn open_external(
    ctx: &ExecutionContext,
    core: &mut CoreGuard<'_>,
    url: &str,
) -> Result<Track, CommandError> {
    let media = Arc::clone(&core.services.media);
    let token = abort_token(ctx);
    let opened = MutexGuard::unlocked(core, || media.open_track(url, KIND, &token));
    if token.is_cancelled() {
        return Err(CommandError::Aborted);
    }
    let mut track = opened.map_err(|e| CommandError::failed(format!("could not open '{}': {}", url, e)))?;
    track.kind = KIND;
    track.external_filename = Some(url.to_string());
    Ok(track)
}

pub fn cmd_audio_add(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    if core.playback_stopping() {
        return ctx.fail(CommandError::failed("playback is stopping"));
    }
    let url = ctx.str_arg(0).to_string();
    let mode = ctx.str_arg(1).to_string();

    if mode == "cached" {
        let cached = core
            .player
            .tracks_of(KIND)
            .find(|t| t.external_filename.as_deref() == Some(url.as_str()))
            .map(|t| t.id);
        if let Some(id) = cached {
            select(core, id);
            return;
        }
    }

    let mut track = match open_external(ctx, core, &url) {
        Ok(track) => track,
        Err(e) => return ctx.fail(e),
    };
    let title = ctx.str_arg(2);
    if !title.is_empty() {
        track.title = Some(title.to_string());
    }
    let lang = ctx.str_arg(3);
    if !lang.is_empty() {
        track.lang = Some(lang.to_string());
    }
    track.default = false;
    track.selected = false;

    let id = core.player.add_track(track);
    core.notify(EventKind::TracksChanged, None);
    if mode != "auto" {
        select(core, id);
    }
    if core.player.playback_initialized {
        info!(track = id, url = %url, "Track added");
    }
}

pub fn cmd_audio_remove(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let Some(id) = track_id(core, ctx.int_arg(0)) else {
        return ctx.fail(CommandError::failed(format!("no audio track {}", ctx.int_arg(0))));
    };
    core.player.remove_track(KIND, id);
    core.notify(EventKind::TracksChanged, None);
    if core.player.playback_initialized {
        info!(track = id, "Track removed");
    }
}

pub fn cmd_audio_reload(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    if !core.player.playback_initialized {
        return ctx.fail(CommandError::failed("cannot reload while not initialized"));
    }
    let url = track_id(core, ctx.int_arg(0))
        .and_then(|id| core.player.track(KIND, id))
        .and_then(|t| t.external_filename.clone().map(|url| (t.id, url)));
    let Some((id, url)) = url else {
        return ctx.fail(CommandError::failed("only external tracks can be reloaded"));
    };

    core.player.remove_track(KIND, id);
    let track = match open_external(ctx, core, &url) {
        Ok(track) => track,
        Err(e) => {
            core.notify(EventKind::TracksChanged, None);
            return ctx.fail(e);
        }
    };
    let new_id = core.player.add_track(track);
    core.notify(EventKind::TracksChanged, None);
    select(core, new_id);
    info!(track = new_id, url = %url, "Reloaded");
}

pub fn cmd_af_command(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    if core.player.audio_out.is_none() {
        return ctx.fail(CommandError::failed("no audio output"));
    }
    let result = core
        .services
        .media
        .filter_command(ctx.str_arg(0), ctx.str_arg(1), ctx.str_arg(2));
    if let Err(e) = result {
        ctx.fail(CommandError::failed(e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing;

    fn selected(core: &Core) -> Option<i64> {
        core.player.selected_track(KIND).map(|t| t.id)
    }

    #[test]
    fn test_audio_add_selects_and_labels() {
        let (core, stubs) = testing::core_with_stubs();
        let lock = testing::lock(core);
        stubs.media.probe(&lock);
        let mut core = lock.lock();
        testing::playing(&mut core);

        let mut ctx = testing::context(&core, "audio-add /ext/commentary.ogg select Commentary eng");
        cmd_audio_add(&mut ctx, &mut core);
        assert!(ctx.success);
        assert!(stubs.media.ran_unlocked());

        let track = core.player.track(KIND, 3).cloned().unwrap();
        assert_eq!(track.title.as_deref(), Some("Commentary"));
        assert_eq!(track.lang.as_deref(), Some("eng"));
        assert!(track.is_external());
        assert_eq!(selected(&core), Some(3));

        let mut ctx = testing::context(&core, "audio-add /ext/other.ogg auto");
        cmd_audio_add(&mut ctx, &mut core);
        assert_eq!(selected(&core), Some(3));
        assert_eq!(core.player.tracks_of(KIND).count(), 4);

        // Already loaded: selected again instead of opened twice.
        core.player.select_track(KIND, Some(1));
        let mut ctx = testing::context(&core, "audio-add /ext/commentary.ogg cached");
        cmd_audio_add(&mut ctx, &mut core);
        assert_eq!(selected(&core), Some(3));
        assert_eq!(stubs.media.opened.lock().len(), 2);
    }

    #[test]
    fn test_audio_add_failures() {
        let (core, stubs) = testing::core_with_stubs();
        let lock = testing::lock(core);
        let mut core = lock.lock();
        testing::playing(&mut core);

        let mut ctx = testing::context(&core, "audio-add /missing.ogg");
        cmd_audio_add(&mut ctx, &mut core);
        assert!(!ctx.success);

        core.request_stop(crate::player::StopPlay::Stop);
        let mut ctx = testing::context(&core, "audio-add /ext/a.ogg");
        cmd_audio_add(&mut ctx, &mut core);
        assert!(!ctx.success);
        assert_eq!(stubs.media.opened.lock().len(), 1);
    }

    #[test]
    fn test_audio_remove() {
        let lock = testing::lock(testing::core());
        let mut core = lock.lock();
        testing::playing(&mut core);
        assert!(testing::run(&mut core, "audio-remove 2").success);
        assert!(testing::run(&mut core, "audio-remove").success);
        assert_eq!(core.player.tracks_of(KIND).count(), 0);
        assert!(!testing::run(&mut core, "audio-remove 99").success);
    }

    #[test]
    fn test_audio_reload_reopens_external_track() {
        let (core, stubs) = testing::core_with_stubs();
        let lock = testing::lock(core);
        let mut core = lock.lock();
        testing::playing(&mut core);

        let mut ctx = testing::context(&core, "audio-reload 1");
        cmd_audio_reload(&mut ctx, &mut core);
        assert!(!ctx.success);

        let mut ctx = testing::context(&core, "audio-add /ext/commentary.ogg");
        cmd_audio_add(&mut ctx, &mut core);
        let mut ctx = testing::context(&core, "audio-reload 3");
        cmd_audio_reload(&mut ctx, &mut core);
        assert!(ctx.success);
        assert!(core.player.track(KIND, 3).is_none());
        assert_eq!(selected(&core), Some(4));
        assert_eq!(stubs.media.opened.lock().len(), 2);
    }

    #[test]
    fn test_af_command_needs_audio_output() {
        let (core, stubs) = testing::core_with_stubs();
        let lock = testing::lock(core);
        let mut core = lock.lock();
        assert!(!testing::run(&mut core, "af-command eq gain 3").success);

        testing::playing(&mut core);
        assert!(testing::run(&mut core, "af-command eq gain 3").success);
        assert_eq!(
            *stubs.media.filter_commands.lock(),
            vec![("eq".to_string(), "gain".to_string(), "3".to_string())]
        );
    }
}
