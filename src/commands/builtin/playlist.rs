// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::commands::ExecutionContext;
use crate::config::OptionValue;
use crate::engine::{Core, CoreGuard};
use crate::errors::CommandError;
use crate::events::EventKind;
use crate::player::StopPlay;

fn playlist_changed(core: &mut Core) {
    core.notify(EventKind::ChangePlaylist, None);
    core.wake();
}

fn playlist_step(ctx: &mut ExecutionContext, core: &mut Core, direction: i64) {
    let force = ctx.str_arg(0) == "force";
    match core.player.playlist.neighbour(direction) {
        Some(index) => core.request_entry(index),
        // Forced past either end: stop the current file without a successor.
        None if force => {
            core.player.next_entry = None;
            core.request_stop(StopPlay::CurrentEntry);
        }
        None => ctx.fail(CommandError::failed("no playlist entry in that direction")),
    }
}

pub fn cmd_playlist_next(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    playlist_step(ctx, core, 1);
}

pub fn cmd_playlist_prev(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    playlist_step(ctx, core, -1);
}

pub fn cmd_playlist_clear(_: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    core.player.playlist.clear_except_current();
    playlist_changed(core);
}

pub fn cmd_playlist_remove(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let index = match ctx.arg(0) {
        Some(OptionValue::Int(i)) if *i >= 0 => Some(*i as usize),
        _ => core.player.playlist.current_index(),
    };
    let Some(index) = index.filter(|&i| i < core.player.playlist.len()) else {
        return ctx.fail(CommandError::failed("no such playlist entry"));
    };

    let was_current = core.player.playlist.current_index() == Some(index);
    core.player.playlist.remove(index);
    // The removed entry cannot keep playing; its successor moved into its slot.
    if was_current && !core.playback_stopping() {
        if index < core.player.playlist.len() {
            core.request_entry(index);
        } else {
            core.request_stop(StopPlay::NextEntry);
        }
    }
    playlist_changed(core);
}

pub fn cmd_playlist_move(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let len = core.player.playlist.len();
    let from = ctx.int_arg(0);
    if from < 0 || from as usize >= len {
        return ctx.fail(CommandError::failed("no such playlist entry"));
    }
    // A target past the end appends.
    let to = (ctx.int_arg(1).max(0) as usize).min(len);
    core.player.playlist.move_entry(from as usize, to);
    core.notify(EventKind::ChangePlaylist, None);
}

pub fn cmd_playlist_shuffle(_: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    core.player.playlist.shuffle();
    core.notify(EventKind::ChangePlaylist, None);
}

pub fn cmd_loadfile(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let url = ctx.str_arg(0).to_string();
    let mode = ctx.str_arg(1).to_string();
    let params = match ctx.arg(2) {
        Some(OptionValue::KeyValueList(pairs)) => pairs.clone(),
        _ => Vec::new(),
    };

    if mode == "replace" {
        core.player.playlist.clear();
    }
    core.player.playlist.add(&url, params);
    let index = core.player.playlist.len() - 1;

    let play = match mode.as_str() {
        "replace" => true,
        "append-play" => core.player.playlist.current().is_none(),
        _ => false,
    };
    if play {
        core.request_entry(index);
    }
    playlist_changed(core);
}
