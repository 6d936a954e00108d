// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use tracing::info;

use crate::commands::ExecutionContext;
use crate::engine::CoreGuard;
use crate::properties::expand_string;
use crate::utils::format_time;

pub fn cmd_print_text(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let text = ctx.str_arg(0).to_string();
    info!(sender = ctx.sender().unwrap_or("-"), "{}", text);
    core.player.printed.push(text);
}

pub fn cmd_show_text(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    // A negative duration means the configured default.
    let duration = u64::try_from(ctx.int_arg(1)).ok();
    let level = ctx.int_arg(2);
    let text = ctx.str_arg(0).to_string();
    core.set_osd_msg(level, duration, text);
}

pub fn cmd_expand_text(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let text = ctx.str_arg(0).to_string();
    match expand_string(core, &text) {
        Ok(expanded) => ctx.set_result(Value::String(expanded)),
        Err(e) => ctx.fail(e.into()),
    }
}

pub fn cmd_show_progress(_: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let player = &core.player;
    let progress = match (player.playing_time(), player.duration, player.percent_pos()) {
        (Some(pos), Some(length), Some(percent)) => Some(format!(
            "{} / {} ({:.0}%)",
            format_time(pos, false),
            format_time(length, false),
            percent
        )),
        _ => None,
    };
    match progress {
        Some(text) => {
            core.set_osd_msg(1, None, text);
        }
        None => core.wake(),
    }
}
