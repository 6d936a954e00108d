// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::{Duration, Instant};
use tracing::warn;

use crate::commands::ExecutionContext;
use crate::config::consts::SEEK_REPEAT_INTERVAL_MS;
use crate::config::OptionValue;
use crate::engine::{Core, CoreGuard};
use crate::errors::CommandError;
use crate::player::{SeekKind, SeekPrecision, StopPlay};
use crate::properties::{property_do, PropertyAction};

/// Seeks issued within this window revert to the position before the
/// first of them.
const SEEK_MARK_WINDOW: Duration = Duration::from_secs(2);

pub fn cmd_ignore(_: &mut ExecutionContext, _: &mut CoreGuard<'_>) {}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SeekMode {
    Relative,
    AbsolutePercent,
    Absolute,
    RelativePercent,
}

fn parse_seek_flags(text: &str) -> Result<(SeekMode, Option<SeekPrecision>), CommandError> {
    let mut mode = SeekMode::Relative;
    let mut precision = None;
    for flag in text.split('+').filter(|f| !f.is_empty()) {
        match flag {
            "relative" | "-" => mode = SeekMode::Relative,
            "absolute-percent" => mode = SeekMode::AbsolutePercent,
            "absolute" => mode = SeekMode::Absolute,
            "relative-percent" => mode = SeekMode::RelativePercent,
            "keyframes" => precision = Some(SeekPrecision::Keyframes),
            "exact" => precision = Some(SeekPrecision::Exact),
            other => return Err(CommandError::invalid(format!("unknown seek flag '{}'", other))),
        }
    }
    Ok((mode, precision))
}

fn legacy_precision(text: &str) -> Option<SeekPrecision> {
    match text {
        "keyframes" => Some(SeekPrecision::Keyframes),
        "exact" => Some(SeekPrecision::Exact),
        _ => None,
    }
}

/// Remembers where a burst of seeks started so `revert-seek` can go back.
fn mark_seek(core: &mut Core) {
    let now = Instant::now();
    let stale = core
        .last_seek
        .map_or(true, |at| now.duration_since(at) > SEEK_MARK_WINDOW);
    if stale || core.last_seek_pts.is_none() {
        core.last_seek_pts = core.player.time_pos;
    }
    core.last_seek = Some(now);
}

pub fn cmd_seek(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let (mode, precision) = match parse_seek_flags(ctx.str_arg(1)) {
        Ok(parsed) => parsed,
        Err(e) => return ctx.fail(e),
    };
    let precision = precision
        .or_else(|| legacy_precision(ctx.str_arg(2)))
        .unwrap_or_default();
    let Some(target) = ctx.arg(0).and_then(OptionValue::as_f64) else {
        return ctx.fail(CommandError::invalid("seek target missing"));
    };
    let amount = target * ctx.invocation.scale;

    if !core.player.playback_initialized {
        return ctx.fail(CommandError::failed("nothing is playing"));
    }
    // Held seek keys would otherwise flood the playback loop.
    let throttle = Duration::from_millis(SEEK_REPEAT_INTERVAL_MS);
    if ctx.invocation.repeated && core.last_seek.is_some_and(|at| at.elapsed() < throttle) {
        return;
    }

    mark_seek(core);
    let position = core.player.percent_pos().unwrap_or(0.0) / 100.0;
    match mode {
        SeekMode::Relative => core.queue_seek(SeekKind::Relative, amount, precision),
        SeekMode::AbsolutePercent => core.queue_seek(SeekKind::Factor, amount / 100.0, precision),
        SeekMode::Absolute => {
            let amount = if amount < 0.0 {
                let Some(length) = core.player.duration else {
                    return ctx.fail(CommandError::failed("cannot seek from the end: unknown duration"));
                };
                (length + amount).max(0.0)
            } else {
                amount
            };
            core.queue_seek(SeekKind::Absolute, amount, precision);
        }
        SeekMode::RelativePercent => {
            core.queue_seek(SeekKind::Factor, position + amount / 100.0, precision)
        }
    }
}

pub fn cmd_revert_seek(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    if !core.player.playback_initialized {
        return ctx.fail(CommandError::failed("nothing is playing"));
    }
    let mark = ctx.str_arg(0).split('+').any(|f| f == "mark");
    let target = core.marked_pts.or(core.last_seek_pts);
    if mark {
        core.marked_pts = core.player.time_pos;
        return;
    }
    let Some(target) = target else {
        return ctx.fail(CommandError::failed("no previous seek to revert"));
    };
    core.last_seek_pts = core.player.time_pos;
    core.marked_pts = None;
    core.queue_seek(SeekKind::Absolute, target, SeekPrecision::Exact);
}

pub fn cmd_quit(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    core.player.quit_code = Some(ctx.int_arg(0) as i32);
    core.request_stop(StopPlay::Quit);
}

pub fn cmd_stop(_: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    core.player.playlist.clear();
    if core.player.stop_play != StopPlay::Quit {
        core.request_stop(StopPlay::Stop);
    } else {
        core.wake();
    }
}

fn set_pause(core: &mut Core, paused: bool) {
    if let Err(e) = property_do(core, "pause", &PropertyAction::Set(OptionValue::Flag(paused))) {
        warn!(error = %e, paused, "Could not change pause state");
    }
}

fn step_frame(core: &mut Core, direction: i64) {
    if direction > 0 {
        core.player.frame_steps += direction;
        set_pause(core, false);
    } else {
        core.player.frame_steps = direction;
        set_pause(core, true);
    }
    core.wake();
}

pub fn cmd_frame_step(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    if !core.player.playback_initialized {
        return ctx.fail(CommandError::failed("nothing is playing"));
    }
    let inv = &ctx.invocation;
    if !inv.is_up_down {
        return step_frame(core, 1);
    }
    if inv.is_up {
        if core.player.frame_steps < 1 {
            set_pause(core, true);
        }
    } else if inv.repeated {
        // Holding the key plays normally.
        set_pause(core, false);
    } else {
        step_frame(core, 1);
    }
}

pub fn cmd_frame_back_step(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    if !core.player.playback_initialized {
        return ctx.fail(CommandError::failed("nothing is playing"));
    }
    step_frame(core, -1);
}

fn set_loop_point(core: &mut Core, name: &str, at: Option<f64>) {
    if let Err(e) = property_do(core, name, &PropertyAction::Set(OptionValue::Time(at))) {
        warn!(property = name, error = %e, "Could not set A-B loop point");
    }
}

fn loop_point_set(core: &Core, name: &str) -> bool {
    matches!(core.options.get(name), Some(OptionValue::Time(Some(_))))
}

pub fn cmd_ab_loop(_: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let now = core.player.time_pos;
    if !loop_point_set(core, "ab-loop-a") {
        set_loop_point(core, "ab-loop-a", now);
    } else if !loop_point_set(core, "ab-loop-b") {
        set_loop_point(core, "ab-loop-b", now);
    } else {
        set_loop_point(core, "ab-loop-a", None);
        set_loop_point(core, "ab-loop-b", None);
        core.set_osd_msg(1, None, "Clear A-B loop");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Invocation;
    use crate::engine::testing;
    use crate::player::SeekRequest;

    fn seek_of(core: &Core) -> SeekRequest {
        core.player.pending_seek.expect("no seek queued")
    }

    #[test]
    fn test_seek_needs_playback() {
        let lock = testing::lock(testing::core());
        let mut core = lock.lock();
        assert!(!testing::run(&mut core, "seek 5").success);
        assert!(core.player.pending_seek.is_none());
    }

    #[test]
    fn test_seek_modes() {
        let lock = testing::lock(testing::core());
        let mut core = lock.lock();
        testing::playing(&mut core);

        assert!(testing::run(&mut core, "seek 5").success);
        let seek = seek_of(&core);
        assert_eq!((seek.kind, seek.amount, seek.precision), (SeekKind::Relative, 5.0, SeekPrecision::Default));
        assert_eq!(core.last_seek_pts, Some(30.0));

        testing::run(&mut core, "seek 50 absolute-percent");
        assert_eq!((seek_of(&core).kind, seek_of(&core).amount), (SeekKind::Factor, 0.5));

        testing::run(&mut core, "seek -10 absolute+exact");
        let seek = seek_of(&core);
        assert_eq!((seek.kind, seek.amount, seek.precision), (SeekKind::Absolute, 110.0, SeekPrecision::Exact));

        testing::run(&mut core, "seek 20 relative-percent");
        let seek = seek_of(&core);
        assert_eq!(seek.kind, SeekKind::Factor);
        assert!((seek.amount - 0.45).abs() < 1e-9);

        testing::run(&mut core, "seek 1 absolute keyframes");
        assert_eq!(seek_of(&core).precision, SeekPrecision::Keyframes);

        assert!(!testing::run(&mut core, "seek 1 sideways").success);
    }

    #[test]
    fn test_seek_from_end_needs_duration() {
        let lock = testing::lock(testing::core());
        let mut core = lock.lock();
        testing::playing(&mut core);
        core.player.duration = None;
        assert!(!testing::run(&mut core, "seek -10 absolute").success);
    }

    #[test]
    fn test_seek_is_scaled() {
        let lock = testing::lock(testing::core());
        let mut core = lock.lock();
        testing::playing(&mut core);
        let inv = Invocation::parse(&core.commands, "seek 4").unwrap().with_scale(0.5, 1);
        testing::run_invocation(&mut core, inv);
        assert_eq!(seek_of(&core).amount, 2.0);
    }

    #[test]
    fn test_repeated_seek_is_throttled() {
        let lock = testing::lock(testing::core());
        let mut core = lock.lock();
        testing::playing(&mut core);
        testing::run(&mut core, "seek 5");
        let mut held = Invocation::parse(&core.commands, "seek 5").unwrap();
        held.repeated = true;
        assert!(testing::run_invocation(&mut core, held).success);
        assert_eq!(seek_of(&core).amount, 5.0);
    }

    #[test]
    fn test_revert_seek() {
        let lock = testing::lock(testing::core());
        let mut core = lock.lock();
        testing::playing(&mut core);
        assert!(!testing::run(&mut core, "revert-seek").success);

        testing::run(&mut core, "seek 10");
        core.player.time_pos = Some(40.0);
        assert!(testing::run(&mut core, "revert-seek").success);
        let seek = seek_of(&core);
        assert_eq!((seek.kind, seek.amount, seek.precision), (SeekKind::Absolute, 30.0, SeekPrecision::Exact));
        assert_eq!(core.last_seek_pts, Some(40.0));

        core.player.time_pos = Some(75.0);
        testing::run(&mut core, "revert-seek mark");
        assert_eq!(core.marked_pts, Some(75.0));
        core.player.time_pos = Some(10.0);
        testing::run(&mut core, "revert-seek");
        assert_eq!(seek_of(&core).amount, 75.0);
        assert_eq!(core.marked_pts, None);
    }

    #[test]
    fn test_quit_and_stop() {
        let lock = testing::lock(testing::core());
        let mut core = lock.lock();
        testing::playing(&mut core);
        testing::run(&mut core, "stop");
        assert_eq!(core.player.stop_play, StopPlay::Stop);
        assert!(core.player.playlist.is_empty());

        testing::run(&mut core, "quit 3");
        assert_eq!(core.player.stop_play, StopPlay::Quit);
        assert_eq!(core.player.quit_code, Some(3));
        testing::run(&mut core, "stop");
        assert_eq!(core.player.stop_play, StopPlay::Quit);
    }

    #[test]
    fn test_frame_step_up_down() {
        let lock = testing::lock(testing::core());
        let mut core = lock.lock();
        assert!(!testing::run(&mut core, "frame-step").success);
        testing::playing(&mut core);

        testing::run(&mut core, "frame-step");
        assert_eq!(core.player.frame_steps, 1);
        assert!(!core.options.get_flag("pause"));

        let mut up = Invocation::parse(&core.commands, "frame-step").unwrap();
        up.is_up_down = true;
        up.is_up = true;
        core.player.frame_steps = 0;
        testing::run_invocation(&mut core, up);
        assert!(core.options.get_flag("pause"));

        let mut held = Invocation::parse(&core.commands, "frame-step").unwrap();
        held.is_up_down = true;
        held.repeated = true;
        testing::run_invocation(&mut core, held);
        assert!(!core.options.get_flag("pause"));
        assert_eq!(core.player.frame_steps, 0);

        testing::run(&mut core, "frame-back-step");
        assert_eq!(core.player.frame_steps, -1);
        assert!(core.options.get_flag("pause"));
    }

    #[test]
    fn test_ab_loop_cycles() {
        let lock = testing::lock(testing::core());
        let mut core = lock.lock();
        testing::playing(&mut core);
        testing::run(&mut core, "ab-loop");
        assert_eq!(core.options.get("ab-loop-a"), Some(&OptionValue::Time(Some(30.0))));
        core.player.time_pos = Some(45.0);
        testing::run(&mut core, "ab-loop");
        assert_eq!(core.options.get("ab-loop-b"), Some(&OptionValue::Time(Some(45.0))));

        testing::run(&mut core, "ab-loop");
        assert_eq!(core.options.get("ab-loop-a"), Some(&OptionValue::Time(None)));
        assert_eq!(core.options.get("ab-loop-b"), Some(&OptionValue::Time(None)));
        assert_eq!(core.player.osd.as_ref().map(|o| o.text.as_str()), Some("Clear A-B loop"));
    }
}
