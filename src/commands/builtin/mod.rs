// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The built-in command table.
//!
//! Each entry pairs a name and an argument schema with its handler and the
//! execution flags the dispatcher honours (async, worker pool, abortable,
//! auto-repeat, scaling).

mod audio;
mod client;
mod playback;
mod playlist;
mod process;
mod property;
mod text;

use crate::commands::descriptor::CommandDescriptor;
use crate::commands::list::cmd_list;
use crate::config::OptionType;

use audio::{cmd_af_command, cmd_audio_add, cmd_audio_reload, cmd_audio_remove};
use client::{
    cmd_apply_profile, cmd_hook_ack, cmd_hook_add, cmd_script_binding, cmd_script_message,
    cmd_script_message_to,
};
use playback::{
    cmd_ab_loop, cmd_frame_back_step, cmd_frame_step, cmd_ignore, cmd_quit, cmd_revert_seek,
    cmd_seek, cmd_stop,
};
use playlist::{
    cmd_loadfile, cmd_playlist_clear, cmd_playlist_move, cmd_playlist_next, cmd_playlist_prev,
    cmd_playlist_remove, cmd_playlist_shuffle,
};
use process::{cmd_run, cmd_subprocess};
use property::{cmd_add, cmd_change_list, cmd_cycle, cmd_cycle_values, cmd_multiply, cmd_set};
use text::{cmd_expand_text, cmd_print_text, cmd_show_progress, cmd_show_text};

fn capture_size() -> OptionType {
    OptionType::int64().with_range(0.0, i64::MAX as f64)
}

pub fn builtin_commands() -> Vec<CommandDescriptor> {
    let s = OptionType::string;
    vec![
        CommandDescriptor::new("ignore", cmd_ignore).ignore(),
        CommandDescriptor::new("seek", cmd_seek)
            .arg("target", OptionType::time())
            .opt("flags", s(), "relative")
            .opt(
                "legacy",
                OptionType::choice(&["unused", "default-precise", "keyframes", "exact"]),
                "unused",
            )
            .auto_repeat()
            .scalable(),
        CommandDescriptor::new("revert-seek", cmd_revert_seek).opt_zero("flags", s()),
        CommandDescriptor::new("quit", cmd_quit).opt_zero("code", OptionType::int()),
        CommandDescriptor::new("stop", cmd_stop),
        CommandDescriptor::new("frame-step", cmd_frame_step)
            .auto_repeat()
            .on_updown(),
        CommandDescriptor::new("frame-back-step", cmd_frame_back_step).auto_repeat(),
        CommandDescriptor::new("ab-loop", cmd_ab_loop),
        CommandDescriptor::new("playlist-next", cmd_playlist_next)
            .opt("flags", OptionType::choice(&["weak", "force"]), "weak"),
        CommandDescriptor::new("playlist-prev", cmd_playlist_prev)
            .opt("flags", OptionType::choice(&["weak", "force"]), "weak"),
        CommandDescriptor::new("playlist-clear", cmd_playlist_clear),
        CommandDescriptor::new("playlist-remove", cmd_playlist_remove).opt(
            "index",
            OptionType::choice(&["current"]).with_range(-1.0, i32::MAX as f64),
            "current",
        ),
        CommandDescriptor::new("playlist-move", cmd_playlist_move)
            .arg("index1", OptionType::int())
            .arg("index2", OptionType::int()),
        CommandDescriptor::new("playlist-shuffle", cmd_playlist_shuffle),
        CommandDescriptor::new("loadfile", cmd_loadfile)
            .arg("url", s())
            .opt(
                "flags",
                OptionType::choice(&["replace", "append", "append-play"]),
                "replace",
            )
            .opt_zero("options", OptionType::key_value_list()),
        CommandDescriptor::new("print-text", cmd_print_text)
            .arg("text", s())
            .auto_repeat(),
        CommandDescriptor::new("show-text", cmd_show_text)
            .arg("text", s())
            .opt("duration", OptionType::int(), "-1")
            .opt_zero("level", OptionType::int()),
        CommandDescriptor::new("expand-text", cmd_expand_text).arg("text", s()),
        CommandDescriptor::new("show-progress", cmd_show_progress).auto_repeat(),
        CommandDescriptor::new("run", cmd_run)
            .arg("command", s())
            .opt_zero("args", s())
            .vararg(),
        CommandDescriptor::new("subprocess", cmd_subprocess)
            .arg("args", OptionType::string_list())
            .opt("playback_only", OptionType::flag(), "yes")
            .opt("capture_size", capture_size(), "67108864")
            .opt_zero("capture_stdout", OptionType::flag())
            .opt_zero("capture_stderr", OptionType::flag())
            .spawn_thread()
            .abortable(),
        CommandDescriptor::new("set", cmd_set).arg("name", s()).arg("value", s()),
        CommandDescriptor::new("add", cmd_add)
            .arg("name", s())
            .opt("value", OptionType::double(), "1")
            .auto_repeat()
            .scalable(),
        CommandDescriptor::new("cycle", cmd_cycle)
            .arg("name", s())
            .opt("value", s(), "up")
            .auto_repeat()
            .scalable(),
        CommandDescriptor::new("multiply", cmd_multiply)
            .arg("name", s())
            .arg("value", OptionType::double())
            .auto_repeat(),
        CommandDescriptor::new("cycle-values", cmd_cycle_values)
            .arg("arg0", s())
            .arg("arg1", s())
            .opt_zero("argN", s())
            .vararg(),
        CommandDescriptor::new("change-list", cmd_change_list)
            .arg("name", s())
            .arg("operation", s())
            .arg("value", s()),
        CommandDescriptor::new("audio-add", cmd_audio_add)
            .arg("url", s())
            .opt("flags", OptionType::choice(&["select", "auto", "cached"]), "select")
            .opt_zero("title", s())
            .opt_zero("lang", s())
            .spawn_thread()
            .abort_on_playback_end(),
        CommandDescriptor::new("audio-remove", cmd_audio_remove).opt("id", OptionType::int(), "-1"),
        CommandDescriptor::new("audio-reload", cmd_audio_reload)
            .opt("id", OptionType::int(), "-1")
            .spawn_thread()
            .abort_on_playback_end(),
        CommandDescriptor::new("af-command", cmd_af_command)
            .arg("label", s())
            .arg("command", s())
            .arg("argument", s()),
        CommandDescriptor::new("script-binding", cmd_script_binding)
            .arg("name", s())
            .auto_repeat()
            .on_updown(),
        CommandDescriptor::new("script-message", cmd_script_message)
            .opt_zero("args", s())
            .vararg(),
        CommandDescriptor::new("script-message-to", cmd_script_message_to)
            .arg("target", s())
            .opt_zero("args", s())
            .vararg(),
        CommandDescriptor::new("hook-add", cmd_hook_add)
            .arg("arg0", s())
            .arg("arg1", OptionType::int())
            .arg("arg2", OptionType::int()),
        CommandDescriptor::new("hook-ack", cmd_hook_ack).arg("arg0", OptionType::int()),
        CommandDescriptor::new("apply-profile", cmd_apply_profile).arg("name", s()),
        CommandDescriptor::new("list", cmd_list).exec_async(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::consts::DEFAULT_CAPTURE_SIZE;
    use crate::config::OptionValue;

    #[test]
    fn test_names_are_unique() {
        let commands = builtin_commands();
        let mut names: Vec<&str> = commands.iter().map(|c| c.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), commands.len());
    }

    #[test]
    fn test_defaults_parse() {
        for desc in builtin_commands() {
            for spec in desc.args.iter().filter(|a| a.optional) {
                assert!(spec.default_value().is_ok(), "{}: {}", desc.name, spec.name);
            }
        }
    }

    #[test]
    fn test_capture_size_default() {
        let commands = builtin_commands();
        let sub = commands.iter().find(|c| c.name == "subprocess").unwrap();
        assert_eq!(sub.args[2].default_value(), Ok(OptionValue::Int(DEFAULT_CAPTURE_SIZE)));
        assert!(sub.flags.spawn_thread && sub.flags.can_abort && !sub.flags.abort_on_playback_end);
    }
}
