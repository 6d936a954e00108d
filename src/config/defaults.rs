// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::loader::OptionDef;
use crate::config::options::OptionType;
use crate::config::store::UpdateKind;

/// The built-in option table. Configuration may append to it.
pub fn builtin_option_defs() -> Vec<OptionDef> {
    vec![
        OptionDef::new("pause", OptionType::flag()).default_value("no"),
        OptionDef::new("speed", OptionType::double().with_range(0.01, 100.0)).default_value("1"),
        OptionDef::new("volume", OptionType::double().with_range(0.0, 1000.0))
            .default_value("100")
            .updates(UpdateKind::Volume),
        OptionDef::new("volume-max", OptionType::double().with_range(100.0, 1000.0))
            .default_value("130")
            .updates(UpdateKind::Volume),
        OptionDef::alias("softvol-max", "volume-max", Some("use --volume-max")),
        OptionDef::new("mute", OptionType::flag())
            .default_value("no")
            .updates(UpdateKind::Volume),
        OptionDef::new("audio-delay", OptionType::double().with_range(-100.0, 100.0))
            .default_value("0"),
        OptionDef::new("aid", OptionType::choice(&["no", "auto"]).with_range(0.0, 8190.0))
            .default_value("auto"),
        OptionDef::new("af", OptionType::string_list()).updates(UpdateKind::Audio),
        OptionDef::new("audio-device", OptionType::string()).default_value("auto"),
        OptionDef::new("audio-samplerate", OptionType::int().with_range(0.0, 768_000.0))
            .default_value("0")
            .updates(UpdateKind::Audio),
        OptionDef::new("replaygain", OptionType::choice(&["no", "track", "album"]))
            .default_value("no")
            .updates(UpdateKind::Audio),
        OptionDef::new("gapless-audio", OptionType::choice(&["no", "yes", "weak"]))
            .default_value("weak"),
        OptionDef::new("ab-loop-a", OptionType::time()).default_value("no"),
        OptionDef::new("ab-loop-b", OptionType::time()).default_value("no"),
        OptionDef::new("loop-file", OptionType::choice(&["no", "inf"]).with_range(0.0, 10_000.0))
            .default_value("no"),
        OptionDef::new("idle", OptionType::choice(&["no", "yes", "once"])).default_value("no"),
        OptionDef::new("osd-level", OptionType::int().with_range(0.0, 3.0))
            .default_value("1")
            .updates(UpdateKind::Osd),
        OptionDef::new("osd-duration", OptionType::int().with_range(0.0, 3_600_000.0))
            .default_value("1000"),
        OptionDef::new("display-tags", OptionType::string_list())
            .default_value("Artist,Album,Album_Artist,Composer,Genre,Title,Track,Date"),
        OptionDef::new("term-status-msg", OptionType::string()).updates(UpdateKind::Term),
        OptionDef::new("input-ipc-server", OptionType::string()).updates(UpdateKind::Input),
        OptionDef::new("title", OptionType::string()),
        OptionDef::new("include", OptionType::string()).hidden(),
        OptionDef::new("profile", OptionType::string_list()).hidden(),
    ]
}
