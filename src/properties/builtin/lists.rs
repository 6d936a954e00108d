// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{OptionType, OptionValue};
use crate::engine::Core;
use crate::errors::PropertyError;
use crate::player::Track;
use crate::properties::builtin::playback::basename;
use crate::properties::helpers::{read_list, read_sub, SubProp};
use crate::properties::{
    alias, deprecated_alias, PropertyAction, PropertyDescriptor, PropertyReply, PropertyResult,
};

pub(super) fn descriptors() -> Vec<PropertyDescriptor> {
    vec![
        PropertyDescriptor::new("track-list", track_list),
        PropertyDescriptor::new("playlist", playlist),
        PropertyDescriptor::new("playlist-pos", playlist_pos),
        PropertyDescriptor::new("chapter-list", chapter_list),
        PropertyDescriptor::new("audio", alias("aid")),
        PropertyDescriptor::new("playlist-count", alias("playlist/count")),
        PropertyDescriptor::new("drop-frame-count", deprecated_alias("decoder-frame-drop-count")),
    ]
}

fn track_entry(track: &Track, action: &PropertyAction) -> PropertyResult {
    let opt_str = |v: &Option<String>| v.as_ref().map(|s| OptionValue::str(s.as_str()));
    read_sub(
        action,
        &[
            SubProp::new("id", OptionValue::Int(track.id)),
            SubProp::str("type", track.kind.name()),
            SubProp::opt("title", opt_str(&track.title)),
            SubProp::opt("lang", opt_str(&track.lang)),
            SubProp::opt("codec", opt_str(&track.codec)),
            SubProp::new("default", OptionValue::Flag(track.default)),
            SubProp::new("selected", OptionValue::Flag(track.selected)),
            SubProp::new("external", OptionValue::Flag(track.is_external())),
            SubProp::opt("external-filename", opt_str(&track.external_filename)),
        ],
    )
}

fn track_line(track: &Track) -> String {
    let marker = if track.selected { '*' } else { ' ' };
    let mut line = format!("{} {} ({})", marker, track.kind, track.id);
    if let Some(lang) = &track.lang {
        line.push_str(&format!(" {}", lang));
    }
    if let Some(title) = &track.title {
        line.push_str(&format!(" '{}'", title));
    }
    if track.is_external() {
        line.push_str(" (external)");
    }
    line
}

fn track_list(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let tracks = &core.player.tracks;
    if let PropertyAction::Print = action {
        let lines: Vec<String> = tracks.iter().map(track_line).collect();
        return Ok(PropertyReply::Text(lines.join("\n")));
    }
    read_list(action, tracks.len(), |i, action| track_entry(&tracks[i], action))
}

fn playlist(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let list = &core.player.playlist;
    let current = list.current_index();
    if let PropertyAction::Print = action {
        let lines: Vec<String> = list
            .entries()
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let marker = if Some(i) == current { "> " } else { "" };
                let name = e.title.as_deref().unwrap_or_else(|| basename(&e.filename));
                format!("{}{}", marker, name)
            })
            .collect();
        return Ok(PropertyReply::Text(lines.join("\n")));
    }
    read_list(action, list.len(), |i, action| {
        let entry = list.get(i).ok_or(PropertyError::Unknown)?;
        read_sub(
            action,
            &[
                SubProp::str("filename", entry.filename.as_str()),
                SubProp::new("current", OptionValue::Flag(Some(i) == current)),
                SubProp::opt("title", entry.title.as_ref().map(|t| OptionValue::str(t.as_str()))),
                SubProp::new("id", OptionValue::Int(entry.id as i64)),
            ],
        )
    })
}

fn playlist_pos(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let len = core.player.playlist.len();
    match action {
        PropertyAction::Get => {
            let pos = core.player.playlist.current_index().map_or(-1, |i| i as i64);
            Ok(PropertyReply::Value(OptionValue::Int(pos)))
        }
        PropertyAction::GetType => Ok(PropertyReply::Type(
            OptionType::int().with_range(-1.0, len as f64 - 1.0),
        )),
        PropertyAction::Set(value) => {
            let index = value
                .as_int()
                .and_then(|i| usize::try_from(i).ok())
                .filter(|&i| i < len)
                .ok_or_else(|| PropertyError::failed("playlist index out of range"))?;
            core.request_entry(index);
            Ok(PropertyReply::Done)
        }
        _ => Err(PropertyError::NotImplemented),
    }
}

fn chapter_list(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let chapters = &core.player.chapters;
    read_list(action, chapters.len(), |i, action| {
        let chapter = &chapters[i];
        read_sub(
            action,
            &[
                SubProp::str("title", chapter.title.as_str()),
                SubProp::new("time", OptionValue::Double(chapter.time)),
            ],
        )
    })
}
