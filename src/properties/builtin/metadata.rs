// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{Map, Value};

use crate::config::{OptionType, OptionValue};
use crate::engine::Core;
use crate::errors::PropertyError;
use crate::player::Tags;
use crate::properties::helpers::{read_list, read_sub, split_path, SubProp};
use crate::properties::{PropertyAction, PropertyDescriptor, PropertyReply, PropertyResult};

pub(super) fn descriptors() -> Vec<PropertyDescriptor> {
    vec![
        PropertyDescriptor::new("metadata", metadata),
        PropertyDescriptor::new("filtered-metadata", filtered_metadata),
        PropertyDescriptor::new("chapter-metadata", chapter_metadata),
    ]
}

/// Tag set access: the whole map, `list/...` by position, or a single tag
/// by (case-insensitive) key, optionally spelled `by-key/<key>`.
pub(super) fn tag_property(action: &PropertyAction, tags: &Tags) -> PropertyResult {
    match action {
        PropertyAction::Get | PropertyAction::GetNode => {
            let map: Map<String, Value> = tags
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect();
            Ok(PropertyReply::Node(Value::Object(map)))
        }
        PropertyAction::GetType => Ok(PropertyReply::Type(OptionType::node())),
        PropertyAction::Print => {
            if tags.is_empty() {
                return Ok(PropertyReply::Text("(empty)".to_string()));
            }
            let lines: Vec<String> = tags.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
            Ok(PropertyReply::Text(lines.join("\n")))
        }
        PropertyAction::KeyAction { key, action } => {
            let (head, rest) = split_path(key);
            if head == "list" {
                let list_action = if rest.is_empty() {
                    action.as_ref().clone()
                } else {
                    PropertyAction::key(rest, action.as_ref().clone())
                };
                return read_list(&list_action, tags.len(), |i, item_action| {
                    let (k, v) = tags.entry(i).ok_or(PropertyError::Unknown)?;
                    read_sub(item_action, &[SubProp::str("key", k), SubProp::str("value", v)])
                });
            }
            let name = key.strip_prefix("by-key/").unwrap_or(key);
            let value = tags.get(name).ok_or(PropertyError::Unknown)?;
            match action.as_ref() {
                PropertyAction::Get => Ok(PropertyReply::Value(OptionValue::str(value))),
                PropertyAction::GetType => Ok(PropertyReply::Type(OptionType::string())),
                _ => Err(PropertyError::NotImplemented),
            }
        }
        _ => Err(PropertyError::NotImplemented),
    }
}

fn metadata(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let demuxer = core.player.demuxer.as_ref().ok_or(PropertyError::Unavailable)?;
    tag_property(action, &demuxer.metadata)
}

fn filtered_metadata(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let demuxer = core.player.demuxer.as_ref().ok_or(PropertyError::Unavailable)?;
    let keys = core
        .options
        .get("display-tags")
        .and_then(OptionValue::as_list)
        .unwrap_or(&[]);
    tag_property(action, &demuxer.metadata.filtered(keys))
}

fn chapter_metadata(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let chapter = core
        .player
        .current_chapter()
        .and_then(|c| core.player.chapters.get(c))
        .ok_or(PropertyError::Unavailable)?;
    tag_property(action, &chapter.metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing;
    use crate::properties::dispatch;
    use serde_json::json;

    fn tags() -> Tags {
        vec![("Title", "Song"), ("Artist", "Band"), ("Comment", "x")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_tag_key_actions() {
        let tags = tags();
        let get = |key: &str| tag_property(&PropertyAction::key(key, PropertyAction::Get), &tags);

        assert_eq!(get("title"), Ok(PropertyReply::Value(OptionValue::str("Song"))));
        assert_eq!(get("by-key/ARTIST"), Ok(PropertyReply::Value(OptionValue::str("Band"))));
        assert_eq!(get("missing"), Err(PropertyError::Unknown));
        assert_eq!(get("list/count"), Ok(PropertyReply::Value(OptionValue::Int(3))));
        assert_eq!(get("list/1/key"), Ok(PropertyReply::Value(OptionValue::str("Artist"))));
        assert_eq!(get("list/2/value"), Ok(PropertyReply::Value(OptionValue::str("x"))));
        assert_eq!(
            get("list").and_then(|r| r.into_node()),
            Ok(json!([
                {"key": "Title", "value": "Song"},
                {"key": "Artist", "value": "Band"},
                {"key": "Comment", "value": "x"},
            ]))
        );
    }

    #[test]
    fn test_tag_print() {
        assert_eq!(
            tag_property(&PropertyAction::Print, &tags()),
            Ok(PropertyReply::Text("Title: Song\nArtist: Band\nComment: x".into()))
        );
        assert_eq!(
            tag_property(&PropertyAction::Print, &Tags::new()),
            Ok(PropertyReply::Text("(empty)".into()))
        );
    }

    #[test]
    fn test_metadata_properties() {
        let mut core = testing::core();
        assert_eq!(dispatch(&mut core, "metadata", &PropertyAction::Get), Err(PropertyError::Unavailable));

        testing::playing(&mut core);
        let printed = dispatch(&mut core, "metadata/by-key/title", &PropertyAction::Print)
            .and_then(|r| r.into_text());
        assert_eq!(printed.as_deref(), Ok("Demo Movie"));

        let filtered = dispatch(&mut core, "filtered-metadata", &PropertyAction::Get)
            .and_then(|r| r.into_node())
            .unwrap();
        assert_eq!(filtered, json!({"artist": "Someone", "title": "Demo Movie"}));

        let chapter = dispatch(&mut core, "chapter-metadata/list/count", &PropertyAction::Get).unwrap();
        assert_eq!(chapter, PropertyReply::Value(OptionValue::Int(1)));
    }
}
