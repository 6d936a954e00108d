// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{json, Value};

use crate::config::{OptionEntry, OptionType, OptionValue, SetFlags, ValueKind};
use crate::engine::Core;
use crate::errors::PropertyError;
use crate::properties::helpers::{read_sub, ro, ro_node, ro_str, split_path, SubProp};
use crate::properties::{PropertyAction, PropertyDescriptor, PropertyReply, PropertyResult};

pub(super) fn descriptors() -> Vec<PropertyDescriptor> {
    vec![
        PropertyDescriptor::new("options", |_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core| {
            access_options(action, core, false)
        }),
        PropertyDescriptor::new("file-local-options", |_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core| {
            access_options(action, core, true)
        }),
        PropertyDescriptor::new("option-info", option_info),
        PropertyDescriptor::new("property-list", property_list),
        PropertyDescriptor::new("profile-list", profile_list),
        PropertyDescriptor::new("working-directory", working_directory),
        PropertyDescriptor::new("version", version),
    ]
}

/// `options/<name>` reads and writes the raw option. The file-local variant
/// backs the old value up so it is restored when the file ends.
fn access_options(action: &PropertyAction, core: &mut Core, local: bool) -> PropertyResult {
    let PropertyAction::KeyAction { key, action } = action else {
        return match action {
            PropertyAction::Get => {
                let names = core.options.iter().map(|e| e.name.clone()).collect();
                Ok(PropertyReply::Value(OptionValue::StringList(names)))
            }
            PropertyAction::GetType => Ok(PropertyReply::Type(OptionType::string_list())),
            _ => Err(PropertyError::NotImplemented),
        };
    };
    let entry = core.options.resolve(key).ok_or(PropertyError::Unknown)?;
    match action.as_ref() {
        PropertyAction::Get => Ok(PropertyReply::Value(entry.value.clone())),
        PropertyAction::GetType => Ok(PropertyReply::Type(entry.ty.clone())),
        PropertyAction::Set(value) => {
            if local && core.player.playlist.current().is_none() {
                return Err(PropertyError::failed("file-local option change requires active playback"));
            }
            let flags = if local {
                SetFlags::RUNTIME.union(SetFlags::BACKUP)
            } else {
                SetFlags::RUNTIME
            };
            core.write_option(key, value.clone(), flags)
                .map_err(|e| PropertyError::failed(e.to_string()))?;
            core.wake();
            Ok(PropertyReply::Done)
        }
        _ => Err(PropertyError::NotImplemented),
    }
}

fn has_range(kind: ValueKind) -> bool {
    matches!(
        kind,
        ValueKind::Int | ValueKind::Int64 | ValueKind::Float | ValueKind::Double | ValueKind::Choice
    )
}

fn option_members(entry: &OptionEntry) -> Vec<SubProp> {
    let ty = &entry.ty;
    let ranged = has_range(ty.kind);
    let mut props = vec![
        SubProp::str("name", entry.name.as_str()),
        SubProp::str("type", ty.name()),
        SubProp::new("set-from-commandline", OptionValue::Flag(entry.set_from_cmdline)),
        SubProp::new("set-locally", OptionValue::Flag(entry.set_locally)),
        SubProp::new("default-value", entry.default.clone()),
        SubProp::opt("min", ty.min.filter(|_| ranged).map(OptionValue::Double)),
        SubProp::opt("max", ty.max.filter(|_| ranged).map(OptionValue::Double)),
    ];
    if ty.kind == ValueKind::Choice {
        props.push(SubProp::new("choices", OptionValue::StringList(ty.choices.clone())));
    }
    props
}

fn option_info(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let PropertyAction::KeyAction { key, action } = action else {
        return Err(PropertyError::NotImplemented);
    };
    let (name, rest) = split_path(key);
    let entry = core.options.resolve(name).ok_or(PropertyError::Unknown)?;
    let members = option_members(entry);
    if rest.is_empty() {
        read_sub(action, &members)
    } else {
        read_sub(&PropertyAction::key(rest, action.as_ref().clone()), &members)
    }
}

fn property_list(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let names = core.properties.names().map(str::to_string).collect();
    ro(action, OptionValue::StringList(names))
}

fn profile_list(_: &PropertyDescriptor, action: &PropertyAction, core: &mut Core) -> PropertyResult {
    let profiles: Vec<Value> = core
        .options
        .profiles()
        .map(|(name, profile)| {
            let options: Vec<Value> = profile
                .options
                .iter()
                .map(|(k, v)| json!({"key": k, "value": v}))
                .collect();
            let mut node = json!({"name": name, "options": options});
            if let Some(desc) = &profile.description {
                node["profile-desc"] = Value::String(desc.clone());
            }
            node
        })
        .collect();
    ro_node(action, Value::Array(profiles))
}

fn working_directory(_: &PropertyDescriptor, action: &PropertyAction, _: &mut Core) -> PropertyResult {
    let cwd = std::env::current_dir().map_err(|_| PropertyError::Unavailable)?;
    ro_str(action, &cwd.to_string_lossy())
}

fn version(_: &PropertyDescriptor, action: &PropertyAction, _: &mut Core) -> PropertyResult {
    ro_str(action, env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing;
    use crate::properties::{dispatch, property_do};

    #[test]
    fn test_options_key_access() {
        let mut core = testing::core();
        assert_eq!(
            dispatch(&mut core, "options/volume", &PropertyAction::Get),
            Ok(PropertyReply::Value(OptionValue::Double(100.0)))
        );
        property_do(&mut core, "options/volume", &PropertyAction::SetString("55".into())).unwrap();
        assert_eq!(core.options.get_f64("volume"), Some(55.0));
        assert_eq!(
            dispatch(&mut core, "options/nope", &PropertyAction::Get),
            Err(PropertyError::Unknown)
        );
        let names = dispatch(&mut core, "options", &PropertyAction::Get).unwrap();
        assert!(matches!(names, PropertyReply::Value(OptionValue::StringList(l)) if l.contains(&"pause".to_string())));
    }

    #[test]
    fn test_file_local_options_need_playback_and_back_up() {
        let mut core = testing::core();
        let set = PropertyAction::SetString("2".into());
        assert!(matches!(
            property_do(&mut core, "file-local-options/speed", &set),
            Err(PropertyError::Error(_))
        ));

        testing::playing(&mut core);
        property_do(&mut core, "file-local-options/speed", &set).unwrap();
        assert!(core.options.has_backup("speed"));
        assert_eq!(
            dispatch(&mut core, "option-info/speed/set-locally", &PropertyAction::Get),
            Ok(PropertyReply::Value(OptionValue::Flag(true)))
        );
    }

    #[test]
    fn test_option_info_members() {
        let mut core = testing::core();
        let get = |core: &mut Core, path: &str| dispatch(core, path, &PropertyAction::Get);

        assert_eq!(
            get(&mut core, "option-info/volume/max"),
            Ok(PropertyReply::Value(OptionValue::Double(1000.0)))
        );
        assert_eq!(
            get(&mut core, "option-info/volume/type"),
            Ok(PropertyReply::Value(OptionValue::str("double")))
        );
        assert_eq!(get(&mut core, "option-info/pause/min"), Err(PropertyError::Unavailable));
        assert_eq!(
            get(&mut core, "option-info/idle/choices"),
            Ok(PropertyReply::Value(OptionValue::StringList(vec![
                "no".into(),
                "yes".into(),
                "once".into()
            ])))
        );
        assert_eq!(get(&mut core, "option-info/volume/bogus"), Err(PropertyError::Unknown));
        assert_eq!(get(&mut core, "option-info"), Err(PropertyError::NotImplemented));

        let node = get(&mut core, "option-info/speed").and_then(|r| r.into_node()).unwrap();
        assert_eq!(node["default-value"], serde_json::json!(1.0));
    }

    #[test]
    fn test_static_introspection() {
        let mut core = testing::core();
        assert_eq!(
            dispatch(&mut core, "version", &PropertyAction::Get),
            Ok(PropertyReply::Value(OptionValue::str(env!("CARGO_PKG_VERSION"))))
        );
        let list = dispatch(&mut core, "property-list", &PropertyAction::Get).unwrap();
        assert!(matches!(list, PropertyReply::Value(OptionValue::StringList(l)) if l.contains(&"track-list".to_string())));
        assert!(dispatch(&mut core, "working-directory", &PropertyAction::Get).is_ok());
    }
}
