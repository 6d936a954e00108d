// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Commands that act on properties: `set`, `add`, `cycle`, `multiply`,
//! `cycle-values` and `change-list`.

use tracing::{debug, error};

use crate::commands::{ExecutionContext, OsdMode};
use crate::config::{OptionType, OptionValue, SetFlags, ValueKind};
use crate::engine::{Core, CoreGuard};
use crate::errors::{CommandError, PropertyError};
use crate::observability::messages::{property::PropertyFailed, StructuredLog};
use crate::properties::{dispatch, property_do, PropertyAction, PropertyResult};

/// Turns a property status into the command outcome, with an OSD message
/// for unknown properties and failed writes. Unavailable fails silently.
pub(super) fn show_property_status(ctx: &mut ExecutionContext, core: &mut Core, name: &str, result: PropertyResult) {
    let Err(err) = result else {
        return;
    };
    PropertyFailed {
        property: name,
        status: err.status(),
    }
    .log();
    let osd = ctx.invocation.flags.osd != OsdMode::None;
    match &err {
        PropertyError::Unavailable => {}
        PropertyError::Unknown if osd => {
            core.set_osd_msg(1, None, format!("Unknown property: '{}'", name));
        }
        _ if osd => {
            core.set_osd_msg(1, None, format!("Failed to set property '{}'", name));
        }
        _ => {}
    }
    ctx.fail(CommandError::from_property(name, &err));
}

fn show_property_value(ctx: &ExecutionContext, core: &mut Core, name: &str) {
    if !matches!(ctx.invocation.flags.osd, OsdMode::Msg | OsdMode::MsgBar) {
        return;
    }
    if let Ok(text) = dispatch(core, name, &PropertyAction::Print).and_then(|r| r.into_text()) {
        core.set_osd_msg(1, None, format!("{}: {}", name, text));
    }
}

/// Runs a set-like action and reports its status. Returns whether it worked.
pub(super) fn change_property(ctx: &mut ExecutionContext, core: &mut Core, name: &str, action: PropertyAction) -> bool {
    let result = property_do(core, name, &action);
    let ok = result.is_ok();
    if ok {
        show_property_value(ctx, core, name);
    }
    show_property_status(ctx, core, name, result);
    ok
}

fn property_type(core: &mut Core, name: &str) -> Option<OptionType> {
    dispatch(core, name, &PropertyAction::GetType)
        .and_then(|r| r.into_type())
        .ok()
}

// Flags and choices would flicker under a held key.
fn property_autorepeats(core: &mut Core, name: &str) -> bool {
    property_type(core, name).map_or(true, |ty| !matches!(ty.kind, ValueKind::Flag | ValueKind::Choice))
}

fn property_scalable(core: &mut Core, name: &str) -> bool {
    property_type(core, name).map_or(true, |ty| ty.kind.is_scalable())
}

pub fn cmd_set(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let name = ctx.str_arg(0).to_string();
    let value = ctx.str_arg(1).to_string();
    change_property(ctx, core, &name, PropertyAction::SetString(value));
}

fn cycle_step(text: &str) -> Result<f64, CommandError> {
    match text {
        "up" => Ok(1.0),
        "down" => Ok(-1.0),
        other => other
            .trim()
            .parse()
            .map_err(|_| CommandError::invalid(format!("invalid cycle direction '{}'", other))),
    }
}

fn add_cycle(ctx: &mut ExecutionContext, core: &mut Core, inc: f64, wrap: bool) {
    let name = ctx.str_arg(0).to_string();
    let inv = &ctx.invocation;
    if inv.repeated && !inv.flags.repeatable && !property_autorepeats(core, &name) {
        debug!(command = %inv.original, "Dropping command from auto-repeated key");
        return;
    }

    let (scale, units) = if property_scalable(core, &name) {
        (inv.scale, 1)
    } else {
        (1.0, inv.scale_units)
    };
    for _ in 0..units {
        let action = PropertyAction::Switch { inc: inc * scale, wrap };
        if !change_property(ctx, core, &name, action) {
            return;
        }
    }
}

pub fn cmd_add(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let inc = ctx.f64_arg(1);
    add_cycle(ctx, core, inc, false);
}

pub fn cmd_cycle(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    match cycle_step(ctx.str_arg(1)) {
        Ok(inc) => add_cycle(ctx, core, inc, true),
        Err(e) => ctx.fail(e),
    }
}

pub fn cmd_multiply(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let name = ctx.str_arg(0).to_string();
    let factor = ctx.f64_arg(1);
    change_property(ctx, core, &name, PropertyAction::Multiply(factor));
}

pub fn cmd_cycle_values(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let mut values = ctx.rest(0);
    let reverse = values.first().is_some_and(|v| v == "!reverse");
    if reverse {
        values.remove(0);
    }
    if values.is_empty() {
        ctx.fail(CommandError::invalid("cycle-values needs a property name"));
        return;
    }
    let name = values.remove(0);
    if values.is_empty() {
        error!(property = %name, "cycle-values command does not have any value arguments");
        ctx.fail(CommandError::invalid("cycle-values command does not have any value arguments"));
        return;
    }

    let ty = match dispatch(core, &name, &PropertyAction::GetType).and_then(|r| r.into_type()) {
        Ok(ty) => ty,
        Err(e) => return show_property_status(ctx, core, &name, Err(e)),
    };
    let current = match dispatch(core, &name, &PropertyAction::Get).and_then(|r| r.into_value()) {
        Ok(value) => ty.print(&value),
        Err(e) => return show_property_status(ctx, core, &name, Err(e)),
    };

    // Compare printed forms so that "1" matches 1.000000.
    let found = values
        .iter()
        .position(|v| ty.parse(v).is_ok_and(|parsed| ty.print(&parsed) == current));
    let len = values.len() as i64;
    let step = if reverse { -1 } else { 1 };
    let next = match found {
        Some(index) => (index as i64 + step).rem_euclid(len),
        None => {
            debug!(property = %name, "Current value not found. Picking default.");
            if reverse {
                len - 1
            } else {
                0
            }
        }
    };
    let value = values.swap_remove(next as usize);
    change_property(ctx, core, &name, PropertyAction::SetString(value));
}

fn split_items(ty: &OptionType, text: &str) -> Vec<String> {
    match ty.parse(text) {
        Ok(OptionValue::StringList(items)) => items,
        _ => vec![text.to_string()],
    }
}

pub fn cmd_change_list(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let name = ctx.str_arg(0).to_string();
    let op = ctx.str_arg(1).to_string();
    let value = ctx.str_arg(2).to_string();

    let Some(entry) = core.options.resolve(&name) else {
        core.set_osd_msg(1, None, format!("Unknown option: '{}'", name));
        ctx.fail(CommandError::Unknown {
            what: "option",
            name,
        });
        return;
    };
    let ty = entry.ty.clone();
    let mut list: Vec<String> = entry.value.as_list().map(<[String]>::to_vec).unwrap_or_default();

    let known = ty.kind == ValueKind::StringList;
    match op.as_str() {
        _ if !known => {}
        "set" => list = split_items(&ty, &value),
        "append" => list.push(value.clone()),
        "add" => list.extend(split_items(&ty, &value)),
        "pre" => {
            let mut items = split_items(&ty, &value);
            items.extend(list);
            list = items;
        }
        "clr" => list.clear(),
        "remove" => list.retain(|item| *item != value),
        "toggle" => match list.iter().position(|item| *item == value) {
            Some(index) => {
                list.remove(index);
            }
            None => list.push(value.clone()),
        },
        _ => {
            core.set_osd_msg(1, None, format!("Unknown action: '{}'", op));
            ctx.fail(CommandError::invalid(format!("unknown list action '{}'", op)));
            return;
        }
    }
    if !known {
        core.set_osd_msg(1, None, format!("Unknown action: '{}'", op));
        ctx.fail(CommandError::invalid(format!("option '{}' is not a list", name)));
        return;
    }

    if let Err(e) = core.on_set_option(&name, OptionValue::StringList(list), SetFlags::RUNTIME) {
        core.set_osd_msg(1, None, format!("Failed setting option: '{}'", name));
        ctx.fail(CommandError::failed(e.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::Invocation;
    use crate::config::OptionValue;
    use crate::engine::testing;

    #[test]
    fn test_set_add_multiply() {
        let lock = testing::lock(testing::core());
        let mut core = lock.lock();
        assert!(testing::run(&mut core, "set volume 50").success);
        assert!(testing::run(&mut core, "add volume -5").success);
        assert!(testing::run(&mut core, "multiply volume 2").success);
        assert_eq!(core.options.get_f64("volume"), Some(90.0));
    }

    #[test]
    fn test_status_messages() {
        let lock = testing::lock(testing::core());
        let mut core = lock.lock();

        let outcome = testing::run(&mut core, "set bogus 1");
        assert!(!outcome.success);
        assert_eq!(core.player.osd.take().map(|o| o.text), Some("Unknown property: 'bogus'".into()));

        let outcome = testing::run(&mut core, "set volume loud");
        assert!(!outcome.success);
        assert_eq!(core.player.osd.take().map(|o| o.text), Some("Failed to set property 'volume'".into()));

        // Nothing is playing, so time-pos is unavailable: fails quietly.
        let outcome = testing::run(&mut core, "add time-pos 5");
        assert!(!outcome.success);
        assert!(core.player.osd.is_none());

        let outcome = testing::run(&mut core, "no-osd set bogus 1");
        assert!(!outcome.success);
        assert!(core.player.osd.is_none());
    }

    #[test]
    fn test_osd_msg_prefix_shows_new_value() {
        let lock = testing::lock(testing::core());
        let mut core = lock.lock();
        testing::run(&mut core, "osd-msg set speed 2");
        assert_eq!(core.player.osd.take().map(|o| o.text), Some("speed: 2.00".into()));
    }

    #[test]
    fn test_cycle_wraps_and_autorepeat_is_filtered() {
        let lock = testing::lock(testing::core());
        let mut core = lock.lock();
        testing::run(&mut core, "cycle pause");
        assert!(core.options.get_flag("pause"));
        testing::run(&mut core, "cycle pause down");
        assert!(!core.options.get_flag("pause"));

        let mut inv = Invocation::parse(&core.commands, "cycle pause").unwrap();
        inv.repeated = true;
        let outcome = testing::run_invocation(&mut core, inv);
        assert!(outcome.success);
        assert!(!core.options.get_flag("pause"));

        let mut inv = Invocation::parse(&core.commands, "repeatable cycle pause").unwrap();
        inv.repeated = true;
        testing::run_invocation(&mut core, inv);
        assert!(core.options.get_flag("pause"));
    }

    #[test]
    fn test_cycle_choice_with_huge_step() {
        let lock = testing::lock(testing::core());
        let mut core = lock.lock();
        assert!(testing::run(&mut core, "set replaygain track").success);
        assert!(testing::run(&mut core, "cycle replaygain 1e19").success);
        assert_eq!(core.options.get("replaygain"), Some(&OptionValue::Choice("album".into())));
    }

    #[test]
    fn test_scale_applies_to_floating_properties() {
        let lock = testing::lock(testing::core());
        let mut core = lock.lock();
        let inv = Invocation::parse(&core.commands, "add volume 2").unwrap().with_scale(2.5, 3);
        testing::run_invocation(&mut core, inv);
        assert_eq!(core.options.get_f64("volume"), Some(105.0));

        // Integer options repeat the step once per unit instead.
        let inv = Invocation::parse(&core.commands, "add osd-level 1").unwrap().with_scale(2.5, 2);
        testing::run_invocation(&mut core, inv);
        assert_eq!(core.options.get("osd-level"), Some(&OptionValue::Int(3)));
    }

    #[test]
    fn test_cycle_values() {
        let lock = testing::lock(testing::core());
        let mut core = lock.lock();
        let cmd = "cycle-values speed 1 1.5 2";
        testing::run(&mut core, cmd);
        assert_eq!(core.options.get_f64("speed"), Some(1.5));
        testing::run(&mut core, cmd);
        testing::run(&mut core, cmd);
        assert_eq!(core.options.get_f64("speed"), Some(1.0));

        testing::run(&mut core, "cycle-values !reverse speed 1 1.5 2");
        assert_eq!(core.options.get_f64("speed"), Some(2.0));

        assert!(!testing::run(&mut core, "cycle-values speed").success);
        assert!(!testing::run(&mut core, "cycle-values !reverse speed").success);
    }

    #[test]
    fn test_change_list_operations() {
        let lock = testing::lock(testing::core());
        let mut core = lock.lock();
        let list = |core: &crate::engine::Core| core.options.get("display-tags").and_then(OptionValue::as_list).map(<[String]>::to_vec);

        testing::run(&mut core, "change-list display-tags set Artist,Title");
        testing::run(&mut core, "change-list display-tags append Album");
        testing::run(&mut core, "change-list display-tags pre Genre");
        assert_eq!(list(&*core), Some(vec!["Genre".into(), "Artist".into(), "Title".into(), "Album".into()]));

        testing::run(&mut core, "change-list display-tags remove Title");
        testing::run(&mut core, "change-list display-tags toggle Artist");
        testing::run(&mut core, "change-list display-tags toggle Year");
        assert_eq!(list(&*core), Some(vec!["Genre".into(), "Album".into(), "Year".into()]));

        testing::run(&mut core, "change-list display-tags clr \"\"");
        assert_eq!(list(&*core), Some(Vec::new()));

        assert!(!testing::run(&mut core, "change-list display-tags explode x").success);
        assert!(!testing::run(&mut core, "change-list volume append 1").success);
        assert!(!testing::run(&mut core, "change-list nothing append 1").success);
    }
}
