// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Commands addressed to external clients: key bindings, script messages,
//! the hook protocol, and profile application.

use tracing::warn;

use crate::commands::ExecutionContext;
use crate::config::SetFlags;
use crate::engine::CoreGuard;
use crate::errors::{CommandError, HookError};
use crate::events::ClientEvent;

/// Delivers `args` to `target`, or to every client when there is none.
fn deliver(ctx: &mut ExecutionContext, core: &CoreGuard<'_>, target: Option<&str>, args: Vec<String>) {
    let event = ClientEvent::ClientMessage { args };
    match target {
        Some(client) => {
            if let Err(e) = core.services.clients.send(client, 0, event) {
                ctx.fail(CommandError::failed(e.to_string()));
            }
        }
        None => core.services.clients.broadcast(&event),
    }
}

/// Two-character key state: `p` for a plain press, otherwise `d`/`u`/`r`
/// for down, up and repeat of a key tracked as up/down.
fn key_state(ctx: &ExecutionContext) -> String {
    let inv = &ctx.invocation;
    let state = if !inv.is_up_down {
        'p'
    } else if inv.repeated {
        'r'
    } else if inv.is_up {
        'u'
    } else {
        'd'
    };
    format!("{}-", state)
}

pub fn cmd_script_binding(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let full = ctx.str_arg(0).to_string();
    let (target, name) = match full.split_once('/') {
        Some((target, name)) => (Some(target.to_string()), name.to_string()),
        None => (None, full.clone()),
    };
    if name.is_empty() {
        return ctx.fail(CommandError::invalid("empty binding name"));
    }
    let args = vec![
        "key-binding".to_string(),
        name,
        key_state(ctx),
        ctx.invocation.key_name.clone().unwrap_or_default(),
    ];
    deliver(ctx, core, target.as_deref(), args);
}

pub fn cmd_script_message(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let args = ctx.rest(0);
    deliver(ctx, core, None, args);
}

pub fn cmd_script_message_to(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let mut args = ctx.rest(0);
    let target = args.remove(0);
    deliver(ctx, core, Some(&target), args);
}

fn hook_misuse(e: HookError) -> CommandError {
    CommandError::ProtocolMisuse(e.to_string())
}

pub fn cmd_hook_add(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let Some(client) = ctx.sender().map(str::to_string) else {
        return ctx.fail(hook_misuse(HookError::NoSender));
    };
    let hook = ctx.str_arg(0).to_string();
    let user_id = u64::try_from(ctx.int_arg(1)).unwrap_or_default();
    let priority = i32::try_from(ctx.int_arg(2)).unwrap_or_default();
    core.hook_add(&client, &hook, user_id, priority, true);
}

pub fn cmd_hook_ack(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let Some(client) = ctx.sender().map(str::to_string) else {
        return ctx.fail(hook_misuse(HookError::NoSender));
    };
    if let Err(e) = core.hook_ack(&client, ctx.int_arg(0)) {
        ctx.fail(hook_misuse(e));
    }
}

pub fn cmd_apply_profile(ctx: &mut ExecutionContext, core: &mut CoreGuard<'_>) {
    let name = ctx.str_arg(0).to_string();
    let Some(profile) = core.options.profile(&name).cloned() else {
        return ctx.fail(CommandError::failed(format!("unknown profile '{}'", name)));
    };
    for (option, value) in &profile.options {
        if let Err(e) = core.on_set_option_string(option, value, SetFlags::RUNTIME) {
            warn!(profile = %name, option = %option, error = %e, "Profile option rejected");
            ctx.fail(CommandError::failed(format!("profile '{}': {}", name, e)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Invocation;
    use crate::config::Profile;
    use crate::engine::testing;
    use crate::hooks::HookProgress;
    use std::collections::BTreeMap;

    fn messages(client: &mut crate::events::ClientHandle) -> Vec<Vec<String>> {
        client
            .drain()
            .into_iter()
            .filter_map(|e| match e.event {
                ClientEvent::ClientMessage { args } => Some(args),
                _ => None,
            })
            .collect()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_script_binding_states() {
        let (core, hub) = testing::core_with_hub();
        let mut ui = hub.connect("ui");
        let mut other = hub.connect("other");
        let lock = testing::lock(core);
        let mut core = lock.lock();

        assert!(testing::run(&mut core, "script-binding ui/menu").success);
        assert_eq!(messages(&mut ui), vec![strings(&["key-binding", "menu", "p-", ""])]);
        assert!(messages(&mut other).is_empty());

        let mut inv = Invocation::parse(&core.commands, "script-binding toggle").unwrap();
        inv.is_up_down = true;
        inv.key_name = Some("x".into());
        testing::run_invocation(&mut core, inv.clone());
        inv.is_up = true;
        testing::run_invocation(&mut core, inv);
        assert_eq!(
            messages(&mut other),
            vec![
                strings(&["key-binding", "toggle", "d-", "x"]),
                strings(&["key-binding", "toggle", "u-", "x"]),
            ]
        );

        assert!(!testing::run(&mut core, "script-binding nobody/menu").success);
        assert!(!testing::run(&mut core, "script-binding ui/").success);
    }

    #[test]
    fn test_script_messages() {
        let (core, hub) = testing::core_with_hub();
        let mut a = hub.connect("a");
        let mut b = hub.connect("b");
        let lock = testing::lock(core);
        let mut core = lock.lock();

        testing::run(&mut core, "script-message ping 1");
        assert_eq!(messages(&mut a), vec![strings(&["ping", "1"])]);
        assert_eq!(messages(&mut b), vec![strings(&["ping", "1"])]);

        assert!(testing::run(&mut core, "script-message-to b pong").success);
        assert!(messages(&mut a).is_empty());
        assert_eq!(messages(&mut b), vec![strings(&["pong"])]);

        let outcome = testing::run(&mut core, "script-message-to c pong");
        assert!(!outcome.success);
    }

    #[test]
    fn test_hook_commands_need_a_client() {
        let (core, hub) = testing::core_with_hub();
        let mut script = hub.connect("script");
        let lock = testing::lock(core);
        let mut core = lock.lock();

        let outcome = testing::run(&mut core, "hook-add on_load 7 0");
        assert!(matches!(outcome.error, Some(CommandError::ProtocolMisuse(_))));

        let inv = Invocation::parse(&core.commands, "hook-add on_load 7 0")
            .unwrap()
            .with_sender("script");
        assert!(testing::run_invocation(&mut core, inv).success);
        assert_eq!(core.hooks.handlers().len(), 1);

        let seq = core.hooks.handlers()[0].seq;
        assert!(matches!(core.hook_start("on_load"), HookProgress::Dispatched { .. }));
        assert!(!script.drain().is_empty());

        let wrong = Invocation::parse(&core.commands, &format!("hook-ack {}", seq + 5))
            .unwrap()
            .with_sender("script");
        assert!(!testing::run_invocation(&mut core, wrong).success);

        let ack = Invocation::parse(&core.commands, &format!("hook-ack {}", seq))
            .unwrap()
            .with_sender("script");
        assert!(testing::run_invocation(&mut core, ack).success);
        assert!(core.hook_drained("on_load"));
    }

    #[test]
    fn test_apply_profile() {
        let lock = testing::lock(testing::core());
        let mut core = lock.lock();
        let mut options = BTreeMap::new();
        options.insert("volume".to_string(), "30".to_string());
        options.insert("mute".to_string(), "yes".to_string());
        core.options.add_profile(
            "quiet",
            Profile {
                description: None,
                options,
            },
        );

        assert!(testing::run(&mut core, "apply-profile quiet").success);
        assert_eq!(core.options.get_f64("volume"), Some(30.0));
        assert!(core.options.get_flag("mute"));
        assert!(!testing::run(&mut core, "apply-profile loud").success);
    }
}
