// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context, Result};
use std::env;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use playcore::config::{load_config, EngineConfig};
use playcore::engine::{Engine, EngineBuilder};
use playcore::events::{ClientEvent, ClientHandle};
use playcore::observability::init_tracing;

const CLIENT_NAME: &str = "cli";

fn usage(program: &str) -> String {
    format!(
        "Usage: {0} [--config <file.yaml|file.toml>] [command ...]\n\
         Each argument is one command line; without any, lines are read from stdin.\n\
         Example: {0} 'set volume 50' 'print-text ${{volume}}'",
        program
    )
}

struct Args {
    config: Option<String>,
    commands: Vec<String>,
}

fn parse_args() -> Result<Args> {
    let mut raw = env::args();
    let program = raw.next().unwrap_or_else(|| "playcore".into());
    let mut args = Args {
        config: None,
        commands: Vec::new(),
    };
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "-c" | "--config" => match raw.next() {
                Some(path) => args.config = Some(path),
                None => bail!("--config needs a file\n{}", usage(&program)),
            },
            "-h" | "--help" => {
                println!("{}", usage(&program));
                std::process::exit(0);
            }
            _ => args.commands.push(arg),
        }
    }
    Ok(args)
}

/// Prints what the engine sent to this client since the last call.
fn print_events(client: &mut ClientHandle) {
    for envelope in client.drain() {
        match envelope.event {
            ClientEvent::ClientMessage { args } => println!("message: {}", args.join(" ")),
            ClientEvent::Lifecycle { kind, payload: Some(payload) } => println!("event: {:?} {}", kind, payload),
            ClientEvent::Lifecycle { kind, payload: None } => println!("event: {:?}", kind),
            ClientEvent::Hook { name, id } => println!("hook: {} ({})", name, id),
            ClientEvent::PropertyChange { name } => println!("changed: {}", name),
        }
    }
}

async fn run_line(engine: &Engine, client: &mut ClientHandle, line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return true;
    }
    let outcome = engine.command(line).await;
    print_events(client);
    match (&outcome.error, &outcome.result) {
        (Some(e), _) => eprintln!("error: {}: {}", line, e),
        (None, serde_json::Value::Null) => println!("ok"),
        (None, result) => println!("{}", result),
    }
    outcome.success
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => load_config(path).with_context(|| format!("failed to load {}", path))?,
        None => EngineConfig::default(),
    };
    let engine = Arc::new(
        EngineBuilder::from_config(config)
            .build()
            .context("failed to start the engine")?,
    );
    let mut client = engine.connect(CLIENT_NAME);

    let mut failures = 0usize;
    if args.commands.is_empty() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
            if !run_line(&engine, &mut client, &line).await {
                failures += 1;
            }
        }
    } else {
        for line in &args.commands {
            if !run_line(&engine, &mut client, line).await {
                failures += 1;
            }
        }
    }

    // Shutdown blocks while workers drain.
    let drained = tokio::task::spawn_blocking({
        let engine = Arc::clone(&engine);
        move || engine.shutdown()
    })
    .await
    .context("shutdown task panicked")?;
    if !drained {
        eprintln!("warning: worker jobs were still running at exit");
    }
    if failures > 0 {
        bail!("{} command(s) failed", failures);
    }
    Ok(())
}
