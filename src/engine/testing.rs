// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test support: cores wired to in-memory collaborators and a loaded file.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio_util::sync::CancellationToken;

use crate::commands::{
    run_command, CommandOutcome, CommandTable, CompletionFn, ExecutionContext, Invocation, OpId,
};
use crate::config::{builtin_option_defs, OptionDef, OptionStore};
use crate::engine::{AbortHandle, Core, CoreGuard, CoreLock, Services, WakeSignal};
use crate::events::ClientHub;
use crate::player::{
    AudioDevice, AudioOutput, Chapter, DemuxerInfo, MediaInfo, Tags, Track, TrackKind,
};
use crate::traits::{MediaBackend, SubprocessOutcome, SubprocessRequest, SubprocessRunner};

/// Remembers whether the core lock was free while a blocking call ran.
#[derive(Default)]
struct LockProbe {
    core: Mutex<Weak<CoreLock>>,
    unlocked: AtomicBool,
}

impl LockProbe {
    fn attach(&self, core: &Arc<CoreLock>) {
        *self.core.lock() = Arc::downgrade(core);
    }

    fn check(&self) {
        if let Some(core) = self.core.lock().upgrade() {
            self.unlocked.store(core.try_lock().is_some(), Ordering::SeqCst);
        }
    }
}

#[derive(Default)]
pub struct StubRunner {
    pub outcome: Mutex<SubprocessOutcome>,
    pub requests: Mutex<Vec<SubprocessRequest>>,
    pub detached: Mutex<Vec<Vec<String>>>,
    probe: LockProbe,
}

impl StubRunner {
    pub fn probe(&self, core: &Arc<CoreLock>) {
        self.probe.attach(core);
    }

    pub fn ran_unlocked(&self) -> bool {
        self.probe.unlocked.load(Ordering::SeqCst)
    }
}

impl SubprocessRunner for StubRunner {
    fn run(&self, request: &SubprocessRequest, cancel: &CancellationToken) -> SubprocessOutcome {
        self.probe.check();
        self.requests.lock().push(request.clone());
        if cancel.is_cancelled() {
            return SubprocessOutcome {
                status: -1,
                killed_by_us: true,
                error: Some("killed".into()),
                ..Default::default()
            };
        }
        self.outcome.lock().clone()
    }

    fn spawn_detached(&self, args: &[String]) -> Result<(), String> {
        self.detached.lock().push(args.to_vec());
        Ok(())
    }
}

/// Opens any url except those containing `missing`.
#[derive(Default)]
pub struct StubMedia {
    pub opened: Mutex<Vec<String>>,
    pub filter_commands: Mutex<Vec<(String, String, String)>>,
    probe: LockProbe,
}

impl StubMedia {
    pub fn probe(&self, core: &Arc<CoreLock>) {
        self.probe.attach(core);
    }

    pub fn ran_unlocked(&self) -> bool {
        self.probe.unlocked.load(Ordering::SeqCst)
    }
}

impl MediaBackend for StubMedia {
    fn open_track(&self, url: &str, kind: TrackKind, _: &CancellationToken) -> Result<Track, String> {
        self.probe.check();
        self.opened.lock().push(url.to_string());
        if url.contains("missing") {
            return Err("no such file".into());
        }
        Ok(Track {
            codec: Some("vorbis".into()),
            ..Track::new(kind)
        })
    }

    fn filter_command(&self, label: &str, command: &str, argument: &str) -> Result<(), String> {
        self.filter_commands
            .lock()
            .push((label.to_string(), command.to_string(), argument.to_string()));
        Ok(())
    }
}

pub struct Stubs {
    pub hub: Arc<ClientHub>,
    pub runner: Arc<StubRunner>,
    pub media: Arc<StubMedia>,
    pub wake: Arc<WakeSignal>,
}

pub fn stubs() -> Stubs {
    Stubs {
        hub: Arc::new(ClientHub::new()),
        runner: Arc::new(StubRunner::default()),
        media: Arc::new(StubMedia::default()),
        wake: Arc::new(WakeSignal::new()),
    }
}

impl Stubs {
    pub fn services(&self) -> Services {
        Services {
            clients: self.hub.clone(),
            scheduler: self.wake.clone(),
            subprocess: self.runner.clone(),
            media: self.media.clone(),
        }
    }
}

fn build(extra: Vec<OptionDef>, stubs: &Stubs) -> Core {
    let options = OptionStore::from_defs(builtin_option_defs().into_iter().chain(extra)).unwrap();
    Core::new(options, Arc::new(CommandTable::builtin()), stubs.services())
}

pub fn core() -> Core {
    build(Vec::new(), &stubs())
}

/// Core whose option table has `extra` on top of the builtin options.
pub fn core_with(extra: Vec<OptionDef>) -> Core {
    build(extra, &stubs())
}

pub fn core_with_hub() -> (Core, Arc<ClientHub>) {
    let stubs = stubs();
    (build(Vec::new(), &stubs), stubs.hub)
}

pub fn core_with_stubs() -> (Core, Stubs) {
    let stubs = stubs();
    (build(Vec::new(), &stubs), stubs)
}

pub fn lock(core: Core) -> Arc<CoreLock> {
    Arc::new(Mutex::new(core))
}

/// Loads `/media/movie.mkv`: two minutes long, positioned at 0:30, two audio
/// tracks (the first selected), two chapters and a running audio output.
pub fn playing(core: &mut Core) {
    core.player.playlist.add("/media/movie.mkv", Vec::new());
    let index = core.player.playlist.len() - 1;
    core.start_file(index);

    let main = Track {
        title: Some("Main".into()),
        lang: Some("eng".into()),
        codec: Some("opus".into()),
        default: true,
        selected: true,
        ..Track::new(TrackKind::Audio)
    };
    let dub = Track {
        lang: Some("jpn".into()),
        codec: Some("aac".into()),
        ..Track::new(TrackKind::Audio)
    };
    core.file_loaded(MediaInfo {
        demuxer: DemuxerInfo {
            file_format: "mkv".into(),
            seekable: true,
            metadata: [("title", "Demo Movie"), ("artist", "Someone")].into_iter().collect(),
            file_size: Some(2 * 1024 * 1024),
            ..Default::default()
        },
        duration: Some(120.0),
        start_time: 0.0,
        tracks: vec![main, dub],
        chapters: vec![
            Chapter {
                title: "Opening".into(),
                time: 0.0,
                metadata: [("title", "Opening")].into_iter().collect::<Tags>(),
            },
            Chapter {
                title: "Main".into(),
                time: 60.0,
                metadata: Tags::new(),
            },
        ],
        media_title: None,
    });

    core.player.audio_out = Some(AudioOutput {
        driver: "pulse".into(),
        device: "default".into(),
        volume: 80.0,
        muted: false,
        samplerate: 48000,
        channels: 2,
        format: "floatp".into(),
        gain: 1.0,
    });
    core.player.audio_devices = vec![
        AudioDevice {
            name: "auto".into(),
            description: "Autoselect device".into(),
        },
        AudioDevice {
            name: "alsa/default".into(),
            description: "Default (ALSA)".into(),
        },
    ];
    core.player.time_pos = Some(30.0);
    core.player.av_difference = Some(0.25);
    core.player.dropped_frames = 3;
}

/// Execution context for calling a handler directly, with an abort handle.
pub fn context(core: &Core, line: &str) -> ExecutionContext {
    let inv = Invocation::parse(&core.commands, line).unwrap();
    let mut ctx = ExecutionContext::new(OpId(1), inv, None);
    ctx.abort = Some(Arc::new(AbortHandle::new()));
    ctx
}

/// Parses and runs `line`. A line that does not parse yields a failed
/// outcome instead of running anything.
pub fn run(core: &mut CoreGuard<'_>, line: &str) -> CommandOutcome {
    match Invocation::parse(&core.commands, line) {
        Ok(inv) => run_invocation(core, inv),
        Err(e) => CommandOutcome {
            id: OpId(0),
            name: line.to_string(),
            success: false,
            result: serde_json::Value::Null,
            error: Some(e),
        },
    }
}

pub fn run_invocation(core: &mut CoreGuard<'_>, inv: Invocation) -> CommandOutcome {
    let slot = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&slot);
    let callback: CompletionFn = Box::new(move |outcome: &CommandOutcome, _: &mut CoreGuard<'_>| {
        *sink.lock() = Some(outcome.clone());
    });
    run_command(core, inv, None, Some(callback));
    let outcome = slot.lock().take();
    outcome.expect("command did not complete inline")
}
