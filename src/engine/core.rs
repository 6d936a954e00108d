// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The shared core state and the single lock guarding it.
//!
//! Everything a property accessor or command handler may touch lives in
//! [`Core`]. It is constructed once per engine and only ever reached through
//! [`CoreLock`], so every mutation happens with the lock held.

use parking_lot::{Mutex, MutexGuard};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use crate::commands::{CommandTable, OpId};
use crate::config::{OptionStore, OptionValue, SetFlags};
use crate::engine::{AbortRegistry, PendingOps, WorkerPool};
use crate::errors::{HookError, OptionError};
use crate::events::{ClientEvent, EventKind, NotificationRouter};
use crate::hooks::{HookProgress, HookRegistry};
use crate::player::{MediaInfo, OsdMessage, PlayerState, SeekKind, SeekPrecision, SeekRequest, StopPlay};
use crate::properties::{builtin_properties, PropertyRegistry};
use crate::traits::{ClientBus, MediaBackend, Scheduler, SubprocessRunner};

pub type CoreLock = Mutex<Core>;
pub type CoreGuard<'a> = MutexGuard<'a, Core>;

/// External collaborators reached from inside the core.
#[derive(Clone)]
pub struct Services {
    pub clients: Arc<dyn ClientBus>,
    pub scheduler: Arc<dyn Scheduler>,
    pub subprocess: Arc<dyn SubprocessRunner>,
    pub media: Arc<dyn MediaBackend>,
}

pub struct Core {
    pub properties: Arc<PropertyRegistry>,
    pub commands: Arc<CommandTable>,
    pub options: OptionStore,
    pub player: PlayerState,
    pub hooks: HookRegistry,
    pub aborts: AbortRegistry,
    pub pending: PendingOps,
    /// Worker-pool commands waiting for a worker.
    pub queued: PendingOps,
    pub router: NotificationRouter,
    pub services: Services,
    pub(crate) pool: Option<WorkerPool>,
    /// Worker jobs queued or running. Shutdown waits for zero.
    pub outstanding_jobs: usize,
    pub shutting_down: bool,
    pub is_idle: bool,
    pub last_seek: Option<Instant>,
    pub last_seek_pts: Option<f64>,
    pub marked_pts: Option<f64>,
    pub warned_deprecated: HashSet<String>,
    /// Provenance used by option-backed accessors while
    /// [`Core::on_set_option`] routes a write through them.
    pub(crate) option_write_flags: Option<SetFlags>,
    next_op: u64,
}

impl Core {
    pub fn new(options: OptionStore, commands: Arc<CommandTable>, services: Services) -> Self {
        let properties = Arc::new(PropertyRegistry::build(builtin_properties(), &options));
        Self {
            properties,
            commands,
            options,
            player: PlayerState::default(),
            hooks: HookRegistry::new(),
            aborts: AbortRegistry::new(),
            pending: PendingOps::default(),
            queued: PendingOps::default(),
            router: NotificationRouter::default(),
            services,
            pool: None,
            outstanding_jobs: 0,
            shutting_down: false,
            is_idle: false,
            last_seek: None,
            last_seek_pts: None,
            marked_pts: None,
            warned_deprecated: HashSet::new(),
            option_write_flags: None,
            next_op: 0,
        }
    }

    pub fn wake(&self) {
        self.services.scheduler.wake();
    }

    pub(crate) fn next_op_id(&mut self) -> OpId {
        self.next_op += 1;
        OpId(self.next_op)
    }

    pub(crate) fn worker_pool(&self) -> Option<&WorkerPool> {
        self.pool.as_ref()
    }

    /// Broadcasts a lifecycle event and invalidates the properties it maps to.
    pub fn notify(&mut self, kind: EventKind, payload: Option<Value>) {
        self.command_event(kind);
        self.services
            .clients
            .broadcast(&ClientEvent::Lifecycle { kind, payload });
        self.router.on_event(kind, self.services.clients.as_ref());
    }

    /// Tells observers of `name` that it may have changed.
    pub fn notify_property(&mut self, name: &str) {
        let id = self.properties.id_of(name);
        self.router.on_property(name, id, self.services.clients.as_ref());
    }

    fn command_event(&mut self, kind: EventKind) {
        match kind {
            EventKind::StartFile => {
                self.last_seek = None;
                self.last_seek_pts = None;
                self.marked_pts = None;
                self.is_idle = false;
            }
            EventKind::Idle => self.is_idle = true,
            _ => {}
        }
    }

    /// Queues a seek for the playback loop. Relative seeks issued before the
    /// previous one was executed accumulate.
    pub fn queue_seek(&mut self, kind: SeekKind, amount: f64, precision: SeekPrecision) {
        let amount = match (&self.player.pending_seek, kind) {
            (Some(prev), SeekKind::Relative) if prev.kind == SeekKind::Relative => prev.amount + amount,
            _ => amount,
        };
        self.player.pending_seek = Some(SeekRequest {
            kind,
            amount,
            precision,
        });
        self.wake();
    }

    /// Stops the current file and switches to playlist entry `index`.
    pub fn request_entry(&mut self, index: usize) {
        self.player.next_entry = Some(index);
        self.request_stop(StopPlay::CurrentEntry);
    }

    pub fn request_stop(&mut self, reason: StopPlay) {
        self.player.stop_play = reason;
        self.aborts.abort_playback();
        self.wake();
    }

    pub fn playback_stopping(&self) -> bool {
        self.player.stop_play != StopPlay::KeepPlaying
    }

    /// Shows `text` on the OSD if `level` is within the configured OSD level.
    pub fn set_osd_msg(&mut self, level: i64, duration_ms: Option<u64>, text: impl Into<String>) -> bool {
        let osd_level = self.options.get("osd-level").and_then(OptionValue::as_int).unwrap_or(1);
        if level > osd_level {
            return false;
        }
        let default_ms = self
            .options
            .get("osd-duration")
            .and_then(OptionValue::as_int)
            .unwrap_or(0)
            .max(0) as u64;
        self.player.osd = Some(OsdMessage {
            text: text.into(),
            duration_ms: duration_ms.unwrap_or(default_ms),
            level,
        });
        self.wake();
        true
    }

    // -- playback lifecycle, driven by the host pipeline ------------------

    /// Makes playlist entry `index` current and announces the new file.
    pub fn start_file(&mut self, index: usize) -> bool {
        if index >= self.player.playlist.len() {
            return false;
        }
        self.player.playlist.set_current(Some(index));
        self.player.stop_play = StopPlay::KeepPlaying;
        self.player.next_entry = None;
        let params = self
            .player
            .playlist
            .current()
            .map(|e| e.params.clone())
            .unwrap_or_default();
        for (name, text) in params {
            if let Err(e) = self.apply_file_option(&name, &text) {
                warn!(option = %name, error = %e, "Ignoring invalid per-file option");
            }
        }
        self.notify(EventKind::StartFile, None);
        true
    }

    // Per-file values go straight to the store with a backup so the file
    // end can restore them.
    fn apply_file_option(&mut self, name: &str, text: &str) -> Result<(), OptionError> {
        let entry = self
            .options
            .resolve(name)
            .ok_or_else(|| OptionError::Unknown(name.to_string()))?;
        let value = entry.ty.parse(text)?;
        self.write_option(name, value, SetFlags::BACKUP)?;
        self.notify_property(name);
        Ok(())
    }

    pub fn file_loaded(&mut self, info: MediaInfo) {
        self.player.open(info);
        self.notify(EventKind::FileLoaded, None);
    }

    /// Tears the current file down: coupled work is aborted and file-local
    /// options are restored.
    pub fn end_file(&mut self) {
        self.aborts.abort_playback();
        for (name, value) in self.options.take_backups() {
            if let Err(e) = self.on_set_option(&name, value, SetFlags::NONE) {
                warn!(option = %name, error = %e, "Failed to restore file-local option");
            }
        }
        self.player.close();
        self.notify(EventKind::EndFile, None);
    }

    /// Resolves a pending stop request into the next playlist index, ending
    /// the current file on the way. Enters idle when nothing is left.
    pub fn advance_playlist(&mut self) -> Option<usize> {
        let reason = self.player.stop_play;
        if reason == StopPlay::KeepPlaying {
            return None;
        }
        if self.player.playlist.current().is_some() || self.player.playback_initialized {
            self.end_file();
        }
        let next = match reason {
            StopPlay::CurrentEntry => self.player.next_entry.take(),
            StopPlay::NextEntry | StopPlay::AtEndOfFile => self.player.playlist.neighbour(1),
            StopPlay::KeepPlaying | StopPlay::Stop | StopPlay::Quit => None,
        };
        match next {
            Some(index) if self.start_file(index) => Some(index),
            _ => {
                self.player.playlist.set_current(None);
                if reason != StopPlay::Quit {
                    self.player.stop_play = StopPlay::KeepPlaying;
                    self.notify(EventKind::Idle, None);
                }
                None
            }
        }
    }

    // -- hooks -------------------------------------------------------------

    pub fn hook_add(&mut self, client: &str, hook: &str, user_id: u64, priority: i32, legacy: bool) -> i64 {
        self.hooks.add(client, hook, user_id, priority, legacy)
    }

    /// Runs the handlers of `hook`. The scheduler is woken once none is left.
    pub fn hook_start(&mut self, hook: &str) -> HookProgress {
        let progress = self.hooks.start(hook, self.services.clients.as_ref());
        if progress == HookProgress::Finished {
            self.wake();
        }
        progress
    }

    pub fn hook_ack(&mut self, client: &str, seq: i64) -> Result<HookProgress, HookError> {
        let progress = self.hooks.ack(client, seq, self.services.clients.as_ref())?;
        if progress == HookProgress::Finished {
            self.wake();
        }
        Ok(progress)
    }

    pub fn hook_drained(&mut self, hook: &str) -> bool {
        self.hooks.is_drained(hook, self.services.clients.as_ref())
    }

    /// Forgets everything owned by a disconnected client.
    pub fn client_gone(&mut self, client: &str) {
        self.aborts.cancel_client_work(client, None);
        self.router.drop_client(client);
        if self.hooks.remove_client(client) > 0 {
            self.wake();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing;
    use crate::player::Tags;

    #[test]
    fn test_relative_seeks_accumulate() {
        let mut core = testing::core();
        core.queue_seek(SeekKind::Relative, 5.0, SeekPrecision::Default);
        core.queue_seek(SeekKind::Relative, -2.0, SeekPrecision::Exact);
        let seek = core.player.pending_seek.unwrap();
        assert_eq!((seek.kind, seek.amount, seek.precision), (SeekKind::Relative, 3.0, SeekPrecision::Exact));

        core.queue_seek(SeekKind::Absolute, 10.0, SeekPrecision::Default);
        core.queue_seek(SeekKind::Relative, 1.0, SeekPrecision::Default);
        assert_eq!(core.player.pending_seek.unwrap().amount, 1.0);
    }

    #[test]
    fn test_start_file_resets_seek_marks_and_idle() {
        let mut core = testing::core();
        core.player.playlist.add("/media/a.mkv", Vec::new());
        core.marked_pts = Some(3.0);
        core.notify(EventKind::Idle, None);
        assert!(core.is_idle);

        assert!(core.start_file(0));
        assert_eq!(core.marked_pts, None);
        assert!(!core.is_idle);
        assert!(!core.start_file(4));
    }

    #[test]
    fn test_per_file_options_are_restored_at_end() {
        let mut core = testing::core();
        core.player
            .playlist
            .add("/media/a.mkv", vec![("speed".into(), "1.5".into())]);
        core.start_file(0);
        assert_eq!(core.options.get_f64("speed"), Some(1.5));
        assert!(core.options.has_backup("speed"));

        core.end_file();
        assert_eq!(core.options.get_f64("speed"), Some(1.0));
        assert!(!core.options.has_backup("speed"));
    }

    #[test]
    fn test_advance_playlist_follows_stop_reason() {
        let mut core = testing::core();
        for name in ["/a.mkv", "/b.mkv", "/c.mkv"] {
            core.player.playlist.add(name, Vec::new());
        }
        core.start_file(0);
        assert_eq!(core.advance_playlist(), None);

        core.request_stop(StopPlay::NextEntry);
        assert_eq!(core.advance_playlist(), Some(1));

        core.request_entry(0);
        assert_eq!(core.advance_playlist(), Some(0));

        core.request_stop(StopPlay::Stop);
        assert_eq!(core.advance_playlist(), None);
        assert!(core.is_idle);
        assert_eq!(core.player.playlist.current_index(), None);
    }

    #[test]
    fn test_osd_respects_level() {
        let mut core = testing::core();
        assert!(core.set_osd_msg(1, None, "hello"));
        assert_eq!(core.player.osd.as_ref().map(|o| o.duration_ms), Some(1000));
        assert!(!core.set_osd_msg(3, Some(10), "verbose"));
        assert_eq!(core.player.osd.as_ref().map(|o| o.text.as_str()), Some("hello"));
    }

    #[test]
    fn test_file_loaded_opens_media() {
        let mut core = testing::core();
        core.player.playlist.add("/a.mkv", Vec::new());
        core.start_file(0);
        core.file_loaded(MediaInfo {
            duration: Some(10.0),
            chapters: vec![crate::player::Chapter {
                title: "x".into(),
                time: 0.0,
                metadata: Tags::new(),
            }],
            ..Default::default()
        });
        assert!(core.player.playback_initialized);
        assert_eq!(core.player.duration, Some(10.0));
    }
}
