// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use super::{Playlist, Tags};

/// Why (and whether) the current file is being stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopPlay {
    #[default]
    KeepPlaying,
    AtEndOfFile,
    NextEntry,
    CurrentEntry,
    Stop,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Video,
    Audio,
    Sub,
}

impl TrackKind {
    pub fn name(self) -> &'static str {
        match self {
            TrackKind::Video => "video",
            TrackKind::Audio => "audio",
            TrackKind::Sub => "sub",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: i64,
    pub kind: TrackKind,
    pub title: Option<String>,
    pub lang: Option<String>,
    pub codec: Option<String>,
    pub default: bool,
    pub selected: bool,
    pub external_filename: Option<String>,
}

impl Track {
    pub fn new(kind: TrackKind) -> Self {
        Self {
            id: 0,
            kind,
            title: None,
            lang: None,
            codec: None,
            default: false,
            selected: false,
            external_filename: None,
        }
    }

    pub fn is_external(&self) -> bool {
        self.external_filename.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub title: String,
    pub time: f64,
    pub metadata: Tags,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemuxerInfo {
    pub file_format: String,
    pub seekable: bool,
    pub partially_seekable: bool,
    pub is_network: bool,
    pub metadata: Tags,
    pub file_size: Option<i64>,
    /// Cache fill speed in bytes per second.
    pub cache_speed: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioOutput {
    pub driver: String,
    pub device: String,
    /// Hardware/system volume in percent.
    pub volume: f64,
    pub muted: bool,
    pub samplerate: i64,
    pub channels: i64,
    pub format: String,
    /// Software gain applied by the player, derived from the `volume` option.
    pub gain: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioDevice {
    pub name: String,
    pub description: String,
}

/// Everything the host reports when a file finished loading.
#[derive(Debug, Clone, Default)]
pub struct MediaInfo {
    pub demuxer: DemuxerInfo,
    pub duration: Option<f64>,
    pub start_time: f64,
    pub tracks: Vec<Track>,
    pub chapters: Vec<Chapter>,
    pub media_title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekKind {
    Relative,
    Absolute,
    Factor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeekPrecision {
    #[default]
    Default,
    Keyframes,
    Exact,
}

/// Seek queued for the playback loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekRequest {
    pub kind: SeekKind,
    pub amount: f64,
    pub precision: SeekPrecision,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OsdMessage {
    pub text: String,
    pub duration_ms: u64,
    pub level: i64,
}

/// State read through the state-accessor surface.
#[derive(Debug, Default)]
pub struct PlayerState {
    pub playlist: Playlist,
    pub stop_play: StopPlay,
    pub playback_initialized: bool,
    pub restart_complete: bool,
    pub eof_reached: bool,
    pub paused_for_cache: bool,
    pub core_idle: bool,
    pub time_pos: Option<f64>,
    pub duration: Option<f64>,
    pub start_time: f64,
    pub audio_pts: Option<f64>,
    pub demuxer: Option<DemuxerInfo>,
    pub media_title: Option<String>,
    pub tracks: Vec<Track>,
    pub chapters: Vec<Chapter>,
    pub audio_out: Option<AudioOutput>,
    pub audio_devices: Vec<AudioDevice>,
    pub av_difference: Option<f64>,
    pub dropped_frames: i64,
    pub pending_seek: Option<SeekRequest>,
    /// Positive: frames to step forward. Negative: step back.
    pub frame_steps: i64,
    pub osd: Option<OsdMessage>,
    pub printed: Vec<String>,
    pub quit_code: Option<i32>,
    pub audio_reload_requested: bool,
    /// Playlist index to switch to once the current file has stopped.
    pub next_entry: Option<usize>,
    next_track_id: i64,
}

impl PlayerState {
    /// Installs freshly loaded media. Called by the host pipeline.
    pub fn open(&mut self, info: MediaInfo) {
        self.demuxer = Some(info.demuxer);
        self.duration = info.duration;
        self.start_time = info.start_time;
        self.chapters = info.chapters;
        self.media_title = info.media_title;
        self.tracks.clear();
        for track in info.tracks {
            self.add_track(track);
        }
        self.time_pos = Some(info.start_time);
        self.playback_initialized = true;
        self.restart_complete = true;
        self.eof_reached = false;
        self.stop_play = StopPlay::KeepPlaying;
    }

    /// Tears down per-file state when playback of an entry ends.
    pub fn close(&mut self) {
        self.demuxer = None;
        self.duration = None;
        self.time_pos = None;
        self.audio_pts = None;
        self.chapters.clear();
        self.tracks.clear();
        self.media_title = None;
        self.playback_initialized = false;
        self.restart_complete = false;
        self.pending_seek = None;
        self.frame_steps = 0;
        self.av_difference = None;
    }

    pub fn filename(&self) -> Option<&str> {
        self.playlist.current().map(|e| e.filename.as_str())
    }

    pub fn playing_time(&self) -> Option<f64> {
        self.time_pos.map(|t| t - self.start_time)
    }

    pub fn remaining(&self) -> Option<f64> {
        match (self.duration, self.time_pos) {
            (Some(d), Some(t)) => Some(self.start_time + d - t),
            _ => None,
        }
    }

    pub fn percent_pos(&self) -> Option<f64> {
        match (self.duration, self.playing_time()) {
            (Some(d), Some(t)) if d > 0.0 => Some((t / d * 100.0).clamp(0.0, 100.0)),
            _ => None,
        }
    }

    pub fn seekable(&self) -> bool {
        self.demuxer
            .as_ref()
            .map(|d| d.seekable || d.partially_seekable)
            .unwrap_or(false)
    }

    /// Index of the chapter containing the current position.
    pub fn current_chapter(&self) -> Option<usize> {
        let pos = self.time_pos?;
        self.chapters.iter().rposition(|c| c.time <= pos)
    }

    pub fn add_track(&mut self, mut track: Track) -> i64 {
        self.next_track_id += 1;
        track.id = self.next_track_id;
        let id = track.id;
        self.tracks.push(track);
        id
    }

    pub fn remove_track(&mut self, kind: TrackKind, id: i64) -> Option<Track> {
        let pos = self.tracks.iter().position(|t| t.kind == kind && t.id == id)?;
        Some(self.tracks.remove(pos))
    }

    pub fn track(&self, kind: TrackKind, id: i64) -> Option<&Track> {
        self.tracks.iter().find(|t| t.kind == kind && t.id == id)
    }

    pub fn selected_track(&self, kind: TrackKind) -> Option<&Track> {
        self.tracks.iter().find(|t| t.kind == kind && t.selected)
    }

    pub fn tracks_of(&self, kind: TrackKind) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(move |t| t.kind == kind)
    }

    /// Selects track `id` of `kind`, or deselects all with `None`.
    pub fn select_track(&mut self, kind: TrackKind, id: Option<i64>) -> bool {
        if let Some(id) = id {
            if self.track(kind, id).is_none() {
                return false;
            }
        }
        for track in self.tracks.iter_mut().filter(|t| t.kind == kind) {
            track.selected = Some(track.id) == id;
        }
        true
    }
}
