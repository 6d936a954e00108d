// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Plain player state read and mutated by properties and commands.
//!
//! Nothing in here decodes media. The host pipeline (or a test) fills these
//! fields; the dispatch core only reads and adjusts them under the core lock.

mod playlist;
mod state;
mod tags;

pub use playlist::{Playlist, PlaylistEntry};
pub use state::{
    AudioDevice, AudioOutput, Chapter, DemuxerInfo, MediaInfo, OsdMessage, PlayerState,
    SeekKind, SeekPrecision, SeekRequest, StopPlay, Track, TrackKind,
};
pub use tags::Tags;
