// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Lifecycle events. The first block carries entries in the event/property
/// map and therefore a bit in [`EventMask`]; the rest are delivered to
/// clients but never invalidate properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    StartFile,
    EndFile,
    FileLoaded,
    ChangeAll,
    TracksChanged,
    TrackSwitched,
    Idle,
    Pause,
    Unpause,
    Tick,
    DurationUpdate,
    VideoReconfig,
    AudioReconfig,
    Seek,
    PlaybackRestart,
    MetadataUpdate,
    ChapterChange,
    CacheUpdate,
    WinResize,
    WinState,
    ChangePlaylist,
    CoreIdle,
    Shutdown,
    ClientMessage,
    Hook,
}

impl EventKind {
    pub const MAPPED: [EventKind; 22] = [
        EventKind::StartFile,
        EventKind::EndFile,
        EventKind::FileLoaded,
        EventKind::ChangeAll,
        EventKind::TracksChanged,
        EventKind::TrackSwitched,
        EventKind::Idle,
        EventKind::Pause,
        EventKind::Unpause,
        EventKind::Tick,
        EventKind::DurationUpdate,
        EventKind::VideoReconfig,
        EventKind::AudioReconfig,
        EventKind::Seek,
        EventKind::PlaybackRestart,
        EventKind::MetadataUpdate,
        EventKind::ChapterChange,
        EventKind::CacheUpdate,
        EventKind::WinResize,
        EventKind::WinState,
        EventKind::ChangePlaylist,
        EventKind::CoreIdle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::StartFile => "start-file",
            EventKind::EndFile => "end-file",
            EventKind::FileLoaded => "file-loaded",
            EventKind::ChangeAll => "change-all",
            EventKind::TracksChanged => "tracks-changed",
            EventKind::TrackSwitched => "track-switched",
            EventKind::Idle => "idle",
            EventKind::Pause => "pause",
            EventKind::Unpause => "unpause",
            EventKind::Tick => "tick",
            EventKind::DurationUpdate => "duration-update",
            EventKind::VideoReconfig => "video-reconfig",
            EventKind::AudioReconfig => "audio-reconfig",
            EventKind::Seek => "seek",
            EventKind::PlaybackRestart => "playback-restart",
            EventKind::MetadataUpdate => "metadata-update",
            EventKind::ChapterChange => "chapter-change",
            EventKind::CacheUpdate => "cache-update",
            EventKind::WinResize => "win-resize",
            EventKind::WinState => "win-state",
            EventKind::ChangePlaylist => "change-playlist",
            EventKind::CoreIdle => "core-idle",
            EventKind::Shutdown => "shutdown",
            EventKind::ClientMessage => "client-message",
            EventKind::Hook => "hook",
        }
    }

    /// Bit index in [`EventMask`], if the event is mapped.
    pub fn bit(self) -> Option<u32> {
        Self::MAPPED.iter().position(|k| *k == self).map(|i| i as u32)
    }

    /// Property-name patterns invalidated by this event.
    pub fn affected_properties(self) -> &'static [&'static str] {
        match self {
            EventKind::StartFile
            | EventKind::EndFile
            | EventKind::FileLoaded
            | EventKind::ChangeAll
            | EventKind::Idle => &["*"],
            EventKind::TracksChanged => &["track-list"],
            EventKind::TrackSwitched => &[
                "vid", "video", "aid", "audio", "sid", "sub", "secondary-sid",
            ],
            EventKind::Pause | EventKind::Unpause => &["pause"],
            EventKind::Tick => &[
                "time-pos",
                "audio-pts",
                "stream-pos",
                "avsync",
                "percent-pos",
                "time-remaining",
                "playtime-remaining",
                "playback-time",
                "estimated-vf-fps",
                "drop-frame-count",
                "vo-drop-frame-count",
                "total-avsync-change",
                "audio-speed-correction",
                "video-speed-correction",
                "vo-delayed-frame-count",
                "mistimed-frame-count",
                "vsync-ratio",
                "estimated-display-fps",
                "vsync-jitter",
                "sub-text",
                "audio-bitrate",
                "video-bitrate",
                "sub-bitrate",
                "decoder-frame-drop-count",
                "frame-drop-count",
                "video-frame-info",
            ],
            EventKind::DurationUpdate => &["duration"],
            EventKind::VideoReconfig => &[
                "video-out-params",
                "video-params",
                "video-format",
                "video-codec",
                "video-bitrate",
                "dwidth",
                "dheight",
                "width",
                "height",
                "fps",
                "aspect",
                "vo-configured",
                "current-vo",
                "colormatrix",
                "colormatrix-input-range",
                "colormatrix-output-range",
                "colormatrix-primaries",
                "video-aspect",
                "video-dec-params",
                "hwdec",
                "hwdec-current",
                "hwdec-interop",
            ],
            EventKind::AudioReconfig => &[
                "audio-format",
                "audio-codec",
                "audio-bitrate",
                "samplerate",
                "channels",
                "audio",
                "volume",
                "mute",
                "current-ao",
                "audio-codec-name",
                "audio-params",
                "audio-out-params",
                "volume-max",
                "mixer-active",
            ],
            EventKind::Seek | EventKind::PlaybackRestart => {
                &["seeking", "core-idle", "eof-reached"]
            }
            EventKind::MetadataUpdate => &["metadata", "filtered-metadata", "media-title"],
            EventKind::ChapterChange => &["chapter", "chapter-metadata"],
            EventKind::CacheUpdate => &[
                "cache",
                "cache-free",
                "cache-used",
                "cache-idle",
                "demuxer-cache-duration",
                "demuxer-cache-idle",
                "paused-for-cache",
                "demuxer-cache-time",
                "cache-buffering-state",
                "cache-speed",
                "cache-percent",
            ],
            EventKind::WinResize => &["window-scale", "osd-width", "osd-height", "osd-par"],
            EventKind::WinState => &[
                "window-minimized",
                "display-names",
                "display-fps",
                "fullscreen",
            ],
            EventKind::ChangePlaylist => &[
                "playlist",
                "playlist-pos",
                "playlist-pos-1",
                "playlist-count",
                "playlist/count",
            ],
            EventKind::CoreIdle => &["core-idle", "eof-reached"],
            EventKind::Shutdown | EventKind::ClientMessage | EventKind::Hook => &[],
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of events that may change a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct EventMask(pub u64);

impl EventMask {
    pub fn contains(self, kind: EventKind) -> bool {
        kind.bit().map(|b| self.0 & (1u64 << b) != 0).unwrap_or(false)
    }

    pub fn insert(&mut self, kind: EventKind) {
        if let Some(b) = kind.bit() {
            self.0 |= 1u64 << b;
        }
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

// Without a '/', the terminator counts too so a bare name never matches as a
// prefix of a longer one.
fn prefix_len(s: &str) -> usize {
    s.find('/').unwrap_or(s.len() + 1)
}

/// Whether pattern `a` covers property name `b`.
///
/// `"*"` matches everything. Otherwise an `options/` prefix is ignored on
/// both sides and the first path segments must be equal.
pub fn match_property(a: &str, b: &str) -> bool {
    if a == "*" {
        return true;
    }
    let a = a.strip_prefix("options/").unwrap_or(a);
    let b = b.strip_prefix("options/").unwrap_or(b);
    let n = prefix_len(a).min(prefix_len(b));
    let (ab, bb) = (a.as_bytes(), b.as_bytes());
    (0..n).all(|i| ab.get(i) == bb.get(i))
}

/// Events whose map entries match `name`.
pub fn property_event_mask(name: &str) -> EventMask {
    let mut mask = EventMask::default();
    for kind in EventKind::MAPPED {
        if kind
            .affected_properties()
            .iter()
            .any(|pattern| match_property(pattern, name))
        {
            mask.insert(kind);
        }
    }
    mask
}
