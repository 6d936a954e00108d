// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use tokio_util::sync::CancellationToken;

use crate::player::{Track, TrackKind};
use crate::traits::MediaBackend;

/// Media backend for hosts without a decoder: every request fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMedia;

impl MediaBackend for NullMedia {
    fn open_track(&self, url: &str, _: TrackKind, _: &CancellationToken) -> Result<Track, String> {
        Err(format!("no media backend to open '{}'", url))
    }

    fn filter_command(&self, label: &str, _: &str, _: &str) -> Result<(), String> {
        Err(format!("no filter '{}' in the audio chain", label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_media_refuses_everything() {
        let media = NullMedia;
        let err = media
            .open_track("extra.ogg", TrackKind::Audio, &CancellationToken::new())
            .unwrap_err();
        assert!(err.contains("extra.ogg"));
        assert!(media.filter_command("eq", "gain", "2").is_err());
    }
}
