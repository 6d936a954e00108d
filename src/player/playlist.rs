// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use rand::seq::SliceRandom;

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistEntry {
    pub id: u64,
    pub filename: String,
    pub title: Option<String>,
    /// Per-file option overrides applied when the entry starts playing.
    pub params: Vec<(String, String)>,
}

/// Ordered list of entries plus the index of the one currently playing.
#[derive(Debug, Default)]
pub struct Playlist {
    entries: Vec<PlaylistEntry>,
    current: Option<usize>,
    next_id: u64,
}

impl Playlist {
    pub fn add(&mut self, filename: &str, params: Vec<(String, String)>) -> u64 {
        self.next_id += 1;
        self.entries.push(PlaylistEntry {
            id: self.next_id,
            filename: filename.to_string(),
            title: None,
            params,
        });
        self.next_id
    }

    pub fn get(&self, index: usize) -> Option<&PlaylistEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&PlaylistEntry> {
        self.current.and_then(|i| self.entries.get(i))
    }

    pub fn set_current(&mut self, index: Option<usize>) {
        self.current = index.filter(|&i| i < self.entries.len());
    }

    /// Entry `direction` steps away from the current one, if any.
    pub fn neighbour(&self, direction: i64) -> Option<usize> {
        let target = match self.current {
            Some(i) => i as i64 + direction,
            None if direction > 0 => 0,
            None => return None,
        };
        (target >= 0 && (target as usize) < self.entries.len()).then_some(target as usize)
    }

    /// Removes an entry, keeping `current` pointed at the same entry. Removing
    /// the current entry clears it.
    pub fn remove(&mut self, index: usize) -> Option<PlaylistEntry> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);
        self.current = match self.current {
            Some(c) if c == index => None,
            Some(c) if c > index => Some(c - 1),
            other => other,
        };
        Some(removed)
    }

    /// Removes everything except the current entry.
    pub fn clear_except_current(&mut self) {
        match self.current.map(|c| self.entries.swap_remove(c)) {
            Some(current) => {
                self.entries = vec![current];
                self.current = Some(0);
            }
            None => self.entries.clear(),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = None;
    }

    /// Moves entry `from` so that it sits before the entry at `to`
    /// (`to == len` appends).
    pub fn move_entry(&mut self, from: usize, to: usize) -> bool {
        let len = self.entries.len();
        if from >= len || to > len {
            return false;
        }
        let current_id = self.current().map(|e| e.id);
        let entry = self.entries.remove(from);
        let to = if to > from { to - 1 } else { to };
        self.entries.insert(to, entry);
        self.current = current_id.and_then(|id| self.entries.iter().position(|e| e.id == id));
        true
    }

    pub fn shuffle(&mut self) {
        let current_id = self.current().map(|e| e.id);
        self.entries.shuffle(&mut rand::thread_rng());
        self.current = current_id.and_then(|id| self.entries.iter().position(|e| e.id == id));
    }
}
