// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Ordered metadata tag set with case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tags(Vec<(String, String)>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Replaces an existing key (case-insensitive) or appends a new one.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.0.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.0.push((key.to_string(), value.to_string())),
        }
    }

    pub fn entry(&self, index: usize) -> Option<(&str, &str)> {
        self.0.get(index).map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keeps the tags named in `keys`, in the order of `keys`.
    pub fn filtered(&self, keys: &[String]) -> Tags {
        let mut out = Tags::new();
        for key in keys {
            if let Some(v) = self.get(key) {
                if let Some((k, _)) = self.0.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
                    out.0.push((k.clone(), v.to_string()));
                }
            }
        }
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Tags(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut tags: Tags = vec![("Title", "Song"), ("ARTIST", "Band")].into_iter().collect();
        assert_eq!(tags.get("title"), Some("Song"));
        tags.set("artist", "Other");
        assert_eq!(tags.get("Artist"), Some("Other"));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_filtered_follows_key_order() {
        let tags: Tags = vec![("Title", "Song"), ("Artist", "Band"), ("Comment", "x")]
            .into_iter()
            .collect();
        let keys = vec!["artist".to_string(), "title".to_string()];
        let filtered = tags.filtered(&keys);
        assert_eq!(filtered.entry(0), Some(("Artist", "Band")));
        assert_eq!(filtered.entry(1), Some(("Title", "Song")));
        assert_eq!(filtered.len(), 2);
    }
}
