// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::OptionStore;
use crate::engine::Core;
use crate::events::match_property;
use crate::properties::bridge::generic_option;
use crate::properties::dispatch::{alias, deprecated_alias};
use crate::properties::{PropertyAction, PropertyResult};
use crate::traits::PropertyAccessor;

/// Named entry of the property table.
#[derive(Clone)]
pub struct PropertyDescriptor {
    pub name: String,
    /// Generated from the option of the same name.
    pub is_option: bool,
    accessor: Arc<dyn PropertyAccessor>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, accessor: impl PropertyAccessor + 'static) -> Self {
        Self {
            name: name.into(),
            is_option: false,
            accessor: Arc::new(accessor),
        }
    }

    fn option(name: &str, accessor: impl PropertyAccessor + 'static) -> Self {
        Self {
            is_option: true,
            ..Self::new(name, accessor)
        }
    }

    pub fn call(&self, action: &PropertyAction, core: &mut Core) -> PropertyResult {
        self.accessor.access(self, action, core)
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("is_option", &self.is_option)
            .finish()
    }
}

/// Ordered property table, immutable once built.
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    descriptors: Vec<PropertyDescriptor>,
}

impl PropertyRegistry {
    /// Explicit descriptors first, then one generated descriptor per option
    /// that is neither hidden nor already covered.
    pub fn build(explicit: Vec<PropertyDescriptor>, options: &OptionStore) -> Self {
        let mut seen = HashSet::new();
        let mut descriptors = Vec::with_capacity(explicit.len() + options.len());
        for desc in explicit {
            if seen.insert(desc.name.clone()) {
                descriptors.push(desc);
            } else {
                debug!(property = %desc.name, "Duplicate property descriptor ignored");
            }
        }
        for entry in options.iter() {
            if entry.no_property || seen.contains(&entry.name) {
                continue;
            }
            let desc = match (&entry.alias_of, &entry.deprecation) {
                (Some(target), Some(_)) => PropertyDescriptor::option(&entry.name, deprecated_alias(target)),
                (Some(target), None) => PropertyDescriptor::option(&entry.name, alias(target)),
                (None, _) => PropertyDescriptor::option(&entry.name, generic_option),
            };
            seen.insert(entry.name.clone());
            descriptors.push(desc);
        }
        Self { descriptors }
    }

    pub fn find(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    /// Exact match, else the longest `/`-prefix that names a property,
    /// returned together with the remaining sub-path.
    pub fn resolve<'p>(&self, path: &'p str) -> Option<(&PropertyDescriptor, Option<&'p str>)> {
        if let Some(desc) = self.find(path) {
            return Some((desc, None));
        }
        let mut end = path.len();
        while let Some(sep) = path[..end].rfind('/') {
            if let Some(desc) = self.find(&path[..sep]) {
                let rest = &path[sep + 1..];
                return Some((desc, (!rest.is_empty()).then_some(rest)));
            }
            end = sep;
        }
        None
    }

    /// Stable, possibly shared id used to match change notifications.
    pub fn id_of(&self, name: &str) -> Option<usize> {
        self.descriptors
            .iter()
            .position(|d| match_property(&d.name, name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OptionDef, OptionType};
    use crate::errors::PropertyError;
    use crate::properties::PropertyReply;

    fn nothing(_: &PropertyDescriptor, _: &PropertyAction, _: &mut Core) -> PropertyResult {
        Err(PropertyError::NotImplemented)
    }

    fn registry() -> PropertyRegistry {
        let options = OptionStore::from_defs(vec![
            OptionDef::new("volume", OptionType::double()),
            OptionDef::new("brightness", OptionType::int().with_range(0.0, 100.0)),
            OptionDef::new("include", OptionType::string()).hidden(),
            OptionDef::alias("bright", "brightness", None),
        ])
        .unwrap();
        PropertyRegistry::build(
            vec![
                PropertyDescriptor::new("volume", nothing),
                PropertyDescriptor::new("playlist", nothing),
                PropertyDescriptor::new("playlist", |_: &PropertyDescriptor, _: &PropertyAction, _: &mut Core| {
                    Ok(PropertyReply::Done)
                }),
            ],
            &options,
        )
    }

    #[test]
    fn test_explicit_descriptors_shadow_options() {
        let reg = registry();
        let names: Vec<&str> = reg.names().collect();
        assert_eq!(names, vec!["volume", "playlist", "brightness", "bright"]);
        assert!(!reg.find("volume").unwrap().is_option);
        assert!(reg.find("brightness").unwrap().is_option);
        assert!(reg.find("include").is_none());
    }

    #[test]
    fn test_resolve_splits_sub_paths() {
        let reg = registry();
        let cases = vec![
            ("volume", Some(("volume", None))),
            ("playlist/count", Some(("playlist", Some("count")))),
            ("playlist/0/filename", Some(("playlist", Some("0/filename")))),
            ("playlist/", Some(("playlist", None))),
            ("nope/count", None),
        ];
        for (path, expected) in cases {
            let got = reg.resolve(path).map(|(d, rest)| (d.name.as_str(), rest));
            assert_eq!(got, expected, "resolving {}", path);
        }
    }

    #[test]
    fn test_ids_follow_prefix_matching() {
        let reg = registry();
        assert_eq!(reg.id_of("volume"), Some(0));
        assert_eq!(reg.id_of("options/volume"), Some(0));
        assert_eq!(reg.id_of("playlist/count"), Some(1));
        assert_eq!(reg.id_of("unknown-thing"), None);
    }
}
