// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Explicit property descriptors, grouped by the state they expose.

mod audio;
mod introspection;
mod lists;
mod metadata;
mod playback;
mod time;

use crate::properties::PropertyDescriptor;

/// Every explicit descriptor, in registry order.
pub fn builtin_properties() -> Vec<PropertyDescriptor> {
    let mut props = Vec::new();
    props.extend(playback::descriptors());
    props.extend(time::descriptors());
    props.extend(audio::descriptors());
    props.extend(metadata::descriptors());
    props.extend(lists::descriptors());
    props.extend(introspection::descriptors());
    props
}
