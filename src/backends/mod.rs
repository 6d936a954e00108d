// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Default implementations of the collaborator traits in [`crate::traits`].
//!
//! Hosts normally bring their own media backend; the engine falls back to
//! [`NullMedia`] when they do not. [`ProcessRunner`] runs real child
//! processes with `std::process`.

mod null;
mod process;

pub use null::NullMedia;
pub use process::ProcessRunner;
