// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod format;
mod time;

pub use format::format_file_size;
pub use time::{format_time, parse_time};
