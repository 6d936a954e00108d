// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Human-readable byte count using binary units.
pub fn format_file_size(bytes: i64) -> String {
    let size = bytes as f64;
    if size < 1024.0 {
        return format!("{} B", bytes);
    }
    if size < 1024.0 * 1024.0 {
        return format!("{:.3} KiB", size / 1024.0);
    }
    if size < 1024.0 * 1024.0 * 1024.0 {
        return format!("{:.3} MiB", size / (1024.0 * 1024.0));
    }
    if size < 1024.0 * 1024.0 * 1024.0 * 1024.0 {
        return format!("{:.3} GiB", size / (1024.0 * 1024.0 * 1024.0));
    }
    format!("{:.3} TiB", size / (1024.0 * 1024.0 * 1024.0 * 1024.0))
}
