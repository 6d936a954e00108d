// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Parse a time specification into seconds.
///
/// Accepts plain seconds (`90.5`), `MM:SS` and `HH:MM:SS[.fff]`, each with an
/// optional leading sign.
///
/// ```rust
/// use playcore::utils::parse_time;
///
/// assert_eq!(parse_time("1:02:03"), Some(3723.0));
/// assert_eq!(parse_time("-00:30"), Some(-30.0));
/// assert_eq!(parse_time("abc"), None);
/// ```
pub fn parse_time(text: &str) -> Option<f64> {
    let text = text.trim();
    let (sign, body) = match text.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, text.strip_prefix('+').unwrap_or(text)),
    };
    if body.is_empty() {
        return None;
    }
    let parts: Vec<&str> = body.split(':').collect();
    if parts.len() > 3 {
        return None;
    }
    let mut total = 0.0;
    for (i, part) in parts.iter().enumerate() {
        let last = i + 1 == parts.len();
        let value: f64 = if last {
            part.parse().ok()?
        } else {
            part.parse::<u32>().ok()? as f64
        };
        if !value.is_finite() || (i > 0 && value >= 60.0) {
            return None;
        }
        total = total * 60.0 + value;
    }
    Some(sign * total)
}

/// Format seconds as `[-]HH:MM:SS`, optionally with milliseconds.
///
/// ```rust
/// use playcore::utils::format_time;
///
/// assert_eq!(format_time(3723.25, false), "01:02:03");
/// assert_eq!(format_time(3723.25, true), "01:02:03.250");
/// ```
pub fn format_time(seconds: f64, fractions: bool) -> String {
    let sign = if seconds < 0.0 { "-" } else { "" };
    let abs = seconds.abs();
    let whole = abs.floor() as u64;
    let (h, m, s) = (whole / 3600, (whole / 60) % 60, whole % 60);
    if fractions {
        let ms = ((abs - whole as f64) * 1000.0).round().min(999.0) as u64;
        format!("{}{:02}:{:02}:{:02}.{:03}", sign, h, m, s, ms)
    } else {
        format!("{}{:02}:{:02}:{:02}", sign, h, m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_table() {
        let cases = vec![
            ("10", Some(10.0)),
            ("+1.5", Some(1.5)),
            ("01:30", Some(90.0)),
            ("1:00:00", Some(3600.0)),
            ("00:61", None),
            ("1:2:3:4", None),
            ("", None),
            ("-", None),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_time(input), expected, "input '{}'", input);
        }
    }

    #[test]
    fn test_format_negative_time() {
        assert_eq!(format_time(-61.0, false), "-00:01:01");
    }
}
