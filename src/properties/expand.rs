// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! `${...}` property expansion in user-supplied text.
//!
//! | Syntax | Result |
//! |---|---|
//! | `${name}` | printed value, `(unavailable)`/`(error)` on failure |
//! | `${name:text}` | printed value, or `text` on any failure |
//! | `${=name}` | raw value instead of the printed one |
//! | `${?name:text}` | `text` if the property has a value |
//! | `${!name:text}` | `text` if it has none |
//! | `${?name==v:text}` | `text` if the raw value equals `v` |
//! | `${!name==v:text}` | `text` if it does not |
//! | `$$`, `$}` | literal `$` and `}` |
//! | `$>` | the rest of the string is copied verbatim |

use crate::config::consts::MAX_EXPANSION_DEPTH;
use crate::engine::Core;
use crate::errors::{ExpandError, PropertyError};
use crate::properties::dispatch::dispatch;
use crate::properties::PropertyAction;

/// Printed (`raw == false`) or raw string form of a property.
pub fn property_string(core: &mut Core, name: &str, raw: bool) -> Result<String, PropertyError> {
    if !raw {
        return dispatch(core, name, &PropertyAction::Print)?.into_text();
    }
    let value = dispatch(core, name, &PropertyAction::Get)?.into_value()?;
    match dispatch(core, name, &PropertyAction::GetType) {
        Ok(reply) => Ok(reply.into_type()?.print(&value)),
        Err(PropertyError::NotImplemented) => {
            Ok(crate::properties::helpers::type_of_value(&value).print(&value))
        }
        Err(e) => Err(e),
    }
}

pub fn expand_string(core: &mut Core, text: &str) -> Result<String, ExpandError> {
    expand(core, text, 0)
}

/// Resolves C-style escapes first, then expands.
pub fn expand_escaped_string(core: &mut Core, text: &str) -> Result<String, ExpandError> {
    let unescaped = unescape(text)?;
    expand(core, &unescaped, 0)
}

/// Decodes `\n`, `\t`, `\\`, `\"`, `\e`, `\xNN` and `\uNNNN`.
pub fn unescape(text: &str) -> Result<String, ExpandError> {
    let broken = || ExpandError::BrokenEscape(text.to_string());
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next().ok_or_else(broken)? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'e' => out.push('\x1b'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                let code = u8::from_str_radix(&hex, 16).map_err(|_| broken())?;
                out.push(code as char);
            }
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16).map_err(|_| broken())?;
                out.push(char::from_u32(code).ok_or_else(broken)?);
            }
            _ => return Err(broken()),
        }
    }
    Ok(out)
}

/// Byte offset of the `}` closing a reference that starts at `body`.
fn find_close(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                depth += 1;
                i += 2;
            }
            b'$' => i += 2,
            b'}' if depth == 0 => return Some(i),
            b'}' => {
                depth -= 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

fn expand(core: &mut Core, text: &str, depth: usize) -> Result<String, ExpandError> {
    if depth > MAX_EXPANSION_DEPTH {
        return Err(ExpandError::TooDeep(text.to_string()));
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        match tail.as_bytes().first() {
            Some(b'$') => {
                out.push('$');
                rest = &tail[1..];
            }
            Some(b'}') => {
                out.push('}');
                rest = &tail[1..];
            }
            Some(b'>') => {
                out.push_str(&tail[1..]);
                return Ok(out);
            }
            Some(b'{') => {
                let body = &tail[1..];
                let end = find_close(body).ok_or_else(|| ExpandError::Unbalanced(text.to_string()))?;
                out.push_str(&expand_reference(core, &body[..end], depth)?);
                rest = &body[end + 1..];
            }
            _ => {
                out.push('$');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

enum Mode {
    Print,
    Raw,
    IfSet(bool),
}

fn expand_reference(core: &mut Core, body: &str, depth: usize) -> Result<String, ExpandError> {
    let (mode, body) = match body.as_bytes().first() {
        Some(b'?') => (Mode::IfSet(true), &body[1..]),
        Some(b'!') => (Mode::IfSet(false), &body[1..]),
        Some(b'=') => (Mode::Raw, &body[1..]),
        _ => (Mode::Print, body),
    };
    let (head, alt) = match body.split_once(':') {
        Some((h, a)) => (h, Some(a)),
        None => (body, None),
    };

    match mode {
        Mode::IfSet(wanted) => {
            let (name, compare) = match head.split_once("==") {
                Some((n, v)) => (n, Some(v)),
                None => (head, None),
            };
            let present = match property_string(core, name, true) {
                Ok(value) => compare.map_or(true, |v| v == value),
                Err(_) => false,
            };
            if present == wanted {
                expand(core, alt.unwrap_or(""), depth + 1)
            } else {
                Ok(String::new())
            }
        }
        Mode::Print | Mode::Raw => {
            let raw = matches!(mode, Mode::Raw);
            match (property_string(core, head, raw), alt) {
                (Ok(value), _) => Ok(value),
                (Err(_), Some(alt)) => expand(core, alt, depth + 1),
                (Err(PropertyError::Unknown), None) => Err(ExpandError::UnknownProperty(head.to_string())),
                (Err(PropertyError::Unavailable), None) => Ok("(unavailable)".to_string()),
                (Err(_), None) => Ok("(error)".to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing;

    #[test]
    fn test_expansion_table() {
        let mut core = testing::core();
        let cases = vec![
            ("plain text", "plain text"),
            ("vol ${volume}", "vol 100"),
            ("raw ${=volume}", "raw 100.000000"),
            ("${pause}", "no"),
            ("${duration}", "(unavailable)"),
            ("${duration:none}", "none"),
            ("${duration:${pause}}", "no"),
            ("${?pause:set}", "set"),
            ("${!duration:nothing}", "nothing"),
            ("${?pause==no:running}", "running"),
            ("${!pause==no:paused}", ""),
            ("$$5 $}", "$5 }"),
            ("a$>${volume}", "a${volume}"),
            ("${nonexistent:fallback}", "fallback"),
        ];
        for (input, expected) in cases {
            assert_eq!(expand_string(&mut core, input).as_deref(), Ok(expected), "expanding {}", input);
        }
    }

    #[test]
    fn test_expansion_errors() {
        let mut core = testing::core();
        assert!(matches!(expand_string(&mut core, "${volume"), Err(ExpandError::Unbalanced(_))));
        assert!(matches!(
            expand_string(&mut core, "${nonexistent}"),
            Err(ExpandError::UnknownProperty(_))
        ));
        let deep = "${x:".repeat(MAX_EXPANSION_DEPTH + 2) + &"}".repeat(MAX_EXPANSION_DEPTH + 2);
        assert!(matches!(expand_string(&mut core, &deep), Err(ExpandError::TooDeep(_))));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"a\nb\x41é").as_deref(), Ok("a\nbAé"));
        assert!(matches!(unescape(r"bad\q"), Err(ExpandError::BrokenEscape(_))));
        let mut core = testing::core();
        assert_eq!(expand_escaped_string(&mut core, r"v=${volume}\t").as_deref(), Ok("v=100\t"));
    }
}
