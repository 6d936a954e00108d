// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt::{Display, Formatter};
use tracing::Span;

use super::StructuredLog;
use crate::errors::PropertyStatus;

/// A property was written.
///
/// # Log Level
/// `debug!` - Frequent during normal use
pub struct PropertySet<'a> {
    pub property: &'a str,
    pub action: &'a str,
    pub status: PropertyStatus,
}

impl Display for PropertySet<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Property '{}' {} -> {}",
            self.property, self.action, self.status
        )
    }
}

impl StructuredLog for PropertySet<'_> {
    fn log(&self) {
        tracing::debug!(
            property = self.property,
            action = self.action,
            status = %self.status,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "property_set",
            span_name = name,
            property = self.property,
            action = self.action,
        )
    }
}

/// An option changed outside the property layer.
pub struct OptionChanged<'a> {
    pub option: &'a str,
    pub via_property: bool,
}

impl Display for OptionChanged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.via_property {
            write!(f, "Option '{}' set through its property", self.option)
        } else {
            write!(f, "Option '{}' set directly", self.option)
        }
    }
}

impl StructuredLog for OptionChanged<'_> {
    fn log(&self) {
        tracing::trace!(
            option = self.option,
            via_property = self.via_property,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!("option_changed", span_name = name, option = self.option)
    }
}

/// User-visible property failure, also shown on the OSD.
///
/// # Log Level
/// `warn!`
pub struct PropertyFailed<'a> {
    pub property: &'a str,
    pub status: PropertyStatus,
}

impl Display for PropertyFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.status {
            PropertyStatus::Unknown => write!(f, "Unknown property: '{}'", self.property),
            _ => write!(f, "Failed to set property '{}'", self.property),
        }
    }
}

impl StructuredLog for PropertyFailed<'_> {
    fn log(&self) {
        tracing::warn!(property = self.property, status = %self.status, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("property_failed", span_name = name, property = self.property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_text_distinguishes_unknown() {
        let unknown = PropertyFailed { property: "nope", status: PropertyStatus::Unknown };
        assert_eq!(unknown.to_string(), "Unknown property: 'nope'");

        let failed = PropertyFailed { property: "volume", status: PropertyStatus::Error };
        assert_eq!(failed.to_string(), "Failed to set property 'volume'");
    }
}
