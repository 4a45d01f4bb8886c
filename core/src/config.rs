// SPDX-FileCopyrightText: 2026 davcal developers
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use davcal_ical::TzConverter;
use serde::de;

/// Configuration for the calendar service.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Config {
    /// Fixed UTC offset used to interpret local timestamps, e.g. `"+07:00"`.
    ///
    /// Every local time is assumed to be at this offset; there is no zone
    /// detection and no DST handling. Defaults to +07:00 for compatibility
    /// with documents written by earlier releases.
    #[serde(default)]
    pub utc_offset: ConfigOffset,

    /// Email address of the account owner.
    ///
    /// When set, invitation status lookups and responses target the
    /// attendee line carrying this address instead of the first/all lines.
    #[serde(default)]
    pub account_email: Option<String>,

    /// Calendar used when an operation names none.
    #[serde(default)]
    pub default_calendar: Option<String>,
}

/// Fixed UTC offset, deserialized from strings like `"+07:00"` or `"-0530"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigOffset(TzConverter);

impl ConfigOffset {
    /// The timezone converter for this offset.
    #[must_use]
    pub const fn converter(&self) -> TzConverter {
        self.0
    }
}

impl<'de> serde::Deserialize<'de> for ConfigOffset {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct OffsetVisitor;

        impl de::Visitor<'_> for OffsetVisitor {
            type Value = ConfigOffset;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str(r#"a UTC offset string like "+07:00" or "-0530""#)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                TzConverter::from_spec(value)
                    .map(ConfigOffset)
                    .map_err(|e| de::Error::custom(e.to_string()))
            }
        }

        deserializer.deserialize_str(OffsetVisitor)
    }
}
