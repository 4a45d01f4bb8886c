// SPDX-FileCopyrightText: 2026 davcal developers
//
// SPDX-License-Identifier: Apache-2.0

/// Errors produced while encoding or decoding iCalendar documents.
#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum IcalError {
    /// A date or date-time value could not be parsed.
    #[error("Malformed date value: {value}")]
    MalformedDate {
        /// The offending value text.
        value: String,
    },

    /// A UTC offset specification could not be parsed.
    #[error("Malformed UTC offset: {value}")]
    MalformedOffset {
        /// The offending offset text.
        value: String,
    },

    /// The document contains no VEVENT component.
    #[error("No VEVENT component found in document")]
    NoVEvent,

    /// The VEVENT component carries no UID property.
    #[error("VEVENT component has no UID")]
    MissingUid,
}

impl IcalError {
    pub(crate) fn malformed_date(value: impl Into<String>) -> Self {
        Self::MalformedDate {
            value: value.into(),
        }
    }
}
