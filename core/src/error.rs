// SPDX-FileCopyrightText: 2026 davcal developers
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use davcal_ical::IcalError;

/// What kind of resource a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// A calendar collection.
    Calendar,

    /// A calendar event.
    Event,

    /// An invitation.
    Invitation,
}

impl ResourceKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Calendar => "calendar",
            Self::Event => "event",
            Self::Invitation => "invitation",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar service errors.
#[non_exhaustive]
#[derive(Debug)]
pub enum Error {
    /// No resource with the given identifier exists in any reachable
    /// calendar.
    NotFound {
        /// The kind of resource looked for.
        kind: ResourceKind,
        /// The identifier that matched nothing.
        id: String,
    },

    /// The storage transport failed.
    Store(String),

    /// An iCalendar document could not be encoded or decoded.
    Ical(IcalError),

    /// Configuration error.
    Config(String),
}

impl Error {
    /// Creates a not-found error for the given resource.
    pub fn not_found(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Stable machine-readable code for the structured error contract.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Store(_) => "store",
            Self::Ical(_) => "ical",
            Self::Config(_) => "config",
        }
    }

    /// A recovery hint for the user, when one applies.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NotFound {
                kind: ResourceKind::Event,
                ..
            } => Some("Use list_events to discover valid event ids"),
            Self::NotFound {
                kind: ResourceKind::Calendar,
                ..
            } => Some("Use list_calendars to discover valid calendar ids"),
            Self::NotFound {
                kind: ResourceKind::Invitation,
                ..
            } => Some("Use list_invitations to discover pending invitations"),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Store(e) => write!(f, "Storage error: {e}"),
            Self::Ical(e) => write!(f, "iCalendar error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Ical(e) => Some(e),
            _ => None,
        }
    }
}

impl From<IcalError> for Error {
    fn from(e: IcalError) -> Self {
        Self::Ical(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_carries_kind_and_suggestion() {
        let err = Error::not_found(ResourceKind::Event, "abc");
        assert_eq!(err.code(), "not_found");
        assert_eq!(err.to_string(), "event not found: abc");
        assert_eq!(
            err.suggestion(),
            Some("Use list_events to discover valid event ids")
        );
    }

    #[test]
    fn store_errors_have_no_suggestion() {
        let err = Error::Store("connection refused".to_string());
        assert_eq!(err.code(), "store");
        assert_eq!(err.suggestion(), None);
    }
}
