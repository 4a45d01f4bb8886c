// SPDX-FileCopyrightText: 2026 davcal developers
//
// SPDX-License-Identifier: Apache-2.0

//! The storage transport boundary.
//!
//! The service never talks to a server itself: it consumes and produces
//! plain text documents through the [`CalendarStore`] trait. A conforming
//! implementation (a `CalDAV` client, a directory of files, an in-memory
//! map in tests) owns authentication, sync and optimistic concurrency.

use std::fmt;
use std::ops::Deref;

use async_trait::async_trait;
use jiff::Timestamp;

/// Location of a stored calendar object, e.g. `/calendars/user/uid.ics`.
///
/// Opaque to the service except for one contract: an event's href contains
/// its UID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Href(String);

impl Href {
    /// Creates a new `Href` from a string.
    #[must_use]
    pub const fn new(href: String) -> Self {
        Self(href)
    }

    /// Returns the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Href {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Href {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Href {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Href {
    fn from(href: String) -> Self {
        Self(href)
    }
}

impl From<&str> for Href {
    fn from(href: &str) -> Self {
        Self(href.to_string())
    }
}

/// Version token of a stored object, used for optimistic concurrency when a
/// rebuilt document replaces the old one. Supplied by the transport and
/// carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ETag(String);

impl ETag {
    /// Creates a new `ETag` from a string.
    #[must_use]
    pub const fn new(etag: String) -> Self {
        Self(etag)
    }

    /// Returns the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for ETag {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for ETag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ETag {
    fn from(etag: String) -> Self {
        Self(etag)
    }
}

impl From<&str> for ETag {
    fn from(etag: &str) -> Self {
        Self(etag.to_string())
    }
}

/// Metadata of one calendar collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    /// Stable identifier of the collection; doubles as `calendar_id` on
    /// events parsed out of it.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Collection description, if the server provides one.
    pub description: Option<String>,

    /// Display color, if the server provides one.
    pub color: Option<String>,

    /// Collection timezone, if the server provides one. Informational
    /// only: document dates are interpreted at the configured offset.
    pub timezone: Option<String>,
}

impl Calendar {
    /// Creates a calendar with only an id and a name.
    #[must_use]
    pub const fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            description: None,
            color: None,
            timezone: None,
        }
    }
}

/// One stored calendar object: the raw document plus its location and
/// version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarObject {
    /// Where the document lives.
    pub href: Href,

    /// Its current version token.
    pub etag: ETag,

    /// The raw iCalendar text.
    pub data: String,
}

/// A UTC time range used to limit which objects a fetch returns.
///
/// Filtering is the transport's concern; the service never filters parsed
/// events by time itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Inclusive start instant.
    pub start: Timestamp,

    /// Exclusive end instant.
    pub end: Timestamp,
}

/// Error type produced by storage transports.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Storage transport the calendar service runs against.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Lists all calendar collections.
    async fn list_calendars(&self) -> Result<Vec<Calendar>, StoreError>;

    /// Fetches the stored objects of one calendar, optionally limited to a
    /// time range.
    async fn fetch_objects(
        &self,
        calendar: &Calendar,
        range: Option<TimeRange>,
    ) -> Result<Vec<CalendarObject>, StoreError>;

    /// Stores a brand-new document under the given filename.
    async fn create_object(
        &self,
        calendar: &Calendar,
        filename: &str,
        data: &str,
    ) -> Result<(), StoreError>;

    /// Replaces an existing document, guarded by its `ETag`.
    async fn update_object(
        &self,
        calendar: &Calendar,
        href: &Href,
        etag: &ETag,
        data: &str,
    ) -> Result<(), StoreError>;

    /// Deletes a stored document.
    async fn delete_object(&self, href: &Href) -> Result<(), StoreError>;
}
