// SPDX-FileCopyrightText: 2026 davcal developers
//
// SPDX-License-Identifier: Apache-2.0

//! Calendar service: event CRUD, reminders and invitations over a pluggable
//! storage transport.
//!
//! The service owns no network code. It composes the codec from
//! [`davcal_ical`] with a [`CalendarStore`] implementation supplied by the
//! caller, and layers calendar selection, UID-based lookup and
//! partial-failure tolerance on top.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro
)]

pub mod config;
pub mod error;
pub mod service;
pub mod store;

pub use crate::config::{Config, ConfigOffset};
pub use crate::error::{Error, ResourceKind};
pub use crate::service::CalendarService;
pub use crate::store::{Calendar, CalendarObject, CalendarStore, ETag, Href, StoreError, TimeRange};
