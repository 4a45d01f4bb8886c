// SPDX-FileCopyrightText: 2026 davcal developers
//
// SPDX-License-Identifier: Apache-2.0

//! iCalendar event codec: a bidirectional mapping between calendar event
//! records and VCALENDAR/VEVENT/VALARM text documents.
//!
//! This is deliberately not a full RFC 5545 implementation. It is a small
//! line scanner over the document subset this system writes itself: no
//! VTIMEZONE handling, no line folding or unfolding, no parameter escaping
//! beyond a minimal subset. Foreign documents are handled defensively by
//! ignoring what is not recognized.

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

pub mod alarm;
pub mod attendee;
pub mod codec;
pub mod duration;
pub mod error;
pub mod recurrence;
pub mod timezone;
pub mod types;

pub use crate::attendee::{Invitation, InvitationResponse, ParticipationStatus};
pub use crate::codec::EventCodec;
pub use crate::error::IcalError;
pub use crate::recurrence::{Frequency, Recurrence};
pub use crate::timezone::{DEFAULT_OFFSET, TzConverter, format_ical_date, format_local_date};
pub use crate::types::{
    EmailAddress, Event, EventDraft, EventPatch, Reminder, ReminderAction, ReminderDraft,
};
