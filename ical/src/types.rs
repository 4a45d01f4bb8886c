// SPDX-FileCopyrightText: 2026 davcal developers
//
// SPDX-License-Identifier: Apache-2.0

//! Value objects exchanged across the codec boundary.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A calendar user: an email address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    /// The address itself.
    pub email: String,

    /// Display name (the `CN` parameter), if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The action a reminder takes when it fires.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderAction {
    /// Show the reminder on screen.
    #[default]
    Display,

    /// Play a sound.
    Audio,

    /// Send an email.
    Email,
}

const ACTION_DISPLAY: &str = "display";
const ACTION_AUDIO: &str = "audio";
const ACTION_EMAIL: &str = "email";

impl AsRef<str> for ReminderAction {
    fn as_ref(&self) -> &str {
        match self {
            ReminderAction::Display => ACTION_DISPLAY,
            ReminderAction::Audio => ACTION_AUDIO,
            ReminderAction::Email => ACTION_EMAIL,
        }
    }
}

impl Display for ReminderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl FromStr for ReminderAction {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            ACTION_DISPLAY => Ok(ReminderAction::Display),
            ACTION_AUDIO => Ok(ReminderAction::Audio),
            ACTION_EMAIL => Ok(ReminderAction::Email),
            _ => Err(()),
        }
    }
}

/// A reminder (alarm) attached to an event, as recovered from a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Identifier carried in `X-WR-ALARMUID`, generated on read when the
    /// source block has none so every in-memory reminder is addressable.
    pub id: String,

    /// The raw relative-duration string, exactly as found in the document.
    pub trigger: String,

    /// Minutes derived from `trigger`. Positive means the reminder fires
    /// that many minutes before the event.
    pub minutes_before: i64,

    /// What happens when the reminder fires.
    pub action: ReminderAction,

    /// Free text shown with the reminder, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Reminder {
    /// Converts a parsed reminder back into a draft, keeping its id so a
    /// rebuilt alarm keeps a stable identity across updates.
    ///
    /// Drafts can only express lead times. A negative `minutes_before` (an
    /// after-event trigger from a foreign document) clamps to zero here and
    /// becomes the default lead time on the next rebuild.
    #[must_use]
    pub fn to_draft(&self) -> ReminderDraft {
        ReminderDraft {
            id: Some(self.id.clone()),
            days_before: 0,
            hours_before: 0,
            minutes_before: u32::try_from(self.minutes_before.max(0)).unwrap_or(0),
            action: self.action,
            description: self.description.clone(),
        }
    }
}

/// Input for creating a reminder. The three `*_before` fields are summed.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderDraft {
    /// Reuse this alarm id instead of minting a fresh one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Days before the event.
    #[serde(default)]
    pub days_before: u32,

    /// Hours before the event.
    #[serde(default)]
    pub hours_before: u32,

    /// Minutes before the event.
    #[serde(default)]
    pub minutes_before: u32,

    /// What happens when the reminder fires.
    #[serde(default)]
    pub action: ReminderAction,

    /// Free text shown with the reminder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A calendar event parsed from a stored document.
///
/// Events are immutable value objects: updates parse the old document, merge
/// changes into a new [`EventDraft`] and build a brand-new document that
/// replaces the old one. State lives only in the text document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The UID embedded in the document; also the storage filename stem.
    pub id: String,

    /// Identifier of the owning calendar collection.
    pub calendar_id: String,

    /// Location of the stored document, opaque to the codec.
    pub url: String,

    /// Version token of the stored document, opaque to the codec.
    pub etag: String,

    /// The SUMMARY line; empty when the document has none.
    pub title: String,

    /// The DESCRIPTION line, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The LOCATION line, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Local start timestamp. Date-only for all-day events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    /// Local end timestamp. Date-only for all-day events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,

    /// Whether DTSTART carried `VALUE=DATE`.
    pub is_all_day: bool,

    /// Raw RRULE value, if the event recurs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<String>,

    /// Attendees. Not recovered by parsing: participation state is read from
    /// the raw document on demand, so this is only populated on drafts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<EmailAddress>,

    /// Reminders recovered from the document's VALARM blocks, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reminders: Vec<Reminder>,
}

/// Input for building a brand-new event document.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    /// The SUMMARY line.
    pub title: String,

    /// Local start timestamp, with or without an offset suffix.
    pub start: String,

    /// Local end timestamp, with or without an offset suffix.
    pub end: String,

    /// The DESCRIPTION line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The LOCATION line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Emit date-only DTSTART/DTEND.
    #[serde(default)]
    pub all_day: bool,

    /// Attendees to embed as ATTENDEE lines.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<EmailAddress>,

    /// Reminders to embed as VALARM blocks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reminders: Vec<ReminderDraft>,
}

/// Partial update for an event; unset fields keep their current value.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPatch {
    /// Replacement title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Replacement start timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    /// Replacement end timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,

    /// Replacement description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Replacement location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Replacement all-day flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_day: Option<bool>,

    /// Replacement attendee list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<EmailAddress>>,
}

impl EventPatch {
    /// Is this patch empty, meaning no fields are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.all_day.is_none()
            && self.attendees.is_none()
    }

    /// Merges the patch over an existing event into a draft for rebuilding.
    ///
    /// Recurrence is carried separately (it stays a raw string on the event);
    /// reminders are carried over as drafts so their ids stay stable.
    #[must_use]
    pub fn merge_into(&self, existing: &Event) -> EventDraft {
        EventDraft {
            title: self.title.clone().unwrap_or_else(|| existing.title.clone()),
            start: self
                .start
                .clone()
                .or_else(|| existing.start.clone())
                .unwrap_or_default(),
            end: self
                .end
                .clone()
                .or_else(|| existing.end.clone())
                .unwrap_or_default(),
            description: self
                .description
                .clone()
                .or_else(|| existing.description.clone()),
            location: self.location.clone().or_else(|| existing.location.clone()),
            all_day: self.all_day.unwrap_or(existing.is_all_day),
            attendees: self
                .attendees
                .clone()
                .unwrap_or_else(|| existing.attendees.clone()),
            reminders: existing.reminders.iter().map(Reminder::to_draft).collect(),
        }
    }
}
