// SPDX-FileCopyrightText: 2026 davcal developers
//
// SPDX-License-Identifier: Apache-2.0

//! The bidirectional mapping between [`Event`] records and VCALENDAR/VEVENT
//! documents.
//!
//! Parsing is a line scanner over a fixed table of recognized prefixes, not
//! a grammar. It handles this system's own output reliably; foreign
//! documents are treated defensively, with unrecognized lines ignored
//! rather than rejected.

use uuid::Uuid;

use crate::alarm;
use crate::error::IcalError;
use crate::timezone::{TzConverter, format_ical_date, format_local_date};
use crate::types::{Event, EventDraft, ReminderDraft};

/// PRODID written into every generated document.
pub const PRODID: &str = "-//davcal//EN";

/// Encodes and decodes calendar event documents at a fixed UTC offset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EventCodec {
    tz: TzConverter,
}

impl EventCodec {
    /// Creates a codec using the given timezone converter.
    #[must_use]
    pub const fn new(tz: TzConverter) -> Self {
        Self { tz }
    }

    /// The timezone converter this codec formats and parses dates with.
    #[must_use]
    pub const fn tz(&self) -> &TzConverter {
        &self.tz
    }

    /// Parses a document into an [`Event`] record.
    ///
    /// Only lines between `BEGIN:VEVENT` and `END:VEVENT` are scanned;
    /// scanning stops at the first `END:VEVENT`, so exactly one VEVENT per
    /// document is supported. When the same property appears twice the last
    /// occurrence wins. A `VALUE=DATE` DTSTART marks the whole event
    /// all-day. VALARM blocks are collected over the entire document.
    /// Date values that fail to parse leave their field unset.
    ///
    /// # Errors
    ///
    /// Returns [`IcalError::NoVEvent`] when the document has no VEVENT
    /// block and [`IcalError::MissingUid`] when the block carries no UID.
    pub fn parse(
        &self,
        document: &str,
        calendar_id: &str,
        url: &str,
        etag: &str,
    ) -> Result<Event, IcalError> {
        let mut in_event = false;
        let mut seen_event = false;

        let mut id = None;
        let mut title = None;
        let mut description = None;
        let mut location = None;
        let mut start = None;
        let mut end = None;
        let mut recurrence = None;
        let mut is_all_day = false;

        for line in document.lines() {
            let line = line.trim();
            if line == "BEGIN:VEVENT" {
                in_event = true;
                seen_event = true;
                continue;
            }
            if line == "END:VEVENT" {
                break;
            }
            if !in_event {
                continue;
            }

            if let Some(value) = line.strip_prefix("UID:") {
                id = Some(value.to_string());
            } else if let Some(value) = line.strip_prefix("SUMMARY:") {
                title = Some(value.to_string());
            } else if let Some(value) = line.strip_prefix("DESCRIPTION:") {
                description = Some(value.to_string());
            } else if let Some(value) = line.strip_prefix("LOCATION:") {
                location = Some(value.to_string());
            } else if let Some(value) = line.strip_prefix("DTSTART;VALUE=DATE:") {
                is_all_day = true;
                start = self.tz.parse_ical_date(value, true).ok();
            } else if let Some(value) = line.strip_prefix("DTSTART:") {
                start = self.tz.parse_ical_date(value, false).ok();
            } else if let Some(value) = line.strip_prefix("DTEND;VALUE=DATE:") {
                end = self.tz.parse_ical_date(value, true).ok();
            } else if let Some(value) = line.strip_prefix("DTEND:") {
                end = self.tz.parse_ical_date(value, false).ok();
            } else if let Some(value) = line.strip_prefix("RRULE:") {
                recurrence = Some(value.to_string());
            }
        }

        if !seen_event {
            return Err(IcalError::NoVEvent);
        }
        let id = id.ok_or(IcalError::MissingUid)?;

        Ok(Event {
            id,
            calendar_id: calendar_id.to_string(),
            url: url.to_string(),
            etag: etag.to_string(),
            title: title.unwrap_or_default(),
            description,
            location,
            start,
            end,
            is_all_day,
            recurrence,
            attendees: Vec::new(),
            reminders: alarm::parse_valarms(document),
        })
    }

    /// Builds a complete VCALENDAR document from a draft.
    ///
    /// `reminders`, when given, replaces the draft's own reminder list.
    /// Reminder drafts that carry an id keep it; the rest get a fresh
    /// random one.
    ///
    /// # Errors
    ///
    /// Returns [`IcalError::MalformedDate`] if the draft's start or end is
    /// not a parseable local timestamp.
    pub fn build(
        &self,
        draft: &EventDraft,
        uid: &str,
        recurrence: Option<&str>,
        reminders: Option<&[ReminderDraft]>,
    ) -> Result<String, IcalError> {
        let mut ics = format!(
            "BEGIN:VCALENDAR\n\
             VERSION:2.0\n\
             PRODID:{PRODID}\n\
             CALSCALE:GREGORIAN\n\
             BEGIN:VEVENT\n\
             UID:{uid}\n"
        );

        if draft.all_day {
            // A calendar date, not an instant: no UTC conversion, or the
            // date shifts across the offset.
            ics.push_str(&format!(
                "DTSTART;VALUE=DATE:{}\nDTEND;VALUE=DATE:{}\n",
                format_local_date(&draft.start)?,
                format_local_date(&draft.end)?
            ));
        } else {
            let start = self.tz.to_utc(&draft.start)?;
            let end = self.tz.to_utc(&draft.end)?;
            ics.push_str(&format!(
                "DTSTART:{}\nDTEND:{}\n",
                format_ical_date(start, false),
                format_ical_date(end, false)
            ));
        }

        ics.push_str(&format!("SUMMARY:{}\n", draft.title));

        if let Some(description) = &draft.description {
            ics.push_str(&format!("DESCRIPTION:{description}\n"));
        }
        if let Some(location) = &draft.location {
            ics.push_str(&format!("LOCATION:{location}\n"));
        }
        if let Some(rrule) = recurrence {
            ics.push_str(&format!("RRULE:{rrule}\n"));
        }

        for attendee in &draft.attendees {
            match &attendee.name {
                Some(name) => ics.push_str(&format!(
                    "ATTENDEE;CN=\"{name}\":mailto:{}\n",
                    attendee.email
                )),
                None => ics.push_str(&format!("ATTENDEE;mailto:{}\n", attendee.email)),
            }
        }

        for reminder in reminders.unwrap_or(&draft.reminders) {
            let reminder_id = reminder
                .id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            ics.push_str(&alarm::build_valarm(reminder, &reminder_id));
            ics.push('\n');
        }

        ics.push_str(
            "STATUS:CONFIRMED\n\
             SEQUENCE:0\n\
             END:VEVENT\n\
             END:VCALENDAR",
        );
        Ok(ics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_requires_a_vevent_block() {
        let codec = EventCodec::default();
        let err = codec
            .parse("BEGIN:VCALENDAR\nEND:VCALENDAR", "cal", "/x.ics", "\"1\"")
            .unwrap_err();
        assert!(matches!(err, IcalError::NoVEvent));
    }

    #[test]
    fn parse_requires_a_uid() {
        let codec = EventCodec::default();
        let doc = "BEGIN:VEVENT\nSUMMARY:No uid here\nEND:VEVENT";
        let err = codec.parse(doc, "cal", "/x.ics", "\"1\"").unwrap_err();
        assert!(matches!(err, IcalError::MissingUid));
    }

    #[test]
    fn last_duplicate_property_wins() {
        let codec = EventCodec::default();
        let doc = "BEGIN:VEVENT\n\
                   UID:u1\n\
                   SUMMARY:First\n\
                   SUMMARY:Second\n\
                   END:VEVENT";
        let event = codec.parse(doc, "cal", "/u1.ics", "\"1\"").unwrap();
        assert_eq!(event.title, "Second");
    }

    #[test]
    fn lines_after_end_vevent_are_ignored() {
        let codec = EventCodec::default();
        let doc = "BEGIN:VEVENT\n\
                   UID:u1\n\
                   SUMMARY:Inside\n\
                   END:VEVENT\n\
                   SUMMARY:Outside\n";
        let event = codec.parse(doc, "cal", "/u1.ics", "\"1\"").unwrap();
        assert_eq!(event.title, "Inside");
    }

    #[test]
    fn malformed_dates_leave_fields_unset() {
        let codec = EventCodec::default();
        let doc = "BEGIN:VEVENT\n\
                   UID:u1\n\
                   SUMMARY:Bad dates\n\
                   DTSTART:garbage\n\
                   DTEND:20240301T020000Z\n\
                   END:VEVENT";
        let event = codec.parse(doc, "cal", "/u1.ics", "\"1\"").unwrap();
        assert_eq!(event.start, None);
        assert_eq!(event.end.as_deref(), Some("2024-03-01T09:00:00+07:00"));
    }

    #[test]
    fn unrecognized_lines_are_ignored() {
        let codec = EventCodec::default();
        let doc = "BEGIN:VEVENT\n\
                   UID:u1\n\
                   SUMMARY:Meeting\n\
                   X-CUSTOM:whatever\n\
                   TRANSP:OPAQUE\n\
                   END:VEVENT";
        let event = codec.parse(doc, "cal", "/u1.ics", "\"1\"").unwrap();
        assert_eq!(event.title, "Meeting");
    }

    #[test]
    fn carries_transport_identity_through() {
        let codec = EventCodec::default();
        let doc = "BEGIN:VEVENT\nUID:u1\nSUMMARY:S\nEND:VEVENT";
        let event = codec
            .parse(doc, "cal-7", "/cal/u1.ics", "\"etag-9\"")
            .unwrap();
        assert_eq!(event.calendar_id, "cal-7");
        assert_eq!(event.url, "/cal/u1.ics");
        assert_eq!(event.etag, "\"etag-9\"");
    }

    #[test]
    fn build_rejects_unparseable_dates() {
        let codec = EventCodec::default();
        let draft = EventDraft {
            title: "Broken".to_string(),
            start: "not a date".to_string(),
            end: "also not".to_string(),
            ..Default::default()
        };
        assert!(codec.build(&draft, "u1", None, None).is_err());
    }

    #[test]
    fn build_emits_fixed_header_and_footer() {
        let codec = EventCodec::default();
        let draft = EventDraft {
            title: "Meeting".to_string(),
            start: "2024-03-01T09:00:00".to_string(),
            end: "2024-03-01T10:00:00".to_string(),
            ..Default::default()
        };
        let ics = codec.build(&draft, "u1", None, None).unwrap();
        assert!(ics.starts_with(
            "BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:-//davcal//EN\nCALSCALE:GREGORIAN\nBEGIN:VEVENT\nUID:u1\n"
        ));
        assert!(ics.ends_with("STATUS:CONFIRMED\nSEQUENCE:0\nEND:VEVENT\nEND:VCALENDAR"));
        assert!(ics.contains("DTSTART:20240301T020000Z\nDTEND:20240301T030000Z\n"));
    }

    #[test]
    fn build_writes_all_day_dates_without_offset_shift() {
        let codec = EventCodec::default();
        let draft = EventDraft {
            title: "Conference".to_string(),
            start: "2024-03-01".to_string(),
            end: "2024-03-02".to_string(),
            all_day: true,
            ..Default::default()
        };
        let ics = codec.build(&draft, "u1", None, None).unwrap();
        assert!(ics.contains("DTSTART;VALUE=DATE:20240301\n"));
        assert!(ics.contains("DTEND;VALUE=DATE:20240302\n"));
    }

    #[test]
    fn build_formats_attendees_with_and_without_names() {
        use crate::types::EmailAddress;

        let codec = EventCodec::default();
        let draft = EventDraft {
            title: "Sync".to_string(),
            start: "2024-03-01T09:00:00".to_string(),
            end: "2024-03-01T10:00:00".to_string(),
            attendees: vec![
                EmailAddress {
                    email: "alice@example.com".to_string(),
                    name: Some("Alice".to_string()),
                },
                EmailAddress {
                    email: "dave@example.com".to_string(),
                    name: None,
                },
            ],
            ..Default::default()
        };
        let ics = codec.build(&draft, "u1", None, None).unwrap();
        assert!(ics.contains("ATTENDEE;CN=\"Alice\":mailto:alice@example.com\n"));
        assert!(ics.contains("ATTENDEE;mailto:dave@example.com\n"));
    }

    #[test]
    fn build_includes_rrule_when_given() {
        let codec = EventCodec::default();
        let draft = EventDraft {
            title: "Weekly".to_string(),
            start: "2024-03-01T09:00:00".to_string(),
            end: "2024-03-01T10:00:00".to_string(),
            ..Default::default()
        };
        let ics = codec
            .build(&draft, "u1", Some("FREQ=WEEKLY;COUNT=4"), None)
            .unwrap();
        assert!(ics.contains("RRULE:FREQ=WEEKLY;COUNT=4\n"));
    }
}
