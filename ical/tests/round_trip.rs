// SPDX-FileCopyrightText: 2026 davcal developers
//
// SPDX-License-Identifier: Apache-2.0

//! Build/parse round-trip tests over whole documents.

use davcal_ical::{EmailAddress, EventCodec, EventDraft, ReminderAction, ReminderDraft};

fn codec() -> EventCodec {
    EventCodec::default()
}

fn timed_draft() -> EventDraft {
    EventDraft {
        title: "Architecture review".to_string(),
        start: "2024-03-01T09:00:00".to_string(),
        end: "2024-03-01T10:30:00".to_string(),
        description: Some("Quarterly deep dive".to_string()),
        location: Some("Room 4".to_string()),
        ..Default::default()
    }
}

#[test]
fn timed_event_round_trips() {
    let codec = codec();
    let draft = timed_draft();
    let ics = codec.build(&draft, "uid-1", None, None).unwrap();
    let event = codec.parse(&ics, "cal-1", "/cal/uid-1.ics", "\"1\"").unwrap();

    assert_eq!(event.id, "uid-1");
    assert_eq!(event.title, "Architecture review");
    assert_eq!(event.description.as_deref(), Some("Quarterly deep dive"));
    assert_eq!(event.location.as_deref(), Some("Room 4"));
    assert_eq!(event.start.as_deref(), Some("2024-03-01T09:00:00+07:00"));
    assert_eq!(event.end.as_deref(), Some("2024-03-01T10:30:00+07:00"));
    assert!(!event.is_all_day);
    assert!(event.reminders.is_empty());
}

#[test]
fn all_day_event_round_trips_as_bare_dates() {
    let codec = codec();
    let draft = EventDraft {
        title: "Conference".to_string(),
        start: "2024-03-01".to_string(),
        end: "2024-03-02".to_string(),
        all_day: true,
        ..Default::default()
    };
    let ics = codec.build(&draft, "uid-2", None, None).unwrap();
    assert!(ics.contains("DTSTART;VALUE=DATE:20240301"));
    assert!(ics.contains("DTEND;VALUE=DATE:20240302"));

    let event = codec.parse(&ics, "cal-1", "/cal/uid-2.ics", "\"1\"").unwrap();
    assert!(event.is_all_day);
    // The exact dates survive: no offset shift, no time-of-day component.
    assert_eq!(event.start.as_deref(), Some("2024-03-01"));
    assert_eq!(event.end.as_deref(), Some("2024-03-02"));
}

#[test]
fn reminders_round_trip_with_matching_cardinality() {
    let codec = codec();
    let mut draft = timed_draft();
    draft.reminders = vec![
        ReminderDraft {
            minutes_before: 15,
            ..Default::default()
        },
        ReminderDraft {
            hours_before: 1,
            action: ReminderAction::Email,
            description: Some("Send agenda".to_string()),
            ..Default::default()
        },
        ReminderDraft {
            days_before: 1,
            action: ReminderAction::Audio,
            ..Default::default()
        },
    ];

    let ics = codec.build(&draft, "uid-3", None, None).unwrap();
    let event = codec.parse(&ics, "cal-1", "/cal/uid-3.ics", "\"1\"").unwrap();

    assert_eq!(event.reminders.len(), 3);
    assert_eq!(event.reminders[0].minutes_before, 15);
    assert_eq!(event.reminders[1].minutes_before, 60);
    assert_eq!(event.reminders[2].minutes_before, 1440);

    assert_eq!(event.reminders[0].action, ReminderAction::Display);
    assert_eq!(event.reminders[1].action, ReminderAction::Email);
    assert_eq!(event.reminders[2].action, ReminderAction::Audio);

    assert_eq!(event.reminders[0].description.as_deref(), Some("Event reminder"));
    assert_eq!(event.reminders[1].description.as_deref(), Some("Send agenda"));

    // Every alarm id is present and unique.
    let mut ids: Vec<_> = event.reminders.iter().map(|r| r.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[test]
fn reminder_ids_stay_stable_across_rebuilds() {
    let codec = codec();
    let mut draft = timed_draft();
    draft.reminders = vec![ReminderDraft {
        minutes_before: 15,
        ..Default::default()
    }];

    let ics = codec.build(&draft, "uid-4", None, None).unwrap();
    let event = codec.parse(&ics, "cal-1", "/cal/uid-4.ics", "\"1\"").unwrap();
    let first_id = event.reminders[0].id.clone();

    // Rebuild the way an update does: reminders carried over as drafts.
    let drafts: Vec<_> = event.reminders.iter().map(|r| r.to_draft()).collect();
    let rebuilt = codec.build(&draft, "uid-4", None, Some(&drafts)).unwrap();
    let reparsed = codec
        .parse(&rebuilt, "cal-1", "/cal/uid-4.ics", "\"2\"")
        .unwrap();

    assert_eq!(reparsed.reminders.len(), 1);
    assert_eq!(reparsed.reminders[0].id, first_id);
}

#[test]
fn recurrence_survives_round_trip_as_raw_string() {
    let codec = codec();
    let draft = timed_draft();
    let ics = codec
        .build(&draft, "uid-5", Some("FREQ=DAILY;COUNT=3"), None)
        .unwrap();
    let event = codec.parse(&ics, "cal-1", "/cal/uid-5.ics", "\"1\"").unwrap();
    assert_eq!(event.recurrence.as_deref(), Some("FREQ=DAILY;COUNT=3"));
}

#[test]
fn attendees_are_written_but_not_parsed_back() {
    let codec = codec();
    let mut draft = timed_draft();
    draft.attendees = vec![EmailAddress {
        email: "alice@example.com".to_string(),
        name: Some("Alice".to_string()),
    }];

    let ics = codec.build(&draft, "uid-6", None, None).unwrap();
    assert!(ics.contains("ATTENDEE;CN=\"Alice\":mailto:alice@example.com"));

    // Participation state lives in the raw text, not on the record.
    let event = codec.parse(&ics, "cal-1", "/cal/uid-6.ics", "\"1\"").unwrap();
    assert!(event.attendees.is_empty());
}
