// SPDX-FileCopyrightText: 2026 davcal developers
//
// SPDX-License-Identifier: Apache-2.0

//! Calendar operations over a storage transport.
//!
//! Every operation fetches raw documents through the store, runs them
//! through the codec and, for writes, stores a brand-new document back at
//! the same href/etag. Scans over multiple calendars tolerate partial
//! failure: a calendar that cannot be fetched is logged and skipped, and an
//! operation only fails once its target is missing from every reachable
//! calendar.

use std::fmt;

use davcal_ical::attendee::{self, Invitation, InvitationResponse};
use davcal_ical::{Event, EventCodec, EventDraft, EventPatch, Recurrence, Reminder, ReminderDraft};
use jiff::{SignedDuration, Timestamp};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, ResourceKind};
use crate::store::{Calendar, CalendarObject, CalendarStore, StoreError, TimeRange};

/// Default query window when the caller gives no end date.
const DEFAULT_WINDOW: SignedDuration = SignedDuration::from_hours(30 * 24);

/// High-level calendar operations over a [`CalendarStore`].
pub struct CalendarService<S> {
    store: S,
    codec: EventCodec,
    config: Config,
}

impl<S> fmt::Debug for CalendarService<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarService")
            .field("codec", &self.codec)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: CalendarStore> CalendarService<S> {
    /// Creates a service over the given store.
    #[must_use]
    pub fn new(store: S, config: Config) -> Self {
        let codec = EventCodec::new(config.utc_offset.converter());
        Self {
            store,
            codec,
            config,
        }
    }

    /// The codec this service parses and builds documents with.
    #[must_use]
    pub const fn codec(&self) -> &EventCodec {
        &self.codec
    }

    /// Lists all calendar collections.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the transport fails.
    pub async fn list_calendars(&self) -> Result<Vec<Calendar>, Error> {
        self.store.list_calendars().await.map_err(store_error)
    }

    /// Lists events, optionally limited to one calendar and a date range.
    ///
    /// Date-only bounds are widened to whole days; without bounds the query
    /// covers the next 30 days. Calendars that fail to fetch are skipped.
    /// Results are sorted by start.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when a named calendar does not exist and
    /// [`Error::Store`] when the calendar listing itself fails.
    pub async fn list_events(
        &self,
        calendar: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<Event>, Error> {
        let calendars = self.list_calendars().await?;
        let targets: Vec<&Calendar> = match calendar {
            Some(id) => vec![
                find_calendar(&calendars, id)
                    .ok_or_else(|| Error::not_found(ResourceKind::Calendar, id))?,
            ],
            None => calendars.iter().collect(),
        };

        let range = self.time_range(start, end)?;
        let mut events = Vec::new();
        for cal in targets {
            match self.store.fetch_objects(cal, Some(range)).await {
                Ok(objects) => {
                    for obj in objects {
                        match self.parse_object(cal, &obj) {
                            Ok(event) => events.push(event),
                            Err(e) => tracing::debug!(
                                href = %obj.href,
                                error = %e,
                                "skipping unparsable calendar object"
                            ),
                        }
                    }
                }
                Err(e) => tracing::warn!(
                    calendar = %cal.name,
                    error = %e,
                    "failed to fetch calendar objects, skipping calendar"
                ),
            }
        }

        events.sort_by(|a, b| a.start.cmp(&b.start));
        Ok(events)
    }

    /// Gets one event by its UID, searching every calendar.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when no reachable calendar holds a
    /// document whose href contains the id.
    pub async fn get_event(&self, event_id: &str) -> Result<Event, Error> {
        let (cal, obj) = self.find_event(event_id).await?;
        self.parse_object(&cal, &obj)
    }

    /// Creates a new event and returns its generated UID.
    ///
    /// Without an explicit calendar the configured default is used, then
    /// the first collection that does not look like a task or fallback
    /// calendar.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the named calendar does not exist,
    /// [`Error::Ical`] when the draft's dates cannot be parsed and
    /// [`Error::Store`] when storing fails.
    pub async fn create_event(
        &self,
        calendar: Option<&str>,
        draft: &EventDraft,
    ) -> Result<String, Error> {
        self.create(calendar, draft, None).await
    }

    /// Creates a new recurring event and returns its generated UID.
    ///
    /// # Errors
    ///
    /// As [`Self::create_event`], plus [`Error::Ical`] when the recurrence
    /// end date cannot be parsed.
    pub async fn create_recurring_event(
        &self,
        calendar: Option<&str>,
        draft: &EventDraft,
        recurrence: &Recurrence,
    ) -> Result<String, Error> {
        let rrule = recurrence.to_rrule(self.codec.tz())?;
        self.create(calendar, draft, Some(&rrule)).await
    }

    /// Applies a partial update to an event.
    ///
    /// The old document is parsed, the patch merged over it, and a new
    /// document stored at the same href/etag. Recurrence and reminders are
    /// carried over; reminder ids stay stable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the event does not exist, plus the
    /// codec and store failure modes of a rebuild.
    pub async fn update_event(&self, event_id: &str, patch: &EventPatch) -> Result<Event, Error> {
        let (cal, obj) = self.find_event(event_id).await?;
        let existing = self.parse_object(&cal, &obj)?;

        let draft = patch.merge_into(&existing);
        let ics = self
            .codec
            .build(&draft, &existing.id, existing.recurrence.as_deref(), None)?;
        self.store
            .update_object(&cal, &obj.href, &obj.etag, &ics)
            .await
            .map_err(store_error)?;

        tracing::debug!(uid = %existing.id, calendar = %cal.name, "updated event");
        self.codec
            .parse(&ics, &cal.id, obj.href.as_str(), obj.etag.as_str())
            .map_err(Error::from)
    }

    /// Deletes an event by its UID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the event does not exist and
    /// [`Error::Store`] when deletion fails.
    pub async fn delete_event(&self, event_id: &str) -> Result<(), Error> {
        let (cal, obj) = self.find_event(event_id).await?;
        self.store
            .delete_object(&obj.href)
            .await
            .map_err(store_error)?;
        tracing::debug!(uid = event_id, calendar = %cal.name, "deleted event");
        Ok(())
    }

    /// Searches events whose title, description or location contains the
    /// query, case-insensitively.
    ///
    /// # Errors
    ///
    /// As [`Self::list_events`].
    pub async fn search_events(
        &self,
        query: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<Event>, Error> {
        let events = self.list_events(None, start, end).await?;
        let needle = query.to_lowercase();
        Ok(events
            .into_iter()
            .filter(|event| {
                event.title.to_lowercase().contains(&needle)
                    || event
                        .description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
                    || event
                        .location
                        .as_ref()
                        .is_some_and(|l| l.to_lowercase().contains(&needle))
            })
            .collect())
    }

    /// Adds a reminder to an existing event and returns the reminder's id.
    ///
    /// Existing reminders keep their ids; the document is rebuilt in place.
    ///
    /// # Errors
    ///
    /// As [`Self::update_event`].
    pub async fn add_reminder(
        &self,
        event_id: &str,
        draft: ReminderDraft,
    ) -> Result<String, Error> {
        let (cal, obj) = self.find_event(event_id).await?;
        let existing = self.parse_object(&cal, &obj)?;

        let mut draft = draft;
        let reminder_id = draft
            .id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();

        let mut reminders: Vec<ReminderDraft> =
            existing.reminders.iter().map(Reminder::to_draft).collect();
        reminders.push(draft);

        self.rebuild_with_reminders(&cal, &obj, &existing, &reminders)
            .await?;
        tracing::debug!(uid = %existing.id, reminder = %reminder_id, "added reminder");
        Ok(reminder_id)
    }

    /// Removes one reminder from an event, or all of them when
    /// `reminder_id` is `None`.
    ///
    /// Removing an id that matches nothing leaves the rest intact; the
    /// document is still rebuilt.
    ///
    /// # Errors
    ///
    /// As [`Self::update_event`].
    pub async fn remove_reminder(
        &self,
        event_id: &str,
        reminder_id: Option<&str>,
    ) -> Result<(), Error> {
        let (cal, obj) = self.find_event(event_id).await?;
        let existing = self.parse_object(&cal, &obj)?;

        let remaining: Vec<ReminderDraft> = match reminder_id {
            Some(rid) => existing
                .reminders
                .iter()
                .filter(|r| r.id != rid)
                .map(Reminder::to_draft)
                .collect(),
            None => Vec::new(),
        };

        self.rebuild_with_reminders(&cal, &obj, &existing, &remaining)
            .await?;
        tracing::debug!(uid = %existing.id, "removed reminder(s)");
        Ok(())
    }

    /// Lists an event's reminders.
    ///
    /// # Errors
    ///
    /// As [`Self::get_event`].
    pub async fn list_reminders(&self, event_id: &str) -> Result<Vec<Reminder>, Error> {
        Ok(self.get_event(event_id).await?.reminders)
    }

    /// Lists invitations: events that carry both an organizer and
    /// attendees, combined with the current user's participation status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] when the calendar listing fails; per
    /// calendar fetch failures are skipped.
    pub async fn list_invitations(&self) -> Result<Vec<Invitation>, Error> {
        let calendars = self.list_calendars().await?;
        let mut invitations = Vec::new();

        for cal in calendars {
            let objects = match self.store.fetch_objects(&cal, None).await {
                Ok(objects) => objects,
                Err(e) => {
                    tracing::warn!(
                        calendar = %cal.name,
                        error = %e,
                        "failed to fetch invitations, skipping calendar"
                    );
                    continue;
                }
            };

            for obj in objects {
                if !(obj.data.contains("ORGANIZER") && obj.data.contains("ATTENDEE")) {
                    continue;
                }
                let Ok(event) = self.parse_object(&cal, &obj) else {
                    continue;
                };
                let Some(organizer) = attendee::parse_organizer(&obj.data) else {
                    continue;
                };
                let my_status =
                    attendee::parse_attendee_status(&obj.data, self.config.account_email.as_deref());
                invitations.push(Invitation {
                    event_id: event.id,
                    calendar_id: cal.id.clone(),
                    title: event.title,
                    organizer,
                    start: event.start,
                    end: event.end,
                    description: event.description,
                    location: event.location,
                    my_status,
                });
            }
        }

        Ok(invitations)
    }

    /// Answers an invitation by patching PARTSTAT in the stored document.
    ///
    /// The raw text is patched in place, never re-serialized, so fields the
    /// codec does not model survive unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the event does not exist and
    /// [`Error::Store`] when storing the patched document fails.
    pub async fn respond_to_invitation(
        &self,
        event_id: &str,
        response: InvitationResponse,
    ) -> Result<(), Error> {
        let (cal, obj) = self.find_event(event_id).await?;
        let patched = attendee::apply_response(
            &obj.data,
            response,
            self.config.account_email.as_deref(),
        );
        self.store
            .update_object(&cal, &obj.href, &obj.etag, &patched)
            .await
            .map_err(store_error)?;
        tracing::debug!(uid = event_id, status = %response.status(), "responded to invitation");
        Ok(())
    }

    async fn create(
        &self,
        calendar: Option<&str>,
        draft: &EventDraft,
        rrule: Option<&str>,
    ) -> Result<String, Error> {
        let calendars = self.list_calendars().await?;
        let cal = self.choose_calendar(&calendars, calendar)?;

        let uid = Uuid::new_v4().to_string();
        let ics = self.codec.build(draft, &uid, rrule, None)?;
        self.store
            .create_object(cal, &format!("{uid}.ics"), &ics)
            .await
            .map_err(store_error)?;

        tracing::debug!(%uid, calendar = %cal.name, "created event");
        Ok(uid)
    }

    /// Scans every calendar for the object whose href contains the UID.
    async fn find_event(&self, event_id: &str) -> Result<(Calendar, CalendarObject), Error> {
        let calendars = self.list_calendars().await?;
        for cal in calendars {
            match self.store.fetch_objects(&cal, None).await {
                Ok(objects) => {
                    if let Some(obj) = objects
                        .into_iter()
                        .find(|o| o.href.as_str().contains(event_id))
                    {
                        return Ok((cal, obj));
                    }
                }
                Err(e) => tracing::warn!(
                    calendar = %cal.name,
                    error = %e,
                    "failed to search calendar, skipping"
                ),
            }
        }
        Err(Error::not_found(ResourceKind::Event, event_id))
    }

    fn parse_object(&self, cal: &Calendar, obj: &CalendarObject) -> Result<Event, Error> {
        self.codec
            .parse(&obj.data, &cal.id, obj.href.as_str(), obj.etag.as_str())
            .map_err(Error::from)
    }

    async fn rebuild_with_reminders(
        &self,
        cal: &Calendar,
        obj: &CalendarObject,
        existing: &Event,
        reminders: &[ReminderDraft],
    ) -> Result<(), Error> {
        let draft = EventPatch::default().merge_into(existing);
        let ics = self.codec.build(
            &draft,
            &existing.id,
            existing.recurrence.as_deref(),
            Some(reminders),
        )?;
        self.store
            .update_object(cal, &obj.href, &obj.etag, &ics)
            .await
            .map_err(store_error)
    }

    fn choose_calendar<'a>(
        &self,
        calendars: &'a [Calendar],
        requested: Option<&str>,
    ) -> Result<&'a Calendar, Error> {
        let requested = requested.or(self.config.default_calendar.as_deref());
        if let Some(id) = requested {
            return find_calendar(calendars, id)
                .ok_or_else(|| Error::not_found(ResourceKind::Calendar, id));
        }

        // Prefer a plain event calendar over task or fallback collections.
        calendars
            .iter()
            .find(|cal| {
                let name = cal.name.to_lowercase();
                !name.contains("task") && !name.contains("default")
            })
            .or_else(|| calendars.first())
            .ok_or_else(|| Error::not_found(ResourceKind::Calendar, "any"))
    }

    fn time_range(&self, start: Option<&str>, end: Option<&str>) -> Result<TimeRange, Error> {
        let tz = self.config.utc_offset.converter();

        let effective_start = start.map(widen_to_start_of_day);
        let effective_end = match (start, end) {
            (_, Some(e)) => Some(widen_to_end_of_day(e)),
            // A start without an end is a single-day query.
            (Some(s), None) => Some(widen_to_end_of_day(s.split('T').next().unwrap_or(s))),
            (None, None) => None,
        };

        let start_ts = match &effective_start {
            Some(s) => tz.to_utc(s)?,
            None => Timestamp::now(),
        };
        let end_ts = match &effective_end {
            Some(e) => tz.to_utc(e)?,
            None => Timestamp::now() + DEFAULT_WINDOW,
        };
        Ok(TimeRange {
            start: start_ts,
            end: end_ts,
        })
    }
}

fn find_calendar<'a>(calendars: &'a [Calendar], id: &str) -> Option<&'a Calendar> {
    calendars.iter().find(|c| c.id == id || c.name == id)
}

fn widen_to_start_of_day(bound: &str) -> String {
    if bound.contains('T') {
        bound.to_string()
    } else {
        format!("{bound}T00:00:00")
    }
}

fn widen_to_end_of_day(bound: &str) -> String {
    if bound.contains('T') {
        bound.to_string()
    } else {
        format!("{bound}T23:59:59")
    }
}

fn store_error(e: StoreError) -> Error {
    Error::Store(e.to_string())
}
