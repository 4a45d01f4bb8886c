// SPDX-FileCopyrightText: 2026 davcal developers
//
// SPDX-License-Identifier: Apache-2.0

//! Relative alarm trigger durations: `[-]P[nD][T[nH][nM]]`.
//!
//! Only day, hour and minute components are handled; weeks, months and
//! seconds never occur in documents this system writes.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::ReminderDraft;

/// Minutes used when a reminder draft specifies no lead time at all.
pub const DEFAULT_TRIGGER_MINUTES: i64 = 15;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Parses a trigger duration into a signed minute count.
///
/// Sign convention, preserved for compatibility with stored data: a literal
/// leading `-` (the common "fires before the event" case) yields a
/// *positive* minute count; a duration without one yields a *negative*
/// count. Component text that fails to parse contributes zero rather than
/// failing, so garbage input degrades to `0`.
#[must_use]
pub fn parse_trigger_minutes(trigger: &str) -> i64 {
    const DAY_RE: &str = r"P(\d+)D";
    const HOUR_RE: &str = r"(\d+)H";
    const MINUTE_RE: &str = r"(\d+)M";
    static DAY: OnceLock<Regex> = OnceLock::new();
    static HOUR: OnceLock<Regex> = OnceLock::new();
    static MINUTE: OnceLock<Regex> = OnceLock::new();

    let before = trigger.starts_with('-');
    let clean = trigger.strip_prefix('-').unwrap_or(trigger);

    let mut minutes: i64 = 0;

    let day = DAY.get_or_init(|| Regex::new(DAY_RE).unwrap());
    if let Some(captures) = day.captures(clean)
        && let Ok(n) = captures[1].parse::<i64>()
    {
        minutes += n * MINUTES_PER_DAY;
    }

    let hour = HOUR.get_or_init(|| Regex::new(HOUR_RE).unwrap());
    if let Some(captures) = hour.captures(clean)
        && let Ok(n) = captures[1].parse::<i64>()
    {
        minutes += n * 60;
    }

    let minute = MINUTE.get_or_init(|| Regex::new(MINUTE_RE).unwrap());
    if let Some(captures) = minute.captures(clean)
        && let Ok(n) = captures[1].parse::<i64>()
    {
        minutes += n;
    }

    if before { minutes } else { -minutes }
}

/// Builds a trigger duration string from a reminder draft.
///
/// The day, hour and minute lead times are summed; a zero total falls back
/// to [`DEFAULT_TRIGGER_MINUTES`]. The result always carries the leading
/// `-P`, and zero components are omitted.
#[must_use]
pub fn build_trigger(draft: &ReminderDraft) -> String {
    let mut total = i64::from(draft.days_before) * MINUTES_PER_DAY
        + i64::from(draft.hours_before) * 60
        + i64::from(draft.minutes_before);
    if total == 0 {
        total = DEFAULT_TRIGGER_MINUTES;
    }

    let days = total / MINUTES_PER_DAY;
    let hours = (total % MINUTES_PER_DAY) / 60;
    let minutes = total % 60;

    let mut trigger = String::from("-P");
    if days > 0 {
        trigger.push_str(&format!("{days}D"));
    }
    if hours > 0 || minutes > 0 {
        trigger.push('T');
        if hours > 0 {
            trigger.push_str(&format!("{hours}H"));
        }
        if minutes > 0 {
            trigger.push_str(&format!("{minutes}M"));
        }
    }
    trigger
}
