// SPDX-FileCopyrightText: 2026 davcal developers
//
// SPDX-License-Identifier: Apache-2.0

//! Building and scanning VALARM blocks.

use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

use crate::duration::{build_trigger, parse_trigger_minutes};
use crate::types::{Reminder, ReminderDraft};

/// Description written when a reminder draft carries none.
pub const DEFAULT_ALARM_DESCRIPTION: &str = "Event reminder";

/// Emits one `BEGIN:VALARM ... END:VALARM` block for a reminder draft.
///
/// The block carries the alarm id in a custom `X-WR-ALARMUID` line so a
/// specific alarm can later be targeted for removal.
#[must_use]
pub fn build_valarm(draft: &ReminderDraft, reminder_id: &str) -> String {
    let trigger = build_trigger(draft);
    let action = draft.action.as_ref().to_uppercase();
    let description = draft
        .description
        .as_deref()
        .unwrap_or(DEFAULT_ALARM_DESCRIPTION);

    format!(
        "BEGIN:VALARM\n\
         ACTION:{action}\n\
         TRIGGER:{trigger}\n\
         DESCRIPTION:{description}\n\
         X-WR-ALARMUID:{reminder_id}\n\
         END:VALARM"
    )
}

/// Scans a whole document for VALARM blocks and decodes each into a
/// [`Reminder`].
///
/// Returned reminders match the number and order of blocks in the source,
/// except that a block without a TRIGGER line is treated as malformed and
/// dropped. A block without an `X-WR-ALARMUID` gets a fresh random id so it
/// is still addressable in memory.
#[must_use]
pub fn parse_valarms(document: &str) -> Vec<Reminder> {
    const BLOCK_RE: &str = r"(?s)BEGIN:VALARM.*?END:VALARM";
    static BLOCK: OnceLock<Regex> = OnceLock::new();
    let re = BLOCK.get_or_init(|| Regex::new(BLOCK_RE).unwrap());

    let mut reminders = Vec::new();
    for block in re.find_iter(document) {
        let mut trigger = None;
        let mut action = None;
        let mut description = None;
        let mut id = None;

        for line in block.as_str().lines() {
            let line = line.trim();
            if let Some(value) = line.strip_prefix("TRIGGER:") {
                trigger = Some(value.to_string());
            } else if let Some(value) = line.strip_prefix("ACTION:") {
                action = value.parse().ok();
            } else if let Some(value) = line.strip_prefix("DESCRIPTION:") {
                description = Some(value.to_string());
            } else if let Some(value) = line.strip_prefix("X-WR-ALARMUID:") {
                id = Some(value.to_string());
            }
        }

        let Some(trigger) = trigger else { continue };
        let minutes_before = parse_trigger_minutes(&trigger);
        reminders.push(Reminder {
            id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            trigger,
            minutes_before,
            action: action.unwrap_or_default(),
            description,
        });
    }
    reminders
}
