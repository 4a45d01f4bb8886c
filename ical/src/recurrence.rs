// SPDX-FileCopyrightText: 2026 davcal developers
//
// SPDX-License-Identifier: Apache-2.0

//! RRULE generation.
//!
//! Generation only: parsed events carry their RRULE as an opaque string and
//! never interpret it.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IcalError;
use crate::timezone::{TzConverter, format_ical_date};

/// How often a recurring event repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Repeats every day.
    Daily,

    /// Repeats every week.
    Weekly,

    /// Repeats every month.
    Monthly,

    /// Repeats every year.
    Yearly,
}

const FREQ_DAILY: &str = "DAILY";
const FREQ_WEEKLY: &str = "WEEKLY";
const FREQ_MONTHLY: &str = "MONTHLY";
const FREQ_YEARLY: &str = "YEARLY";

impl AsRef<str> for Frequency {
    fn as_ref(&self) -> &str {
        match self {
            Frequency::Daily => FREQ_DAILY,
            Frequency::Weekly => FREQ_WEEKLY,
            Frequency::Monthly => FREQ_MONTHLY,
            Frequency::Yearly => FREQ_YEARLY,
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl FromStr for Frequency {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_uppercase().as_str() {
            FREQ_DAILY => Ok(Frequency::Daily),
            FREQ_WEEKLY => Ok(Frequency::Weekly),
            FREQ_MONTHLY => Ok(Frequency::Monthly),
            FREQ_YEARLY => Ok(Frequency::Yearly),
            _ => Err(()),
        }
    }
}

/// Description of a recurrence, turned into an RRULE value on build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    /// Repeat frequency.
    pub frequency: Frequency,

    /// Stop after this many occurrences. Takes precedence over `until`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    /// Last local date (`YYYY-MM-DD`) on which the event may occur.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
}

impl Recurrence {
    /// Creates a recurrence with neither count nor end date.
    #[must_use]
    pub const fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            count: None,
            until: None,
        }
    }

    /// Renders the RRULE value: `FREQ=...` plus at most one of `COUNT` and
    /// `UNTIL`.
    ///
    /// `until` is taken as the end of that day in local time and converted
    /// to a compact UTC date-time through the given converter.
    ///
    /// # Errors
    ///
    /// Returns [`IcalError::MalformedDate`] if `until` is not a date.
    pub fn to_rrule(&self, tz: &TzConverter) -> Result<String, IcalError> {
        let mut rrule = format!("FREQ={}", self.frequency.as_ref());
        if let Some(count) = self.count {
            rrule.push_str(&format!(";COUNT={count}"));
        } else if let Some(until) = &self.until {
            let instant = tz.to_utc(&format!("{until}T23:59:59"))?;
            rrule.push_str(&format!(";UNTIL={}", format_ical_date(instant, false)));
        }
        Ok(rrule)
    }
}
