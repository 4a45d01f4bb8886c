// SPDX-FileCopyrightText: 2026 davcal developers
//
// SPDX-License-Identifier: Apache-2.0

//! Attendee participation status: extraction and in-place patching.
//!
//! Invitations are answered by rewriting PARTSTAT inside the raw document
//! instead of a full parse/rebuild pass, so unmodeled lines survive
//! untouched.

use std::fmt::Display;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::EmailAddress;

/// An attendee's participation status (the PARTSTAT parameter).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParticipationStatus {
    /// No answer yet.
    #[default]
    NeedsAction,

    /// The attendee accepted.
    Accepted,

    /// The attendee declined.
    Declined,

    /// The attendee answered "maybe".
    Tentative,
}

const PARTSTAT_NEEDS_ACTION: &str = "needs-action";
const PARTSTAT_ACCEPTED: &str = "accepted";
const PARTSTAT_DECLINED: &str = "declined";
const PARTSTAT_TENTATIVE: &str = "tentative";

impl ParticipationStatus {
    /// The upper-case wire form used in ATTENDEE lines.
    #[must_use]
    pub const fn partstat(self) -> &'static str {
        match self {
            ParticipationStatus::NeedsAction => "NEEDS-ACTION",
            ParticipationStatus::Accepted => "ACCEPTED",
            ParticipationStatus::Declined => "DECLINED",
            ParticipationStatus::Tentative => "TENTATIVE",
        }
    }
}

impl AsRef<str> for ParticipationStatus {
    fn as_ref(&self) -> &str {
        match self {
            ParticipationStatus::NeedsAction => PARTSTAT_NEEDS_ACTION,
            ParticipationStatus::Accepted => PARTSTAT_ACCEPTED,
            ParticipationStatus::Declined => PARTSTAT_DECLINED,
            ParticipationStatus::Tentative => PARTSTAT_TENTATIVE,
        }
    }
}

impl Display for ParticipationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl FromStr for ParticipationStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            PARTSTAT_NEEDS_ACTION => Ok(ParticipationStatus::NeedsAction),
            PARTSTAT_ACCEPTED => Ok(ParticipationStatus::Accepted),
            PARTSTAT_DECLINED => Ok(ParticipationStatus::Declined),
            PARTSTAT_TENTATIVE => Ok(ParticipationStatus::Tentative),
            _ => Err(()),
        }
    }
}

/// The answer given to an invitation. Any status may move to any other;
/// there is no transition guard and no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationResponse {
    /// Accept the invitation.
    Accept,

    /// Decline the invitation.
    Decline,

    /// Answer "maybe".
    Tentative,
}

impl InvitationResponse {
    /// The participation status this response maps to.
    #[must_use]
    pub const fn status(self) -> ParticipationStatus {
        match self {
            InvitationResponse::Accept => ParticipationStatus::Accepted,
            InvitationResponse::Decline => ParticipationStatus::Declined,
            InvitationResponse::Tentative => ParticipationStatus::Tentative,
        }
    }
}

/// A read-only invitation view: an event's identity and time fields
/// combined with its organizer and the current user's participation status,
/// both recovered from the raw document rather than stored on the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    /// UID of the underlying event.
    pub event_id: String,

    /// Identifier of the owning calendar collection.
    pub calendar_id: String,

    /// Event title.
    pub title: String,

    /// Who sent the invitation.
    pub organizer: EmailAddress,

    /// Local start timestamp, if the document carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    /// Local end timestamp, if the document carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,

    /// Event description, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Event location, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// The current user's participation status.
    pub my_status: ParticipationStatus,
}

/// Extracts the ORGANIZER line from a document, if present.
#[must_use]
pub fn parse_organizer(document: &str) -> Option<EmailAddress> {
    const RE: &str = r#"(?i)ORGANIZER(?:;CN="?([^":]*)"?)?:mailto:([^\r\n]+)"#;
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let re = REGEX.get_or_init(|| Regex::new(RE).unwrap());

    re.captures(document).map(|captures| EmailAddress {
        email: captures[2].to_string(),
        name: captures
            .get(1)
            .map(|m| m.as_str().to_string())
            .filter(|name| !name.is_empty()),
    })
}

/// Recovers the current user's participation status from a document.
///
/// When `user_email` is given, the ATTENDEE line carrying that address is
/// consulted. Without it (or when no line matches) the first PARTSTAT found
/// on any attendee line is used, which conflates "my" status with "any"
/// attendee's when there are several. Unknown or absent values default to
/// needs-action.
#[must_use]
pub fn parse_attendee_status(document: &str, user_email: Option<&str>) -> ParticipationStatus {
    if let Some(email) = user_email {
        let needle = email.to_lowercase();
        for line in document.lines() {
            let line = line.trim();
            if line.starts_with("ATTENDEE") && line.to_lowercase().contains(&needle) {
                return partstat_in(line).unwrap_or_default();
            }
        }
    }

    const RE: &str = r"(?i)ATTENDEE[^:]*PARTSTAT=([^;:\r\n]+)";
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let re = REGEX.get_or_init(|| Regex::new(RE).unwrap());

    re.captures(document)
        .and_then(|captures| captures[1].parse().ok())
        .unwrap_or_default()
}

/// Rewrites participation status inside the raw document text.
///
/// When `user_email` matches an ATTENDEE line, only the lines carrying that
/// address are patched. Otherwise every attendee line is rewritten
/// identically, matching the historical behavior. Lines without a PARTSTAT
/// get one inserted immediately before `:mailto:`; all other parameters are
/// left exactly as they were.
#[must_use]
pub fn apply_response(
    document: &str,
    response: InvitationResponse,
    user_email: Option<&str>,
) -> String {
    let partstat = response.status().partstat();

    if let Some(email) = user_email {
        let needle = email.to_lowercase();
        let is_mine = |line: &str| {
            let trimmed = line.trim();
            trimmed.starts_with("ATTENDEE") && trimmed.to_lowercase().contains(&needle)
        };
        if document.lines().any(is_mine) {
            return document
                .split('\n')
                .map(|line| {
                    if is_mine(line) {
                        patch_attendee_line(line, partstat)
                    } else {
                        line.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");
        }
    }

    const REWRITE_RE: &str = r"(?i)ATTENDEE([^:]*?)PARTSTAT=[^;:\r\n]+";
    static REWRITE: OnceLock<Regex> = OnceLock::new();
    let re = REWRITE.get_or_init(|| Regex::new(REWRITE_RE).unwrap());
    let patched = re
        .replace_all(document, format!("ATTENDEE${{1}}PARTSTAT={partstat}"))
        .into_owned();

    if patched.contains(&format!("PARTSTAT={partstat}")) {
        return patched;
    }

    const INSERT_RE: &str = r"(?i)ATTENDEE([^:]*):mailto:";
    static INSERT: OnceLock<Regex> = OnceLock::new();
    let re = INSERT.get_or_init(|| Regex::new(INSERT_RE).unwrap());
    re.replace_all(&patched, format!("ATTENDEE${{1}};PARTSTAT={partstat}:mailto:"))
        .into_owned()
}

/// Extracts the PARTSTAT value from a single attendee line, if any.
fn partstat_in(line: &str) -> Option<ParticipationStatus> {
    const RE: &str = r"(?i)PARTSTAT=([^;:\r\n]+)";
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let re = REGEX.get_or_init(|| Regex::new(RE).unwrap());
    re.captures(line)
        .and_then(|captures| captures[1].parse().ok())
}

fn patch_attendee_line(line: &str, partstat: &str) -> String {
    const PARTSTAT_RE: &str = r"(?i)PARTSTAT=[^;:\r\n]+";
    static REWRITE: OnceLock<Regex> = OnceLock::new();
    let re = REWRITE.get_or_init(|| Regex::new(PARTSTAT_RE).unwrap());
    if re.is_match(line) {
        return re
            .replace(line, format!("PARTSTAT={partstat}"))
            .into_owned();
    }

    const MAILTO_RE: &str = r"(?i)^(\s*ATTENDEE[^:]*):mailto:";
    static INSERT: OnceLock<Regex> = OnceLock::new();
    let re = INSERT.get_or_init(|| Regex::new(MAILTO_RE).unwrap());
    re.replace(line, format!("${{1}};PARTSTAT={partstat}:mailto:"))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVITE: &str = "BEGIN:VCALENDAR\n\
                          BEGIN:VEVENT\n\
                          UID:inv-1\n\
                          ORGANIZER;CN=\"Bob\":mailto:bob@example.com\n\
                          ATTENDEE;CN=\"Alice\":mailto:alice@example.com\n\
                          ATTENDEE;CN=\"Carol\";PARTSTAT=DECLINED:mailto:carol@example.com\n\
                          END:VEVENT\n\
                          END:VCALENDAR";

    #[test]
    fn organizer_with_name() {
        let organizer = parse_organizer(INVITE).unwrap();
        assert_eq!(organizer.email, "bob@example.com");
        assert_eq!(organizer.name.as_deref(), Some("Bob"));
    }

    #[test]
    fn organizer_without_name() {
        let doc = "ORGANIZER:mailto:boss@example.com\n";
        let organizer = parse_organizer(doc).unwrap();
        assert_eq!(organizer.email, "boss@example.com");
        assert_eq!(organizer.name, None);
    }

    #[test]
    fn no_organizer() {
        assert_eq!(parse_organizer("BEGIN:VEVENT\nEND:VEVENT"), None);
    }

    #[test]
    fn status_defaults_to_needs_action() {
        let doc = "ATTENDEE;CN=\"Alice\":mailto:alice@example.com\n";
        assert_eq!(
            parse_attendee_status(doc, None),
            ParticipationStatus::NeedsAction
        );
    }

    #[test]
    fn status_reads_first_partstat_without_identity() {
        // Carol's DECLINED is the first PARTSTAT in the document.
        assert_eq!(
            parse_attendee_status(INVITE, None),
            ParticipationStatus::Declined
        );
    }

    #[test]
    fn status_targets_user_email_when_given() {
        assert_eq!(
            parse_attendee_status(INVITE, Some("alice@example.com")),
            ParticipationStatus::NeedsAction
        );
        assert_eq!(
            parse_attendee_status(INVITE, Some("carol@example.com")),
            ParticipationStatus::Declined
        );
    }

    #[test]
    fn my_line_without_partstat_defaults_to_needs_action() {
        assert_eq!(
            parse_attendee_status(INVITE, Some("alice@example.com")),
            ParticipationStatus::NeedsAction
        );
        // An unknown value on my line also falls back to the default.
        let doc = "ATTENDEE;PARTSTAT=DELEGATED:mailto:me@example.com\n";
        assert_eq!(
            parse_attendee_status(doc, Some("me@example.com")),
            ParticipationStatus::NeedsAction
        );
    }

    #[test]
    fn respond_inserts_partstat_and_preserves_identity() {
        let doc = "ATTENDEE;CN=\"Alice\":mailto:alice@example.com\n";
        let patched = apply_response(doc, InvitationResponse::Accept, None);

        let lines: Vec<_> = patched
            .lines()
            .filter(|l| l.starts_with("ATTENDEE"))
            .collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("CN=\"Alice\""));
        assert!(lines[0].contains("mailto:alice@example.com"));
        assert!(lines[0].contains("PARTSTAT=ACCEPTED"));
        assert_eq!(
            parse_attendee_status(&patched, None),
            ParticipationStatus::Accepted
        );
    }

    #[test]
    fn respond_rewrites_existing_partstat() {
        let doc = "ATTENDEE;PARTSTAT=DECLINED:mailto:alice@example.com\n";
        let patched = apply_response(doc, InvitationResponse::Tentative, None);
        assert!(patched.contains("PARTSTAT=TENTATIVE"));
        assert!(!patched.contains("DECLINED"));
    }

    #[test]
    fn respond_without_identity_rewrites_existing_statuses() {
        // Carol already carries a PARTSTAT, so the rewrite pass fires and the
        // insertion pass is skipped: Alice's line stays without one.
        let patched = apply_response(INVITE, InvitationResponse::Accept, None);
        assert_eq!(patched.matches("PARTSTAT=ACCEPTED").count(), 1);
        assert!(!patched.contains("PARTSTAT=DECLINED"));
        assert!(patched.contains("ATTENDEE;CN=\"Alice\":mailto:alice@example.com"));
    }

    #[test]
    fn respond_without_identity_inserts_when_no_status_present() {
        let doc = "ATTENDEE;CN=\"Alice\":mailto:alice@example.com\n\
                   ATTENDEE:mailto:dave@example.com\n";
        let patched = apply_response(doc, InvitationResponse::Accept, None);
        assert_eq!(patched.matches("PARTSTAT=ACCEPTED").count(), 2);
    }

    #[test]
    fn respond_with_identity_patches_only_that_attendee() {
        let patched = apply_response(INVITE, InvitationResponse::Accept, Some("alice@example.com"));
        // Alice gains ACCEPTED, Carol keeps DECLINED.
        assert!(patched.contains(";PARTSTAT=ACCEPTED:mailto:alice@example.com"));
        assert!(patched.contains("PARTSTAT=DECLINED:mailto:carol@example.com"));
        // The organizer line is untouched.
        assert!(patched.contains("ORGANIZER;CN=\"Bob\":mailto:bob@example.com"));
    }

    #[test]
    fn respond_with_unknown_identity_falls_back_to_legacy_rewrite() {
        let patched = apply_response(INVITE, InvitationResponse::Decline, Some("dave@example.com"));
        // Same as the no-identity path: Carol's existing PARTSTAT is
        // rewritten, which satisfies the presence check, so Alice's bare
        // line gains nothing.
        assert_eq!(patched.matches("PARTSTAT=DECLINED").count(), 1);
        assert!(patched.contains("PARTSTAT=DECLINED:mailto:carol@example.com"));
        assert!(patched.contains("ATTENDEE;CN=\"Alice\":mailto:alice@example.com"));
    }
}
