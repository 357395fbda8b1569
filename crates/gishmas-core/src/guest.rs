//! Guest records: one entry per completed sus test.
//!
//! The serialized shape (camelCase, lowercase enums) is shared by the
//! remote collection and the local storage cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Severity tier derived from the total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SusLevel {
    Low,
    Medium,
    High,
}

/// Quiz verdict as stored on the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuestStatus {
    /// Passed the test.
    Invited,
    /// Failed the test.
    Sus,
}

impl GuestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuestStatus::Invited => "invited",
            GuestStatus::Sus => "sus",
        }
    }
}

/// A guest that has been scored but not yet persisted.
///
/// The storage backend decides `id` and `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestDraft {
    pub name: String,
    pub reason: String,
    pub sus_level: SusLevel,
    pub status: GuestStatus,
}

impl GuestDraft {
    /// Build a draft, trimming the name.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyName`] when the trimmed name is empty.
    pub fn new(
        name: &str,
        reason: impl Into<String>,
        sus_level: SusLevel,
        status: GuestStatus,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self {
            name: name.to_string(),
            reason: reason.into(),
            sus_level,
            status,
        })
    }

    /// Attach an identity and creation time.
    pub fn into_guest(self, id: impl Into<String>, created_at: Option<DateTime<Utc>>) -> Guest {
        Guest {
            id: id.into(),
            name: self.name,
            reason: self.reason,
            sus_level: self.sus_level,
            status: self.status,
            created_at,
        }
    }
}

/// A persisted guest record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: String,
    pub name: String,
    pub reason: String,
    pub sus_level: SusLevel,
    pub status: GuestStatus,
    /// Missing while a server timestamp is still pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Guest {
    pub fn is_sus(&self) -> bool {
        self.status == GuestStatus::Sus
    }
}

/// Sort newest first. Guests without a timestamp sort as oldest.
///
/// Stable, so equal timestamps keep their delivery order.
pub fn sort_newest_first(guests: &mut [Guest]) {
    guests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Case-insensitive substring filter over guest names.
pub fn filter_by_name<'a>(guests: &'a [Guest], needle: &str) -> Vec<&'a Guest> {
    let needle = needle.to_lowercase();
    guests
        .iter()
        .filter(|g| g.name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn guest(id: &str, created_at: Option<DateTime<Utc>>) -> Guest {
        GuestDraft::new(id, "r", SusLevel::Low, GuestStatus::Invited)
            .unwrap()
            .into_guest(id, created_at)
    }

    #[test]
    fn draft_trims_name() {
        let draft = GuestDraft::new("  Rudolph \t", "r", SusLevel::Low, GuestStatus::Invited)
            .unwrap();
        assert_eq!(draft.name, "Rudolph");
    }

    #[test]
    fn draft_rejects_blank_name() {
        let err = GuestDraft::new("   ", "r", SusLevel::Low, GuestStatus::Invited).unwrap_err();
        assert_eq!(err, ValidationError::EmptyName);
    }

    #[test]
    fn wire_shape_uses_camel_case_and_lowercase_enums() {
        let g = GuestDraft::new("Elf", "Hates holiday karaoke.", SusLevel::Medium, GuestStatus::Sus)
            .unwrap()
            .into_guest("abc", None);
        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(json["susLevel"], "medium");
        assert_eq!(json["status"], "sus");
        assert!(json.get("createdAt").is_none());
    }

    #[test]
    fn sort_puts_missing_timestamps_last() {
        let now = Utc::now();
        let mut guests = vec![
            guest("pending", None),
            guest("old", Some(now - Duration::hours(1))),
            guest("new", Some(now)),
        ];
        sort_newest_first(&mut guests);
        let ids: Vec<_> = guests.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, ["new", "old", "pending"]);
    }

    #[test]
    fn filter_is_case_insensitive() {
        let guests = vec![guest("Santa", None), guest("Grinch", None)];
        let hits = filter_by_name(&guests, "SAN");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Santa");
        assert_eq!(filter_by_name(&guests, "").len(), 2);
    }
}
