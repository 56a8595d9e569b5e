//! Blood bank lookup types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use blood_connect_core::PostalCode;

/// Upper bound on entries returned for one postal code.
pub const MAX_PROVIDER_ENTRIES: usize = 10;

/// A blood bank near a postal code.
///
/// All fields except `name` come from free-form generated text and may be
/// missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default, alias = "timings")]
    pub hours: Option<String>,
    /// Ongoing donation campaign, if any.
    #[serde(default)]
    pub campaign: Option<String>,
}

/// Cached blood bank lookup for one postal code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedLookup {
    pub postal_code: PostalCode,
    pub entries: Vec<ProviderEntry>,
    pub refreshed_at: DateTime<Utc>,
}

impl CachedLookup {
    /// Build a record, keeping at most [`MAX_PROVIDER_ENTRIES`] entries.
    #[must_use]
    pub fn new(
        postal_code: PostalCode,
        mut entries: Vec<ProviderEntry>,
        refreshed_at: DateTime<Utc>,
    ) -> Self {
        entries.truncate(MAX_PROVIDER_ENTRIES);
        Self {
            postal_code,
            entries,
            refreshed_at,
        }
    }

    /// Returns true if the record is younger than `window` at `now`.
    #[must_use]
    pub fn is_fresh_at(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.refreshed_at < window
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_fresh_at() {
        let now = Utc::now();
        let record = CachedLookup {
            postal_code: PostalCode::parse("75034").unwrap(),
            entries: Vec::new(),
            refreshed_at: now,
        };
        let window = Duration::days(7);

        assert!(record.is_fresh_at(now + Duration::hours(1), window));
        assert!(!record.is_fresh_at(now + Duration::days(7), window));
        assert!(!record.is_fresh_at(now + Duration::days(8), window));
    }

    #[test]
    fn test_new_caps_entries() {
        let entries = (0..12)
            .map(|i| ProviderEntry {
                name: format!("Bank {i}"),
                address: None,
                contact: None,
                hours: None,
                campaign: None,
            })
            .collect();
        let record = CachedLookup::new(PostalCode::parse("75034").unwrap(), entries, Utc::now());
        assert_eq!(record.entries.len(), MAX_PROVIDER_ENTRIES);
        assert_eq!(record.entries[9].name, "Bank 9");
    }

    #[test]
    fn test_provider_entry_accepts_timings_alias() {
        let entry: ProviderEntry =
            serde_json::from_str(r#"{"name":"City Blood Bank","timings":"24x7"}"#).unwrap();
        assert_eq!(entry.hours.as_deref(), Some("24x7"));
        assert!(entry.campaign.is_none());

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["hours"], "24x7");
    }
}
