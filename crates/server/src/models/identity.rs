//! Identity (registered user) domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use blood_connect_core::{BloodType, Email, PostalCode, UserId};

/// A registered BloodConnect user (domain type).
///
/// Serialized as the `user` object of profile responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Database ID.
    pub id: UserId,
    /// Unique, normalized email.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Blood group.
    pub blood_type: BloodType,
    /// Where the user lives; used for request matching.
    pub postal_code: PostalCode,
    /// Contact phone, if shared.
    pub phone: Option<String>,
    /// Whether the user has offered to donate.
    pub available_to_donate: bool,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the profile last changed.
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a new identity.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: Email,
    pub name: String,
    pub blood_type: BloodType,
    pub postal_code: PostalCode,
    pub phone: Option<String>,
}

/// Partial profile update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct IdentityPatch {
    pub name: Option<String>,
    pub blood_type: Option<BloodType>,
    pub postal_code: Option<PostalCode>,
    pub phone: Option<String>,
    pub available_to_donate: Option<bool>,
}

impl IdentityPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.blood_type.is_none()
            && self.postal_code.is_none()
            && self.phone.is_none()
            && self.available_to_donate.is_none()
    }

    /// Apply the patch to an identity in place.
    pub fn apply(&self, identity: &mut Identity, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            identity.name.clone_from(name);
        }
        if let Some(blood_type) = self.blood_type {
            identity.blood_type = blood_type;
        }
        if let Some(postal_code) = &self.postal_code {
            identity.postal_code = postal_code.clone();
        }
        if let Some(phone) = &self.phone {
            identity.phone = Some(phone.clone());
        }
        if let Some(available) = self.available_to_donate {
            identity.available_to_donate = available;
        }
        identity.updated_at = now;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        let now = Utc::now();
        Identity {
            id: UserId::new(1),
            email: Email::parse("donor@example.com").unwrap(),
            name: "Asha".to_string(),
            blood_type: BloodType::OPositive,
            postal_code: PostalCode::parse("75034").unwrap(),
            phone: None,
            available_to_donate: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(IdentityPatch::default().is_empty());
        let patch = IdentityPatch {
            available_to_donate: Some(true),
            ..IdentityPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_patch_apply_partial() {
        let mut user = identity();
        let later = user.updated_at + chrono::Duration::minutes(5);
        let patch = IdentityPatch {
            phone: Some("+1 555 0100".to_string()),
            available_to_donate: Some(true),
            ..IdentityPatch::default()
        };

        patch.apply(&mut user, later);

        assert_eq!(user.name, "Asha");
        assert_eq!(user.phone.as_deref(), Some("+1 555 0100"));
        assert!(user.available_to_donate);
        assert_eq!(user.updated_at, later);
    }

    #[test]
    fn test_identity_serializes_camel_case() {
        let json = serde_json::to_value(identity()).unwrap();
        assert_eq!(json["bloodType"], "O+");
        assert_eq!(json["postalCode"], "75034");
        assert_eq!(json["availableToDonate"], false);
    }
}
