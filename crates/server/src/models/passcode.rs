//! Passcode domain type.

use chrono::{DateTime, Utc};

use blood_connect_core::{Email, Passcode};

/// An issued login passcode (domain type).
///
/// At most one record exists per email; a new issuance replaces the old one
/// and verification (successful or expired) removes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasscodeRecord {
    /// Address the code was sent to.
    pub email: Email,
    /// The 6-digit code.
    pub code: Passcode,
    /// When the code stops being accepted.
    pub expires_at: DateTime<Utc>,
    /// When the code was issued.
    pub created_at: DateTime<Utc>,
}

impl PasscodeRecord {
    /// Returns true if the code is past its expiry at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_is_expired_at_boundary() {
        let now = Utc::now();
        let record = PasscodeRecord {
            email: Email::parse("donor@example.com").unwrap(),
            code: Passcode::from_number(42),
            expires_at: now + Duration::minutes(10),
            created_at: now,
        };

        assert!(!record.is_expired_at(now));
        assert!(!record.is_expired_at(record.expires_at));
        assert!(record.is_expired_at(record.expires_at + Duration::seconds(1)));
    }
}
