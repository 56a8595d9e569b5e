//! Blood request domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use blood_connect_core::{BloodRequestId, BloodType, Email, PostalCode, RequestStatus};

/// A request for blood submitted by a registered user (domain type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequest {
    /// Database ID.
    pub id: BloodRequestId,
    /// Who asked for blood.
    pub requester_email: Email,
    /// Requester's display name.
    pub requester_name: String,
    /// Blood group needed.
    pub blood_type: BloodType,
    /// Where the blood is needed; donors are matched on this.
    pub postal_code: PostalCode,
    /// Requester's contact phone.
    pub phone: Option<String>,
    /// `pending` until a donor accepts.
    pub status: RequestStatus,
    /// The donor who accepted, once accepted.
    pub responder: Option<Responder>,
    /// Donors who declined; the request is hidden from them.
    pub declined_donors: Vec<Email>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BloodRequest {
    /// Returns true if `donor` should see this request in their pending list.
    #[must_use]
    pub fn is_visible_to(&self, donor: &Email) -> bool {
        self.status == RequestStatus::Pending
            && &self.requester_email != donor
            && !self.declined_donors.contains(donor)
    }
}

/// Input for submitting a blood request.
#[derive(Debug, Clone)]
pub struct NewBloodRequest {
    pub requester_email: Email,
    pub requester_name: String,
    pub blood_type: BloodType,
    pub postal_code: PostalCode,
    pub phone: Option<String>,
}

/// Donor who accepted a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Responder {
    pub email: Email,
    pub name: String,
    pub phone: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    fn request() -> BloodRequest {
        let now = Utc::now();
        BloodRequest {
            id: BloodRequestId::new(7),
            requester_email: email("patient@example.com"),
            requester_name: "Ravi".to_string(),
            blood_type: BloodType::BNegative,
            postal_code: PostalCode::parse("560001").unwrap(),
            phone: None,
            status: RequestStatus::Pending,
            responder: None,
            declined_donors: vec![email("busy@example.com")],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_visible_to_other_donor() {
        assert!(request().is_visible_to(&email("donor@example.com")));
    }

    #[test]
    fn test_hidden_from_requester_and_decliners() {
        let req = request();
        assert!(!req.is_visible_to(&email("patient@example.com")));
        assert!(!req.is_visible_to(&email("busy@example.com")));
    }

    #[test]
    fn test_hidden_once_accepted() {
        let mut req = request();
        req.status = RequestStatus::Accepted;
        assert!(!req.is_visible_to(&email("donor@example.com")));
    }
}
