//! Donation campaign domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use blood_connect_core::{CampaignId, Email, GeoPoint};

/// A blood donation drive announced by an organizer (domain type).
///
/// Dates and times are kept as the organizer typed them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    /// Database ID.
    pub id: CampaignId,
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub time: String,
    pub venue: String,
    /// What donors get for taking part, if anything.
    pub incentive: Option<String>,
    pub message: Option<String>,
    pub organizer: Organizer,
    /// Venue coordinates, used by radius search.
    pub location: Option<GeoPoint>,
    pub created_at: DateTime<Utc>,
}

/// Who runs a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organizer {
    pub name: String,
    pub email: Email,
}

/// Input for announcing a campaign.
#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub time: String,
    pub venue: String,
    pub incentive: Option<String>,
    pub message: Option<String>,
    pub organizer: Organizer,
    pub location: Option<GeoPoint>,
}

/// A donor who joined a campaign. One per email per campaign.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignResponse {
    pub name: String,
    pub email: Email,
    /// When the donor joined.
    pub joined: DateTime<Utc>,
    /// Where the donor was when joining, if shared.
    pub location: Option<GeoPoint>,
}
