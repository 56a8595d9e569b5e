//! Donation campaigns.
//!
//! Organizers announce a drive with a venue and dates; donors join it once
//! per email. Joining again is accepted and changes nothing.
//!
//! Radius search over venues is delegated to a [`CampaignLocator`]. None is
//! wired by default, in which case `nearby` reports the search unavailable.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use blood_connect_core::{CampaignId, Email, GeoPoint};

use crate::db::{CampaignStore, RepositoryError, Stores};
use crate::models::{Campaign, CampaignResponse, NewCampaign, Organizer};

/// Search radius for nearby campaigns (30 miles).
pub const NEARBY_RADIUS_METERS: f64 = 48_280.0;

/// Errors from campaign operations.
#[derive(Debug, Error)]
pub enum CampaignError {
    /// Missing or malformed input.
    #[error("{0}")]
    InvalidInput(String),

    /// No campaign has the given ID.
    #[error("Campaign not found")]
    NotFound,

    /// No radius search backend is configured.
    #[error("Nearby campaign search is not available")]
    Unavailable,

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[source] RepositoryError),
}

impl From<RepositoryError> for CampaignError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

/// Radius search over campaign venues.
#[async_trait]
pub trait CampaignLocator: Send + Sync {
    /// Campaigns whose venue lies within `radius_meters` of `center`,
    /// nearest first.
    async fn within(
        &self,
        center: GeoPoint,
        radius_meters: f64,
    ) -> Result<Vec<Campaign>, RepositoryError>;
}

/// Campaign announcement, as submitted.
#[derive(Debug, Clone, Default)]
pub struct CampaignForm {
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub time: String,
    pub venue: String,
    pub incentive: Option<String>,
    pub message: Option<String>,
    pub organizer_name: String,
    pub organizer_email: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// A donor joining a campaign, as submitted.
#[derive(Debug, Clone, Default)]
pub struct JoinForm {
    pub name: String,
    pub email: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

fn email(field: &str, raw: &str) -> Result<Email, CampaignError> {
    if raw.trim().is_empty() {
        return Err(CampaignError::InvalidInput(format!("{field} is required")));
    }
    Email::parse(raw).map_err(|e| CampaignError::InvalidInput(format!("Invalid email: {e}")))
}

fn location(lat: Option<f64>, lng: Option<f64>) -> Result<Option<GeoPoint>, CampaignError> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => GeoPoint::new(lat, lng)
            .map(Some)
            .map_err(|e| CampaignError::InvalidInput(format!("Invalid location: {e}"))),
        (None, None) => Ok(None),
        _ => Err(CampaignError::InvalidInput(
            "Both lat and lng are required".to_string(),
        )),
    }
}

fn optional(raw: Option<&String>) -> Option<String> {
    raw.map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Campaign announcements and sign-ups.
#[derive(Clone)]
pub struct CampaignService {
    campaigns: Arc<dyn CampaignStore>,
    locator: Option<Arc<dyn CampaignLocator>>,
}

impl CampaignService {
    /// Create a campaign service without radius search.
    #[must_use]
    pub fn new(stores: &Stores) -> Self {
        Self {
            campaigns: Arc::clone(&stores.campaigns),
            locator: None,
        }
    }

    /// Use `locator` for [`Self::nearby`].
    #[must_use]
    pub fn with_locator(mut self, locator: Arc<dyn CampaignLocator>) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Announce a campaign.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the title or organizer email is missing, or the
    /// location is malformed or half given.
    #[instrument(skip(self, form), fields(organizer = %form.organizer_email))]
    pub async fn create(&self, form: &CampaignForm) -> Result<Campaign, CampaignError> {
        let title = form.title.trim();
        if title.is_empty() {
            return Err(CampaignError::InvalidInput("Title is required".to_string()));
        }

        let new = NewCampaign {
            title: title.to_string(),
            start_date: form.start_date.trim().to_string(),
            end_date: form.end_date.trim().to_string(),
            time: form.time.trim().to_string(),
            venue: form.venue.trim().to_string(),
            incentive: optional(form.incentive.as_ref()),
            message: optional(form.message.as_ref()),
            organizer: Organizer {
                name: form.organizer_name.trim().to_string(),
                email: email("Organizer email", &form.organizer_email)?,
            },
            location: location(form.lat, form.lng)?,
        };

        let campaign = self.campaigns.create(&new, Utc::now()).await?;
        tracing::info!(campaign_id = %campaign.id, "Campaign created");
        Ok(campaign)
    }

    /// Campaigns run by an organizer, newest first.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a missing or malformed email.
    pub async fn by_organizer(&self, raw_email: &str) -> Result<Vec<Campaign>, CampaignError> {
        let organizer = email("Email", raw_email)?;
        Ok(self.campaigns.list_by_organizer(&organizer).await?)
    }

    /// Join a campaign. Returns `false` if the email had already joined.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown campaigns, `InvalidInput` for a missing email
    /// or malformed location.
    #[instrument(skip(self, form), fields(campaign_id = %id))]
    pub async fn respond(&self, id: CampaignId, form: &JoinForm) -> Result<bool, CampaignError> {
        let response = CampaignResponse {
            name: form.name.trim().to_string(),
            email: email("Email", &form.email)?,
            joined: Utc::now(),
            location: location(form.lat, form.lng)?,
        };

        let joined = self.campaigns.add_response(id, &response).await?;
        if joined {
            tracing::info!("Donor joined campaign");
        } else {
            tracing::debug!("Donor had already joined campaign");
        }
        Ok(joined)
    }

    /// Donors who joined a campaign, in join order.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown campaigns.
    pub async fn responses(&self, id: CampaignId) -> Result<Vec<CampaignResponse>, CampaignError> {
        Ok(self.campaigns.responses(id).await?)
    }

    /// Campaigns within [`NEARBY_RADIUS_METERS`] of a point.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a missing or malformed point, `Unavailable` if no
    /// locator is configured.
    pub async fn nearby(
        &self,
        lat: Option<f64>,
        lng: Option<f64>,
    ) -> Result<Vec<Campaign>, CampaignError> {
        let center = location(lat, lng)?.ok_or_else(|| {
            CampaignError::InvalidInput("Both lat and lng are required".to_string())
        })?;
        let locator = self.locator.as_ref().ok_or(CampaignError::Unavailable)?;
        Ok(locator.within(center, NEARBY_RADIUS_METERS).await?)
    }
}
