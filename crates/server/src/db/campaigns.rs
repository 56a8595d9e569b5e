//! Campaign repository for `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use blood_connect_core::{CampaignId, Email, GeoPoint};

use super::{CampaignStore, RepositoryError};
use crate::models::{Campaign, CampaignResponse, NewCampaign, Organizer};

const CAMPAIGN_COLUMNS: &str = "id, title, start_date, end_date, time, venue, incentive, \
     message, organizer_name, organizer_email, latitude, longitude, created_at";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CampaignRow {
    id: i32,
    title: String,
    start_date: String,
    end_date: String,
    time: String,
    venue: String,
    incentive: Option<String>,
    message: Option<String>,
    organizer_name: String,
    organizer_email: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ResponseRow {
    name: String,
    email: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    joined_at: DateTime<Utc>,
}

fn corrupt(what: &str, e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::DataCorruption(format!("invalid {what} in database: {e}"))
}

fn location(lat: Option<f64>, lng: Option<f64>) -> Result<Option<GeoPoint>, RepositoryError> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => GeoPoint::new(lat, lng)
            .map(Some)
            .map_err(|e| corrupt("location", e)),
        _ => Ok(None),
    }
}

impl TryFrom<CampaignRow> for Campaign {
    type Error = RepositoryError;

    fn try_from(row: CampaignRow) -> Result<Self, Self::Error> {
        let email =
            Email::parse(&row.organizer_email).map_err(|e| corrupt("organizer email", e))?;

        Ok(Self {
            id: CampaignId::new(row.id),
            title: row.title,
            start_date: row.start_date,
            end_date: row.end_date,
            time: row.time,
            venue: row.venue,
            incentive: row.incentive,
            message: row.message,
            organizer: Organizer {
                name: row.organizer_name,
                email,
            },
            location: location(row.latitude, row.longitude)?,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<ResponseRow> for CampaignResponse {
    type Error = RepositoryError;

    fn try_from(row: ResponseRow) -> Result<Self, Self::Error> {
        Ok(Self {
            name: row.name,
            email: Email::parse(&row.email).map_err(|e| corrupt("response email", e))?,
            joined: row.joined_at,
            location: location(row.latitude, row.longitude)?,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for campaign database operations.
#[derive(Clone)]
pub struct CampaignRepository {
    pool: PgPool,
}

impl CampaignRepository {
    /// Create a new campaign repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: CampaignId) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM campaigns WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl CampaignStore for CampaignRepository {
    async fn create(
        &self,
        new: &NewCampaign,
        now: DateTime<Utc>,
    ) -> Result<Campaign, RepositoryError> {
        let row = sqlx::query_as::<_, CampaignRow>(&format!(
            r"
            INSERT INTO campaigns
                (title, start_date, end_date, time, venue, incentive, message,
                 organizer_name, organizer_email, latitude, longitude, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {CAMPAIGN_COLUMNS}
            "
        ))
        .bind(&new.title)
        .bind(&new.start_date)
        .bind(&new.end_date)
        .bind(&new.time)
        .bind(&new.venue)
        .bind(new.incentive.as_deref())
        .bind(new.message.as_deref())
        .bind(&new.organizer.name)
        .bind(new.organizer.email.as_str())
        .bind(new.location.map(|p| p.lat()))
        .bind(new.location.map(|p| p.lng()))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn get(&self, id: CampaignId) -> Result<Option<Campaign>, RepositoryError> {
        let row = sqlx::query_as::<_, CampaignRow>(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list_by_organizer(&self, organizer: &Email) -> Result<Vec<Campaign>, RepositoryError> {
        let rows = sqlx::query_as::<_, CampaignRow>(&format!(
            r"
            SELECT {CAMPAIGN_COLUMNS}
            FROM campaigns
            WHERE organizer_email = $1
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(organizer.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn add_response(
        &self,
        id: CampaignId,
        response: &CampaignResponse,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO campaign_responses (campaign_id, name, email, latitude, longitude, joined_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (campaign_id, email) DO NOTHING
            ",
        )
        .bind(id)
        .bind(&response.name)
        .bind(response.email.as_str())
        .bind(response.location.map(|p| p.lat()))
        .bind(response.location.map(|p| p.lng()))
        .bind(response.joined)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.rows_affected() == 1),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                Err(RepositoryError::NotFound)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn responses(&self, id: CampaignId) -> Result<Vec<CampaignResponse>, RepositoryError> {
        if !self.exists(id).await? {
            return Err(RepositoryError::NotFound);
        }

        let rows = sqlx::query_as::<_, ResponseRow>(
            r"
            SELECT name, email, latitude, longitude, joined_at
            FROM campaign_responses
            WHERE campaign_id = $1
            ORDER BY joined_at, id
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
