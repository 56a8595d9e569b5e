//! Blood request repository for `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use blood_connect_core::{BloodRequestId, Email, PostalCode, RequestStatus};

use super::{BloodRequestStore, RepositoryError};
use crate::models::{BloodRequest, NewBloodRequest, Responder};

const REQUEST_COLUMNS: &str = "id, requester_email, requester_name, blood_type, postal_code, \
     phone, status, responder_email, responder_name, responder_phone, declined_donors, \
     created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` blood request queries.
#[derive(Debug, sqlx::FromRow)]
struct BloodRequestRow {
    id: i32,
    requester_email: String,
    requester_name: String,
    blood_type: String,
    postal_code: String,
    phone: Option<String>,
    status: String,
    responder_email: Option<String>,
    responder_name: Option<String>,
    responder_phone: Option<String>,
    declined_donors: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn corrupt(what: &str, e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::DataCorruption(format!("invalid {what} in database: {e}"))
}

impl TryFrom<BloodRequestRow> for BloodRequest {
    type Error = RepositoryError;

    fn try_from(row: BloodRequestRow) -> Result<Self, Self::Error> {
        let requester_email =
            Email::parse(&row.requester_email).map_err(|e| corrupt("requester email", e))?;
        let blood_type = row
            .blood_type
            .parse()
            .map_err(|e| corrupt("blood type", e))?;
        let postal_code =
            PostalCode::parse(&row.postal_code).map_err(|e| corrupt("postal code", e))?;
        let status: RequestStatus = row.status.parse().map_err(|e| corrupt("status", e))?;

        let responder = match (row.responder_email, row.responder_name) {
            (Some(email), Some(name)) => Some(Responder {
                email: Email::parse(&email).map_err(|e| corrupt("responder email", e))?,
                name,
                phone: row.responder_phone,
            }),
            _ => None,
        };

        let declined_donors = row
            .declined_donors
            .iter()
            .map(|d| Email::parse(d).map_err(|e| corrupt("declined donor", e)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: BloodRequestId::new(row.id),
            requester_email,
            requester_name: row.requester_name,
            blood_type,
            postal_code,
            phone: row.phone,
            status,
            responder,
            declined_donors,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for blood request database operations.
#[derive(Clone)]
pub struct BloodRequestRepository {
    pool: PgPool,
}

impl BloodRequestRepository {
    /// Create a new blood request repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn status_of(&self, id: BloodRequestId) -> Result<Option<String>, RepositoryError> {
        let status = sqlx::query_scalar("SELECT status FROM blood_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(status)
    }
}

#[async_trait]
impl BloodRequestStore for BloodRequestRepository {
    async fn create(
        &self,
        new: &NewBloodRequest,
        now: DateTime<Utc>,
    ) -> Result<BloodRequest, RepositoryError> {
        let row = sqlx::query_as::<_, BloodRequestRow>(&format!(
            r"
            INSERT INTO blood_requests
                (requester_email, requester_name, blood_type, postal_code, phone, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 'pending', $6, $6)
            RETURNING {REQUEST_COLUMNS}
            "
        ))
        .bind(new.requester_email.as_str())
        .bind(&new.requester_name)
        .bind(new.blood_type.as_str())
        .bind(new.postal_code.as_str())
        .bind(new.phone.as_deref())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn get(&self, id: BloodRequestId) -> Result<Option<BloodRequest>, RepositoryError> {
        let row = sqlx::query_as::<_, BloodRequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM blood_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn pending_for_donor(
        &self,
        postal_code: &PostalCode,
        donor: &Email,
    ) -> Result<Vec<BloodRequest>, RepositoryError> {
        let rows = sqlx::query_as::<_, BloodRequestRow>(&format!(
            r"
            SELECT {REQUEST_COLUMNS}
            FROM blood_requests
            WHERE status = 'pending'
              AND postal_code = $1
              AND requester_email <> $2
              AND NOT ($2 = ANY(declined_donors))
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(postal_code.as_str())
        .bind(donor.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn accept(
        &self,
        id: BloodRequestId,
        responder: &Responder,
        now: DateTime<Utc>,
    ) -> Result<BloodRequest, RepositoryError> {
        let row = sqlx::query_as::<_, BloodRequestRow>(&format!(
            r"
            UPDATE blood_requests
            SET status = 'accepted',
                responder_email = $2,
                responder_name = $3,
                responder_phone = $4,
                updated_at = $5
            WHERE id = $1 AND status = 'pending'
            RETURNING {REQUEST_COLUMNS}
            "
        ))
        .bind(id)
        .bind(responder.email.as_str())
        .bind(&responder.name)
        .bind(responder.phone.as_deref())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.try_into(),
            // Distinguish an unknown ID from one that is no longer pending.
            None => match self.status_of(id).await? {
                Some(_) => Err(RepositoryError::Conflict(
                    "blood request is no longer pending".to_owned(),
                )),
                None => Err(RepositoryError::NotFound),
            },
        }
    }

    async fn decline(
        &self,
        id: BloodRequestId,
        donor: &Email,
        now: DateTime<Utc>,
    ) -> Result<BloodRequest, RepositoryError> {
        let row = sqlx::query_as::<_, BloodRequestRow>(&format!(
            r"
            UPDATE blood_requests
            SET declined_donors = CASE
                    WHEN $2 = ANY(declined_donors) THEN declined_donors
                    ELSE array_append(declined_donors, $2)
                END,
                updated_at = $3
            WHERE id = $1
            RETURNING {REQUEST_COLUMNS}
            "
        ))
        .bind(id)
        .bind(donor.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn list_for_requester(
        &self,
        requester: &Email,
    ) -> Result<Vec<BloodRequest>, RepositoryError> {
        let rows = sqlx::query_as::<_, BloodRequestRow>(&format!(
            r"
            SELECT {REQUEST_COLUMNS}
            FROM blood_requests
            WHERE requester_email = $1
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(requester.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn delete_pending_for_requester(
        &self,
        requester: &Email,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM blood_requests WHERE requester_email = $1 AND status = 'pending'",
        )
        .bind(requester.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
