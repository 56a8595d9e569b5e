//! Identity repository for `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use blood_connect_core::{BloodType, Email, PostalCode, UserId};

use super::{IdentityStore, RepositoryError, map_unique_violation};
use crate::models::{Identity, IdentityPatch, NewIdentity};

const IDENTITY_COLUMNS: &str = "id, email, name, blood_type, postal_code, phone, \
     available_to_donate, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` identity queries.
#[derive(Debug, sqlx::FromRow)]
struct IdentityRow {
    id: i32,
    email: String,
    name: String,
    blood_type: String,
    postal_code: String,
    phone: Option<String>,
    available_to_donate: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = RepositoryError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let blood_type: BloodType = row.blood_type.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid blood type in database: {e}"))
        })?;
        let postal_code = PostalCode::parse(&row.postal_code).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid postal code in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            name: row.name,
            blood_type,
            postal_code,
            phone: row.phone,
            available_to_donate: row.available_to_donate,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for identity database operations.
#[derive(Clone)]
pub struct IdentityRepository {
    pool: PgPool,
}

impl IdentityRepository {
    /// Create a new identity repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for IdentityRepository {
    async fn create(
        &self,
        new: &NewIdentity,
        now: DateTime<Utc>,
    ) -> Result<Identity, RepositoryError> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            r"
            INSERT INTO identities (email, name, blood_type, postal_code, phone, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {IDENTITY_COLUMNS}
            "
        ))
        .bind(new.email.as_str())
        .bind(&new.name)
        .bind(new.blood_type.as_str())
        .bind(new.postal_code.as_str())
        .bind(new.phone.as_deref())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email"))?;

        row.try_into()
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<Identity>, RepositoryError> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM identities WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn update(
        &self,
        email: &Email,
        patch: &IdentityPatch,
        now: DateTime<Utc>,
    ) -> Result<Identity, RepositoryError> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            r"
            UPDATE identities
            SET name = COALESCE($2, name),
                blood_type = COALESCE($3, blood_type),
                postal_code = COALESCE($4, postal_code),
                phone = COALESCE($5, phone),
                available_to_donate = COALESCE($6, available_to_donate),
                updated_at = $7
            WHERE email = $1
            RETURNING {IDENTITY_COLUMNS}
            "
        ))
        .bind(email.as_str())
        .bind(patch.name.as_deref())
        .bind(patch.blood_type.map(BloodType::as_str))
        .bind(patch.postal_code.as_ref().map(PostalCode::as_str))
        .bind(patch.phone.as_deref())
        .bind(patch.available_to_donate)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }
}
