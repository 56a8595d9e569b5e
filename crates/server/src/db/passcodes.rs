//! Passcode repository for `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use blood_connect_core::{Email, Passcode};

use super::{PasscodeStore, RepositoryError};
use crate::models::PasscodeRecord;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct PasscodeRow {
    email: String,
    code: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PasscodeRow> for PasscodeRecord {
    type Error = RepositoryError;

    fn try_from(row: PasscodeRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let code = Passcode::parse(&row.code).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid passcode in database: {e}"))
        })?;

        Ok(Self {
            email,
            code,
            expires_at: row.expires_at,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for passcode database operations.
#[derive(Clone)]
pub struct PasscodeRepository {
    pool: PgPool,
}

impl PasscodeRepository {
    /// Create a new passcode repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PasscodeStore for PasscodeRepository {
    async fn replace(&self, record: &PasscodeRecord) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM passcodes WHERE email = $1")
            .bind(record.email.as_str())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r"
            INSERT INTO passcodes (email, code, expires_at, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(record.email.as_str())
        .bind(record.code.as_str())
        .bind(record.expires_at)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn consume(
        &self,
        email: &Email,
        code: &Passcode,
    ) -> Result<Option<PasscodeRecord>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, PasscodeRow>(
            r"
            DELETE FROM passcodes
            WHERE email = $1 AND code = $2
            RETURNING email, code, expires_at, created_at
            ",
        )
        .bind(email.as_str())
        .bind(code.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        if row.is_some() {
            sqlx::query("DELETE FROM passcodes WHERE email = $1")
                .bind(email.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn delete_for_email(&self, email: &Email) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM passcodes WHERE email = $1")
            .bind(email.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM passcodes WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
