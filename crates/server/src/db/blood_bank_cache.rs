//! Blood bank lookup cache repository for `PostgreSQL`.
//!
//! Entries are stored as a JSONB array in a single row per postal code.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use blood_connect_core::PostalCode;

use super::{LookupCacheStore, RepositoryError};
use crate::models::{CachedLookup, ProviderEntry};

/// Internal row type for `PostgreSQL` cache queries.
#[derive(Debug, sqlx::FromRow)]
struct CacheRow {
    postal_code: String,
    entries: Json<Vec<ProviderEntry>>,
    refreshed_at: DateTime<Utc>,
}

impl TryFrom<CacheRow> for CachedLookup {
    type Error = RepositoryError;

    fn try_from(row: CacheRow) -> Result<Self, Self::Error> {
        let postal_code = PostalCode::parse(&row.postal_code).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid postal code in database: {e}"))
        })?;

        Ok(Self {
            postal_code,
            entries: row.entries.0,
            refreshed_at: row.refreshed_at,
        })
    }
}

/// Repository for cached blood bank lookups.
#[derive(Clone)]
pub struct BloodBankCacheRepository {
    pool: PgPool,
}

impl BloodBankCacheRepository {
    /// Create a new cache repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LookupCacheStore for BloodBankCacheRepository {
    async fn get(&self, postal_code: &PostalCode) -> Result<Option<CachedLookup>, RepositoryError> {
        let row = sqlx::query_as::<_, CacheRow>(
            r"
            SELECT postal_code, entries, refreshed_at
            FROM blood_bank_cache
            WHERE postal_code = $1
            ",
        )
        .bind(postal_code.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn upsert(&self, record: &CachedLookup) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO blood_bank_cache (postal_code, entries, refreshed_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (postal_code) DO UPDATE
            SET entries = EXCLUDED.entries,
                refreshed_at = EXCLUDED.refreshed_at
            ",
        )
        .bind(record.postal_code.as_str())
        .bind(Json(&record.entries))
        .bind(record.refreshed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
