//! Record stores for BloodConnect.
//!
//! # Database: `PostgreSQL`
//!
//! ## Tables
//!
//! - `identities` - Registered users (keyed by email)
//! - `passcodes` - Issued login codes (at most one per email)
//! - `blood_requests` - Blood requests and donor responses
//! - `blood_bank_cache` - Generated blood bank lookups (keyed by postal code)
//! - `campaigns` - Donation drives announced by organizers
//! - `campaign_responses` - Donors who joined a campaign (one per email)
//!
//! Each table is reached through a store trait so the services can run
//! against either the `PostgreSQL` repositories or [`MemoryStore`].
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p blood-connect-cli -- migrate
//! ```

pub mod blood_bank_cache;
pub mod blood_requests;
pub mod campaigns;
pub mod identities;
pub mod memory;
pub mod passcodes;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use blood_connect_core::{BloodRequestId, CampaignId, Email, Passcode, PostalCode};

use crate::models::{
    BloodRequest, CachedLookup, Campaign, CampaignResponse, Identity, IdentityPatch,
    NewBloodRequest, NewCampaign, NewIdentity, PasscodeRecord, Responder,
};

pub use blood_bank_cache::BloodBankCacheRepository;
pub use blood_requests::BloodRequestRepository;
pub use campaigns::CampaignRepository;
pub use identities::IdentityRepository;
pub use memory::MemoryStore;
pub use passcodes::PasscodeRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Maps a unique-constraint violation to [`RepositoryError::Conflict`].
pub(crate) fn map_unique_violation(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

// =============================================================================
// Store Traits
// =============================================================================

/// Storage for issued passcodes.
#[async_trait]
pub trait PasscodeStore: Send + Sync {
    /// Atomically remove every passcode for `record.email` and insert `record`.
    async fn replace(&self, record: &PasscodeRecord) -> Result<(), RepositoryError>;

    /// Remove the record matching both email and code, along with every other
    /// code for that email, and return it.
    ///
    /// Atomic: of two concurrent calls with the same code, at most one gets
    /// the record back.
    async fn consume(
        &self,
        email: &Email,
        code: &Passcode,
    ) -> Result<Option<PasscodeRecord>, RepositoryError>;

    /// Delete every passcode for an email. Returns the number removed.
    async fn delete_for_email(&self, email: &Email) -> Result<u64, RepositoryError>;

    /// Delete every passcode that expired before `now`.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError>;
}

/// Storage for registered identities.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Insert a new identity. Fails with `Conflict` if the email is taken.
    async fn create(
        &self,
        new: &NewIdentity,
        now: DateTime<Utc>,
    ) -> Result<Identity, RepositoryError>;

    async fn get_by_email(&self, email: &Email) -> Result<Option<Identity>, RepositoryError>;

    async fn exists(&self, email: &Email) -> Result<bool, RepositoryError>;

    /// Apply a partial update. Fails with `NotFound` if the email is unknown.
    async fn update(
        &self,
        email: &Email,
        patch: &IdentityPatch,
        now: DateTime<Utc>,
    ) -> Result<Identity, RepositoryError>;
}

/// Storage for blood requests.
#[async_trait]
pub trait BloodRequestStore: Send + Sync {
    async fn create(
        &self,
        new: &NewBloodRequest,
        now: DateTime<Utc>,
    ) -> Result<BloodRequest, RepositoryError>;

    async fn get(&self, id: BloodRequestId) -> Result<Option<BloodRequest>, RepositoryError>;

    /// Pending requests in `postal_code` that `donor` did not submit or
    /// decline, newest first.
    async fn pending_for_donor(
        &self,
        postal_code: &PostalCode,
        donor: &Email,
    ) -> Result<Vec<BloodRequest>, RepositoryError>;

    /// Mark a pending request accepted by `responder`.
    ///
    /// Fails with `NotFound` for unknown IDs and `Conflict` if the request is
    /// no longer pending.
    async fn accept(
        &self,
        id: BloodRequestId,
        responder: &Responder,
        now: DateTime<Utc>,
    ) -> Result<BloodRequest, RepositoryError>;

    /// Record that `donor` declined. Declining twice is a no-op.
    async fn decline(
        &self,
        id: BloodRequestId,
        donor: &Email,
        now: DateTime<Utc>,
    ) -> Result<BloodRequest, RepositoryError>;

    /// Requests submitted by `requester`, newest first.
    async fn list_for_requester(
        &self,
        requester: &Email,
    ) -> Result<Vec<BloodRequest>, RepositoryError>;

    /// Delete the requester's pending requests. Returns the number removed.
    async fn delete_pending_for_requester(&self, requester: &Email)
    -> Result<u64, RepositoryError>;
}

/// Storage for cached blood bank lookups.
#[async_trait]
pub trait LookupCacheStore: Send + Sync {
    async fn get(&self, postal_code: &PostalCode) -> Result<Option<CachedLookup>, RepositoryError>;

    /// Insert or wholesale replace the record for `record.postal_code`.
    async fn upsert(&self, record: &CachedLookup) -> Result<(), RepositoryError>;
}

/// Storage for donation campaigns and the donors who joined them.
#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn create(
        &self,
        new: &NewCampaign,
        now: DateTime<Utc>,
    ) -> Result<Campaign, RepositoryError>;

    async fn get(&self, id: CampaignId) -> Result<Option<Campaign>, RepositoryError>;

    /// Campaigns run by `organizer`, newest first.
    async fn list_by_organizer(&self, organizer: &Email) -> Result<Vec<Campaign>, RepositoryError>;

    /// Record that a donor joined. Returns `false` if that email already had.
    ///
    /// Fails with `NotFound` for unknown IDs.
    async fn add_response(
        &self,
        id: CampaignId,
        response: &CampaignResponse,
    ) -> Result<bool, RepositoryError>;

    /// Donors who joined, in join order. Fails with `NotFound` for unknown IDs.
    async fn responses(&self, id: CampaignId) -> Result<Vec<CampaignResponse>, RepositoryError>;
}

// =============================================================================
// Store Bundle
// =============================================================================

#[derive(Clone)]
enum Backend {
    Postgres(PgPool),
    Memory,
}

/// All stores used by the server, sharing one backend.
#[derive(Clone)]
pub struct Stores {
    pub passcodes: Arc<dyn PasscodeStore>,
    pub identities: Arc<dyn IdentityStore>,
    pub blood_requests: Arc<dyn BloodRequestStore>,
    pub blood_banks: Arc<dyn LookupCacheStore>,
    pub campaigns: Arc<dyn CampaignStore>,
    backend: Backend,
}

impl Stores {
    /// Stores backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            passcodes: Arc::new(PasscodeRepository::new(pool.clone())),
            identities: Arc::new(IdentityRepository::new(pool.clone())),
            blood_requests: Arc::new(BloodRequestRepository::new(pool.clone())),
            blood_banks: Arc::new(BloodBankCacheRepository::new(pool.clone())),
            campaigns: Arc::new(CampaignRepository::new(pool.clone())),
            backend: Backend::Postgres(pool),
        }
    }

    /// Stores backed by one shared [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_memory(&MemoryStore::new())
    }

    /// Stores backed by an existing [`MemoryStore`], so callers can inspect it.
    #[must_use]
    pub fn from_memory(store: &MemoryStore) -> Self {
        Self {
            passcodes: Arc::new(store.clone()),
            identities: Arc::new(store.clone()),
            blood_requests: Arc::new(store.clone()),
            blood_banks: Arc::new(store.clone()),
            campaigns: Arc::new(store.clone()),
            backend: Backend::Memory,
        }
    }

    /// Check that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if `PostgreSQL` does not answer.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        match &self.backend {
            Backend::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
                Ok(())
            }
            Backend::Memory => Ok(()),
        }
    }
}
