//! Blood bank lookups with a stale-while-fetch cache.
//!
//! A fresh cached listing for a postal code is returned as is. Otherwise the
//! generation capability is asked for one, and a parseable answer replaces
//! the cache record. Output that cannot be parsed yields an empty listing and
//! never touches the cache, so a stale record survives for the next attempt.
//! A failed generation call is an error, and callers fall back to their own
//! default list.

pub mod parse;
pub mod prompt;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::instrument;

use blood_connect_core::PostalCode;

use crate::config::BloodBankConfig;
use crate::db::{LookupCacheStore, RepositoryError, Stores};
use crate::genai::{CompletionRequest, GenerationError, Generator};
use crate::models::{CachedLookup, MAX_PROVIDER_ENTRIES, ProviderEntry};

pub use parse::{
    GenerationOutcome, entries_from_values, parse_provider_entries, strip_code_fences,
};

/// Errors from blood bank lookups.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Missing or malformed postal code.
    #[error("{0}")]
    InvalidInput(String),

    /// The generation call failed.
    #[error("blood bank lookup failed: {0}")]
    Upstream(#[source] GenerationError),
}

/// Looks up blood banks near a postal code.
#[derive(Clone)]
pub struct BloodBankService {
    cache: Arc<dyn LookupCacheStore>,
    generator: Arc<dyn Generator>,
    config: BloodBankConfig,
}

impl BloodBankService {
    /// Create a new blood bank service.
    #[must_use]
    pub fn new(stores: &Stores, generator: Arc<dyn Generator>, config: &BloodBankConfig) -> Self {
        Self {
            cache: Arc::clone(&stores.blood_banks),
            generator,
            config: *config,
        }
    }

    /// Up to 10 blood banks near `postal_code`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the postal code is empty or malformed
    /// - `Upstream` if the generation call fails or times out
    pub async fn lookup(&self, postal_code: &str) -> Result<Vec<ProviderEntry>, LookupError> {
        self.lookup_at(postal_code, Utc::now()).await
    }

    /// [`Self::lookup`] with an explicit clock.
    ///
    /// # Errors
    ///
    /// See [`Self::lookup`].
    #[instrument(skip(self))]
    pub async fn lookup_at(
        &self,
        postal_code: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<ProviderEntry>, LookupError> {
        let postal_code = PostalCode::parse(postal_code)
            .map_err(|e| LookupError::InvalidInput(format!("Invalid postal code: {e}")))?;

        let cached = match self.cache.get(&postal_code).await {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(postal_code = %postal_code, error = %e, "Blood bank cache read failed, treating as miss");
                None
            }
        };

        if let Some(record) = cached
            && record.is_fresh_at(now, self.config.freshness)
        {
            tracing::debug!(postal_code = %postal_code, "Blood bank cache hit");
            return Ok(capped(record.entries));
        }

        let request = CompletionRequest {
            system_prompt: prompt::SYSTEM_PROMPT.to_string(),
            user_prompt: prompt::user_prompt(&postal_code),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let text = match tokio::time::timeout(
            self.config.generation_timeout,
            self.generator.complete(&request),
        )
        .await
        {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(upstream(&postal_code, e)),
            Err(_) => {
                let e = GenerationError::Timeout(self.config.generation_timeout.as_secs());
                return Err(upstream(&postal_code, e));
            }
        };

        match parse_provider_entries(&text) {
            GenerationOutcome::Unparseable(raw) => {
                tracing::warn!(postal_code = %postal_code, raw = %raw, "Unparseable blood bank listing, not cached");
                Ok(Vec::new())
            }
            GenerationOutcome::Parsed(entries) => {
                let record = CachedLookup::new(postal_code, entries, now);
                if let Err(e) = self.cache.upsert(&record).await {
                    tracing::error!(postal_code = %record.postal_code, error = %e, "Failed to cache blood bank listing");
                }
                tracing::info!(postal_code = %record.postal_code, count = record.entries.len(), "Blood bank listing refreshed");
                Ok(record.entries)
            }
        }
    }

    /// Store a listing for `postal_code` as if it had just been generated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the cache write fails.
    pub async fn seed(
        &self,
        postal_code: PostalCode,
        entries: Vec<ProviderEntry>,
        now: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.cache
            .upsert(&CachedLookup::new(postal_code, entries, now))
            .await
    }
}

fn capped(mut entries: Vec<ProviderEntry>) -> Vec<ProviderEntry> {
    entries.truncate(MAX_PROVIDER_ENTRIES);
    entries
}

fn upstream(postal_code: &PostalCode, error: GenerationError) -> LookupError {
    tracing::warn!(postal_code = %postal_code, error = %error, "Blood bank generation failed");
    LookupError::Upstream(error)
}
