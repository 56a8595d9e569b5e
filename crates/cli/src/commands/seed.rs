//! Seed the blood bank lookup cache from a JSON file.
//!
//! The file holds an array of records, one per postal code:
//!
//! ```json
//! [
//!   { "postalCode": "75034", "data": [{ "name": "Carter BloodCare", "timings": "8-6" }] }
//! ]
//! ```
//!
//! `zip_code` and `pincode` are accepted in place of `postalCode`. Entries
//! go through the same conversion as generated listings, and at most ten
//! are kept per postal code. Seeded records count as freshly refreshed.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use blood_connect_core::PostalCode;
use blood_connect_server::db::{self, LookupCacheStore, Stores};
use blood_connect_server::models::CachedLookup;
use blood_connect_server::services::blood_banks::entries_from_values;

use super::{CommandError, database_url};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedRecord {
    #[serde(alias = "zip_code", alias = "pincode")]
    postal_code: String,
    #[serde(default)]
    data: Vec<Value>,
}

/// Parse seed file contents into cache records.
fn parse_seed(content: &str, now: DateTime<Utc>) -> Result<Vec<CachedLookup>, CommandError> {
    let records: Vec<SeedRecord> =
        serde_json::from_str(content).map_err(|e| CommandError::SeedFormat(e.to_string()))?;

    records
        .into_iter()
        .map(|record| {
            let postal_code = PostalCode::parse(&record.postal_code).map_err(|e| {
                CommandError::SeedFormat(format!("postal code {:?}: {e}", record.postal_code))
            })?;
            Ok(CachedLookup::new(
                postal_code,
                entries_from_values(&record.data),
                now,
            ))
        })
        .collect()
}

/// Upsert every record in `file_path` into the lookup cache.
///
/// The whole file is validated before anything is written.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or a write fails.
pub async fn blood_banks(file_path: &str) -> Result<(), CommandError> {
    let path = Path::new(file_path);
    tracing::info!(path = %file_path, "Loading blood bank listings from file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: file_path.to_string(),
            source,
        })?;
    let records = parse_seed(&content, Utc::now())?;
    tracing::info!(records = records.len(), "Parsed seed file");

    let pool = db::create_pool(&database_url()?).await?;
    let stores = Stores::postgres(pool);

    for record in &records {
        stores.blood_banks.upsert(record).await?;
        tracing::info!(
            postal_code = %record.postal_code,
            entries = record.entries.len(),
            "Seeded blood bank listing"
        );
    }

    tracing::info!(records = records.len(), "Seeding complete");
    Ok(())
}
