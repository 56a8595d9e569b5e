//! Passcode maintenance.

use chrono::Utc;

use blood_connect_server::db::{self, PasscodeStore, Stores};

use super::{CommandError, database_url};

/// Delete every passcode whose expiry has passed.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the delete fails.
pub async fn purge() -> Result<(), CommandError> {
    let pool = db::create_pool(&database_url()?).await?;
    let stores = Stores::postgres(pool);

    let purged = stores.passcodes.purge_expired(Utc::now()).await?;
    tracing::info!(purged, "Expired passcodes removed");
    Ok(())
}
