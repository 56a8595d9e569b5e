//! Blood bank lookup endpoint.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::models::ProviderEntry;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NearbyRequest {
    #[serde(alias = "pincode", alias = "zipCode", alias = "zip_code")]
    pub postal_code: String,
}

#[derive(Debug, Serialize)]
pub struct NearbyResponse {
    pub ok: bool,
    pub entries: Vec<ProviderEntry>,
}

/// POST /api/nearby-blood-banks
///
/// An empty list is a successful answer.
#[instrument(skip(state, payload))]
pub async fn nearby(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NearbyRequest>, JsonRejection>,
) -> Result<Json<NearbyResponse>> {
    let Json(req) = payload?;
    let entries = state.blood_banks().lookup(&req.postal_code).await?;
    Ok(Json(NearbyResponse { ok: true, entries }))
}
