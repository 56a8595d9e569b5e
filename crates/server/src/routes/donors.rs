//! Donor profile endpoints.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::models::Identity;
use crate::services::donors::{ProfileChanges, Registration};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    #[serde(alias = "bloodGroup")]
    pub blood_type: String,
    #[serde(alias = "pincode")]
    pub postal_code: String,
    pub phone: Option<String>,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Self {
            email: req.email,
            name: req.name,
            blood_type: req.blood_type,
            postal_code: req.postal_code,
            phone: req.phone,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub email: String,
    pub name: Option<String>,
    #[serde(alias = "bloodGroup")]
    pub blood_type: Option<String>,
    #[serde(alias = "pincode")]
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub available_to_donate: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub ok: bool,
    pub user: Identity,
}

fn profile(user: Identity) -> Json<ProfileResponse> {
    Json(ProfileResponse { ok: true, user })
}

/// POST /api/register
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>> {
    let Json(req) = payload?;
    let user = state.donors().register(&req.into()).await?;
    Ok(profile(user))
}

/// POST /api/get-profile
#[instrument(skip(state, payload))]
pub async fn get_profile(
    State(state): State<AppState>,
    payload: std::result::Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>> {
    let Json(req) = payload?;
    let user = state.donors().profile(&req.email).await?;
    Ok(profile(user))
}

/// POST /api/update-profile
#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>> {
    let Json(req) = payload?;
    let changes = ProfileChanges {
        name: req.name,
        blood_type: req.blood_type,
        postal_code: req.postal_code,
        phone: req.phone,
        available_to_donate: req.available_to_donate,
    };
    let user = state.donors().update_profile(&req.email, &changes).await?;
    Ok(profile(user))
}

/// POST /api/donate
#[instrument(skip(state, payload))]
pub async fn donate(
    State(state): State<AppState>,
    payload: std::result::Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>> {
    let Json(req) = payload?;
    let user = state.donors().mark_available(&req.email).await?;
    Ok(profile(user))
}
