//! Passcode login endpoints.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SendOtpRequest {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerifyOtpRequest {
    pub email: String,
    #[serde(alias = "otp")]
    pub code: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CheckUserRequest {
    pub email: String,
}

/// Body returned by endpoints that only report success.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub(crate) const fn ok() -> Json<Self> {
        Json(Self { ok: true })
    }
}

#[derive(Debug, Serialize)]
pub struct CheckUserResponse {
    pub ok: bool,
    pub registered: bool,
}

/// POST /api/send-otp
#[instrument(skip(state, payload))]
pub async fn send_otp(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SendOtpRequest>, JsonRejection>,
) -> Result<Json<OkResponse>> {
    let Json(req) = payload?;
    state.passcodes().issue(&req.email).await?;
    Ok(OkResponse::ok())
}

/// POST /api/verify-otp
#[instrument(skip(state, payload))]
pub async fn verify_otp(
    State(state): State<AppState>,
    payload: std::result::Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> Result<Json<OkResponse>> {
    let Json(req) = payload?;
    state.passcodes().verify(&req.email, &req.code).await?;
    Ok(OkResponse::ok())
}

/// POST /api/check-user
///
/// Malformed emails are simply not registered.
#[instrument(skip(state, payload))]
pub async fn check_user(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CheckUserRequest>, JsonRejection>,
) -> Result<Json<CheckUserResponse>> {
    let Json(req) = payload?;
    let registered = state.passcodes().is_registered(&req.email).await?;
    Ok(Json(CheckUserResponse {
        ok: true,
        registered,
    }))
}
