//! Blood request endpoints.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use blood_connect_core::{BloodRequestId, RequestStatus};

use crate::error::{AppError, Result};
use crate::models::BloodRequest;
use crate::services::donors::{DonorAnswer, RequestForm};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestBloodRequest {
    #[serde(alias = "patientEmail", alias = "email")]
    pub requester_email: String,
    #[serde(alias = "patientName", alias = "name")]
    pub requester_name: String,
    #[serde(alias = "bloodGroup")]
    pub blood_type: String,
    #[serde(alias = "pincode")]
    pub postal_code: String,
    pub phone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PendingRequestsRequest {
    #[serde(alias = "pincode")]
    pub postal_code: String,
    pub email: String,
}

/// A request id as clients send it: a number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RequestIdField {
    Number(i32),
    Text(String),
}

impl RequestIdField {
    fn parse(&self) -> Option<i32> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RespondRequest {
    pub request_id: Option<RequestIdField>,
    pub donor_email: String,
    pub donor_name: String,
    pub donor_phone: Option<String>,
    pub accepted: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequesterRequest {
    #[serde(alias = "patientEmail")]
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCreatedResponse {
    pub ok: bool,
    pub request_id: BloodRequestId,
}

#[derive(Debug, Serialize)]
pub struct RequestListResponse {
    pub ok: bool,
    pub requests: Vec<BloodRequest>,
}

#[derive(Debug, Serialize)]
pub struct RespondResponse {
    pub ok: bool,
    pub status: RequestStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearedResponse {
    pub ok: bool,
    pub deleted_count: u64,
}

/// POST /api/request-blood
#[instrument(skip(state, payload))]
pub async fn request_blood(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RequestBloodRequest>, JsonRejection>,
) -> Result<Json<RequestCreatedResponse>> {
    let Json(req) = payload?;
    let form = RequestForm {
        requester_email: req.requester_email,
        requester_name: req.requester_name,
        blood_type: req.blood_type,
        postal_code: req.postal_code,
        phone: req.phone,
    };
    let created = state.donors().submit_request(&form).await?;
    Ok(Json(RequestCreatedResponse {
        ok: true,
        request_id: created.id,
    }))
}

/// POST /api/pending-requests
#[instrument(skip(state, payload))]
pub async fn pending_requests(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PendingRequestsRequest>, JsonRejection>,
) -> Result<Json<RequestListResponse>> {
    let Json(req) = payload?;
    let requests = state
        .donors()
        .pending_for_donor(&req.postal_code, &req.email)
        .await?;
    Ok(Json(RequestListResponse { ok: true, requests }))
}

/// POST /api/respond-request
#[instrument(skip(state, payload))]
pub async fn respond_request(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RespondRequest>, JsonRejection>,
) -> Result<Json<RespondResponse>> {
    let Json(req) = payload?;
    let request_id = req
        .request_id
        .as_ref()
        .and_then(RequestIdField::parse)
        .ok_or_else(|| AppError::BadRequest("requestId is required".to_string()))?;

    let answer = DonorAnswer {
        request_id,
        donor_email: req.donor_email,
        donor_name: req.donor_name,
        donor_phone: req.donor_phone,
        accepted: req.accepted,
    };
    let updated = state.donors().respond(&answer).await?;
    Ok(Json(RespondResponse {
        ok: true,
        status: updated.status,
    }))
}

/// POST /api/my-requests
#[instrument(skip(state, payload))]
pub async fn my_requests(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RequesterRequest>, JsonRejection>,
) -> Result<Json<RequestListResponse>> {
    let Json(req) = payload?;
    let requests = state.donors().requests_of(&req.email).await?;
    Ok(Json(RequestListResponse { ok: true, requests }))
}

/// POST /api/clear-pending-requests
#[instrument(skip(state, payload))]
pub async fn clear_pending_requests(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RequesterRequest>, JsonRejection>,
) -> Result<Json<ClearedResponse>> {
    let Json(req) = payload?;
    let deleted_count = state.donors().clear_pending(&req.email).await?;
    Ok(Json(ClearedResponse {
        ok: true,
        deleted_count,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_accepts_number_or_string() {
        let numeric: RespondRequest = serde_json::from_str(r#"{"requestId": 7}"#).unwrap();
        assert_eq!(numeric.request_id.unwrap().parse(), Some(7));

        let text: RespondRequest = serde_json::from_str(r#"{"requestId": " 12 "}"#).unwrap();
        assert_eq!(text.request_id.unwrap().parse(), Some(12));

        let junk: RespondRequest = serde_json::from_str(r#"{"requestId": "abc"}"#).unwrap();
        assert_eq!(junk.request_id.unwrap().parse(), None);
    }

    #[test]
    fn test_request_form_aliases() {
        let req: RequestBloodRequest = serde_json::from_str(
            r#"{"patientEmail":"a@b.com","patientName":"Ann","bloodGroup":"O+","pincode":"75034"}"#,
        )
        .unwrap();
        assert_eq!(req.requester_email, "a@b.com");
        assert_eq!(req.requester_name, "Ann");
        assert_eq!(req.blood_type, "O+");
        assert_eq!(req.postal_code, "75034");
    }
}
