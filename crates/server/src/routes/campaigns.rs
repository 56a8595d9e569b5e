//! Donation campaign endpoints.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use blood_connect_core::CampaignId;

use crate::error::Result;
use crate::models::{Campaign, CampaignResponse};
use crate::services::campaigns::{CampaignError, CampaignForm, JoinForm};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrganizerField {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub time: String,
    pub venue: String,
    pub incentive: Option<String>,
    pub message: Option<String>,
    pub organizer: OrganizerField,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl From<CreateCampaignRequest> for CampaignForm {
    fn from(req: CreateCampaignRequest) -> Self {
        Self {
            title: req.title,
            start_date: req.start_date,
            end_date: req.end_date,
            time: req.time,
            venue: req.venue,
            incentive: req.incentive,
            message: req.message,
            organizer_name: req.organizer.name,
            organizer_email: req.organizer.email,
            lat: req.lat,
            lng: req.lng,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JoinRequest {
    pub name: String,
    pub email: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrganizerQuery {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CampaignCreatedResponse {
    pub ok: bool,
    pub campaign: Campaign,
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub ok: bool,
    pub success: bool,
    /// False when the email had already joined.
    pub joined: bool,
}

#[derive(Debug, Serialize)]
pub struct ResponsesResponse {
    pub ok: bool,
    pub responses: Vec<CampaignResponse>,
}

/// Unknown and non-numeric IDs both read as a missing campaign.
fn campaign_id(raw: &str) -> std::result::Result<CampaignId, CampaignError> {
    raw.trim()
        .parse::<i32>()
        .map(CampaignId::new)
        .map_err(|_| CampaignError::NotFound)
}

/// POST /api/campaigns
#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateCampaignRequest>, JsonRejection>,
) -> Result<Json<CampaignCreatedResponse>> {
    let Json(req) = payload?;
    let campaign = state.campaigns().create(&req.into()).await?;
    Ok(Json(CampaignCreatedResponse { ok: true, campaign }))
}

/// GET /api/campaigns?lat=&lng=
#[instrument(skip(state, query))]
pub async fn nearby(
    State(state): State<AppState>,
    query: std::result::Result<Query<NearbyQuery>, QueryRejection>,
) -> Result<Json<Vec<Campaign>>> {
    let Query(q) = query?;
    Ok(Json(state.campaigns().nearby(q.lat, q.lng).await?))
}

/// GET /api/campaigns/by-organizer?email=
#[instrument(skip(state, query))]
pub async fn by_organizer(
    State(state): State<AppState>,
    query: std::result::Result<Query<OrganizerQuery>, QueryRejection>,
) -> Result<Json<Vec<Campaign>>> {
    let Query(q) = query?;
    Ok(Json(state.campaigns().by_organizer(&q.email).await?))
}

/// POST /api/campaigns/{id}/respond
#[instrument(skip(state, payload))]
pub async fn respond(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<JoinRequest>, JsonRejection>,
) -> Result<Json<JoinResponse>> {
    let Json(req) = payload?;
    let form = JoinForm {
        name: req.name,
        email: req.email,
        lat: req.lat,
        lng: req.lng,
    };
    let joined = state.campaigns().respond(campaign_id(&id)?, &form).await?;
    Ok(Json(JoinResponse {
        ok: true,
        success: true,
        joined,
    }))
}

/// GET /api/campaigns/{id}/responses
#[instrument(skip(state))]
pub async fn responses(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResponsesResponse>> {
    let responses = state.campaigns().responses(campaign_id(&id)?).await?;
    Ok(Json(ResponsesResponse {
        ok: true,
        responses,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_campaign_id_parsing() {
        assert_eq!(campaign_id(" 12 ").unwrap(), CampaignId::new(12));
        assert!(matches!(campaign_id("abc"), Err(CampaignError::NotFound)));
    }

    #[test]
    fn test_create_request_reads_nested_organizer() {
        let req: CreateCampaignRequest = serde_json::from_str(
            r#"{"title":"Drive","startDate":"2026-11-01","organizer":{"name":"Meera","email":"m@example.com"},"lat":12.9,"lng":77.5}"#,
        )
        .unwrap();
        let form = CampaignForm::from(req);
        assert_eq!(form.start_date, "2026-11-01");
        assert_eq!(form.organizer_email, "m@example.com");
        assert!(form.lat.is_some() && form.lng.is_some());
    }
}
