//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness
//! GET  /health/ready                - Readiness (store reachable)
//!
//! POST /api/send-otp                - Email a login passcode (rate limited)
//! POST /api/verify-otp              - Verify a login passcode (rate limited)
//! POST /api/check-user              - Is this email registered?
//!
//! POST /api/nearby-blood-banks      - Blood banks near a postal code
//!
//! POST /api/register                - Create a donor profile
//! POST /api/get-profile             - Fetch a donor profile
//! POST /api/update-profile          - Change profile fields
//! POST /api/donate                  - Mark a donor available
//!
//! POST /api/request-blood           - Submit a blood request
//! POST /api/pending-requests        - Requests a donor can answer
//! POST /api/respond-request         - Accept or decline a request
//! POST /api/my-requests             - Requests a user submitted
//! POST /api/clear-pending-requests  - Withdraw a user's pending requests
//!
//! POST /api/campaigns                    - Announce a campaign
//! GET  /api/campaigns?lat=&lng=          - Campaigns near a point
//! GET  /api/campaigns/by-organizer       - An organizer's campaigns
//! POST /api/campaigns/{id}/respond       - Join a campaign (once per email)
//! GET  /api/campaigns/{id}/responses     - Donors who joined
//! ```

pub mod auth;
pub mod blood_banks;
pub mod campaigns;
pub mod donors;
pub mod health;
pub mod requests;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::RateLimiterLayer;
use crate::state::AppState;

/// Passcode routes, optionally behind the per-IP rate limiter.
fn auth_routes(limiter: Option<RateLimiterLayer>) -> Router<AppState> {
    let limited = Router::new()
        .route("/send-otp", post(auth::send_otp))
        .route("/verify-otp", post(auth::verify_otp));

    let limited = match limiter {
        Some(layer) => limited.layer(layer),
        None => limited,
    };

    limited.route("/check-user", post(auth::check_user))
}

fn donor_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(donors::register))
        .route("/get-profile", post(donors::get_profile))
        .route("/update-profile", post(donors::update_profile))
        .route("/donate", post(donors::donate))
}

fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/request-blood", post(requests::request_blood))
        .route("/pending-requests", post(requests::pending_requests))
        .route("/respond-request", post(requests::respond_request))
        .route("/my-requests", post(requests::my_requests))
        .route(
            "/clear-pending-requests",
            post(requests::clear_pending_requests),
        )
}

fn campaign_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/campaigns",
            post(campaigns::create).get(campaigns::nearby),
        )
        .route("/campaigns/by-organizer", get(campaigns::by_organizer))
        .route("/campaigns/{id}/respond", post(campaigns::respond))
        .route("/campaigns/{id}/responses", get(campaigns::responses))
}

/// Build the complete router.
pub fn routes(limiter: Option<RateLimiterLayer>) -> Router<AppState> {
    let api = Router::new()
        .merge(auth_routes(limiter))
        .route("/nearby-blood-banks", post(blood_banks::nearby))
        .merge(donor_routes())
        .merge(request_routes())
        .merge(campaign_routes());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api)
}
