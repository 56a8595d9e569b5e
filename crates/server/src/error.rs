//! Unified error handling with Sentry integration.
//!
//! Every API handler returns `Result<T, AppError>`. Errors are rendered as
//! `{"ok": false, "error": "..."}`; server-side failures are captured to
//! Sentry and answered with a generic message.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{CampaignError, DonorError, LookupError, PasscodeError};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Passcode issuance or verification failed.
    #[error(transparent)]
    Passcode(#[from] PasscodeError),

    /// Blood bank lookup failed.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Donor directory operation failed.
    #[error(transparent)]
    Donor(#[from] DonorError),

    /// Campaign operation failed.
    #[error(transparent)]
    Campaign(#[from] CampaignError),

    /// Store operation failed outside a service.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Malformed request body.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Passcode(err) => match err {
                PasscodeError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                PasscodeError::NotFound | PasscodeError::Expired => StatusCode::UNAUTHORIZED,
                PasscodeError::Delivery(_) => StatusCode::BAD_GATEWAY,
                PasscodeError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Lookup(err) => match err {
                LookupError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                LookupError::Upstream(_) => StatusCode::BAD_GATEWAY,
            },
            Self::Donor(err) => match err {
                DonorError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                DonorError::NotFound(_) => StatusCode::NOT_FOUND,
                DonorError::Conflict(_) => StatusCode::CONFLICT,
                DonorError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Campaign(err) => match err {
                CampaignError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                CampaignError::NotFound => StatusCode::NOT_FOUND,
                CampaignError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
                CampaignError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show to clients.
    fn public_message(&self) -> String {
        match self {
            Self::Passcode(PasscodeError::Store(_))
            | Self::Donor(DonorError::Store(_))
            | Self::Campaign(CampaignError::Store(_))
            | Self::Database(_) => "Server error".to_string(),
            Self::Lookup(LookupError::Upstream(_)) => {
                "Could not retrieve blood bank info.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server-side failures (store, delivery, upstream) to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = Json(json!({ "ok": false, "error": self.public_message() }));
        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::genai::GenerationError;
    use crate::services::EmailError;

    use super::*;

    fn get_status(err: impl Into<AppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_passcode_status_codes() {
        assert_eq!(
            get_status(PasscodeError::InvalidInput("Email is required".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(get_status(PasscodeError::NotFound), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(PasscodeError::Expired), StatusCode::UNAUTHORIZED);
        assert_eq!(
            get_status(PasscodeError::Delivery(EmailError::InvalidAddress(
                "x".into()
            ))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(PasscodeError::Store(RepositoryError::NotFound)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_donor_status_codes() {
        assert_eq!(
            get_status(DonorError::NotFound("User not found".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(DonorError::Conflict("Already registered".into())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_campaign_status_codes() {
        assert_eq!(get_status(CampaignError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            get_status(CampaignError::InvalidInput("Title is required".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CampaignError::Unavailable),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::from(CampaignError::Store(RepositoryError::NotFound)).public_message(),
            "Server error"
        );
    }

    #[test]
    fn test_lookup_upstream_is_bad_gateway() {
        assert_eq!(
            get_status(LookupError::Upstream(GenerationError::Timeout(15))),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_public_messages() {
        assert_eq!(
            AppError::from(PasscodeError::NotFound).public_message(),
            "Invalid OTP"
        );
        assert_eq!(
            AppError::from(PasscodeError::Expired).public_message(),
            "OTP expired"
        );
        assert_eq!(
            AppError::from(DonorError::Store(RepositoryError::DataCorruption(
                "bad row".into()
            )))
            .public_message(),
            "Server error"
        );
    }
}
