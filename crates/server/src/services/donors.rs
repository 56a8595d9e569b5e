//! Donor directory and blood requests.
//!
//! Registered identities carry a blood type and postal code; blood requests
//! are matched to donors in the same postal code. Donors accept (first one
//! wins) or decline (request hidden from them from then on).

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use blood_connect_core::{BloodRequestId, BloodType, Email, PostalCode};

use crate::db::{BloodRequestStore, IdentityStore, RepositoryError, Stores};
use crate::models::{
    BloodRequest, Identity, IdentityPatch, NewBloodRequest, NewIdentity, Responder,
};

/// Errors from donor directory operations.
#[derive(Debug, Error)]
pub enum DonorError {
    /// Missing or malformed input.
    #[error("{0}")]
    InvalidInput(String),

    /// The identity or request does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The operation conflicts with current state.
    #[error("{0}")]
    Conflict(String),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[source] RepositoryError),
}

impl DonorError {
    fn from_repo(e: RepositoryError, not_found: &str, conflict: &str) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound(not_found.to_string()),
            RepositoryError::Conflict(_) => Self::Conflict(conflict.to_string()),
            other => Self::Store(other),
        }
    }
}

impl From<RepositoryError> for DonorError {
    fn from(e: RepositoryError) -> Self {
        Self::Store(e)
    }
}

/// Registration form, as submitted.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub email: String,
    pub name: String,
    pub blood_type: String,
    pub postal_code: String,
    pub phone: Option<String>,
}

/// Profile changes, as submitted. Blank strings count as absent.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub blood_type: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub available_to_donate: Option<bool>,
}

/// Blood request form, as submitted.
#[derive(Debug, Clone, Default)]
pub struct RequestForm {
    pub requester_email: String,
    pub requester_name: String,
    pub blood_type: String,
    pub postal_code: String,
    pub phone: Option<String>,
}

/// A donor's answer to a request, as submitted.
#[derive(Debug, Clone, Default)]
pub struct DonorAnswer {
    pub request_id: i32,
    pub donor_email: String,
    pub donor_name: String,
    pub donor_phone: Option<String>,
    pub accepted: bool,
}

fn email(raw: &str) -> Result<Email, DonorError> {
    if raw.trim().is_empty() {
        return Err(DonorError::InvalidInput("Email is required".to_string()));
    }
    Email::parse(raw).map_err(|e| DonorError::InvalidInput(format!("Invalid email: {e}")))
}

fn required(field: &str, raw: &str) -> Result<String, DonorError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(DonorError::InvalidInput(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn blood_type(raw: &str) -> Result<BloodType, DonorError> {
    required("Blood type", raw)?
        .parse()
        .map_err(|e| DonorError::InvalidInput(format!("{e}")))
}

fn postal_code(raw: &str) -> Result<PostalCode, DonorError> {
    PostalCode::parse(raw).map_err(|e| DonorError::InvalidInput(format!("Invalid postal code: {e}")))
}

fn non_blank(raw: Option<&String>) -> Option<&str> {
    raw.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Registration, profiles and blood requests.
#[derive(Clone)]
pub struct DonorService {
    identities: Arc<dyn IdentityStore>,
    requests: Arc<dyn BloodRequestStore>,
}

impl DonorService {
    /// Create a new donor service.
    #[must_use]
    pub fn new(stores: &Stores) -> Self {
        Self {
            identities: Arc::clone(&stores.identities),
            requests: Arc::clone(&stores.blood_requests),
        }
    }

    /// Register a new identity.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for missing fields, `Conflict` if the email is taken.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: &Registration) -> Result<Identity, DonorError> {
        let new = NewIdentity {
            email: email(&form.email)?,
            name: required("Name", &form.name)?,
            blood_type: blood_type(&form.blood_type)?,
            postal_code: postal_code(&form.postal_code)?,
            phone: non_blank(form.phone.as_ref()).map(String::from),
        };

        let identity = self
            .identities
            .create(&new, Utc::now())
            .await
            .map_err(|e| DonorError::from_repo(e, "User not found", "Already registered"))?;

        tracing::info!(user_id = %identity.id, "User registered");
        Ok(identity)
    }

    /// Fetch a profile.
    ///
    /// # Errors
    ///
    /// `NotFound` if the email is not registered.
    pub async fn profile(&self, raw_email: &str) -> Result<Identity, DonorError> {
        let email = email(raw_email)?;
        self.identities
            .get_by_email(&email)
            .await?
            .ok_or_else(|| DonorError::NotFound("User not found".to_string()))
    }

    /// Apply a partial profile update.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if nothing would change or a field is malformed,
    /// `NotFound` if the email is not registered.
    #[instrument(skip(self, changes))]
    pub async fn update_profile(
        &self,
        raw_email: &str,
        changes: &ProfileChanges,
    ) -> Result<Identity, DonorError> {
        let email = email(raw_email)?;
        let patch = IdentityPatch {
            name: non_blank(changes.name.as_ref()).map(String::from),
            blood_type: non_blank(changes.blood_type.as_ref())
                .map(blood_type)
                .transpose()?,
            postal_code: non_blank(changes.postal_code.as_ref())
                .map(postal_code)
                .transpose()?,
            phone: non_blank(changes.phone.as_ref()).map(String::from),
            available_to_donate: changes.available_to_donate,
        };
        if patch.is_empty() {
            return Err(DonorError::InvalidInput(
                "No profile fields to update".to_string(),
            ));
        }

        self.identities
            .update(&email, &patch, Utc::now())
            .await
            .map_err(|e| DonorError::from_repo(e, "User not found", "Profile conflict"))
    }

    /// Mark the user as available to donate.
    ///
    /// # Errors
    ///
    /// `NotFound` if the email is not registered.
    pub async fn mark_available(&self, raw_email: &str) -> Result<Identity, DonorError> {
        let changes = ProfileChanges {
            available_to_donate: Some(true),
            ..ProfileChanges::default()
        };
        self.update_profile(raw_email, &changes).await
    }

    /// Submit a pending blood request.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for missing or malformed fields.
    #[instrument(skip(self, form), fields(postal_code = %form.postal_code))]
    pub async fn submit_request(&self, form: &RequestForm) -> Result<BloodRequest, DonorError> {
        let new = NewBloodRequest {
            requester_email: email(&form.requester_email)?,
            requester_name: required("Name", &form.requester_name)?,
            blood_type: blood_type(&form.blood_type)?,
            postal_code: postal_code(&form.postal_code)?,
            phone: non_blank(form.phone.as_ref()).map(String::from),
        };

        let request = self.requests.create(&new, Utc::now()).await?;
        tracing::info!(request_id = %request.id, "Blood request submitted");
        Ok(request)
    }

    /// Pending requests a donor can answer, newest first.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a malformed postal code or email.
    pub async fn pending_for_donor(
        &self,
        raw_postal_code: &str,
        raw_email: &str,
    ) -> Result<Vec<BloodRequest>, DonorError> {
        let postal_code = postal_code(raw_postal_code)?;
        let donor = email(raw_email)?;
        Ok(self.requests.pending_for_donor(&postal_code, &donor).await?)
    }

    /// Record a donor's answer to a request.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown requests, `Conflict` when accepting a request
    /// that is no longer pending.
    #[instrument(skip(self, answer), fields(request_id = answer.request_id, accepted = answer.accepted))]
    pub async fn respond(&self, answer: &DonorAnswer) -> Result<BloodRequest, DonorError> {
        let id = BloodRequestId::new(answer.request_id);
        let donor = email(&answer.donor_email)?;

        let updated = if answer.accepted {
            let responder = Responder {
                email: donor,
                name: required("Donor name", &answer.donor_name)?,
                phone: non_blank(answer.donor_phone.as_ref()).map(String::from),
            };
            self.requests.accept(id, &responder, Utc::now()).await
        } else {
            self.requests.decline(id, &donor, Utc::now()).await
        }
        .map_err(|e| {
            DonorError::from_repo(e, "Request not found", "Request is no longer pending")
        })?;

        tracing::info!(status = %updated.status, "Donor responded to request");
        Ok(updated)
    }

    /// Requests submitted by a user, newest first.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a malformed email.
    pub async fn requests_of(&self, raw_email: &str) -> Result<Vec<BloodRequest>, DonorError> {
        let requester = email(raw_email)?;
        Ok(self.requests.list_for_requester(&requester).await?)
    }

    /// Delete a user's pending requests.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a malformed email.
    pub async fn clear_pending(&self, raw_email: &str) -> Result<u64, DonorError> {
        let requester = email(raw_email)?;
        let deleted = self.requests.delete_pending_for_requester(&requester).await?;
        tracing::info!(deleted, "Pending blood requests cleared");
        Ok(deleted)
    }
}
