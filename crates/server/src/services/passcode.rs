//! Email passcode authentication.
//!
//! # Flow
//!
//! 1. `issue` generates a 6-digit code, replaces any previous code for the
//!    email and mails it
//! 2. `verify` accepts the code once; success and expiry both consume it
//!
//! Reissuing discards the previous code, so at most one code per email is
//! live at any time.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use thiserror::Error;
use tracing::instrument;

use blood_connect_core::{Email, Passcode};

use crate::config::PasscodeConfig;
use crate::db::{IdentityStore, PasscodeStore, RepositoryError, Stores};
use crate::models::PasscodeRecord;
use crate::services::email::{EmailError, Mailer, OutgoingEmail};

/// Errors from passcode operations.
#[derive(Debug, Error)]
pub enum PasscodeError {
    /// Missing or malformed input.
    #[error("{0}")]
    InvalidInput(String),

    /// No code matches the email and code given.
    #[error("Invalid OTP")]
    NotFound,

    /// The code matched but is past its expiry.
    #[error("OTP expired")]
    Expired,

    /// The email could not be delivered.
    #[error("Failed to send OTP")]
    Delivery(#[from] EmailError),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] RepositoryError),
}

/// Generate a uniformly random 6-digit passcode (`000000`-`999999`).
#[must_use]
pub fn generate_passcode() -> Passcode {
    let n = rand::rng().random_range(0..Passcode::SPACE);
    Passcode::from_number(n)
}

fn parse_email(raw: &str) -> Result<Email, PasscodeError> {
    if raw.trim().is_empty() {
        return Err(PasscodeError::InvalidInput("Email is required".to_string()));
    }
    Email::parse(raw).map_err(|e| PasscodeError::InvalidInput(format!("Invalid email: {e}")))
}

/// Issues and verifies login passcodes.
#[derive(Clone)]
pub struct PasscodeService {
    passcodes: Arc<dyn PasscodeStore>,
    identities: Arc<dyn IdentityStore>,
    mailer: Arc<dyn Mailer>,
    ttl: Duration,
}

impl PasscodeService {
    /// Create a new passcode service.
    #[must_use]
    pub fn new(stores: &Stores, mailer: Arc<dyn Mailer>, config: &PasscodeConfig) -> Self {
        Self {
            passcodes: Arc::clone(&stores.passcodes),
            identities: Arc::clone(&stores.identities),
            mailer,
            ttl: config.ttl,
        }
    }

    /// Issue a new passcode for `email` and deliver it.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the email is empty or malformed (nothing is stored)
    /// - `Delivery` if the email could not be sent (the new code is removed)
    /// - `Store` if the store fails
    pub async fn issue(&self, email: &str) -> Result<(), PasscodeError> {
        self.issue_at(email, Utc::now()).await
    }

    /// [`Self::issue`] with an explicit clock.
    ///
    /// # Errors
    ///
    /// See [`Self::issue`].
    #[instrument(skip(self, email))]
    pub async fn issue_at(&self, email: &str, now: DateTime<Utc>) -> Result<(), PasscodeError> {
        let email = parse_email(email)?;
        let code = generate_passcode();
        let message = OutgoingEmail::passcode(&email, &code, self.ttl.num_minutes())?;

        let record = PasscodeRecord {
            email: email.clone(),
            code,
            expires_at: now + self.ttl,
            created_at: now,
        };
        self.passcodes.replace(&record).await?;

        if let Err(e) = self.mailer.send(&message).await {
            tracing::error!(email = %email, error = %e, "Failed to send passcode email");
            if let Err(cleanup) = self.passcodes.delete_for_email(&email).await {
                tracing::error!(email = %email, error = %cleanup, "Failed to remove undelivered passcode");
            }
            return Err(PasscodeError::Delivery(e));
        }

        tracing::info!(email = %email, expires_at = %record.expires_at, "Passcode issued");
        Ok(())
    }

    /// Verify a passcode, consuming it.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if email or code is empty
    /// - `NotFound` if no record matches (including a second use)
    /// - `Expired` if the matching record is past its expiry
    /// - `Store` if the store fails
    pub async fn verify(&self, email: &str, code: &str) -> Result<(), PasscodeError> {
        self.verify_at(email, code, Utc::now()).await
    }

    /// [`Self::verify`] with an explicit clock.
    ///
    /// # Errors
    ///
    /// See [`Self::verify`].
    #[instrument(skip(self, email, code))]
    pub async fn verify_at(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<(), PasscodeError> {
        let email = parse_email(email)?;
        if code.trim().is_empty() {
            return Err(PasscodeError::InvalidInput("OTP is required".to_string()));
        }
        // A code of the wrong shape can never match a stored one.
        let Ok(code) = Passcode::parse(code) else {
            return Err(PasscodeError::NotFound);
        };

        let Some(record) = self.passcodes.consume(&email, &code).await? else {
            tracing::info!(email = %email, "Passcode rejected");
            return Err(PasscodeError::NotFound);
        };

        if record.is_expired_at(now) {
            tracing::info!(email = %email, "Passcode expired");
            return Err(PasscodeError::Expired);
        }

        tracing::info!(email = %email, "Passcode verified");
        Ok(())
    }

    /// Whether `email` belongs to a registered identity.
    ///
    /// Empty or malformed emails are never registered.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the identity store fails.
    pub async fn is_registered(&self, email: &str) -> Result<bool, PasscodeError> {
        let Ok(email) = Email::parse(email) else {
            return Ok(false);
        };
        Ok(self.identities.exists(&email).await?)
    }

    /// Delete all passcodes that expired before `now`.
    ///
    /// # Errors
    ///
    /// Returns `Store` if the passcode store fails.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, PasscodeError> {
        let purged = self.passcodes.purge_expired(now).await?;
        tracing::info!(purged, "Expired passcodes purged");
        Ok(purged)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::db::MemoryStore;
    use crate::services::email::LogMailer;

    /// Records every message instead of sending it.
    #[derive(Default)]
    struct CapturingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    impl CapturingMailer {
        fn last_code(&self) -> String {
            let sent = self.sent.lock().unwrap();
            let body = &sent.last().unwrap().text_body;
            body.split_whitespace()
                .find(|w| w.len() == 6 && w.chars().all(|c| c.is_ascii_digit()))
                .unwrap()
                .to_string()
        }
    }

    #[async_trait]
    impl Mailer for CapturingMailer {
        async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
            Err(EmailError::InvalidAddress(email.to.to_string()))
        }
    }

    fn service(store: &MemoryStore, mailer: Arc<dyn Mailer>) -> PasscodeService {
        PasscodeService::new(
            &Stores::from_memory(store),
            mailer,
            &PasscodeConfig::default(),
        )
    }

    fn donor() -> Email {
        Email::parse("donor@example.com").unwrap()
    }

    /// Holds every `consume` call until two callers are inside it.
    struct RendezvousStore {
        inner: MemoryStore,
        barrier: tokio::sync::Barrier,
    }

    #[async_trait]
    impl PasscodeStore for RendezvousStore {
        async fn replace(&self, record: &PasscodeRecord) -> Result<(), RepositoryError> {
            self.inner.replace(record).await
        }

        async fn consume(
            &self,
            email: &Email,
            code: &Passcode,
        ) -> Result<Option<PasscodeRecord>, RepositoryError> {
            self.barrier.wait().await;
            self.inner.consume(email, code).await
        }

        async fn delete_for_email(&self, email: &Email) -> Result<u64, RepositoryError> {
            self.inner.delete_for_email(email).await
        }

        async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
            self.inner.purge_expired(now).await
        }
    }

    #[test]
    fn test_generate_passcode_format() {
        for _ in 0..100 {
            let code = generate_passcode();
            assert_eq!(code.as_str().len(), 6);
            assert!(code.as_str().chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn test_issue_stores_one_record_with_ttl() {
        let store = MemoryStore::new();
        let svc = service(&store, Arc::new(LogMailer));
        let now = Utc::now();

        svc.issue_at(" Donor@Example.com ", now).await.unwrap();

        let records = store.passcodes_for(&donor()).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].expires_at, now + Duration::minutes(10));
    }

    #[tokio::test]
    async fn test_issue_rejects_bad_email_without_side_effects() {
        let store = MemoryStore::new();
        let mailer = Arc::new(CapturingMailer::default());
        let svc = service(&store, mailer.clone());

        assert!(matches!(
            svc.issue("").await,
            Err(PasscodeError::InvalidInput(_))
        ));
        assert!(matches!(
            svc.issue("not-an-email").await,
            Err(PasscodeError::InvalidInput(_))
        ));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_verify_consumes_code() {
        let store = MemoryStore::new();
        let mailer = Arc::new(CapturingMailer::default());
        let svc = service(&store, mailer.clone());

        svc.issue("donor@example.com").await.unwrap();
        let code = mailer.last_code();

        svc.verify("donor@example.com", &code).await.unwrap();
        assert!(matches!(
            svc.verify("donor@example.com", &code).await,
            Err(PasscodeError::NotFound)
        ));
        assert!(store.passcodes_for(&donor()).await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_verify_accepts_code_once() {
        let store = MemoryStore::new();
        let mailer = Arc::new(CapturingMailer::default());
        let svc = PasscodeService {
            passcodes: Arc::new(RendezvousStore {
                inner: store.clone(),
                barrier: tokio::sync::Barrier::new(2),
            }),
            identities: Arc::new(store.clone()),
            mailer: mailer.clone(),
            ttl: Duration::minutes(10),
        };

        svc.issue("donor@example.com").await.unwrap();
        let code = mailer.last_code();

        let (first, second) = tokio::join!(
            svc.verify("donor@example.com", &code),
            svc.verify("donor@example.com", &code)
        );

        let accepted = [&first, &second].iter().filter(|r| r.is_ok()).count();
        assert_eq!(accepted, 1);
        assert!(
            matches!(first, Err(PasscodeError::NotFound))
                || matches!(second, Err(PasscodeError::NotFound))
        );
        assert!(store.passcodes_for(&donor()).await.is_empty());
    }

    #[tokio::test]
    async fn test_verify_expired_removes_record() {
        let store = MemoryStore::new();
        let mailer = Arc::new(CapturingMailer::default());
        let svc = service(&store, mailer.clone());
        let now = Utc::now();

        svc.issue_at("donor@example.com", now).await.unwrap();
        let code = mailer.last_code();

        let later = now + Duration::minutes(11);
        assert!(matches!(
            svc.verify_at("donor@example.com", &code, later).await,
            Err(PasscodeError::Expired)
        ));
        assert!(store.passcodes_for(&donor()).await.is_empty());
    }

    #[tokio::test]
    async fn test_verify_input_validation() {
        let store = MemoryStore::new();
        let svc = service(&store, Arc::new(LogMailer));

        assert!(matches!(
            svc.verify("", "123456").await,
            Err(PasscodeError::InvalidInput(_))
        ));
        assert!(matches!(
            svc.verify("donor@example.com", " ").await,
            Err(PasscodeError::InvalidInput(_))
        ));
        assert!(matches!(
            svc.verify("donor@example.com", "12ab").await,
            Err(PasscodeError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delivery_failure_removes_code() {
        let store = MemoryStore::new();
        let svc = service(&store, Arc::new(FailingMailer));

        assert!(matches!(
            svc.issue("donor@example.com").await,
            Err(PasscodeError::Delivery(_))
        ));
        assert!(store.passcodes_for(&donor()).await.is_empty());
    }

    #[tokio::test]
    async fn test_is_registered_malformed_is_false() {
        let store = MemoryStore::new();
        let svc = service(&store, Arc::new(LogMailer));

        assert!(!svc.is_registered("").await.unwrap());
        assert!(!svc.is_registered("nope").await.unwrap());
        assert!(!svc.is_registered("donor@example.com").await.unwrap());
    }
}
