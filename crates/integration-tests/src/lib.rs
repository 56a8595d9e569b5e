//! Integration tests for BloodConnect.
//!
//! # Running Tests
//!
//! ```bash
//! # Service and router tests (in-memory store, no network)
//! cargo test -p blood-connect-integration-tests
//!
//! # Smoke tests against a running server
//! SERVER_BASE_URL=http://localhost:5000 cargo test -p blood-connect-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `passcode_flow` - Issue and verify login passcodes
//! - `blood_bank_lookup` - Cached blood bank lookups
//! - `donor_requests` - Profiles and blood request matching
//! - `campaigns` - Donation campaigns and sign-ups
//! - `api_router` - The JSON API through the axum router
//! - `smoke` - A running server over HTTP (ignored by default)

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use blood_connect_server::config::{BloodBankConfig, PasscodeConfig};
use blood_connect_server::db::{MemoryStore, Stores};
use blood_connect_server::genai::{CompletionRequest, GenerationError, Generator};
use blood_connect_server::services::{EmailError, Mailer, OutgoingEmail};
use blood_connect_server::state::AppState;

/// Mailer that keeps every message instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    /// All messages sent so far.
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().expect("mailer lock poisoned").clone()
    }

    /// The passcode in the most recent message to `email`.
    pub fn last_code_for(&self, email: &str) -> Option<String> {
        let sent = self.sent.lock().expect("mailer lock poisoned");
        let message = sent.iter().rev().find(|m| m.to.as_str() == email)?;
        message
            .text_body
            .split_whitespace()
            .find(|w| w.len() == 6 && w.chars().all(|c| c.is_ascii_digit()))
            .map(String::from)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        self.sent
            .lock()
            .expect("mailer lock poisoned")
            .push(email.clone());
        Ok(())
    }
}

/// Generator that answers from a queue and records what it was asked.
///
/// An empty queue answers with an API error.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<Vec<Result<String, GenerationError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGenerator {
    /// Queue a text response.
    pub fn push_text(&self, text: impl Into<String>) {
        self.push(Ok(text.into()));
    }

    /// Queue a response.
    pub fn push(&self, response: Result<String, GenerationError>) {
        self.responses
            .lock()
            .expect("generator lock poisoned")
            .insert(0, response);
    }

    /// Number of completions requested so far.
    pub fn calls(&self) -> usize {
        self.requests.lock().expect("generator lock poisoned").len()
    }

    /// Every request received, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .expect("generator lock poisoned")
            .clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        self.requests
            .lock()
            .expect("generator lock poisoned")
            .push(request.clone());
        self.responses
            .lock()
            .expect("generator lock poisoned")
            .pop()
            .unwrap_or_else(|| {
                Err(GenerationError::Api {
                    status: 503,
                    message: "no scripted response".to_string(),
                })
            })
    }
}

/// A JSON array of `count` blood banks, as a model would return it.
pub fn listing(count: usize) -> String {
    let items: Vec<Value> = (1..=count)
        .map(|i| {
            serde_json::json!({
                "name": format!("Blood Bank {i}"),
                "address": format!("{i} Main St"),
                "contact": format!("972-555-01{i:02}"),
                "timings": "9am-5pm",
                "campaign": null,
            })
        })
        .collect();
    Value::Array(items).to_string()
}

/// Application wired to an in-memory store and recording fakes.
pub struct TestContext {
    pub store: MemoryStore,
    pub mailer: Arc<RecordingMailer>,
    pub generator: Arc<ScriptedGenerator>,
    pub state: AppState,
}

impl TestContext {
    /// Create a context with default passcode and lookup settings.
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let mailer = Arc::new(RecordingMailer::default());
        let generator = Arc::new(ScriptedGenerator::default());
        let state = AppState::new(
            Stores::from_memory(&store),
            Arc::clone(&mailer) as Arc<dyn Mailer>,
            Arc::clone(&generator) as Arc<dyn Generator>,
            &PasscodeConfig::default(),
            &BloodBankConfig::default(),
        );

        Self {
            store,
            mailer,
            generator,
            state,
        }
    }

    /// POST a JSON body to the router and return the status and parsed body.
    pub async fn post_json(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let request = Request::post(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request");
        self.send(request).await
    }

    /// Send a raw request to the router and return the status and parsed body.
    ///
    /// Non-JSON bodies come back as a JSON string.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let app = blood_connect_server::app(self.state.clone(), None);
        let response = app.oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
