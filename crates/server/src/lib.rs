//! BloodConnect server library.
//!
//! This crate provides the HTTP backend as a library, allowing it to be
//! tested and reused by the CLI.
//!
//! # Capabilities
//!
//! - Email passcode login (6-digit codes, single use, 10 minute expiry)
//! - Donor profiles and blood requests matched by postal code
//! - Blood bank lookups generated on demand and cached per postal code

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod genai;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use middleware::RateLimiterLayer;
use state::AppState;

/// Build the application router with its middleware stack.
///
/// Pass `None` for `limiter` to serve the passcode routes without per-IP
/// rate limiting (tests, or behind a proxy that limits already).
pub fn app(state: AppState, limiter: Option<RateLimiterLayer>) -> Router {
    Router::new()
        .merge(routes::routes(limiter))
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
