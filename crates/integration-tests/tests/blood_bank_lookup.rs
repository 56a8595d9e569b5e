//! Cached blood bank lookups over the in-memory store.

#![allow(clippy::unwrap_used)]

use blood_connect_core::PostalCode;
use blood_connect_integration_tests::{TestContext, listing};
use blood_connect_server::genai::GenerationError;
use blood_connect_server::services::LookupError;
use chrono::{Duration, Utc};

fn postal(raw: &str) -> PostalCode {
    PostalCode::parse(raw).unwrap()
}

#[tokio::test]
async fn test_lookup_scenario_75034() {
    let ctx = TestContext::new();
    let lookups = ctx.state.blood_banks();
    let now = Utc::now();
    ctx.generator.push_text(listing(10));
    ctx.generator.push_text(listing(4));

    let first = lookups.lookup_at("75034", now).await.unwrap();
    assert_eq!(first.len(), 10);
    let cached = ctx.store.cached_lookup(&postal("75034")).await.unwrap();
    assert_eq!(cached.entries.len(), 10);
    assert_eq!(ctx.generator.calls(), 1);

    let hour_later = lookups
        .lookup_at("75034", now + Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(hour_later, first);
    assert_eq!(ctx.generator.calls(), 1);

    let week_later = lookups
        .lookup_at("75034", now + Duration::days(8))
        .await
        .unwrap();
    assert_eq!(week_later.len(), 4);
    assert_eq!(ctx.generator.calls(), 2);
}

#[tokio::test]
async fn test_prompt_names_postal_code() {
    let ctx = TestContext::new();
    ctx.generator.push_text("[]");

    ctx.state.blood_banks().lookup(" 75034 ").await.unwrap();

    let requests = ctx.generator.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].user_prompt.contains("75034"));
    assert!(requests[0].system_prompt.contains("JSON array"));
}

#[tokio::test]
async fn test_fenced_empty_array_is_cached() {
    let ctx = TestContext::new();
    let lookups = ctx.state.blood_banks();
    let now = Utc::now();
    ctx.generator.push_text("```json\n[]\n```");

    assert!(lookups.lookup_at("10001", now).await.unwrap().is_empty());
    let cached = ctx.store.cached_lookup(&postal("10001")).await.unwrap();
    assert!(cached.entries.is_empty());

    // The empty listing is fresh, so no second generation call.
    assert!(
        lookups
            .lookup_at("10001", now + Duration::days(1))
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(ctx.generator.calls(), 1);
}

#[tokio::test]
async fn test_unparseable_output_is_not_cached() {
    let ctx = TestContext::new();
    ctx.generator
        .push_text("Sorry, I cannot browse the internet for blood banks.");

    assert!(ctx.state.blood_banks().lookup("10001").await.unwrap().is_empty());
    assert!(ctx.store.cached_lookup(&postal("10001")).await.is_none());
}

#[tokio::test]
async fn test_never_more_than_ten() {
    let ctx = TestContext::new();
    ctx.generator.push_text(listing(25));

    assert_eq!(ctx.state.blood_banks().lookup("94107").await.unwrap().len(), 10);
}

#[tokio::test]
async fn test_bad_output_returns_empty_and_keeps_stale_listing() {
    let ctx = TestContext::new();
    let lookups = ctx.state.blood_banks();
    let now = Utc::now();
    ctx.generator.push_text(listing(3));
    ctx.generator.push_text("{\"error\": \"not an array\"}");

    let fresh = lookups.lookup_at("75034", now).await.unwrap();
    let refreshed = lookups
        .lookup_at("75034", now + Duration::days(30))
        .await
        .unwrap();

    assert!(refreshed.is_empty());
    assert_eq!(ctx.generator.calls(), 2);

    let cached = ctx.store.cached_lookup(&postal("75034")).await.unwrap();
    assert_eq!(cached.refreshed_at, now);
    assert_eq!(cached.entries, fresh);
}

#[tokio::test]
async fn test_upstream_failure_is_reported_even_when_stale() {
    let ctx = TestContext::new();
    let lookups = ctx.state.blood_banks();
    let now = Utc::now();
    ctx.generator.push_text(listing(3));
    ctx.generator.push(Err(GenerationError::RateLimited(60)));

    lookups.lookup_at("75034", now).await.unwrap();
    assert!(matches!(
        lookups.lookup_at("75034", now + Duration::days(30)).await,
        Err(LookupError::Upstream(_))
    ));

    // The stale record is kept for the next attempt.
    assert!(ctx.store.cached_lookup(&postal("75034")).await.is_some());
}

#[tokio::test]
async fn test_seeded_listing_is_served_without_generation() {
    let ctx = TestContext::new();
    let entries = blood_connect_server::services::blood_banks::parse_provider_entries(&listing(2));
    let blood_connect_server::services::blood_banks::GenerationOutcome::Parsed(entries) = entries
    else {
        panic!("listing should parse");
    };

    ctx.state
        .blood_banks()
        .seed(postal("75034"), entries.clone(), Utc::now())
        .await
        .unwrap();

    assert_eq!(ctx.state.blood_banks().lookup("75034").await.unwrap(), entries);
    assert_eq!(ctx.generator.calls(), 0);
}

#[tokio::test]
async fn test_upstream_failure_without_cache_is_an_error() {
    let ctx = TestContext::new();

    assert!(matches!(
        ctx.state.blood_banks().lookup("75034").await,
        Err(LookupError::Upstream(_))
    ));
}
