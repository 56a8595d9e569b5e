//! Donation campaigns through the axum router.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use blood_connect_integration_tests::TestContext;
use serde_json::{Value, json};

const ORGANIZER: &str = "organizer@example.com";

async fn get(ctx: &TestContext, path: &str) -> (StatusCode, Value) {
    ctx.send(Request::get(path).body(Body::empty()).unwrap())
        .await
}

async fn create_campaign(ctx: &TestContext, title: &str) -> i64 {
    let (status, body) = ctx
        .post_json(
            "/api/campaigns",
            &json!({
                "title": title,
                "startDate": "2026-11-01",
                "endDate": "2026-11-02",
                "time": "10:00-16:00",
                "venue": "Community centre",
                "incentive": "Free health check",
                "organizer": { "name": "Meera", "email": ORGANIZER },
                "lat": 12.97,
                "lng": 77.59,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    body["campaign"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_create_and_list_by_organizer() {
    let ctx = TestContext::new();
    create_campaign(&ctx, "First drive").await;
    create_campaign(&ctx, "Second drive").await;

    let (status, body) = get(&ctx, "/api/campaigns/by-organizer?email=organizer%40example.com").await;
    assert_eq!(status, StatusCode::OK);
    let campaigns = body.as_array().unwrap();
    assert_eq!(campaigns.len(), 2);
    assert_eq!(campaigns[0]["title"], json!("Second drive"));
    assert_eq!(campaigns[0]["organizer"]["email"], json!(ORGANIZER));
    assert_eq!(campaigns[0]["location"]["lat"], json!(12.97));

    let (status, body) = get(&ctx, "/api/campaigns/by-organizer?email=nobody%40example.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_create_requires_title() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .post_json(
            "/api/campaigns",
            &json!({ "organizer": { "name": "Meera", "email": ORGANIZER } }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "ok": false, "error": "Title is required" }));
}

#[tokio::test]
async fn test_join_once_per_email() {
    let ctx = TestContext::new();
    let id = create_campaign(&ctx, "Drive").await;
    let path = format!("/api/campaigns/{id}/respond");
    let donor = json!({ "name": "Asha", "email": "donor@example.com", "lat": 12.9, "lng": 77.6 });

    let (status, body) = ctx.post_json(&path, &donor).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "success": true, "joined": true }));

    let (status, body) = ctx.post_json(&path, &donor).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "success": true, "joined": false }));

    let (status, body) = get(&ctx, &format!("/api/campaigns/{id}/responses")).await;
    assert_eq!(status, StatusCode::OK);
    let responses = body["responses"].as_array().unwrap();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["name"], json!("Asha"));
    assert_eq!(responses[0]["email"], json!("donor@example.com"));
}

#[tokio::test]
async fn test_unknown_campaign_is_not_found() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .post_json(
            "/api/campaigns/42/respond",
            &json!({ "name": "Asha", "email": "donor@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "ok": false, "error": "Campaign not found" }));

    let (status, _) = get(&ctx, "/api/campaigns/not-a-number/responses").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_nearby_search_is_unavailable_without_locator() {
    let ctx = TestContext::new();
    create_campaign(&ctx, "Drive").await;

    let (status, body) = get(&ctx, "/api/campaigns?lat=12.97&lng=77.59").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["ok"], json!(false));

    let (status, _) = get(&ctx, "/api/campaigns?lat=north").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
