//! Passcode login flow over the in-memory store.

#![allow(clippy::unwrap_used)]

use blood_connect_core::Email;
use blood_connect_integration_tests::TestContext;
use blood_connect_server::services::PasscodeError;
use chrono::{Duration, Utc};

const DONOR: &str = "donor@example.com";

fn donor() -> Email {
    Email::parse(DONOR).unwrap()
}

#[tokio::test]
async fn test_issue_leaves_one_live_record() {
    let ctx = TestContext::new();
    let now = Utc::now();

    ctx.state.passcodes().issue_at(DONOR, now).await.unwrap();

    let records = ctx.store.passcodes_for(&donor()).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].expires_at, now + Duration::minutes(10));
    assert_eq!(ctx.mailer.sent().len(), 1);
    assert!(ctx.mailer.sent()[0].html_body.contains(records[0].code.as_str()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_parallel_verifies_accept_one() {
    let ctx = TestContext::new();
    ctx.state.passcodes().issue(DONOR).await.unwrap();
    let code = ctx.mailer.last_code_for(DONOR).unwrap();

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let state = ctx.state.clone();
            let code = code.clone();
            tokio::spawn(async move { state.passcodes().verify(DONOR, &code).await })
        })
        .collect();

    let mut accepted = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(()) => accepted += 1,
            Err(e) => assert!(matches!(e, PasscodeError::NotFound)),
        }
    }
    assert_eq!(accepted, 1);
    assert!(ctx.store.passcodes_for(&donor()).await.is_empty());
}

#[tokio::test]
async fn test_verify_succeeds_once() {
    let ctx = TestContext::new();
    let passcodes = ctx.state.passcodes();

    passcodes.issue(DONOR).await.unwrap();
    let code = ctx.mailer.last_code_for(DONOR).unwrap();

    passcodes.verify(DONOR, &code).await.unwrap();
    assert!(matches!(
        passcodes.verify(DONOR, &code).await,
        Err(PasscodeError::NotFound)
    ));
}

#[tokio::test]
async fn test_expired_code_is_rejected_and_removed() {
    let ctx = TestContext::new();
    let passcodes = ctx.state.passcodes();
    let issued = Utc::now();

    passcodes.issue_at(DONOR, issued).await.unwrap();
    let code = ctx.mailer.last_code_for(DONOR).unwrap();

    let result = passcodes
        .verify_at(DONOR, &code, issued + Duration::minutes(10) + Duration::seconds(1))
        .await;
    assert!(matches!(result, Err(PasscodeError::Expired)));
    assert!(ctx.store.passcodes_for(&donor()).await.is_empty());
}

#[tokio::test]
async fn test_code_is_valid_until_expiry() {
    let ctx = TestContext::new();
    let passcodes = ctx.state.passcodes();
    let issued = Utc::now();

    passcodes.issue_at(DONOR, issued).await.unwrap();
    let code = ctx.mailer.last_code_for(DONOR).unwrap();

    passcodes
        .verify_at(DONOR, &code, issued + Duration::minutes(10))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_reissue_invalidates_previous_code() {
    let ctx = TestContext::new();
    let passcodes = ctx.state.passcodes();

    passcodes.issue(DONOR).await.unwrap();
    let first = ctx.mailer.last_code_for(DONOR).unwrap();
    passcodes.issue(DONOR).await.unwrap();
    let second = ctx.mailer.last_code_for(DONOR).unwrap();

    assert_eq!(ctx.store.passcodes_for(&donor()).await.len(), 1);
    if first != second {
        assert!(matches!(
            passcodes.verify(DONOR, &first).await,
            Err(PasscodeError::NotFound)
        ));
    }
    passcodes.verify(DONOR, &second).await.unwrap();
}

#[tokio::test]
async fn test_email_is_normalized_between_issue_and_verify() {
    let ctx = TestContext::new();
    let passcodes = ctx.state.passcodes();

    passcodes.issue("  Donor@Example.COM ").await.unwrap();
    let code = ctx.mailer.last_code_for(DONOR).unwrap();

    passcodes.verify(DONOR, &code).await.unwrap();
}

#[tokio::test]
async fn test_purge_removes_only_expired() {
    let ctx = TestContext::new();
    let passcodes = ctx.state.passcodes();
    let now = Utc::now();

    passcodes
        .issue_at("old@example.com", now - Duration::hours(1))
        .await
        .unwrap();
    passcodes.issue_at(DONOR, now).await.unwrap();

    assert_eq!(passcodes.purge_expired(now).await.unwrap(), 1);
    assert_eq!(ctx.store.passcodes_for(&donor()).await.len(), 1);
}
