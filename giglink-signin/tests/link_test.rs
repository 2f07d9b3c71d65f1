//! Tests for link confirmation (password-gated provider linking)

mod common;

use common::{apple_id_token, create_test_server, seed_password_account, signer, TEST_SECRET};
use giglink_core::{ExternalIdentity, Provider, TokenSigner};
use giglink_signin::AccountStore;
use serde_json::{json, Value};

/// Sign in with Apple against an existing password account and return the
/// issued link token
async fn request_link_token(harness: &common::TestHarness, email: &str) -> String {
    let response = harness
        .server
        .post("/wsapi/signin/apple")
        .json(&json!({ "id_token": apple_id_token(email) }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["link_required"], true);
    body["link_token"].as_str().unwrap().to_string()
}

/// Test: confirming with the correct password links the provider and
/// issues a session
#[tokio::test]
async fn test_confirm_link_success() {
    let harness = create_test_server();
    seed_password_account(&harness.store, "a@x.com", "hunter2hunter2");
    let link_token = request_link_token(&harness, "a@x.com").await;

    let response = harness
        .server
        .post("/wsapi/confirm_link")
        .json(&json!({
            "link_token": link_token,
            "email": "a@x.com",
            "pass": "hunter2hunter2"
        }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["account"]["linked_providers"], json!(["apple"]));
    signer()
        .verify_session(body["session_token"].as_str().unwrap())
        .unwrap();

    // The password survives linking
    let account = harness.store.find_by_email("a@x.com").unwrap().unwrap();
    assert!(account.password_hash.is_some());

    // Subsequent Apple sign-ins go straight to a session
    let response = harness
        .server
        .post("/wsapi/signin/apple")
        .json(&json!({ "id_token": apple_id_token("a@x.com") }))
        .await;
    let body: Value = response.json();
    assert!(body.get("link_required").is_none());
    assert!(body["session_token"].is_string());
}

/// Test: a wrong password never links
#[tokio::test]
async fn test_confirm_link_wrong_password() {
    let harness = create_test_server();
    seed_password_account(&harness.store, "a@x.com", "hunter2hunter2");
    let link_token = request_link_token(&harness, "a@x.com").await;

    let response = harness
        .server
        .post("/wsapi/confirm_link")
        .json(&json!({
            "link_token": link_token,
            "email": "a@x.com",
            "pass": "wrong-password"
        }))
        .await;

    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(body["error"], "invalid_credentials");

    let account = harness.store.find_by_email("a@x.com").unwrap().unwrap();
    assert!(account.linked_providers.is_empty());
}

/// Test: a link token cannot be redeemed against a different account,
/// even with that account's correct password
#[tokio::test]
async fn test_confirm_link_email_mismatch() {
    let harness = create_test_server();
    seed_password_account(&harness.store, "a@x.com", "hunter2hunter2");
    seed_password_account(&harness.store, "b@x.com", "swordfish-swordfish");
    let link_token = request_link_token(&harness, "a@x.com").await;

    let response = harness
        .server
        .post("/wsapi/confirm_link")
        .json(&json!({
            "link_token": link_token,
            "email": "b@x.com",
            "pass": "swordfish-swordfish"
        }))
        .await;

    assert_eq!(response.status_code(), 403);
    let body: Value = response.json();
    assert_eq!(body["error"], "email_mismatch");

    let account = harness.store.find_by_email("b@x.com").unwrap().unwrap();
    assert!(account.linked_providers.is_empty());
}

/// Test: the supplied email is compared case-insensitively
#[tokio::test]
async fn test_confirm_link_email_case_insensitive() {
    let harness = create_test_server();
    seed_password_account(&harness.store, "a@x.com", "hunter2hunter2");
    let link_token = request_link_token(&harness, "a@x.com").await;

    let response = harness
        .server
        .post("/wsapi/confirm_link")
        .json(&json!({
            "link_token": link_token,
            "email": "A@X.com",
            "pass": "hunter2hunter2"
        }))
        .await;

    assert_eq!(response.status_code(), 200);
}

/// Test: an expired link token fails even with correct credentials
#[tokio::test]
async fn test_confirm_link_expired_token() {
    let harness = create_test_server();
    seed_password_account(&harness.store, "a@x.com", "hunter2hunter2");

    let expired_signer = TokenSigner::with_ttls(
        TEST_SECRET,
        chrono::Duration::minutes(-5),
        chrono::Duration::days(14),
    );
    let identity = ExternalIdentity {
        provider: Provider::Apple,
        subject: "apple-sub-1".to_string(),
        email: Some("a@x.com".to_string()),
        display_name: None,
    };
    let link_token = expired_signer.issue_link(&identity, "a@x.com").unwrap();

    let response = harness
        .server
        .post("/wsapi/confirm_link")
        .json(&json!({
            "link_token": link_token,
            "email": "a@x.com",
            "pass": "hunter2hunter2"
        }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "link_token_expired");

    let account = harness.store.find_by_email("a@x.com").unwrap().unwrap();
    assert!(account.linked_providers.is_empty());
}

/// Test: a tampered link token is invalid
#[tokio::test]
async fn test_confirm_link_tampered_token() {
    let harness = create_test_server();
    seed_password_account(&harness.store, "a@x.com", "hunter2hunter2");
    let mut link_token = request_link_token(&harness, "a@x.com").await;
    link_token.pop();

    let response = harness
        .server
        .post("/wsapi/confirm_link")
        .json(&json!({
            "link_token": link_token,
            "email": "a@x.com",
            "pass": "hunter2hunter2"
        }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "link_token_invalid");
}

/// Test: a session token is never accepted where a link token is expected
#[tokio::test]
async fn test_session_token_rejected_as_link_token() {
    let harness = create_test_server();
    seed_password_account(&harness.store, "a@x.com", "hunter2hunter2");

    let session_token = signer().issue_session("1", "a@x.com").unwrap();

    let response = harness
        .server
        .post("/wsapi/confirm_link")
        .json(&json!({
            "link_token": session_token,
            "email": "a@x.com",
            "pass": "hunter2hunter2"
        }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "link_token_invalid");
}

/// Test: redeeming the same still-valid token twice links exactly once.
/// There is no server-side revocation; the second redemption succeeds
/// but the linked set does not grow.
#[tokio::test]
async fn test_confirm_link_twice_links_exactly_once() {
    let harness = create_test_server();
    seed_password_account(&harness.store, "a@x.com", "hunter2hunter2");
    let link_token = request_link_token(&harness, "a@x.com").await;

    for _ in 0..2 {
        let response = harness
            .server
            .post("/wsapi/confirm_link")
            .json(&json!({
                "link_token": link_token,
                "email": "a@x.com",
                "pass": "hunter2hunter2"
            }))
            .await;
        assert_eq!(response.status_code(), 200);
    }

    let account = harness.store.find_by_email("a@x.com").unwrap().unwrap();
    assert_eq!(account.linked_providers, vec![Provider::Apple]);
}
