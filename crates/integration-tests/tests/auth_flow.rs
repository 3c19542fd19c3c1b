//! Integration tests for the auth flow.
//!
//! Requires a running API and database; see the crate README.
//! Run with: `cargo test -p orchard-integration-tests -- --ignored`

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use orchard_integration_tests::{base_url, unique_suffix};

#[tokio::test]
#[ignore = "requires a running API server"]
async fn signup_login_refresh_roundtrip() {
    let client = Client::new();
    let base = base_url();
    let suffix = unique_suffix();
    let email = format!("auth-{suffix}@example.com");
    let password = "integration-test-pw";

    // Sign up
    let resp = client
        .post(format!("{base}/api/auth/signup"))
        .json(&json!({
            "email": email,
            "password": password,
            "confirmPassword": password,
            "name": "Auth Tester",
            "nickname": format!("auth-{suffix}"),
        }))
        .send()
        .await
        .expect("signup request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Duplicate sign-up is refused with 409
    let resp = client
        .post(format!("{base}/api/auth/signup"))
        .json(&json!({
            "email": email,
            "password": password,
            "confirmPassword": password,
            "name": "Auth Tester",
            "nickname": format!("auth-{suffix}"),
        }))
        .send()
        .await
        .expect("duplicate signup request failed");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Login
    let resp = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let tokens: Value = resp.json().await.expect("login response not JSON");
    let refresh_token = tokens["refreshToken"].as_str().expect("missing refreshToken");

    // Refresh
    let resp = client
        .post(format!("{base}/api/auth/refresh"))
        .json(&json!({ "refreshToken": refresh_token }))
        .send()
        .await
        .expect("refresh request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    // An access token is not accepted as a refresh token
    let access_token = tokens["accessToken"].as_str().expect("missing accessToken");
    let resp = client
        .post(format!("{base}/api/auth/refresh"))
        .json(&json!({ "refreshToken": access_token }))
        .send()
        .await
        .expect("refresh request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a running API server"]
async fn mismatched_passwords_are_rejected_before_persistence() {
    let client = Client::new();
    let base = base_url();
    let suffix = unique_suffix();
    let email = format!("mismatch-{suffix}@example.com");

    let resp = client
        .post(format!("{base}/api/auth/signup"))
        .json(&json!({
            "email": email,
            "password": "integration-test-pw",
            "confirmPassword": "something else",
            "name": "Mismatch Tester",
            "nickname": format!("mismatch-{suffix}"),
        }))
        .send()
        .await
        .expect("signup request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("error body not JSON");
    assert_eq!(body["errorCode"], "PASSWORD_MISMATCH");

    // The failed sign-up persisted nothing: the same identity registers fine.
    let resp = client
        .post(format!("{base}/api/auth/signup"))
        .json(&json!({
            "email": email,
            "password": "integration-test-pw",
            "confirmPassword": "integration-test-pw",
            "name": "Mismatch Tester",
            "nickname": format!("mismatch-{suffix}"),
        }))
        .send()
        .await
        .expect("signup request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[tokio::test]
#[ignore = "requires a running API server"]
async fn protected_routes_require_a_token() {
    let client = Client::new();
    let base = base_url();

    let resp = client
        .get(format!("{base}/api/users/me"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .get(format!("{base}/api/users/me"))
        .bearer_auth("garbage-token")
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
