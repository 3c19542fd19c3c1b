//! Integration tests for Orchard.
//!
//! These tests drive a running API over HTTP and are `#[ignore]`d by
//! default, since they need infrastructure:
//!
//! ```bash
//! # Start PostgreSQL, run migrations, start the API
//! cargo run -p orchard-cli -- migrate
//! cargo run -p orchard-api &
//!
//! # Run the integration tests
//! cargo test -p orchard-integration-tests -- --ignored
//! ```
//!
//! `ORCHARD_BASE_URL` overrides the default `http://localhost:3000`.

use serde_json::{Value, json};

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("ORCHARD_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A unique suffix for test identities, derived from the current time.
#[must_use]
pub fn unique_suffix() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("{secs}{nanos}")
}

/// Sign up a fresh user and return their access token.
///
/// # Panics
///
/// Panics if the API rejects sign-up or login.
pub async fn signup_and_login(client: &reqwest::Client) -> String {
    let base = base_url();
    let suffix = unique_suffix();
    let email = format!("it-{suffix}@example.com");
    let password = "integration-test-pw";

    let resp = client
        .post(format!("{base}/api/auth/signup"))
        .json(&json!({
            "email": email,
            "password": password,
            "confirmPassword": password,
            "name": "Integration Tester",
            "nickname": format!("it-{suffix}"),
        }))
        .send()
        .await
        .expect("signup request failed");
    assert!(resp.status().is_success(), "signup failed: {}", resp.status());

    let resp = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("login request failed");
    assert!(resp.status().is_success(), "login failed: {}", resp.status());

    let body: Value = resp.json().await.expect("login response not JSON");
    body["accessToken"]
        .as_str()
        .expect("missing accessToken")
        .to_string()
}
