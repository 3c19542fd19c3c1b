//! Integration tests for the cart pricing flow.
//!
//! Requires a running API, migrations applied, and an admin account created
//! via `orchard-cli admin create`, exposed as `ORCHARD_ADMIN_EMAIL` /
//! `ORCHARD_ADMIN_PASSWORD`.
//! Run with: `cargo test -p orchard-integration-tests -- --ignored`

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use orchard_integration_tests::{base_url, signup_and_login, unique_suffix};

/// Login as the configured admin and return an access token.
async fn admin_token(client: &Client) -> String {
    let base = base_url();
    let email = std::env::var("ORCHARD_ADMIN_EMAIL").expect("ORCHARD_ADMIN_EMAIL not set");
    let password = std::env::var("ORCHARD_ADMIN_PASSWORD").expect("ORCHARD_ADMIN_PASSWORD not set");

    let resp = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("admin login request failed");
    assert!(resp.status().is_success(), "admin login failed");

    let body: Value = resp.json().await.expect("login response not JSON");
    body["accessToken"]
        .as_str()
        .expect("missing accessToken")
        .to_string()
}

/// Create a catalog item and return its ID.
async fn create_item(client: &Client, admin: &str, price: &str, stock: i32) -> i64 {
    let base = base_url();
    let name = format!("it-item-{}", unique_suffix());

    let resp = client
        .post(format!("{base}/api/admin/items"))
        .bearer_auth(admin)
        .json(&json!({
            "name": name,
            "description": "integration test item",
            "price": price,
            "stock": stock,
        }))
        .send()
        .await
        .expect("create item request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    // The listing is newest-first, so the created item leads it.
    let resp = client
        .get(format!("{base}/api/admin/items?page=0&size=1"))
        .bearer_auth(admin)
        .send()
        .await
        .expect("list items request failed");
    let body: Value = resp.json().await.expect("list response not JSON");
    assert_eq!(body["content"][0]["name"], name.as_str());
    body["content"][0]["id"].as_i64().expect("item id")
}

#[tokio::test]
#[ignore = "requires a running API server and admin credentials"]
async fn cart_total_tracks_line_mutations() {
    let client = Client::new();
    let base = base_url();
    let admin = admin_token(&client).await;
    let user = signup_and_login(&client).await;

    let item_id = create_item(&client, &admin, "100.00", 10).await;

    // Add quantity 2: total = 200.00
    let resp = client
        .post(format!("{base}/api/users/me/cart/{item_id}"))
        .bearer_auth(&user)
        .json(&json!({ "quantity": 2 }))
        .send()
        .await
        .expect("add to cart failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .get(format!("{base}/api/users/me/cart"))
        .bearer_auth(&user)
        .send()
        .await
        .expect("get cart failed");
    let cart: Value = resp.json().await.expect("cart not JSON");
    assert_eq!(cart["estimatedTotal"], "200.00");
    assert_eq!(cart["lines"][0]["quantity"], 2);

    // Set quantity to 5: total = 500.00
    let resp = client
        .patch(format!("{base}/api/users/me/cart/{item_id}"))
        .bearer_auth(&user)
        .json(&json!({ "quantity": 5 }))
        .send()
        .await
        .expect("update quantity failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base}/api/users/me/cart"))
        .bearer_auth(&user)
        .send()
        .await
        .expect("get cart failed");
    let cart: Value = resp.json().await.expect("cart not JSON");
    assert_eq!(cart["estimatedTotal"], "500.00");

    // Remove the line: total back to zero
    let resp = client
        .delete(format!("{base}/api/users/me/cart/{item_id}"))
        .bearer_auth(&user)
        .send()
        .await
        .expect("remove line failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base}/api/users/me/cart"))
        .bearer_auth(&user)
        .send()
        .await
        .expect("get cart failed");
    let cart: Value = resp.json().await.expect("cart not JSON");
    assert_eq!(cart["estimatedTotal"], "0.00");
    assert!(cart["lines"].as_array().expect("lines").is_empty());
}

#[tokio::test]
#[ignore = "requires a running API server and admin credentials"]
async fn overstock_add_fails_and_leaves_cart_unmodified() {
    let client = Client::new();
    let base = base_url();
    let admin = admin_token(&client).await;
    let user = signup_and_login(&client).await;

    let item_id = create_item(&client, &admin, "10.00", 3).await;

    let resp = client
        .post(format!("{base}/api/users/me/cart/{item_id}"))
        .bearer_auth(&user)
        .json(&json!({ "quantity": 4 }))
        .send()
        .await
        .expect("add to cart failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("error body not JSON");
    assert_eq!(body["errorCode"], "INVALID_OPERATION");

    let resp = client
        .get(format!("{base}/api/users/me/cart"))
        .bearer_auth(&user)
        .send()
        .await
        .expect("get cart failed");
    let cart: Value = resp.json().await.expect("cart not JSON");
    assert_eq!(cart["estimatedTotal"], "0.00");
    assert!(cart["lines"].as_array().expect("lines").is_empty());
}

#[tokio::test]
#[ignore = "requires a running API server and admin credentials"]
async fn removing_a_missing_line_is_not_found() {
    let client = Client::new();
    let base = base_url();
    let admin = admin_token(&client).await;
    let user = signup_and_login(&client).await;

    let item_id = create_item(&client, &admin, "10.00", 3).await;

    let resp = client
        .delete(format!("{base}/api/users/me/cart/{item_id}"))
        .bearer_auth(&user)
        .send()
        .await
        .expect("remove line failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
