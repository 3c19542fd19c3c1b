//! Integration tests for checkout and coupon application.
//!
//! Same prerequisites as `cart_flow.rs`.
//! Run with: `cargo test -p orchard-integration-tests -- --ignored`

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use orchard_integration_tests::{base_url, signup_and_login, unique_suffix};

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

    let resp = client
        .get(format!("{base}/api/admin/items?page=0&size=1"))
        .bearer_auth(admin)
        .send()
        .await
        .expect("list items request failed");
    let body: Value = resp.json().await.expect("list response not JSON");
    body["content"][0]["id"].as_i64().expect("item id")
}

const ADDRESS: &str = r#"{
    "recipient": "A. Customer",
    "addressLine1": "1 Main St",
    "postalCode": "00000",
    "phone": "555-0100"
}"#;

fn address() -> Value {
    serde_json::from_str(ADDRESS).expect("address literal")
}

#[tokio::test]
#[ignore = "requires a running API server and admin credentials"]
async fn flat_coupon_checkout_matches_the_arithmetic() {
    let client = Client::new();
    let base = base_url();
    let admin = admin_token(&client).await;
    let user = signup_and_login(&client).await;

    // Item priced 100.00, quantity 2 -> total 200.00
    let item_id = create_item(&client, &admin, "100.00", 10).await;
    let resp = client
        .post(format!("{base}/api/users/me/cart/{item_id}"))
        .bearer_auth(&user)
        .json(&json!({ "quantity": 2 }))
        .send()
        .await
        .expect("add to cart failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Flat-50 coupon, distributed to everyone
    let coupon_name = format!("it-coupon-{}", unique_suffix());
    let resp = client
        .post(format!("{base}/api/admin/coupons"))
        .bearer_auth(&admin)
        .json(&json!({
            "name": coupon_name,
            "discountType": "fixed_amount",
            "discountValue": "50",
            "expiresAt": "2030-01-01T00:00:00Z",
        }))
        .send()
        .await
        .expect("create coupon failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .get(format!("{base}/api/admin/coupons?page=0&size=1"))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("list coupons failed");
    let body: Value = resp.json().await.expect("coupon list not JSON");
    let coupon_id = body["content"][0]["id"].as_i64().expect("coupon id");

    let resp = client
        .post(format!("{base}/api/admin/coupons/{coupon_id}/distribute-all"))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("distribute failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    // The user sees a usable coupon
    let resp = client
        .get(format!("{base}/api/users/me/coupons"))
        .bearer_auth(&user)
        .send()
        .await
        .expect("list my coupons failed");
    let coupons: Value = resp.json().await.expect("coupons not JSON");
    let grant = coupons
        .as_array()
        .expect("coupon array")
        .iter()
        .find(|c| c["coupon"]["id"].as_i64() == Some(coupon_id))
        .expect("granted coupon present");
    assert_eq!(grant["usable"], true);
    let user_coupon_id = grant["id"].as_i64().expect("user coupon id");

    // Checkout: final = 200 - 50 = 150
    let mut body = address();
    body["userCouponId"] = json!(user_coupon_id);
    let resp = client
        .post(format!("{base}/api/orders"))
        .bearer_auth(&user)
        .json(&body)
        .send()
        .await
        .expect("checkout failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let placed: Value = resp.json().await.expect("checkout response not JSON");
    let order = &placed["order"];
    assert_eq!(order["details"]["totalAmount"], "200.00");
    assert_eq!(order["details"]["discountAmount"], "50.00");
    assert_eq!(order["finalAmount"], "150.00");

    // The coupon is consumed and cannot be applied again
    let resp = client
        .get(format!("{base}/api/users/me/coupons"))
        .bearer_auth(&user)
        .send()
        .await
        .expect("list my coupons failed");
    let coupons: Value = resp.json().await.expect("coupons not JSON");
    let grant = coupons
        .as_array()
        .expect("coupon array")
        .iter()
        .find(|c| c["id"].as_i64() == Some(user_coupon_id))
        .expect("granted coupon present");
    assert_eq!(grant["usable"], false);

    // The cart is empty after checkout
    let resp = client
        .get(format!("{base}/api/users/me/cart"))
        .bearer_auth(&user)
        .send()
        .await
        .expect("get cart failed");
    let cart: Value = resp.json().await.expect("cart not JSON");
    assert_eq!(cart["estimatedTotal"], "0.00");
}

#[tokio::test]
#[ignore = "requires a running API server and admin credentials"]
async fn checkout_with_empty_cart_is_refused() {
    let client = Client::new();
    let base = base_url();
    let user = signup_and_login(&client).await;

    let resp = client
        .post(format!("{base}/api/orders"))
        .bearer_auth(&user)
        .json(&address())
        .send()
        .await
        .expect("checkout failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("error body not JSON");
    assert_eq!(body["errorCode"], "INVALID_OPERATION");
}

#[tokio::test]
#[ignore = "requires a running API server and admin credentials"]
async fn cancelling_a_pending_order_restores_stock() {
    let client = Client::new();
    let base = base_url();
    let admin = admin_token(&client).await;
    let user = signup_and_login(&client).await;

    let item_id = create_item(&client, &admin, "10.00", 5).await;

    let resp = client
        .post(format!("{base}/api/users/me/cart/{item_id}"))
        .bearer_auth(&user)
        .json(&json!({ "quantity": 5 }))
        .send()
        .await
        .expect("add to cart failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(format!("{base}/api/orders"))
        .bearer_auth(&user)
        .json(&address())
        .send()
        .await
        .expect("checkout failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let placed: Value = resp.json().await.expect("checkout response not JSON");
    let order_id = placed["order"]["id"].as_i64().expect("order id");

    // Stock is now exhausted
    let resp = client
        .get(format!("{base}/api/items/{item_id}"))
        .send()
        .await
        .expect("get item failed");
    let item: Value = resp.json().await.expect("item not JSON");
    assert_eq!(item["stock"], 0);

    // Cancel restores it
    let resp = client
        .post(format!("{base}/api/orders/{order_id}/cancel"))
        .bearer_auth(&user)
        .send()
        .await
        .expect("cancel failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base}/api/items/{item_id}"))
        .send()
        .await
        .expect("get item failed");
    let item: Value = resp.json().await.expect("item not JSON");
    assert_eq!(item["stock"], 5);

    // A second cancel is refused
    let resp = client
        .post(format!("{base}/api/orders/{order_id}/cancel"))
        .bearer_auth(&user)
        .send()
        .await
        .expect("cancel failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
