//! API integration tests

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

pub const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Unique suffix so repeated runs never collide on unique columns.
pub fn unique_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos()
}

/// Helper to get an authenticated client. Registers the test account on
/// first use; the duplicate-registration error on later runs is ignored.
pub async fn get_auth_token(client: &Client) -> String {
    let _ = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": "test_runner",
            "password": "test-runner-password",
            "email": "test_runner@example.com",
            "full_name": "Test Runner"
        }))
        .send()
        .await;

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "test_runner",
            "password": "test-runner-password"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Create a fresh asset and return its oracle number.
pub async fn create_test_asset(client: &Client, token: &str, device_type: &str) -> String {
    let oracle_number = format!("ORC-{}", unique_suffix());
    let response = client
        .post(format!("{}/assets", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "oracle_number": oracle_number,
            "device_type": device_type,
            "brand_name": "Dell",
            "model_name": "Latitude 5440",
            "serial_number": format!("SN-{}", unique_suffix()),
            "unit_price": "1250.50",
            "purchase_date": "2024-01-15",
            "warranty_expiry": "3 years",
            "vendor_name": "TechSource Ltd",
            "tender_no": "TND-2024-017"
        }))
        .send()
        .await
        .expect("Failed to send create asset request");

    assert_eq!(response.status(), 201, "asset creation failed");
    oracle_number
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_register_and_login() {
    let client = Client::new();
    let username = format!("user_{}", unique_suffix());

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "secret-password",
            "email": format!("{}@example.com", username),
            "full_name": "Fresh User"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "secret-password"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["username"], username.as_str());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "test_runner",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_get_current_user() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], "test_runner");
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/assets", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_create_asset_and_lookup() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let oracle_number = create_test_asset(&client, &token, "Laptop").await;

    // New asset reads back with derived status "new"
    let response = client
        .get(format!("{}/assets/{}", BASE_URL, oracle_number))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["asset"]["oracle_number"], oracle_number.as_str());
    assert_eq!(body["asset"]["status"], "new");
    assert!(body["asset"]["warranty_expiry"].is_string());

    // Existence probe sees it
    let response = client
        .get(format!("{}/assets/check-oracle/{}", BASE_URL, oracle_number))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["exists"], true);

    // Same oracle number again is a conflict
    let response = client
        .post(format!("{}/assets", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "oracle_number": oracle_number,
            "device_type": "Laptop"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_create_asset_rejects_bad_warranty() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/assets", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "oracle_number": format!("ORC-{}", unique_suffix()),
            "device_type": "Laptop",
            "warranty_expiry": "soon"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_list_assets_with_filters() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let oracle_number = create_test_asset(&client, &token, "Laptop").await;

    let response = client
        .get(format!(
            "{}/assets?device_type=Laptop&oracle_number={}",
            BASE_URL, oracle_number
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let assets = body.as_array().expect("Expected an array");
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0]["oracle_number"], oracle_number.as_str());

    // Unknown status filter is rejected
    let response = client
        .get(format!("{}/assets?status=exploded", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_device_types_and_brands() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/assets/device-types", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let types: Vec<&str> = body
        .as_array()
        .expect("Expected an array")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(types.contains(&"Laptop"));
    assert!(types.contains(&"Printer"));

    let response = client
        .get(format!("{}/assets/device-types/Laptop/brands", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let brands = body["brands"].as_array().expect("Expected brands array");
    assert!(brands.iter().any(|b| b == "Dell"));
}

#[tokio::test]
#[ignore]
async fn test_add_brand() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let brand = format!("Brand{}", unique_suffix());

    let response = client
        .post(format!("{}/assets/brands", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "device_type": "Laptop",
            "brand_name": brand
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let brands = body["brands"].as_array().expect("Expected brands array");
    assert!(brands.iter().any(|b| b == brand.as_str()));
}

#[tokio::test]
#[ignore]
async fn test_dashboard_stats() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/dashboard", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["total_assets"].is_number());
    assert!(body["assigned"].is_number());
    assert!(body["available"].is_number());
    assert!(body["under_repair"].is_number());
    assert!(body["stock_count"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_activity_logs() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    // Guarantee at least one entry
    create_test_asset(&client, &token, "Laptop").await;

    let response = client
        .get(format!("{}/activity-logs?limit=5", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let entries = body.as_array().expect("Expected an array");
    assert!(!entries.is_empty());
    assert!(entries.len() <= 5);
    assert!(entries[0]["activity_type"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_update_profile() {
    let client = Client::new();
    let username = format!("user_{}", unique_suffix());

    client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "secret-password",
            "email": format!("{}@example.com", username),
        }))
        .send()
        .await
        .expect("Failed to send request");

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": username, "password": "secret-password" }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let token = body["token"].as_str().expect("No token").to_string();

    let response = client
        .put(format!("{}/auth/profile", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "full_name": "Renamed User" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["full_name"], "Renamed User");
}
