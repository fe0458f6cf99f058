//! End-to-end lifecycle flows: every transition and guard, driven over HTTP.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::{json, Value};

use crate::api_tests::{create_test_asset, get_auth_token, BASE_URL};

/// Derived status of one asset as the detail endpoint reports it.
async fn asset_status(client: &Client, token: &str, oracle_number: &str) -> String {
    let response = client
        .get(format!("{}/assets/{}", BASE_URL, oracle_number))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    body["asset"]["status"]
        .as_str()
        .expect("No status in response")
        .to_string()
}

fn assignment_form(oracle_number: &str) -> Form {
    Form::new()
        .text("oracle_number", oracle_number.to_string())
        .text("employee_name", "Amina Khattab")
        .text("designation", "Network Engineer")
        .text("department", "Infrastructure")
        .text("assignment_date", "2024-06-15")
        .text("expected_return_date", "2025-06-15")
        .text("notes", "Primary workstation")
}

async fn assign(client: &Client, token: &str, oracle_number: &str) -> reqwest::Response {
    client
        .post(format!("{}/assignments", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(assignment_form(oracle_number))
        .send()
        .await
        .expect("Failed to send assignment request")
}

async fn request_repair(client: &Client, token: &str, oracle_number: &str) -> reqwest::Response {
    client
        .post(format!("{}/repairs/request", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "oracle_number": oracle_number,
            "repair_description": "Screen flickers under load",
            "start_date": "2024-07-01",
            "technician": "Wael Services",
            "cost": "80.00"
        }))
        .send()
        .await
        .expect("Failed to send repair request")
}

async fn complete_repair(client: &Client, token: &str, oracle_number: &str) -> reqwest::Response {
    let form = Form::new()
        .text("oracle_number", oracle_number.to_string())
        .text("completion_date", "2024-07-10")
        .text("is_fixed", "fixed")
        .text("return_date", "2024-07-11")
        .text("notes", "Replaced display cable");
    client
        .post(format!("{}/repairs/complete", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send repair completion")
}

async fn process_return(
    client: &Client,
    token: &str,
    oracle_number: &str,
    return_type: &str,
) -> reqwest::Response {
    let form = Form::new()
        .text("oracle_number", oracle_number.to_string())
        .text("return_type", return_type.to_string())
        .text("return_date", "2024-08-01")
        .text("reason", "End of project")
        .part(
            "voucher",
            Part::bytes(b"return voucher".to_vec())
                .file_name("voucher.pdf")
                .mime_str("application/pdf")
                .expect("Bad mime type"),
        );
    client
        .post(format!("{}/returns", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send return request")
}

async fn auction(client: &Client, token: &str, oracle_number: &str) -> reqwest::Response {
    client
        .post(format!("{}/auctions", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "oracle_number": oracle_number,
            "price": "150.00",
            "auction_date": "2024-09-01"
        }))
        .send()
        .await
        .expect("Failed to send auction request")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_full_asset_lifecycle() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let oracle_number = create_test_asset(&client, &token, "Laptop").await;

    // assign: new -> assigned, with the voucher file attached
    let response = client
        .post(format!("{}/assignments", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(assignment_form(&oracle_number).part(
            "allocation_voucher",
            Part::bytes(b"allocation voucher".to_vec())
                .file_name("allocation.pdf")
                .mime_str("application/pdf")
                .expect("Bad mime type"),
        ))
        .send()
        .await
        .expect("Failed to send assignment request");
    assert_eq!(response.status(), 201);
    assert_eq!(asset_status(&client, &token, &oracle_number).await, "assigned");

    // holder shows up on the detail view
    let response = client
        .get(format!("{}/assets/{}", BASE_URL, oracle_number))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["asset"]["current_holder"], "Amina Khattab");
    assert_eq!(body["active_assignment"]["employee_name"], "Amina Khattab");

    // open a repair: derived status flips without touching custody
    let response = request_repair(&client, &token, &oracle_number).await;
    assert_eq!(response.status(), 201);
    assert_eq!(
        asset_status(&client, &token, &oracle_number).await,
        "under_repair"
    );

    // auction is blocked while the repair is open
    let response = auction(&client, &token, &oracle_number).await;
    assert_eq!(response.status(), 422);

    // so is a return
    let response = process_return(&client, &token, &oracle_number, "returned_to_inventory").await;
    assert_eq!(response.status(), 422);

    // completing the repair restores the assigned view
    let response = complete_repair(&client, &token, &oracle_number).await;
    assert!(response.status().is_success());
    assert_eq!(asset_status(&client, &token, &oracle_number).await, "assigned");

    // repair history now holds one completed entry
    let response = client
        .get(format!("{}/repairs/{}", BASE_URL, oracle_number))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let records = body.as_array().expect("Expected an array");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["state"], "completed");
    assert_eq!(records[0]["outcome"], "fixed");

    // damaged return: custody cleared, assignment closed
    let response = process_return(&client, &token, &oracle_number, "damaged").await;
    assert_eq!(response.status(), 201);
    assert_eq!(asset_status(&client, &token, &oracle_number).await, "damaged");

    let response = client
        .get(format!("{}/assets/{}", BASE_URL, oracle_number))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["asset"]["current_holder"].is_null());
    assert!(body["active_assignment"].is_null());
    assert_eq!(body["latest_return"]["return_type"], "damaged");

    // auction the damaged asset
    let response = auction(&client, &token, &oracle_number).await;
    assert_eq!(response.status(), 201);
    assert_eq!(asset_status(&client, &token, &oracle_number).await, "auctioned");

    // a second auction is refused for the asset's lifetime
    let response = auction(&client, &token, &oracle_number).await;
    assert_eq!(response.status(), 422);

    // and the sold asset is out of every further operation
    let response = assign(&client, &token, &oracle_number).await;
    assert_eq!(response.status(), 422);
    let response = request_repair(&client, &token, &oracle_number).await;
    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_double_assignment_conflict() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let oracle_number = create_test_asset(&client, &token, "Desktop").await;

    let response = assign(&client, &token, &oracle_number).await;
    assert_eq!(response.status(), 201);

    let response = assign(&client, &token, &oracle_number).await;
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_assign_while_under_repair_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let oracle_number = create_test_asset(&client, &token, "Printer").await;

    let response = request_repair(&client, &token, &oracle_number).await;
    assert_eq!(response.status(), 201);

    let response = assign(&client, &token, &oracle_number).await;
    assert_eq!(response.status(), 422);

    // a second repair request on the same asset is also refused
    let response = request_repair(&client, &token, &oracle_number).await;
    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_return_to_inventory_marks_asset_used() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let oracle_number = create_test_asset(&client, &token, "Screen").await;

    let response = assign(&client, &token, &oracle_number).await;
    assert_eq!(response.status(), 201);

    // legacy alias for the disposition is still accepted
    let response = process_return(&client, &token, &oracle_number, "returned").await;
    assert_eq!(response.status(), 201);
    assert_eq!(asset_status(&client, &token, &oracle_number).await, "used");

    // a used asset can go straight back out
    let response = assign(&client, &token, &oracle_number).await;
    assert_eq!(response.status(), 201);
}

#[tokio::test]
#[ignore]
async fn test_return_rejects_unknown_disposition() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let oracle_number = create_test_asset(&client, &token, "Laptop").await;

    let response = process_return(&client, &token, &oracle_number, "exploded").await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_complete_repair_without_open_repair() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let oracle_number = create_test_asset(&client, &token, "Laptop").await;

    let response = complete_repair(&client, &token, &oracle_number).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_repair_listing_and_stats() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let oracle_number = create_test_asset(&client, &token, "Server").await;

    let response = request_repair(&client, &token, &oracle_number).await;
    assert_eq!(response.status(), 201);

    // the open repair appears in the in-progress listing
    let response = client
        .get(format!("{}/repairs?status=in_progress", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let repairs = body.as_array().expect("Expected an array");
    assert!(repairs
        .iter()
        .any(|r| r["oracle_number"] == oracle_number.as_str()));

    // and in the open-oracle-number feed
    let response = client
        .get(format!("{}/repairs/open/oracle-numbers", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["oracle_numbers"]
        .as_array()
        .expect("array")
        .iter()
        .any(|o| o == oracle_number.as_str()));

    let response = client
        .get(format!("{}/repairs/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["in_progress"].as_i64().expect("number") >= 1);
    assert!(body["total"].as_i64().expect("number") >= body["in_progress"].as_i64().unwrap());
}

#[tokio::test]
#[ignore]
async fn test_buyback_return_and_stats() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let oracle_number = create_test_asset(&client, &token, "Laptop").await;

    let response = assign(&client, &token, &oracle_number).await;
    assert_eq!(response.status(), 201);

    // legacy alias for buyback
    let response = process_return(&client, &token, &oracle_number, "employee_buyback").await;
    assert_eq!(response.status(), 201);
    assert_eq!(asset_status(&client, &token, &oracle_number).await, "buyback");

    let response = client
        .get(format!("{}/returns/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["buyback"].as_i64().expect("number") >= 1);
}

#[tokio::test]
#[ignore]
async fn test_attach_voucher_to_return() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let oracle_number = create_test_asset(&client, &token, "Laptop").await;

    // return without a voucher first
    let form = Form::new()
        .text("oracle_number", oracle_number.clone())
        .text("return_type", "returned_to_inventory")
        .text("return_date", "2024-08-01");
    let response = client
        .post(format!("{}/returns", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send return request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let return_id = body["id"].as_i64().expect("No return id");

    // attach one afterwards
    let form = Form::new().part(
        "voucher",
        Part::bytes(b"late voucher".to_vec())
            .file_name("voucher.pdf")
            .mime_str("application/pdf")
            .expect("Bad mime type"),
    );
    let response = client
        .post(format!("{}/returns/{}/voucher", BASE_URL, return_id))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send voucher");
    assert!(response.status().is_success());

    // the stored path resolves through the public file route
    let response = client
        .get(format!("{}/returns/{}", BASE_URL, oracle_number))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let voucher = body[0]["voucher_filename"]
        .as_str()
        .expect("No voucher path")
        .to_string();

    let response = client
        .get(format!("{}/files/{}", BASE_URL, voucher))
        .send()
        .await
        .expect("Failed to fetch file");
    assert!(response.status().is_success());
    assert_eq!(response.bytes().await.expect("body"), "late voucher");
}

#[tokio::test]
#[ignore]
async fn test_available_assets_feed() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let oracle_number = create_test_asset(&client, &token, "Routers").await;

    let response = client
        .get(format!("{}/assets/device-types/Routers/available", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body
        .as_array()
        .expect("array")
        .iter()
        .any(|o| o == oracle_number.as_str()));

    // once assigned it drops out of the feed
    let response = assign(&client, &token, &oracle_number).await;
    assert_eq!(response.status(), 201);

    let response = client
        .get(format!("{}/assets/device-types/Routers/available", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(!body
        .as_array()
        .expect("array")
        .iter()
        .any(|o| o == oracle_number.as_str()));

    // and shows up in the active assignment listing instead
    let response = client
        .get(format!("{}/assignments", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body
        .as_array()
        .expect("array")
        .iter()
        .any(|a| a["oracle_number"] == oracle_number.as_str()));
}
