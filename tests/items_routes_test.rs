// ABOUTME: End-to-end tests for the item CRUD endpoints
// ABOUTME: Covers creation, validation envelopes, ownership, listing filters, and batch deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Daily Cost Contributors

#![allow(clippy::unwrap_used, clippy::float_cmp)]

mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use chrono::{Duration, Local, NaiveDate};
use common::{create_logged_in_user, create_test_app, get, send};
use serde_json::{json, Value};

fn days_ago(days: i64) -> NaiveDate {
    Local::now().date_naive() - Duration::days(days)
}

async fn create_item(
    app: &axum::Router,
    token: &str,
    name: &str,
    purchase_date: NaiveDate,
    amount: f64,
) -> Result<i64> {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/items",
        Some(token),
        Some(json!({
            "name": name,
            "purchase_date": purchase_date.to_string(),
            "purchase_amount": amount,
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    Ok(body["data"]["id"].as_i64().unwrap())
}

#[tokio::test]
async fn test_create_item_returns_created_envelope() -> Result<()> {
    let (app, resources) = create_test_app().await?;
    let (_user, tokens) = create_logged_in_user(&resources, "creator").await?;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/items",
        Some(&tokens.access_token),
        Some(json!({
            "name": "  Noise cancelling headphones ",
            "purchase_date": days_ago(10).to_string(),
            "purchase_amount": 300,
        })),
    )
    .await?;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["code"], 201);
    assert_eq!(body["data"]["name"], "Noise cancelling headphones");
    assert_eq!(body["data"]["days_used"], 10);
    assert_eq!(body["data"]["daily_cost"].as_f64().unwrap(), 30.0);
    Ok(())
}

#[tokio::test]
async fn test_item_bought_today_costs_full_amount_per_day() -> Result<()> {
    let (app, resources) = create_test_app().await?;
    let (_user, tokens) = create_logged_in_user(&resources, "today").await?;

    let id = create_item(&app, &tokens.access_token, "Lunch", days_ago(0), 25.5).await?;
    let (status, body) = get(&app, &format!("/api/items/{id}"), Some(&tokens.access_token)).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["days_used"], 0);
    assert_eq!(body["data"]["daily_cost"].as_f64().unwrap(), 25.5);
    Ok(())
}

#[tokio::test]
async fn test_create_item_validation_errors() -> Result<()> {
    let (app, resources) = create_test_app().await?;
    let (_user, tokens) = create_logged_in_user(&resources, "validator").await?;

    let cases: Vec<Value> = vec![
        json!({ "name": "", "purchase_date": days_ago(1).to_string(), "purchase_amount": 10 }),
        json!({ "name": "x".repeat(256), "purchase_date": days_ago(1).to_string(), "purchase_amount": 10 }),
        json!({ "name": "Future", "purchase_date": days_ago(-1).to_string(), "purchase_amount": 10 }),
        json!({ "name": "Bad date", "purchase_date": "2025/01/01", "purchase_amount": 10 }),
        json!({ "name": "Zero", "purchase_date": days_ago(1).to_string(), "purchase_amount": 0 }),
        json!({ "name": "Negative", "purchase_date": days_ago(1).to_string(), "purchase_amount": -5 }),
        json!({ "name": "Huge", "purchase_date": days_ago(1).to_string(), "purchase_amount": 100_000_000 }),
        json!({ "name": "Missing amount", "purchase_date": days_ago(1).to_string() }),
    ];

    for case in cases {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/items",
            Some(&tokens.access_token),
            Some(case.clone()),
        )
        .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {case}");
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], 400);
        assert_eq!(body["error_code"], "VALIDATION_ERROR");
    }
    Ok(())
}

#[tokio::test]
async fn test_items_require_authentication() -> Result<()> {
    let (app, _resources) = create_test_app().await?;

    let (status, body) = get(&app, "/api/items", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "AUTH_REQUIRED");
    Ok(())
}

#[tokio::test]
async fn test_other_users_items_are_not_found() -> Result<()> {
    let (app, resources) = create_test_app().await?;
    let (_alice, alice) = create_logged_in_user(&resources, "alice").await?;
    let (_bob, bob) = create_logged_in_user(&resources, "bob").await?;

    let id = create_item(&app, &alice.access_token, "Camera", days_ago(3), 600.0).await?;
    let uri = format!("/api/items/{id}");

    let (status, body) = get(&app, &uri, Some(&bob.access_token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "ITEM_NOT_FOUND");

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&bob.access_token),
        Some(json!({ "name": "Mine now" })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&bob.access_token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, &uri, Some(&alice.access_token)).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_update_item_recomputes_daily_cost() -> Result<()> {
    let (app, resources) = create_test_app().await?;
    let (_user, tokens) = create_logged_in_user(&resources, "updater").await?;
    let id = create_item(&app, &tokens.access_token, "Chair", days_ago(4), 100.0).await?;
    let uri = format!("/api/items/{id}");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&tokens.access_token),
        Some(json!({ "purchase_date": days_ago(20).to_string() })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Chair");
    assert_eq!(body["data"]["days_used"], 20);
    assert_eq!(body["data"]["daily_cost"].as_f64().unwrap(), 5.0);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&tokens.access_token),
        Some(json!({ "purchase_amount": -1 })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn test_delete_item_then_missing() -> Result<()> {
    let (app, resources) = create_test_app().await?;
    let (_user, tokens) = create_logged_in_user(&resources, "deleter").await?;
    let id = create_item(&app, &tokens.access_token, "Mug", days_ago(2), 12.0).await?;
    let uri = format!("/api/items/{id}");

    let (status, body) = send(&app, Method::DELETE, &uri, Some(&tokens.access_token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id);

    let (status, _) = get(&app, &uri, Some(&tokens.access_token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&tokens.access_token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_non_numeric_item_id_is_rejected() -> Result<()> {
    let (app, resources) = create_test_app().await?;
    let (_user, tokens) = create_logged_in_user(&resources, "typo").await?;

    let (status, body) = get(&app, "/api/items/abc", Some(&tokens.access_token)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn test_batch_delete_reports_deleted_ids() -> Result<()> {
    let (app, resources) = create_test_app().await?;
    let (_user, tokens) = create_logged_in_user(&resources, "batcher").await?;
    let (_other, other_tokens) = create_logged_in_user(&resources, "bystander").await?;

    let a = create_item(&app, &tokens.access_token, "A", days_ago(5), 10.0).await?;
    let b = create_item(&app, &tokens.access_token, "B", days_ago(5), 10.0).await?;
    let foreign = create_item(&app, &other_tokens.access_token, "F", days_ago(5), 10.0).await?;

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/api/items/batch",
        Some(&tokens.access_token),
        Some(json!({ "item_ids": [b, a, a, foreign] })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted_count"], 2);
    assert_eq!(body["data"]["item_ids"], json!([a, b]));

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/api/items/batch",
        Some(&tokens.access_token),
        Some(json!({ "item_ids": [a, b] })),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "NO_ITEMS_FOUND");

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/items/batch",
        Some(&tokens.access_token),
        Some(json!({ "item_ids": [] })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(
        &app,
        &format!("/api/items/{foreign}"),
        Some(&other_tokens.access_token),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_list_items_pagination_and_filters() -> Result<()> {
    let (app, resources) = create_test_app().await?;
    let (_user, tokens) = create_logged_in_user(&resources, "lister").await?;
    let token = tokens.access_token.as_str();

    create_item(&app, token, "Old laptop", days_ago(400), 5000.0).await?;
    create_item(&app, token, "Laptop stand", days_ago(30), 40.0).await?;
    create_item(&app, token, "Keyboard", days_ago(20), 120.0).await?;
    create_item(&app, token, "Mouse", days_ago(10), 60.0).await?;

    let (status, body) = get(&app, "/api/items?page=1&size=3", Some(token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 4);
    assert_eq!(body["data"]["pages"], 2);
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["size"], 3);
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["name"], "Mouse");

    let (_, body) = get(&app, "/api/items?search=laptop", Some(token)).await?;
    assert_eq!(body["data"]["total"], 2);

    let start = days_ago(25);
    let (_, body) = get(&app, &format!("/api/items?start_date={start}"), Some(token)).await?;
    assert_eq!(body["data"]["total"], 2);

    let (_, body) = get(
        &app,
        "/api/items?sort_by=purchase_amount&sort_order=asc",
        Some(token),
    )
    .await?;
    assert_eq!(body["data"]["items"][0]["name"], "Laptop stand");

    let (status, body) = get(&app, "/api/items?start_date=yesterday", Some(token)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "INVALID_START_DATE");

    let (status, _) = get(&app, "/api/items?size=101", Some(token)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = get(&app, "/api/items?page=0", Some(token)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}
