mod common;

use std::sync::Arc;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn create(server: &common::TestServer, resource: &str, body: Value) -> Result<Value> {
    let res = server
        .client
        .post(server.url(&format!("/api/{}", resource)))
        .json(&body)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<Value>().await?;
    Ok(body["data"].clone())
}

async fn list(server: &common::TestServer, path: &str) -> Result<(StatusCode, Value)> {
    let res = server.client.get(server.url(path)).send().await?;
    let status = res.status();
    Ok((status, res.json::<Value>().await?))
}

#[tokio::test]
async fn crud_round_trip() -> Result<()> {
    let server = common::spawn().await?;

    let created = create(&server, "customers", json!({"name": "Acme", "tier": "gold", "id": "ignored"})).await?;
    let id = created["id"].as_str().unwrap().to_string();
    assert_ne!(id, "ignored");
    assert_eq!(created["name"], "Acme");

    let res = server.client.get(server.url(&format!("/api/customers/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Customer retrieved successfully");

    let res = server
        .client
        .put(server.url(&format!("/api/customers/{}", id)))
        .json(&json!({"tier": "silver"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["tier"], "silver");
    assert_eq!(body["data"]["name"], "Acme");

    let res = server.client.delete(server.url(&format!("/api/customers/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server.client.get(server.url(&format!("/api/customers/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], false);
    assert!(body.get("data").is_none(), "failure envelope carried data: {}", body);

    Ok(())
}

#[tokio::test]
async fn list_paginates_with_lenient_params() -> Result<()> {
    let server = common::spawn().await?;
    for n in 0..5 {
        create(&server, "leads", json!({"name": format!("lead-{}", n)})).await?;
    }

    let (status, body) = list(&server, "/api/leads?page=abc&limit=").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["message"], "Retrieved 5 of 5 leads");

    let (_, body) = list(&server, "/api/leads?page=2&limit=2").await?;
    let names: Vec<_> = body["data"].as_array().unwrap().iter().map(|d| d["name"].clone()).collect();
    assert_eq!(names, vec![json!("lead-2"), json!("lead-1")]);

    let (status, body) = list(&server, "/api/leads?page=0&limit=-4").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);

    Ok(())
}

#[tokio::test]
async fn low_stock_filters_products() -> Result<()> {
    let server = common::spawn().await?;
    create(&server, "products", json!({"name": "Bolt", "quantity": 2, "reorderLevel": 10})).await?;
    create(&server, "products", json!({"name": "Nut", "quantity": 50, "reorderLevel": 10})).await?;

    let (_, body) = list(&server, "/api/products?lowStock=true").await?;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Bolt");

    // Anything other than the literal "true" is false and filters nothing
    let (_, body) = list(&server, "/api/products?lowStock=1").await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    Ok(())
}

#[tokio::test]
async fn critical_and_passthrough_filters() -> Result<()> {
    let server = common::spawn().await?;
    create(&server, "service-tickets", json!({"subject": "Leak", "priority": "critical", "status": "open"})).await?;
    create(&server, "service-tickets", json!({"subject": "Noise", "priority": "low", "status": "open"})).await?;
    create(&server, "service-tickets", json!({"subject": "Crack", "priority": "critical", "status": "closed"})).await?;

    let (_, body) = list(&server, "/api/service-tickets?critical=true").await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = list(&server, "/api/service-tickets?critical=true&status=open").await?;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["subject"], "Leak");

    let (_, body) = list(&server, "/api/service-tickets?search=NOI").await?;
    assert_eq!(body["data"][0]["subject"], "Noise");

    // Cache busters do not narrow the list
    let (_, body) = list(&server, "/api/service-tickets?_t=1700000000").await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    Ok(())
}

#[tokio::test]
async fn invalid_requests_are_enveloped() -> Result<()> {
    let server = common::spawn().await?;

    let (status, body) = list(&server, "/api/widgets").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "error": "Unknown resource 'widgets'"}));

    let res = server.client.get(server.url("/api/products/not-a-uuid")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server.client.post(server.url("/api/products")).json(&json!([1, 2])).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Request body must be a JSON object");

    Ok(())
}

#[tokio::test]
async fn store_failures_become_generic_500() -> Result<()> {
    let server = common::spawn_with(Arc::new(common::FailingStore)).await?;

    let (status, body) = list(&server, "/api/customers").await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    let error = body["error"].as_str().unwrap();
    assert!(!error.contains("DATABASE_URL"), "leaked internal error: {}", error);

    Ok(())
}
