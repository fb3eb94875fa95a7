mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn health_and_root_respond() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = server.client.get(server.url("/")).send().await?.json().await?;
    assert!(body["endpoints"]["posts"].is_string());
    Ok(())
}

#[tokio::test]
async fn register_returns_user_without_password() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server
        .client
        .post(server.url("/api/auth/register"))
        .json(&json!({ "username": "ann", "email": "ann@example.com", "password": "password123" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: Value = res.json().await?;
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["email"], "ann@example.com");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_is_rejected() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    server.register("Ann").await?;

    let res = server
        .client
        .post(server.url("/api/users/register"))
        .json(&json!({ "username": "other", "email": "ann@example.com", "password": "password123" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["error"], "User already exists");
    Ok(())
}

#[tokio::test]
async fn missing_fields_list_field_errors() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server
        .client
        .post(server.url("/api/users/register"))
        .json(&json!({ "email": "ann@example.com" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["error"], "All fields are required");
    assert!(body["field_errors"]["username"].is_string());
    assert!(body["field_errors"]["password"].is_string());
    Ok(())
}

#[tokio::test]
async fn login_token_authenticates_me() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let (token, id) = server.register("Ann").await?;

    let res = server
        .client
        .get(server.url("/api/users/me"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["user"]["id"], id);
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    server.register("Ann").await?;

    let res = server
        .client
        .post(server.url("/api/users/login"))
        .json(&json!({ "email": "ann@example.com", "password": "nope-nope" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Invalid credentials");
    Ok(())
}

#[tokio::test]
async fn missing_and_invalid_tokens() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server.client.get(server.url("/api/users/me")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Access token required");

    let res = server
        .client
        .get(server.url("/api/users/me"))
        .bearer_auth("definitely.not.valid")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Invalid token");
    Ok(())
}
