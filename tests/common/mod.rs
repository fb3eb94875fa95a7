#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use blog_api_rust::config::AppConfig;
use blog_api_rust::database::models::Role;
use blog_api_rust::{app, AppState};
use reqwest::StatusCode;
use serde_json::{json, Value};

/// An in-process server on a free port, backed by a fresh in-memory store
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = AppState::in_memory(AppConfig::development());
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;

        let router = app(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            base_url,
            state,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register through the API, log in, and return `(token, user id)`
    pub async fn register(&self, name: &str) -> Result<(String, String)> {
        let email = format!("{}@example.com", name.to_lowercase());

        let res = self
            .client
            .post(self.url("/api/users/register"))
            .json(&json!({ "username": name, "email": email, "password": "password123" }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

        self.login(&email, "password123").await
    }

    /// Create an admin directly in the store, then log in over HTTP
    pub async fn admin(&self, name: &str) -> Result<(String, String)> {
        let email = format!("{}@example.com", name.to_lowercase());
        self.state
            .users()
            .create_user(name.to_string(), email.clone(), "password123", Role::Admin)
            .await
            .map_err(|e| anyhow::anyhow!(e.message().to_string()))?;

        self.login(&email, "password123").await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(String, String)> {
        let res = self
            .client
            .post(self.url("/api/users/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

        let body: Value = res.json().await?;
        let token = body["token"].as_str().context("login response without token")?;
        let id = body["user"]["id"].as_str().context("login response without user id")?;
        Ok((token.to_string(), id.to_string()))
    }

    /// Create a post as `token` and return its id
    pub async fn create_post(&self, token: &str, title: &str, content: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/api/posts"))
            .bearer_auth(token)
            .json(&json!({ "title": title, "content": content }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create post failed: {}", res.status());

        let body: Value = res.json().await?;
        Ok(body["post"]["id"].as_str().context("post without id")?.to_string())
    }
}
