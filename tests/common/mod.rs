#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};

use inventory_api::config::AppConfig;
use inventory_api::database::MemoryStore;
use inventory_api::{app, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";

/// A real server on an unused port, backed by a fresh in-memory store.
///
/// Each `#[tokio::test]` owns its runtime, so every test starts its own server.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub client: reqwest::Client,
}

/// A signed-in account.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(AppConfig::for_tests(TEST_SECRET), store.clone());

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            port,
            base_url,
            store,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
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

    pub fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.request(Method::GET, path, Some(token)).send().await?)
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.request(Method::DELETE, path, Some(token)).send().await?)
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Result<Response> {
        Ok(self.request(Method::POST, path, token).json(&body).send().await?)
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> Result<Response> {
        Ok(self.request(Method::PUT, path, Some(token)).json(&body).send().await?)
    }

    /// Register and return the new account's id and tokens.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Account> {
        let res = self
            .post(
                "/auth/register",
                None,
                json!({ "name": name, "email": email, "password": password }),
            )
            .await?;
        anyhow::ensure!(
            res.status() == StatusCode::CREATED,
            "register {} returned {}",
            email,
            res.status()
        );
        let body: Value = res.json().await?;
        account_from(&body["data"], email)
    }

    pub async fn create_location(&self, token: &str, name: &str) -> Result<i64> {
        let res = self
            .post("/locations", Some(token), json!({ "name": name, "description": "test" }))
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "location create returned {}", res.status());
        let body: Value = res.json().await?;
        body["data"]["id"].as_i64().context("location id missing")
    }

    pub async fn create_item(&self, token: &str, name: &str, location_id: i64) -> Result<i64> {
        let res = self
            .post(
                "/items",
                Some(token),
                json!({ "name": name, "description": "test", "location_id": location_id }),
            )
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "item create returned {}", res.status());
        let body: Value = res.json().await?;
        body["data"]["id"].as_i64().context("item id missing")
    }
}

pub fn account_from(data: &Value, email: &str) -> Result<Account> {
    Ok(Account {
        id: data["user"]["id"].as_i64().context("user id missing")?,
        email: email.to_string(),
        access_token: data["access_token"].as_str().context("access token missing")?.to_string(),
        refresh_token: data["refresh_token"].as_str().context("refresh token missing")?.to_string(),
    })
}

/// Status and parsed JSON body in one go.
pub async fn read(res: Response) -> Result<(StatusCode, Value)> {
    let status = res.status();
    let body = res.json::<Value>().await?;
    Ok((status, body))
}
