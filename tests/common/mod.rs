#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{extract::State, routing::get, Json, Router};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};

use drinks_api::auth::TokenValidator;
use drinks_api::config::AppConfig;
use drinks_api::database::MemoryDrinkStore;
use drinks_api::AppState;

pub const JWKS: &str = include_str!("../fixtures/jwks.json");
pub const SIGNING_KEY: &str = include_str!("../fixtures/signing_key.pem");
pub const ROGUE_KEY: &str = include_str!("../fixtures/rogue_key.pem");
pub const KID: &str = "drinks-test-key";
pub const DOMAIN: &str = "drinks-test.auth0.local";
pub const ISSUER: &str = "https://drinks-test.auth0.local/";
pub const AUDIENCE: &str = "drinks";

/// API server plus a fake identity provider serving the fixture JWKS,
/// both running on the test's runtime.
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    jwks_hits: Arc<AtomicUsize>,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let jwks_hits = Arc::new(AtomicUsize::new(0));
        let jwks_port = spawn(jwks_router(jwks_hits.clone())).await?;

        let mut config = AppConfig::from_env();
        config.database.url = None;
        config.auth.domain = DOMAIN.to_string();
        config.auth.audience = AUDIENCE.to_string();
        config.auth.algorithms = vec!["RS256".to_string()];
        config.auth.jwks_file = None;
        config.auth.jwks_url = Some(format!("http://127.0.0.1:{}/.well-known/jwks.json", jwks_port));
        config.auth.jwks_cache_secs = 600;
        config.validate().context("test config")?;

        let validator = TokenValidator::from_config(&config.auth).context("validator")?;
        let state = AppState::new(config, Arc::new(MemoryDrinkStore::new()), Arc::new(validator));
        let port = spawn(drinks_api::app(state)).await?;

        let server = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            jwks_hits,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Number of times the API fetched the key set
    pub fn jwks_hits(&self) -> usize {
        self.jwks_hits.load(Ordering::SeqCst)
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
}

async fn spawn(router: Router) -> Result<u16> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind {}", port))?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(port)
}

fn jwks_router(hits: Arc<AtomicUsize>) -> Router {
    async fn jwks(State(hits): State<Arc<AtomicUsize>>) -> Json<Value> {
        hits.fetch_add(1, Ordering::SeqCst);
        Json(serde_json::from_str(JWKS).expect("fixture jwks"))
    }

    Router::new()
        .route("/.well-known/jwks.json", get(jwks))
        .with_state(hits)
}

/// Claims and key used to mint a test token
pub struct Token {
    pub kid: Option<&'static str>,
    pub issuer: &'static str,
    pub audience: &'static str,
    pub expires_in: i64,
    pub permissions: Option<Vec<&'static str>>,
    pub key: &'static str,
}

impl Default for Token {
    fn default() -> Self {
        Self {
            kid: Some(KID),
            issuer: ISSUER,
            audience: AUDIENCE,
            expires_in: 600,
            permissions: Some(Vec::new()),
            key: SIGNING_KEY,
        }
    }
}

impl Token {
    pub fn with(permissions: &[&'static str]) -> Self {
        Self {
            permissions: Some(permissions.to_vec()),
            ..Self::default()
        }
    }

    pub fn mint(&self) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.kid.map(String::from);

        let now = chrono::Utc::now().timestamp();
        let mut claims = json!({
            "sub": "auth0|manager",
            "iss": self.issuer,
            "aud": self.audience,
            "iat": now,
            "exp": now + self.expires_in,
        });
        if let Some(permissions) = &self.permissions {
            claims["permissions"] = json!(permissions);
        }

        let key = EncodingKey::from_rsa_pem(self.key.as_bytes()).expect("fixture key");
        encode(&header, &claims, &key).expect("mint token")
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.mint())
    }
}

/// Token holding every drinks permission
pub fn manager() -> Token {
    Token::with(&["get:drinks-detail", "post:drinks", "patch:drinks", "delete:drinks"])
}

/// POSTs a drink as a manager and returns the response body
pub async fn create_drink(server: &TestServer, body: Value) -> Result<Value> {
    let res = server
        .client
        .post(server.url("/drinks"))
        .header("Authorization", manager().bearer())
        .json(&body)
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "create failed: {}", res.status());
    Ok(res.json().await?)
}

/// Id of the drink with `title` in a `{"drinks": [...]}` body
pub fn id_of(body: &Value, title: &str) -> Option<i64> {
    body["drinks"]
        .as_array()?
        .iter()
        .find(|d| d["title"] == title)
        .and_then(|d| d["id"].as_i64())
}
