//! Fixtures shared by unit tests: an RSA signing key with its JWKS, a token
//! minter and a ready-made in-memory application state.

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;
use std::sync::Arc;

use crate::auth::{StaticKeySet, TokenValidator};
use crate::config::AppConfig;
use crate::database::MemoryDrinkStore;
use crate::state::AppState;

pub const TEST_JWKS: &str = include_str!("../../tests/fixtures/jwks.json");
pub const TEST_SIGNING_KEY: &str = include_str!("../../tests/fixtures/signing_key.pem");
pub const ROGUE_SIGNING_KEY: &str = include_str!("../../tests/fixtures/rogue_key.pem");
pub const TEST_KID: &str = "drinks-test-key";
pub const TEST_ISSUER: &str = "https://drinks-test.auth0.local/";
pub const TEST_AUDIENCE: &str = "drinks";

/// Shape of a token to mint
#[derive(Debug, Clone)]
pub struct TokenSpec {
    pub kid: Option<String>,
    pub issuer: String,
    pub audience: String,
    /// Seconds from now; negative for an already expired token
    pub expires_in: i64,
    pub permissions: Option<Vec<String>>,
    pub signing_key: &'static str,
}

impl Default for TokenSpec {
    fn default() -> Self {
        Self {
            kid: Some(TEST_KID.to_string()),
            issuer: TEST_ISSUER.to_string(),
            audience: TEST_AUDIENCE.to_string(),
            expires_in: 600,
            permissions: Some(Vec::new()),
            signing_key: TEST_SIGNING_KEY,
        }
    }
}

impl TokenSpec {
    pub fn with_permissions(permissions: &[&str]) -> Self {
        Self {
            permissions: Some(permissions.iter().map(|p| p.to_string()).collect()),
            ..Self::default()
        }
    }
}

pub fn mint(spec: &TokenSpec) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = spec.kid.clone();

    let now = Utc::now().timestamp();
    let mut claims = json!({
        "sub": "auth0|barista",
        "iss": spec.issuer,
        "aud": spec.audience,
        "iat": now,
        "exp": now + spec.expires_in,
    });
    if let Some(permissions) = &spec.permissions {
        claims["permissions"] = json!(permissions);
    }

    let key = EncodingKey::from_rsa_pem(spec.signing_key.as_bytes()).expect("fixture key");
    encode(&header, &claims, &key).expect("mint token")
}

pub fn static_validator() -> TokenValidator {
    let keys = StaticKeySet::from_json(TEST_JWKS).expect("fixture jwks");
    TokenValidator::new(Arc::new(keys), TEST_ISSUER, TEST_AUDIENCE, vec![Algorithm::RS256])
}

pub fn memory_state() -> AppState {
    AppState::new(
        AppConfig::from_env(),
        Arc::new(MemoryDrinkStore::new()),
        Arc::new(static_validator()),
    )
}
