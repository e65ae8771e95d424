use jsonwebtoken::{
    decode, decode_header,
    errors::{Error as JwtError, ErrorKind},
    Algorithm, DecodingKey, Validation,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::claims::Claims;
use super::error::AuthError;
use super::jwks::{KeySource, RemoteKeySet, StaticKeySet};
use crate::config::{AuthConfig, ConfigError};

/// Verifies bearer tokens against the issuer's signing keys
pub struct TokenValidator {
    keys: Arc<dyn KeySource>,
    issuer: String,
    audience: String,
    algorithms: Vec<Algorithm>,
}

impl TokenValidator {
    pub fn new(
        keys: Arc<dyn KeySource>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        algorithms: Vec<Algorithm>,
    ) -> Self {
        Self {
            keys,
            issuer: issuer.into(),
            audience: audience.into(),
            algorithms,
        }
    }

    /// Builds a validator from configuration. A configured `jwks_file` takes
    /// precedence over fetching from the issuer.
    pub fn from_config(auth: &AuthConfig) -> Result<Self, ConfigError> {
        let algorithms = auth
            .algorithms
            .iter()
            .map(|name| match Algorithm::from_str(name) {
                // Symmetric algorithms cannot be verified against a JWKS
                Ok(Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) | Err(_) => {
                    Err(ConfigError::Invalid {
                        name: "AUTH_ALGORITHMS",
                        value: name.clone(),
                    })
                }
                Ok(algorithm) => Ok(algorithm),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let keys: Arc<dyn KeySource> = match &auth.jwks_file {
            Some(path) => {
                let invalid = |reason: String| ConfigError::Invalid {
                    name: "AUTH_JWKS_FILE",
                    value: format!("{} ({})", path, reason),
                };
                let text = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
                Arc::new(StaticKeySet::from_json(&text).map_err(|e| invalid(e.to_string()))?)
            }
            None => {
                let url = auth.jwks_url()?;
                let remote = RemoteKeySet::new(url, Duration::from_secs(auth.jwks_cache_secs))
                    .map_err(|e| ConfigError::Invalid {
                        name: "AUTH_JWKS_URL",
                        value: e.to_string(),
                    })?;
                Arc::new(remote)
            }
        };

        Ok(Self::new(keys, auth.issuer(), auth.audience.clone(), algorithms))
    }

    /// Verifies signature, expiry, audience and issuer and returns the claims.
    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| {
            debug!("Unreadable token header: {}", e);
            AuthError::Malformed
        })?;

        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;

        if !self.algorithms.contains(&header.alg) {
            debug!("Token algorithm {:?} is not accepted", header.alg);
            return Err(AuthError::Malformed);
        }

        let jwk = self.keys.find(&kid).await?.ok_or(AuthError::NoMatchingKey)?;
        let key = DecodingKey::from_jwk(&jwk).map_err(|e| {
            debug!("Unusable signing key '{}': {}", kid, e);
            AuthError::NoMatchingKey
        })?;

        let mut validation = Validation::new(header.alg);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        let data = decode::<Claims>(token, &key, &validation).map_err(classify)?;
        Ok(data.claims)
    }
}

fn classify(err: JwtError) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer | ErrorKind::MissingRequiredClaim(_) => {
            AuthError::InvalidClaims
        }
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        other => {
            debug!("Token rejected: {:?}", other);
            AuthError::Malformed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, TokenSpec, TEST_AUDIENCE, TEST_ISSUER};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn validator() -> TokenValidator {
        testing::static_validator()
    }

    #[tokio::test]
    async fn accepts_a_valid_token() {
        let token = testing::mint(&TokenSpec::with_permissions(&["get:drinks-detail"]));
        let claims = validator().validate(&token).await.unwrap();

        assert_eq!(claims.iss, TEST_ISSUER);
        assert!(claims.has_permission("get:drinks-detail"));
        assert_eq!(claims.subject(), "auth0|barista");
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let spec = TokenSpec {
            expires_in: -3600,
            ..TokenSpec::default()
        };
        let err = validator().validate(&testing::mint(&spec)).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn rejects_wrong_audience_and_issuer() {
        let spec = TokenSpec {
            audience: "someone-else".to_string(),
            ..TokenSpec::default()
        };
        let err = validator().validate(&testing::mint(&spec)).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidClaims));

        let spec = TokenSpec {
            issuer: "https://evil.example.com/".to_string(),
            ..TokenSpec::default()
        };
        let err = validator().validate(&testing::mint(&spec)).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidClaims));
    }

    #[tokio::test]
    async fn rejects_token_signed_by_another_key() {
        let spec = TokenSpec {
            signing_key: testing::ROGUE_SIGNING_KEY,
            ..TokenSpec::default()
        };
        let err = validator().validate(&testing::mint(&spec)).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignature));
    }

    #[tokio::test]
    async fn rejects_missing_and_unknown_kid() {
        let spec = TokenSpec {
            kid: None,
            ..TokenSpec::default()
        };
        let err = validator().validate(&testing::mint(&spec)).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingKeyId));

        let spec = TokenSpec {
            kid: Some("rotated-away".to_string()),
            ..TokenSpec::default()
        };
        let err = validator().validate(&testing::mint(&spec)).await.unwrap_err();
        assert!(matches!(err, AuthError::NoMatchingKey));
    }

    #[tokio::test]
    async fn rejects_garbage() {
        let err = validator().validate("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, AuthError::Malformed));
    }

    #[tokio::test]
    async fn rejects_symmetric_algorithm() {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(testing::TEST_KID.to_string());
        let claims = json!({
            "iss": TEST_ISSUER,
            "aud": TEST_AUDIENCE,
            "exp": chrono::Utc::now().timestamp() + 600,
        });
        let token = encode(&header, &claims, &EncodingKey::from_secret(b"shared")).unwrap();

        let err = validator().validate(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::Malformed));
    }

    #[test]
    fn from_config_rejects_unknown_algorithm() {
        let auth = AuthConfig {
            domain: "drinks.us.auth0.com".to_string(),
            audience: "drinks".to_string(),
            algorithms: vec!["RS999".to_string()],
            ..AuthConfig::default()
        };
        assert!(matches!(
            TokenValidator::from_config(&auth),
            Err(ConfigError::Invalid { name: "AUTH_ALGORITHMS", .. })
        ));
    }

    #[test]
    fn from_config_refuses_shared_secret_algorithms() {
        let auth = AuthConfig {
            domain: "drinks.us.auth0.com".to_string(),
            audience: "drinks".to_string(),
            algorithms: vec!["RS256".to_string(), "HS256".to_string()],
            ..AuthConfig::default()
        };
        assert!(matches!(
            TokenValidator::from_config(&auth),
            Err(ConfigError::Invalid { name: "AUTH_ALGORITHMS", ref value }) if value == "HS256"
        ));
    }
}
