use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string. `None` selects the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Identity provider tenant domain, e.g. `example.us.auth0.com`
    pub domain: String,
    pub audience: String,
    pub algorithms: Vec<String>,
    /// Overrides the JWKS location derived from `domain`
    pub jwks_url: Option<String>,
    /// Serve keys from a local JWKS document instead of fetching them
    pub jwks_file: Option<String>,
    pub jwks_cache_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Auth overrides
        if let Ok(v) = env::var("AUTH0_DOMAIN") {
            self.auth.domain = v.trim().trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("API_AUDIENCE") {
            self.auth.audience = v;
        }
        if let Ok(v) = env::var("AUTH_ALGORITHMS") {
            self.auth.algorithms = split_list(&v);
        }
        if let Ok(v) = env::var("AUTH_JWKS_URL") {
            self.auth.jwks_url = Some(v);
        }
        if let Ok(v) = env::var("AUTH_JWKS_FILE") {
            self.auth.jwks_file = Some(v);
        }
        if let Ok(v) = env::var("AUTH_JWKS_CACHE_SECS") {
            self.auth.jwks_cache_secs = v.parse().unwrap_or(self.auth.jwks_cache_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }

        self
    }

    /// Checks the settings that have no usable default.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.domain.is_empty() {
            return Err(ConfigError::Missing("AUTH0_DOMAIN"));
        }
        if self.auth.audience.is_empty() {
            return Err(ConfigError::Missing("API_AUDIENCE"));
        }
        if self.auth.algorithms.is_empty() {
            return Err(ConfigError::Missing("AUTH_ALGORITHMS"));
        }
        self.auth.jwks_url()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 30,
            },
            auth: AuthConfig::default(),
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:4200".to_string(), "http://localhost:8100".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 10,
            },
            auth: AuthConfig::default(),
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 5,
            },
            auth: AuthConfig {
                jwks_cache_secs: 3600,
                ..AuthConfig::default()
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            audience: String::new(),
            algorithms: vec!["RS256".to_string()],
            jwks_url: None,
            jwks_file: None,
            jwks_cache_secs: 600,
        }
    }
}

impl AuthConfig {
    /// Expected `iss` claim. Auth0 issues tokens with a trailing slash.
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }

    pub fn jwks_url(&self) -> Result<Url, ConfigError> {
        let raw = match &self.jwks_url {
            Some(url) => url.clone(),
            None => format!("{}.well-known/jwks.json", self.issuer()),
        };
        Url::parse(&raw).map_err(|_| ConfigError::Invalid { name: "AUTH_JWKS_URL", value: raw })
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
