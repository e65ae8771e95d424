use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use url::Url;

use super::error::AuthError;

/// Minimum gap between refetches triggered by an unknown `kid`
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Where token signing keys come from
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Looks up the public key with the given key id.
    async fn find(&self, kid: &str) -> Result<Option<Jwk>, AuthError>;
}

/// A fixed key set supplied at startup
pub struct StaticKeySet {
    keys: JwkSet,
}

impl StaticKeySet {
    pub fn new(keys: JwkSet) -> Self {
        Self { keys }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(text)?))
    }
}

#[async_trait]
impl KeySource for StaticKeySet {
    async fn find(&self, kid: &str) -> Result<Option<Jwk>, AuthError> {
        Ok(self.keys.find(kid).cloned())
    }
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

struct FailedFetch {
    at: Instant,
    reason: String,
}

#[derive(Default)]
struct KeyCache {
    current: Option<CachedKeys>,
    last_failure: Option<FailedFetch>,
}

/// Key set fetched from the issuer's JWKS endpoint and cached for `ttl`.
///
/// A `kid` that is not in the cached set forces a refetch, rate limited by
/// [`MIN_REFRESH_INTERVAL`], so rotated keys are picked up without a restart.
/// Only one fetch runs at a time. A failed fetch is remembered for the same
/// interval: callers get the stale keys if there are any, otherwise
/// `KeySetUnavailable` without another network round trip.
pub struct RemoteKeySet {
    url: Url,
    client: reqwest::Client,
    ttl: Duration,
    cache: RwLock<KeyCache>,
    refreshing: Mutex<()>,
}

impl RemoteKeySet {
    pub fn new(url: Url, ttl: Duration) -> Result<Self, AuthError> {
        Self::with_timeout(url, ttl, FETCH_TIMEOUT)
    }

    pub fn with_timeout(url: Url, ttl: Duration, timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;

        Ok(Self {
            url,
            client,
            ttl,
            cache: RwLock::new(KeyCache::default()),
            refreshing: Mutex::new(()),
        })
    }

    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let unavailable = |e: reqwest::Error| AuthError::KeySetUnavailable(format!("{}: {}", self.url, e));

        let keys = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .json::<JwkSet>()
            .await
            .map_err(unavailable)?;

        info!("Fetched {} signing key(s) from {}", keys.keys.len(), self.url);
        Ok(keys)
    }

    /// Keys to use when a fetch is not allowed or just failed
    fn fallback(cache: &KeyCache, reason: &str) -> Result<JwkSet, AuthError> {
        match &cache.current {
            Some(stale) => {
                warn!("Serving stale signing keys: {}", reason);
                Ok(stale.keys.clone())
            }
            None => Err(AuthError::KeySetUnavailable(reason.to_string())),
        }
    }

    async fn refresh(&self) -> Result<JwkSet, AuthError> {
        // Waiters queue here and reuse whatever the running fetch produced
        let _guard = self.refreshing.lock().await;

        {
            let cache = self.cache.read().await;
            if let Some(cached) = &cache.current {
                if cached.fetched_at.elapsed() < MIN_REFRESH_INTERVAL {
                    return Ok(cached.keys.clone());
                }
            }
            if let Some(failure) = &cache.last_failure {
                if failure.at.elapsed() < MIN_REFRESH_INTERVAL {
                    return Self::fallback(&cache, &failure.reason);
                }
            }
        }

        // The cache lock is not held across the fetch
        match self.fetch().await {
            Ok(keys) => {
                let mut cache = self.cache.write().await;
                cache.current = Some(CachedKeys {
                    keys: keys.clone(),
                    fetched_at: Instant::now(),
                });
                cache.last_failure = None;
                Ok(keys)
            }
            Err(err) => {
                let reason = err.to_string();
                warn!("Key set fetch failed: {}", reason);
                let mut cache = self.cache.write().await;
                cache.last_failure = Some(FailedFetch {
                    at: Instant::now(),
                    reason: reason.clone(),
                });
                Self::fallback(&cache, &reason)
            }
        }
    }
}

#[async_trait]
impl KeySource for RemoteKeySet {
    async fn find(&self, kid: &str) -> Result<Option<Jwk>, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = &cache.current {
                let age = cached.fetched_at.elapsed();
                if age < self.ttl {
                    if let Some(jwk) = cached.keys.find(kid) {
                        return Ok(Some(jwk.clone()));
                    }
                    if age < MIN_REFRESH_INTERVAL {
                        debug!("Unknown kid '{}', key set fetched {:?} ago", kid, age);
                        return Ok(None);
                    }
                    warn!("Unknown kid '{}', refetching key set", kid);
                }
            }
        }

        let keys = self.refresh().await?;
        Ok(keys.find(kid).cloned())
    }
}
