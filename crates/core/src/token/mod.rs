//! Bearer-token caching and issuance.
//!
//! Tokens are cached in the KV store under a named key with a TTL shorter
//! than the token's real expiry, so a cached token is never served stale.
//! Issuance failures propagate to the caller; retries, where they happen at
//! all, happen in the orchestration layer.

use std::future::Future;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::CredentialsConfig;
use crate::store::{KvStore, StoreError};

/// Cache TTL for issued tokens: 22 hours, below the 24 hour token expiry.
pub const TOKEN_TTL_SECS: u64 = 79_200;

/// Errors from token caching and issuance.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token endpoint returned non-2xx.
    #[error("Token issuance failed with status {status}: {message}")]
    IssuanceFailed { status: u16, message: String },

    /// The token endpoint answered 2xx but without an access token.
    #[error("Token response carried no access token")]
    MissingAccessToken,

    /// Transport-level failure talking to the token endpoint.
    #[error("Token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Cache read/write failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// KV-backed token cache.
pub struct TokenCache {
    store: Arc<dyn KvStore>,
}

impl TokenCache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Return the cached token under `cache_key` if present, otherwise run
    /// `fetch`, store its result with `ttl_secs` and return it.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        cache_key: &str,
        ttl_secs: u64,
        fetch: F,
    ) -> Result<String, TokenError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, TokenError>>,
    {
        if let Some(token) = self.store.get(cache_key)? {
            if !token.is_empty() {
                debug!(cache_key, "token cache hit");
                return Ok(token);
            }
        }

        debug!(cache_key, "token cache miss, fetching");
        let token = fetch().await?;
        self.store.put_with_ttl(cache_key, &token, ttl_secs)?;
        Ok(token)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// OAuth client-credentials exchange against a token endpoint.
pub struct ClientCredentialsTokenSource {
    client: reqwest::Client,
    credentials: CredentialsConfig,
}

impl ClientCredentialsTokenSource {
    pub fn new(client: reqwest::Client, credentials: CredentialsConfig) -> Self {
        Self {
            client,
            credentials,
        }
    }

    /// Perform the network exchange and return a fresh access token.
    pub async fn fetch_token(&self) -> Result<String, TokenError> {
        let form = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("grant_type", "client_credentials"),
            ("scope", self.credentials.scopes.as_str()),
        ];

        let response = self
            .client
            .post(&self.credentials.token_url)
            .header("Accept", "application/json")
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TokenError::IssuanceFailed {
                status: status.as_u16(),
                message,
            });
        }

        let body: TokenResponse = response.json().await?;
        body.access_token
            .filter(|t| !t.is_empty())
            .ok_or(TokenError::MissingAccessToken)
    }
}

/// Where a client gets its bearer token from.
pub enum TokenProvider {
    /// Fixed token passed in via configuration, used as-is.
    Static(String),
    /// Cached exchange: check the cache, fall back to the issuer.
    Cached {
        cache: TokenCache,
        source: ClientCredentialsTokenSource,
        cache_key: String,
    },
}

impl TokenProvider {
    pub async fn bearer(&self) -> Result<String, TokenError> {
        match self {
            TokenProvider::Static(token) => Ok(token.clone()),
            TokenProvider::Cached {
                cache,
                source,
                cache_key,
            } => {
                cache
                    .get_or_fetch(cache_key, TOKEN_TTL_SECS, || source.fetch_token())
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteKvStore;

    fn cache() -> TokenCache {
        TokenCache::new(Arc::new(SqliteKvStore::in_memory().unwrap()))
    }

    #[tokio::test]
    async fn test_cache_miss_fetches_and_stores() {
        let cache = cache();

        let token = cache
            .get_or_fetch("svc-auth-key", 3600, || async {
                Ok("fresh-token".to_string())
            })
            .await
            .unwrap();
        assert_eq!(token, "fresh-token");

        // second call must not invoke the fetcher
        let token = cache
            .get_or_fetch("svc-auth-key", 3600, || async {
                panic!("fetcher called on cache hit")
            })
            .await
            .unwrap();
        assert_eq!(token, "fresh-token");
    }

    #[tokio::test]
    async fn test_fetch_error_propagates_and_caches_nothing() {
        let cache = cache();

        let result = cache
            .get_or_fetch("svc-auth-key", 3600, || async {
                Err(TokenError::MissingAccessToken)
            })
            .await;
        assert!(matches!(result, Err(TokenError::MissingAccessToken)));

        // the failure left no entry behind
        let token = cache
            .get_or_fetch("svc-auth-key", 3600, || async { Ok("later".to_string()) })
            .await
            .unwrap();
        assert_eq!(token, "later");
    }

    #[tokio::test]
    async fn test_static_provider_returns_configured_token() {
        let provider = TokenProvider::Static("passed-through".to_string());
        assert_eq!(provider.bearer().await.unwrap(), "passed-through");
    }

    #[tokio::test]
    async fn test_distinct_cache_keys_do_not_collide() {
        let cache = cache();

        cache
            .get_or_fetch("repo-auth-key", 3600, || async { Ok("repo".to_string()) })
            .await
            .unwrap();
        let token = cache
            .get_or_fetch("manifest-auth-key", 3600, || async {
                Ok("manifest".to_string())
            })
            .await
            .unwrap();
        assert_eq!(token, "manifest");
    }
}
