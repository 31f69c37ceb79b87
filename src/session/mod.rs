//! Auth session and token persistence
//!
//! The session owns the current API token. It is shared by reference
//! (`Arc<Session>`) between clients instead of living in a global.

use crate::Result;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub mod store;

pub use store::{FileTokenStore, InMemoryTokenStore, TokenStore};

/// Storage key for the API token
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Older key written by earlier front-end builds; migrated on load
pub const LEGACY_AUTH_TOKEN_KEY: &str = "authToken";

pub struct Session {
    store: Arc<dyn TokenStore>,
    token: RwLock<Option<String>>,
    logging_out: AtomicBool,
}

impl Session {
    /// Load the session from a token store, migrating the legacy key
    pub async fn load(store: Arc<dyn TokenStore>) -> Result<Self> {
        let mut token = store.get(AUTH_TOKEN_KEY).await?;

        if let Some(legacy) = store.get(LEGACY_AUTH_TOKEN_KEY).await? {
            if token.is_none() {
                info!(
                    fingerprint = %token_fingerprint(&legacy),
                    "Migrating token from legacy storage key"
                );
                store.set(AUTH_TOKEN_KEY, &legacy).await?;
                token = Some(legacy);
            }
            store.remove(LEGACY_AUTH_TOKEN_KEY).await?;
        }

        if let Some(t) = &token {
            debug!(fingerprint = %token_fingerprint(t), "Loaded stored token");
        }

        Ok(Self {
            store,
            token: RwLock::new(token),
            logging_out: AtomicBool::new(false),
        })
    }

    /// Empty session backed by an in-memory store
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemoryTokenStore::new()),
            token: RwLock::new(None),
            logging_out: AtomicBool::new(false),
        }
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    pub async fn set_token(&self, token: &str) -> Result<()> {
        self.store.set(AUTH_TOKEN_KEY, token).await?;
        *self.token.write().await = Some(token.to_string());
        debug!(fingerprint = %token_fingerprint(token), "Token stored");
        Ok(())
    }

    /// Remove the token from the store, then from memory. A failed store
    /// write leaves the session unchanged.
    pub async fn clear(&self) -> Result<()> {
        let mut token = self.token.write().await;
        self.store.remove(AUTH_TOKEN_KEY).await?;
        let previous = token.take();
        drop(token);
        if let Some(t) = previous {
            debug!(fingerprint = %token_fingerprint(&t), "Token cleared");
        }
        Ok(())
    }

    /// Value for the `Authorization` header, suppressed during logout
    pub async fn authorization_header(&self) -> Option<String> {
        if self.is_logging_out() {
            return None;
        }
        self.token
            .read()
            .await
            .as_ref()
            .map(|t| format!("Token {}", t))
    }

    /// Mark a logout as started; `false` if one is already running
    pub fn begin_logout(&self) -> bool {
        self.logging_out
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn end_logout(&self) {
        self.logging_out.store(false, Ordering::Release);
    }

    pub fn is_logging_out(&self) -> bool {
        self.logging_out.load(Ordering::Acquire)
    }
}

/// Short SHA-256 fingerprint of a token, safe to log
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..6])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FinsightError;

    #[tokio::test]
    async fn test_set_and_clear_roundtrip_through_store() {
        let store = Arc::new(InMemoryTokenStore::new());
        let session = Session::load(store.clone()).await.unwrap();
        assert!(!session.is_authenticated().await);

        session.set_token("abc123").await.unwrap();
        assert_eq!(store.get(AUTH_TOKEN_KEY).await.unwrap().as_deref(), Some("abc123"));
        assert_eq!(
            session.authorization_header().await.as_deref(),
            Some("Token abc123")
        );

        session.clear().await.unwrap();
        assert!(store.get(AUTH_TOKEN_KEY).await.unwrap().is_none());
        assert!(session.authorization_header().await.is_none());
    }

    /// Store that accepts writes but refuses removals
    struct StickyStore {
        inner: InMemoryTokenStore,
    }

    #[async_trait::async_trait]
    impl TokenStore for StickyStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            self.inner.set(key, value).await
        }

        async fn remove(&self, _key: &str) -> Result<()> {
            Err(FinsightError::TokenStore("disk is read-only".to_string()))
        }
    }

    #[tokio::test]
    async fn test_failed_clear_keeps_memory_and_store_in_step() {
        let store = Arc::new(StickyStore {
            inner: InMemoryTokenStore::new(),
        });
        let session = Session::load(store.clone()).await.unwrap();
        session.set_token("abc123").await.unwrap();

        assert!(matches!(
            session.clear().await,
            Err(FinsightError::TokenStore(_))
        ));
        assert_eq!(session.token().await.as_deref(), Some("abc123"));

        // A reload sees the same token the session still holds
        let reloaded = Session::load(store).await.unwrap();
        assert_eq!(reloaded.token().await, session.token().await);
    }

    #[tokio::test]
    async fn test_legacy_key_is_migrated() {
        let store = Arc::new(InMemoryTokenStore::new());
        store.set(LEGACY_AUTH_TOKEN_KEY, "old-token").await.unwrap();

        let session = Session::load(store.clone()).await.unwrap();

        assert_eq!(session.token().await.as_deref(), Some("old-token"));
        assert_eq!(store.get(AUTH_TOKEN_KEY).await.unwrap().as_deref(), Some("old-token"));
        assert!(store.get(LEGACY_AUTH_TOKEN_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_current_key_wins_over_legacy() {
        let store = Arc::new(InMemoryTokenStore::new());
        store.set(AUTH_TOKEN_KEY, "new-token").await.unwrap();
        store.set(LEGACY_AUTH_TOKEN_KEY, "old-token").await.unwrap();

        let session = Session::load(store.clone()).await.unwrap();

        assert_eq!(session.token().await.as_deref(), Some("new-token"));
        assert!(store.get(LEGACY_AUTH_TOKEN_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_header_suppressed_during_logout() {
        let session = Session::in_memory();
        session.set_token("abc").await.unwrap();

        assert!(session.begin_logout());
        assert!(!session.begin_logout());
        assert!(session.authorization_header().await.is_none());

        session.end_logout();
        assert!(session.authorization_header().await.is_some());
    }

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let a = token_fingerprint("secret-token");
        assert_eq!(a, token_fingerprint("secret-token"));
        assert_eq!(a.len(), 12);
        assert_ne!(a, token_fingerprint("other-token"));
    }
}
