//! Process-wide signing key cache, keyed by `kid`.
//!
//! - Hit: served from memory (read lock only).
//! - Miss: re-fetch the whole key set, replace the cache, look up once more.
//!   A miss after a successful refresh is `KeyNotFound`.
//! - Built once at startup and shared through `AppState` (Arc), never a global.

use std::{collections::HashMap, fmt, sync::Arc};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::services::auth::{
    error::AuthError,
    jwks::{JwksFetcher, SigningKey},
};

pub struct KeyResolver {
    fetcher: Arc<dyn JwksFetcher>,
    keys: RwLock<HashMap<String, SigningKey>>,
    // Serializes refreshes so a burst of misses for the same kid costs one fetch.
    refresh_lock: Mutex<()>,
}

impl fmt::Debug for KeyResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyResolver").finish_non_exhaustive()
    }
}

impl KeyResolver {
    pub fn new(fetcher: Arc<dyn JwksFetcher>) -> Self {
        Self {
            fetcher,
            keys: RwLock::new(HashMap::new()),
            refresh_lock: Mutex::new(()),
        }
    }

    pub async fn resolve(&self, key_id: &str) -> Result<SigningKey, AuthError> {
        if let Some(key) = self.cached(key_id).await {
            debug!(kid = %key_id, "signing key cache hit");
            return Ok(key);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another request may have refreshed while we waited.
        if let Some(key) = self.cached(key_id).await {
            return Ok(key);
        }

        self.refresh().await?;

        self.cached(key_id)
            .await
            .ok_or_else(|| AuthError::KeyNotFound(key_id.to_string()))
    }

    /// Replace the whole key set with a fresh copy from the provider.
    pub async fn refresh(&self) -> Result<usize, AuthError> {
        let fetched = self.fetcher.fetch().await?;

        let fresh: HashMap<String, SigningKey> = fetched
            .into_iter()
            .map(|key| (key.key_id.clone(), key))
            .collect();
        let count = fresh.len();

        *self.keys.write().await = fresh;

        info!(keys = count, "signing key set refreshed");
        Ok(count)
    }

    async fn cached(&self, key_id: &str) -> Option<SigningKey> {
        self.keys.read().await.get(key_id).cloned()
    }
}
