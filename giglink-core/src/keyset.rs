//! Provider signing-key sets and the process-wide key cache
//!
//! Each provider publishes a JWKS document; a fetched set is cached for a
//! fixed TTL and always replaced wholesale, never merged. Concurrent
//! readers clone the current `Arc`; a stale read racing a replace costs at
//! most one extra fetch.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey};

use crate::{Error, Provider, Result};

/// How long a fetched key set stays fresh (one hour)
pub const KEY_SET_TTL_SECONDS: i64 = 3600;

/// A single verification key from a provider's JWKS document
#[derive(Clone)]
pub struct VerificationKey {
    /// Algorithm the provider declared for this key
    pub algorithm: Algorithm,
    pub key: DecodingKey,
}

/// A provider's published key set at a point in time
#[derive(Clone)]
pub struct ProviderKeySet {
    provider: Provider,
    keys: HashMap<String, VerificationKey>,
    fetched_at: DateTime<Utc>,
}

impl ProviderKeySet {
    pub fn new(provider: Provider, keys: HashMap<String, VerificationKey>) -> Self {
        Self {
            provider,
            keys,
            fetched_at: Utc::now(),
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Look up a key by its `kid`
    pub fn find(&self, kid: &str) -> Option<&VerificationKey> {
        self.keys.get(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

/// Trait for fetching a provider's published key set
pub trait KeySetFetcher: Send + Sync {
    fn fetch(&self, provider: Provider) -> Result<ProviderKeySet>;
}

/// Process-wide cache of provider key sets, one slot per provider
pub struct KeySetCache {
    ttl: Duration,
    google: RwLock<Option<Arc<ProviderKeySet>>>,
    apple: RwLock<Option<Arc<ProviderKeySet>>>,
}

impl KeySetCache {
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(KEY_SET_TTL_SECONDS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            google: RwLock::new(None),
            apple: RwLock::new(None),
        }
    }

    fn slot(&self, provider: Provider) -> &RwLock<Option<Arc<ProviderKeySet>>> {
        match provider {
            Provider::Google => &self.google,
            Provider::Apple => &self.apple,
        }
    }

    /// Get the current key set for a provider, if present and fresh
    pub fn current(&self, provider: Provider) -> Option<Arc<ProviderKeySet>> {
        let slot = self.slot(provider).read().unwrap();
        slot.as_ref()
            .filter(|set| Utc::now() - set.fetched_at < self.ttl)
            .cloned()
    }

    /// Replace a provider's cached key set wholesale
    pub fn replace(&self, set: ProviderKeySet) -> Arc<ProviderKeySet> {
        let set = Arc::new(set);
        let mut slot = self.slot(set.provider).write().unwrap();
        *slot = Some(set.clone());
        set
    }
}

impl Default for KeySetCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve the verification key for a `kid`.
///
/// Consults the cache first; on a miss (absent, stale, or unknown `kid`)
/// fetches the provider's key set exactly once, replaces the cache entry,
/// and fails with `UnknownSigningKey` if the `kid` is still not present.
pub fn resolve_key<F>(
    provider: Provider,
    kid: &str,
    cache: &KeySetCache,
    fetcher: &F,
) -> Result<VerificationKey>
where
    F: KeySetFetcher + ?Sized,
{
    if let Some(set) = cache.current(provider) {
        if let Some(key) = set.find(kid) {
            return Ok(key.clone());
        }
    }

    tracing::debug!(%provider, kid, "Signing key not cached, fetching key set");
    let fresh = fetcher.fetch(provider)?;
    let set = cache.replace(fresh);

    set.find(kid).cloned().ok_or_else(|| Error::UnknownSigningKey {
        provider,
        kid: kid.to_string(),
    })
}
