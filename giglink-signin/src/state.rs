//! Sign-in service state

use giglink_core::{CodeExchanger, KeySetCache, KeySetFetcher, Provider, TokenSigner};

use crate::config::ProviderClientConfig;
use crate::store::AccountStore;

/// Application state shared by all sign-in routes
pub struct AppState<A, F, X> {
    pub store: A,
    /// Signs the application's own link and session tokens
    pub signer: TokenSigner,
    /// Process-wide cache of provider signing keys
    pub key_cache: KeySetCache,
    pub fetcher: F,
    pub exchanger: X,
    pub google: ProviderClientConfig,
    pub apple: ProviderClientConfig,
}

impl<A, F, X> AppState<A, F, X>
where
    A: AccountStore,
    F: KeySetFetcher,
    X: CodeExchanger,
{
    pub fn new(
        store: A,
        signer: TokenSigner,
        fetcher: F,
        exchanger: X,
        google: ProviderClientConfig,
        apple: ProviderClientConfig,
    ) -> Self {
        Self {
            store,
            signer,
            key_cache: KeySetCache::new(),
            fetcher,
            exchanger,
            google,
            apple,
        }
    }

    pub fn provider_client(&self, provider: Provider) -> &ProviderClientConfig {
        match provider {
            Provider::Google => &self.google,
            Provider::Apple => &self.apple,
        }
    }
}
