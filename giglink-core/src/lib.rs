//! GigLink Identity Core Library
//!
//! Implements federated sign-in identity handling:
//! - Providers publish signing keys; ID tokens are verified against them
//! - A process-wide key cache bounds how often key sets are refetched
//! - The application issues its own link-confirmation and session tokens

pub mod adapter;
pub mod error;
pub mod identity;
pub mod keyset;
pub mod provider;
pub mod tokens;

pub use adapter::{
    build_client_assertion, verify_credential, verify_id_token, ClientAssertionConfig,
    CodeExchanger, RawCredential,
};
pub use error::Error;
pub use identity::ExternalIdentity;
pub use keyset::{KeySetCache, KeySetFetcher, ProviderKeySet, VerificationKey};
pub use provider::Provider;
pub use tokens::{LinkClaims, SessionClaims, TokenSigner};

/// Result type for giglink-core operations
pub type Result<T> = std::result::Result<T, Error>;
