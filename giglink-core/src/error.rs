//! Error types for giglink-core

use thiserror::Error;

use crate::Provider;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed identity token")]
    MalformedToken,

    #[error("No signing key {kid} published by {provider}")]
    UnknownSigningKey { provider: Provider, kid: String },

    #[error("Identity token verification failed: {0}")]
    TokenVerificationFailed(String),

    #[error("Provider exchange failed: {0}")]
    ProviderExchangeFailed(String),

    #[error("Provider request timed out")]
    ProviderTimeout,

    #[error("Link token invalid")]
    LinkTokenInvalid,

    #[error("Link token expired")]
    LinkTokenExpired,

    #[error("Session token invalid")]
    SessionTokenInvalid,

    #[error("Session token expired")]
    SessionTokenExpired,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}
