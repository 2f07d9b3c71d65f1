//! Sign-in service error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use giglink_core::Error as CoreError;

#[derive(Debug, Error)]
pub enum SigninError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Malformed identity token")]
    MalformedToken,

    #[error("Unknown signing key")]
    UnknownSigningKey,

    #[error("Identity token verification failed")]
    TokenVerificationFailed(String),

    #[error("Provider exchange failed: {0}")]
    ProviderExchangeFailed(String),

    #[error("Provider request timed out")]
    ProviderTimeout,

    #[error("Identity token carries no email claim")]
    MissingEmailClaim,

    #[error("Link token invalid")]
    LinkTokenInvalid,

    #[error("Link token expired")]
    LinkTokenExpired,

    #[error("Email does not match the pending link")]
    EmailMismatch,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account already exists")]
    AccountAlreadyExists,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SigninError {
    /// Stable machine-readable code returned to clients
    pub fn code(&self) -> &'static str {
        match self {
            SigninError::UnknownProvider(_) => "unknown_provider",
            SigninError::MalformedToken => "malformed_token",
            SigninError::UnknownSigningKey => "unknown_signing_key",
            SigninError::TokenVerificationFailed(_) => "token_verification_failed",
            SigninError::ProviderExchangeFailed(_) => "provider_exchange_failed",
            SigninError::ProviderTimeout => "provider_timeout",
            SigninError::MissingEmailClaim => "missing_email_claim",
            SigninError::LinkTokenInvalid => "link_token_invalid",
            SigninError::LinkTokenExpired => "link_token_expired",
            SigninError::EmailMismatch => "email_mismatch",
            SigninError::InvalidCredentials => "invalid_credentials",
            SigninError::AccountAlreadyExists => "account_already_exists",
            SigninError::AccountNotFound => "account_not_found",
            SigninError::ValidationError(_) => "validation_error",
            SigninError::Internal(_) => "internal_error",
        }
    }
}

impl From<CoreError> for SigninError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::MalformedToken => SigninError::MalformedToken,
            CoreError::UnknownSigningKey { .. } => SigninError::UnknownSigningKey,
            CoreError::TokenVerificationFailed(reason) => {
                SigninError::TokenVerificationFailed(reason)
            }
            CoreError::ProviderExchangeFailed(reason) => {
                SigninError::ProviderExchangeFailed(reason)
            }
            CoreError::ProviderTimeout => SigninError::ProviderTimeout,
            CoreError::LinkTokenInvalid => SigninError::LinkTokenInvalid,
            CoreError::LinkTokenExpired => SigninError::LinkTokenExpired,
            CoreError::SessionTokenInvalid | CoreError::SessionTokenExpired => {
                SigninError::ValidationError("Session token rejected".to_string())
            }
            CoreError::Json(e) => SigninError::Internal(e.to_string()),
            CoreError::Jwt(e) => SigninError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for SigninError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            SigninError::UnknownProvider(name) => {
                (StatusCode::BAD_REQUEST, format!("Unknown provider: {name}"))
            }
            SigninError::MalformedToken => {
                (StatusCode::BAD_REQUEST, "Malformed identity token".to_string())
            }
            SigninError::UnknownSigningKey => {
                (StatusCode::UNAUTHORIZED, "Unknown signing key".to_string())
            }
            SigninError::TokenVerificationFailed(_) => (
                StatusCode::UNAUTHORIZED,
                "Identity token verification failed".to_string(),
            ),
            SigninError::ProviderExchangeFailed(reason) => {
                tracing::warn!("Provider exchange failed: {}", reason);
                (StatusCode::BAD_GATEWAY, "Provider exchange failed".to_string())
            }
            SigninError::ProviderTimeout => {
                tracing::warn!("Provider request timed out");
                (StatusCode::GATEWAY_TIMEOUT, "Provider request timed out".to_string())
            }
            SigninError::MissingEmailClaim => (
                StatusCode::BAD_REQUEST,
                "Identity token carries no email claim".to_string(),
            ),
            SigninError::LinkTokenInvalid => {
                (StatusCode::BAD_REQUEST, "Link token invalid".to_string())
            }
            SigninError::LinkTokenExpired => {
                (StatusCode::BAD_REQUEST, "Link token expired".to_string())
            }
            SigninError::EmailMismatch => (
                StatusCode::FORBIDDEN,
                "Email does not match the pending link".to_string(),
            ),
            SigninError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            SigninError::AccountAlreadyExists => {
                (StatusCode::CONFLICT, "Account already exists".to_string())
            }
            SigninError::AccountNotFound => {
                (StatusCode::NOT_FOUND, "Account not found".to_string())
            }
            SigninError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            SigninError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = json!({ "success": false, "error": self.code(), "reason": message });
        (status, axum::Json(body)).into_response()
    }
}
