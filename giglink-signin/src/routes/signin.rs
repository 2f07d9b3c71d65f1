//! Federated sign-in endpoint

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use giglink_core::{verify_credential, CodeExchanger, KeySetFetcher, Provider, RawCredential};

use crate::error::SigninError;
use crate::resolver::{self, SignIn};
use crate::state::AppState;
use crate::store::AccountStore;

use super::AccountInfo;

#[derive(Deserialize)]
pub struct SignInRequest {
    /// Provider-issued ID token (Google SDKs, Apple native flow)
    pub id_token: Option<String>,
    /// Authorization code to exchange first (Apple web flow)
    pub code: Option<String>,
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// POST /wsapi/signin/{provider}
pub async fn sign_in_with_provider<A, F, X>(
    State(state): State<Arc<AppState<A, F, X>>>,
    Path(provider): Path<String>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, SigninError>
where
    A: AccountStore + 'static,
    F: KeySetFetcher + 'static,
    X: CodeExchanger + 'static,
{
    let provider =
        Provider::from_str(&provider).ok_or(SigninError::UnknownProvider(provider))?;

    let credential = match (req.id_token, req.code) {
        (Some(token), None) => RawCredential::IdToken(token),
        (None, Some(code)) => RawCredential::AuthorizationCode(code),
        _ => {
            return Err(SigninError::ValidationError(
                "Provide exactly one of id_token or code".to_string(),
            ))
        }
    };

    // Verification may fetch provider keys or exchange a code over the
    // network; run it on the blocking pool
    let verify_state = state.clone();
    let identity = tokio::task::spawn_blocking(move || {
        let audiences = &verify_state.provider_client(provider).client_ids;
        verify_credential(
            provider,
            credential,
            audiences,
            &verify_state.key_cache,
            &verify_state.fetcher,
            &verify_state.exchanger,
        )
    })
    .await
    .map_err(|e| SigninError::Internal(format!("Blocking task failed: {e}")))??;

    match resolver::sign_in(&state.store, &state.signer, &identity)? {
        SignIn::Session {
            account,
            session_token,
        } => Ok(Json(SignInResponse {
            success: true,
            session_token: Some(session_token),
            account: Some(AccountInfo::from(&account)),
            link_required: None,
            link_token: None,
            email: None,
        })),
        SignIn::LinkRequired { email, link_token } => Ok(Json(SignInResponse {
            success: true,
            session_token: None,
            account: None,
            link_required: Some(true),
            link_token: Some(link_token),
            email: Some(email),
        })),
    }
}
