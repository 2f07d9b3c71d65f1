//! Link-confirmation endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use giglink_core::{CodeExchanger, KeySetFetcher};

use crate::error::SigninError;
use crate::resolver;
use crate::state::AppState;
use crate::store::AccountStore;

use super::AccountInfo;

#[derive(Deserialize)]
pub struct ConfirmLinkRequest {
    pub link_token: String,
    pub email: String,
    pub pass: String,
}

#[derive(Serialize)]
pub struct ConfirmLinkResponse {
    pub success: bool,
    pub session_token: String,
    pub account: AccountInfo,
}

/// POST /wsapi/confirm_link
///
/// Redeems a link-confirmation token after the user re-entered their
/// password; on success the provider is linked and a session is issued.
pub async fn confirm_link<A, F, X>(
    State(state): State<Arc<AppState<A, F, X>>>,
    Json(req): Json<ConfirmLinkRequest>,
) -> Result<Json<ConfirmLinkResponse>, SigninError>
where
    A: AccountStore + 'static,
    F: KeySetFetcher + 'static,
    X: CodeExchanger + 'static,
{
    let (account, session_token) = resolver::confirm_link(
        &state.store,
        &state.signer,
        &req.link_token,
        &req.email,
        &req.pass,
    )?;

    Ok(Json(ConfirmLinkResponse {
        success: true,
        session_token,
        account: AccountInfo::from(&account),
    }))
}
