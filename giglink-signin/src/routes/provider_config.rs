//! Provider client-configuration endpoint

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use giglink_core::{CodeExchanger, KeySetFetcher, Provider};

use crate::error::SigninError;
use crate::state::AppState;
use crate::store::AccountStore;

#[derive(Serialize)]
pub struct ProviderConfigResponse {
    pub provider: Provider,
    /// Public client identifier the client-side SDK should use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub redirect_uri: String,
}

/// GET /wsapi/provider_config/{provider}
///
/// Public configuration for the client-side SDK; never includes secrets.
pub async fn provider_config<A, F, X>(
    State(state): State<Arc<AppState<A, F, X>>>,
    Path(provider): Path<String>,
) -> Result<Json<ProviderConfigResponse>, SigninError>
where
    A: AccountStore + 'static,
    F: KeySetFetcher + 'static,
    X: CodeExchanger + 'static,
{
    let provider =
        Provider::from_str(&provider).ok_or(SigninError::UnknownProvider(provider))?;
    let client = state.provider_client(provider);

    Ok(Json(ProviderConfigResponse {
        provider,
        client_id: client.client_ids.first().cloned(),
        redirect_uri: client.redirect_uri.clone(),
    }))
}
