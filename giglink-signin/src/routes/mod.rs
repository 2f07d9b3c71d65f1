//! HTTP routes for the sign-in service

mod link;
mod provider_config;
mod signin;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use giglink_core::{CodeExchanger, KeySetFetcher, Provider};

use crate::state::AppState;
use crate::store::{Account, AccountStore};

/// Create the router with all routes
pub fn create_router<A, F, X>(state: Arc<AppState<A, F, X>>) -> Router
where
    A: AccountStore + 'static,
    F: KeySetFetcher + 'static,
    X: CodeExchanger + 'static,
{
    Router::new()
        .route("/wsapi/signin/{provider}", post(signin::sign_in_with_provider))
        .route("/wsapi/confirm_link", post(link::confirm_link))
        .route(
            "/wsapi/provider_config/{provider}",
            get(provider_config::provider_config),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Public view of an account returned to clients
#[derive(Debug, Serialize)]
pub struct AccountInfo {
    pub id: u64,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub linked_providers: Vec<Provider>,
    pub email_verified: bool,
}

impl From<&Account> for AccountInfo {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.0,
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            linked_providers: account.linked_providers.clone(),
            email_verified: account.email_verified,
        }
    }
}
