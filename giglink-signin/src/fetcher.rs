//! HTTP collaborators for provider endpoints
//!
//! Both fetchers use a blocking client with a fixed timeout so a slow or
//! unreachable provider cannot stall a sign-in request; async handlers run
//! them through `spawn_blocking`. Failures are not retried here; the
//! client UI prompts the user to retry the whole sign-in gesture.

use std::collections::HashMap;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey};
use reqwest::blocking::Client;
use serde::Deserialize;

use giglink_core::{
    build_client_assertion, ClientAssertionConfig, CodeExchanger, Error as CoreError,
    KeySetFetcher, Provider, ProviderKeySet, VerificationKey,
};

/// Timeout for provider HTTP calls
const PROVIDER_HTTP_TIMEOUT_SECS: u64 = 5;

fn provider_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(PROVIDER_HTTP_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client")
}

fn transport_error(e: reqwest::Error) -> CoreError {
    if e.is_timeout() {
        CoreError::ProviderTimeout
    } else {
        CoreError::ProviderExchangeFailed(format!("HTTP request failed: {e}"))
    }
}

/// One key from a provider's JWKS document
#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    #[serde(default)]
    alg: Option<String>,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<Jwk>,
}

/// Fetches provider JWKS documents over HTTPS
pub struct HttpKeyFetcher {
    client: Client,
}

impl HttpKeyFetcher {
    pub fn new() -> Self {
        Self {
            client: provider_client(),
        }
    }
}

impl Default for HttpKeyFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySetFetcher for HttpKeyFetcher {
    fn fetch(&self, provider: Provider) -> giglink_core::Result<ProviderKeySet> {
        let response = self
            .client
            .get(provider.jwks_url())
            .send()
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(CoreError::ProviderExchangeFailed(format!(
                "Key set fetch returned HTTP {}",
                response.status()
            )));
        }

        let doc: JwksDocument = response.json().map_err(|e| {
            CoreError::ProviderExchangeFailed(format!("Invalid JWKS document: {e}"))
        })?;

        let mut keys = HashMap::new();
        for jwk in doc.keys {
            // Google and Apple both publish RSA keys
            if jwk.kty != "RSA" {
                continue;
            }
            let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
                continue;
            };
            let Ok(algorithm) = jwk.alg.as_deref().unwrap_or("RS256").parse::<Algorithm>() else {
                continue;
            };
            let Ok(key) = DecodingKey::from_rsa_components(n, e) else {
                tracing::warn!(%provider, kid = %jwk.kid, "Skipping unparseable JWKS key");
                continue;
            };
            keys.insert(jwk.kid, VerificationKey { algorithm, key });
        }

        tracing::debug!(%provider, count = keys.len(), "Fetched provider key set");
        Ok(ProviderKeySet::new(provider, keys))
    }
}

#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    #[serde(default)]
    id_token: Option<String>,
}

/// Exchanges authorization codes at the provider's token endpoint.
///
/// Only Apple's web flow delivers a code; Google's SDKs hand the client an
/// ID token directly, so a Google exchange is a caller error.
pub struct HttpCodeExchanger {
    client: Client,
    apple_assertion: Option<ClientAssertionConfig>,
    apple_redirect_uri: String,
}

impl HttpCodeExchanger {
    pub fn new(apple_assertion: Option<ClientAssertionConfig>, apple_redirect_uri: String) -> Self {
        Self {
            client: provider_client(),
            apple_assertion,
            apple_redirect_uri,
        }
    }
}

impl CodeExchanger for HttpCodeExchanger {
    fn exchange(&self, provider: Provider, code: &str) -> giglink_core::Result<String> {
        match provider {
            Provider::Google => Err(CoreError::ProviderExchangeFailed(
                "google sign-in delivers ID tokens directly".to_string(),
            )),
            Provider::Apple => {
                let assertion_config = self.apple_assertion.as_ref().ok_or_else(|| {
                    CoreError::ProviderExchangeFailed(
                        "apple exchange credentials not configured".to_string(),
                    )
                })?;

                let client_secret = build_client_assertion(assertion_config)?;
                let params = [
                    ("grant_type", "authorization_code"),
                    ("code", code),
                    ("client_id", assertion_config.client_id.as_str()),
                    ("client_secret", client_secret.as_str()),
                    ("redirect_uri", self.apple_redirect_uri.as_str()),
                ];

                let response = self
                    .client
                    .post(provider.token_url())
                    .form(&params)
                    .send()
                    .map_err(transport_error)?;

                if !response.status().is_success() {
                    return Err(CoreError::ProviderExchangeFailed(format!(
                        "Token endpoint returned HTTP {}",
                        response.status()
                    )));
                }

                let body: TokenEndpointResponse = response.json().map_err(|e| {
                    CoreError::ProviderExchangeFailed(format!("Invalid token response: {e}"))
                })?;

                body.id_token.ok_or_else(|| {
                    CoreError::ProviderExchangeFailed(
                        "Token response carried no id_token".to_string(),
                    )
                })
            }
        }
    }
}
