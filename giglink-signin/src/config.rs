//! Sign-in service configuration

use giglink_core::Provider;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// Secret used to sign session and link-confirmation tokens
    pub session_secret: String,

    pub google: ProviderClientConfig,
    pub apple: ProviderClientConfig,

    /// Credentials for Apple's client-assertion signing; absent in
    /// deployments that only use the ID-token flow
    pub apple_signing: Option<AppleSigningConfig>,
}

/// Per-provider client registration
#[derive(Debug, Clone)]
pub struct ProviderClientConfig {
    /// Client identifiers accepted as token audiences; one per client
    /// surface (web, mobile, ...)
    pub client_ids: Vec<String>,
    pub redirect_uri: String,
}

#[derive(Debug, Clone)]
pub struct AppleSigningConfig {
    pub team_id: String,
    pub key_id: String,
    pub private_key_pem: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("GIGLINK_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            session_secret: std::env::var("GIGLINK_SESSION_SECRET")
                .unwrap_or_else(|_| "insecure-dev-session-secret".to_string()),
            google: ProviderClientConfig {
                client_ids: env_list("GIGLINK_GOOGLE_CLIENT_IDS"),
                redirect_uri: std::env::var("GIGLINK_GOOGLE_REDIRECT_URI").unwrap_or_default(),
            },
            apple: ProviderClientConfig {
                client_ids: env_list("GIGLINK_APPLE_CLIENT_IDS"),
                redirect_uri: std::env::var("GIGLINK_APPLE_REDIRECT_URI").unwrap_or_default(),
            },
            apple_signing: apple_signing_from_env(),
        }
    }

    pub fn provider_client(&self, provider: Provider) -> &ProviderClientConfig {
        match provider {
            Provider::Google => &self.google,
            Provider::Apple => &self.apple,
        }
    }
}

fn apple_signing_from_env() -> Option<AppleSigningConfig> {
    let team_id = std::env::var("GIGLINK_APPLE_TEAM_ID").ok()?;
    let key_id = std::env::var("GIGLINK_APPLE_KEY_ID").ok()?;
    let private_key_pem = std::env::var("GIGLINK_APPLE_PRIVATE_KEY").ok()?;
    Some(AppleSigningConfig {
        team_id,
        key_id,
        private_key_pem,
    })
}

/// Parse a comma-separated environment variable into a list
fn env_list(name: &str) -> Vec<String> {
    std::env::var(name)
        .map(|value| split_list(&value))
        .unwrap_or_default()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
