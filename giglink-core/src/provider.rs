//! Identity providers supported for federated sign-in

use std::fmt;

use serde::{Deserialize, Serialize};

/// An external identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Apple,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Apple => "apple",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "google" => Some(Provider::Google),
            "apple" => Some(Provider::Apple),
            _ => None,
        }
    }

    /// Issuer strings this provider puts in its ID tokens.
    ///
    /// Google publishes the same issuer with and without the scheme,
    /// depending on the token's vintage; both forms are exact matches.
    pub fn issuers(&self) -> &'static [&'static str] {
        match self {
            Provider::Google => &["https://accounts.google.com", "accounts.google.com"],
            Provider::Apple => &["https://appleid.apple.com"],
        }
    }

    /// URL of the provider's published JWKS document
    pub fn jwks_url(&self) -> &'static str {
        match self {
            Provider::Google => "https://www.googleapis.com/oauth2/v3/certs",
            Provider::Apple => "https://appleid.apple.com/auth/keys",
        }
    }

    /// URL of the provider's token endpoint (authorization-code exchange)
    pub fn token_url(&self) -> &'static str {
        match self {
            Provider::Google => "https://oauth2.googleapis.com/token",
            Provider::Apple => "https://appleid.apple.com/auth/token",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
