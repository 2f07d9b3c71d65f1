//! Data models for account storage

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use giglink_core::Provider;

/// Unique account identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub u64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A user account
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    /// Stored lowercase; unique across accounts
    pub email: String,
    /// Absent for accounts created through federated sign-up
    pub password_hash: Option<String>,
    pub display_name: Option<String>,
    pub linked_providers: Vec<Provider>,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn has_provider(&self, provider: Provider) -> bool {
        self.linked_providers.contains(&provider)
    }
}

/// Fields for creating an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: Option<String>,
    pub display_name: Option<String>,
    /// Provider to link at creation (federated sign-up)
    pub provider: Option<Provider>,
    pub email_verified: bool,
}

impl NewAccount {
    /// Account created from a verified external identity: the provider
    /// already proved email ownership, and no password is set.
    pub fn federated(email: &str, display_name: Option<String>, provider: Provider) -> Self {
        Self {
            email: email.to_string(),
            password_hash: None,
            display_name,
            provider: Some(provider),
            email_verified: true,
        }
    }
}
