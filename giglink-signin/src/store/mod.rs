//! Account storage abstractions
//!
//! Durable persistence is owned by an external collaborator; this flow
//! only reads accounts and performs single conditional writes (create, or
//! add a provider to an existing account).

pub mod memory;
pub mod models;

pub use memory::InMemoryAccountStore;
pub use models::*;

use crate::error::SigninError;

use giglink_core::Provider;

/// Result type for store operations
pub type StoreResult<T> = Result<T, SigninError>;

/// Trait for account storage
pub trait AccountStore: Send + Sync {
    /// Look up an account by email (case-insensitive exact match)
    fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// Get an account by ID
    fn get(&self, account_id: AccountId) -> StoreResult<Option<Account>>;

    /// Create a new account.
    ///
    /// Fails with `AccountAlreadyExists` on the unique-email constraint.
    fn create(&self, new_account: NewAccount) -> StoreResult<Account>;

    /// Add a provider to an account's linked set (idempotent)
    fn add_provider(&self, account_id: AccountId, provider: Provider) -> StoreResult<Account>;
}

/// Allow sharing a store between the app state and test code
impl<T: AccountStore + ?Sized> AccountStore for std::sync::Arc<T> {
    fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        (**self).find_by_email(email)
    }

    fn get(&self, account_id: AccountId) -> StoreResult<Option<Account>> {
        (**self).get(account_id)
    }

    fn create(&self, new_account: NewAccount) -> StoreResult<Account> {
        (**self).create(new_account)
    }

    fn add_provider(&self, account_id: AccountId, provider: Provider) -> StoreResult<Account> {
        (**self).add_provider(account_id, provider)
    }
}
