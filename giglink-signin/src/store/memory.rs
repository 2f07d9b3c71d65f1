//! In-memory account store

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::Utc;

use super::{Account, AccountId, AccountStore, NewAccount, StoreResult};
use crate::error::SigninError;

use giglink_core::Provider;

/// In-memory account store
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<AccountId, Account>>,
    emails: RwLock<HashMap<String, AccountId>>,
    next_account_id: AtomicU64,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            emails: RwLock::new(HashMap::new()),
            next_account_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let normalized = email.to_lowercase();
        let emails = self.emails.read().unwrap();
        if let Some(account_id) = emails.get(&normalized) {
            return self.get(*account_id);
        }
        Ok(None)
    }

    fn get(&self, account_id: AccountId) -> StoreResult<Option<Account>> {
        Ok(self.accounts.read().unwrap().get(&account_id).cloned())
    }

    fn create(&self, new_account: NewAccount) -> StoreResult<Account> {
        let normalized = new_account.email.to_lowercase();

        // Hold the email map lock across the uniqueness check and insert
        let mut emails = self.emails.write().unwrap();
        if emails.contains_key(&normalized) {
            return Err(SigninError::AccountAlreadyExists);
        }

        let id = AccountId(self.next_account_id.fetch_add(1, Ordering::SeqCst));
        let account = Account {
            id,
            email: normalized.clone(),
            password_hash: new_account.password_hash,
            display_name: new_account.display_name,
            linked_providers: new_account.provider.into_iter().collect(),
            email_verified: new_account.email_verified,
            created_at: Utc::now(),
        };

        emails.insert(normalized, id);
        self.accounts.write().unwrap().insert(id, account.clone());
        Ok(account)
    }

    fn add_provider(&self, account_id: AccountId, provider: Provider) -> StoreResult<Account> {
        let mut accounts = self.accounts.write().unwrap();
        if let Some(account) = accounts.get_mut(&account_id) {
            if !account.linked_providers.contains(&provider) {
                account.linked_providers.push(provider);
            }
            Ok(account.clone())
        } else {
            Err(SigninError::AccountNotFound)
        }
    }
}
