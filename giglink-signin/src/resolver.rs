//! Account resolution for verified external identities
//!
//! Entered fresh per sign-in attempt. The terminal states are explicit:
//! a session is issued (returning federated user or fresh sign-up), or
//! link confirmation is required. An identity matching an existing local
//! email never logs in silently; the user must confirm with their
//! password before the provider is linked.

use crate::crypto::verify_password;
use crate::error::SigninError;
use crate::store::{Account, AccountStore, NewAccount};

use giglink_core::{ExternalIdentity, TokenSigner};

/// Terminal outcome of a sign-in attempt
#[derive(Debug)]
pub enum SignIn {
    /// Signed in; the application session token has been issued
    Session {
        account: Account,
        session_token: String,
    },
    /// The email matches an account not yet linked to this provider;
    /// the caller must ask the user to confirm the link
    LinkRequired { email: String, link_token: String },
}

/// Resolve a verified external identity into a sign-in outcome
pub fn sign_in<A>(
    store: &A,
    signer: &TokenSigner,
    identity: &ExternalIdentity,
) -> Result<SignIn, SigninError>
where
    A: AccountStore + ?Sized,
{
    let email = identity
        .email
        .as_deref()
        .ok_or(SigninError::MissingEmailClaim)?;

    let account = match store.find_by_email(email)? {
        Some(account) => account,
        None => {
            match store.create(NewAccount::federated(
                email,
                identity.display_name.clone(),
                identity.provider,
            )) {
                Ok(account) => {
                    tracing::info!(
                        account_id = %account.id,
                        provider = %identity.provider,
                        "Created account from federated sign-up"
                    );
                    let session_token = issue_session(signer, &account)?;
                    return Ok(SignIn::Session {
                        account,
                        session_token,
                    });
                }
                // Lost a creation race; the store's unique-email
                // constraint is the backstop. Retry as a plain login.
                Err(SigninError::AccountAlreadyExists) => store
                    .find_by_email(email)?
                    .ok_or(SigninError::AccountAlreadyExists)?,
                Err(e) => return Err(e),
            }
        }
    };

    if account.has_provider(identity.provider) {
        let session_token = issue_session(signer, &account)?;
        return Ok(SignIn::Session {
            account,
            session_token,
        });
    }

    let link_token = signer.issue_link(identity, &account.email)?;
    Ok(SignIn::LinkRequired {
        email: account.email,
        link_token,
    })
}

/// Redeem a link-confirmation token against the supplied credentials and
/// link the pending provider
pub fn confirm_link<A>(
    store: &A,
    signer: &TokenSigner,
    link_token: &str,
    supplied_email: &str,
    supplied_password: &str,
) -> Result<(Account, String), SigninError>
where
    A: AccountStore + ?Sized,
{
    let claims = signer.redeem_link(link_token)?;

    // A stolen link token must not be redeemable against another account
    if !supplied_email.eq_ignore_ascii_case(&claims.email) {
        return Err(SigninError::EmailMismatch);
    }

    let account = store
        .find_by_email(&claims.email)?
        .ok_or(SigninError::InvalidCredentials)?;

    let password_hash = account
        .password_hash
        .as_deref()
        .ok_or(SigninError::InvalidCredentials)?;
    let valid = verify_password(supplied_password, password_hash)
        .map_err(|e| SigninError::Internal(e.to_string()))?;
    if !valid {
        return Err(SigninError::InvalidCredentials);
    }

    let account = store.add_provider(account.id, claims.identity.provider)?;
    tracing::info!(
        account_id = %account.id,
        provider = %claims.identity.provider,
        "Linked provider after password confirmation"
    );

    let session_token = issue_session(signer, &account)?;
    Ok((account, session_token))
}

fn issue_session(signer: &TokenSigner, account: &Account) -> Result<String, SigninError> {
    Ok(signer.issue_session(&account.id.to_string(), &account.email)?)
}
