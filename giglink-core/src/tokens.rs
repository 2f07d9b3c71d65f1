//! Application-issued tokens
//!
//! Both token kinds are signed with the application's session secret and
//! carry a `purpose` claim, so a link-confirmation token is never accepted
//! where a session token is expected and vice versa. Link tokens embed the
//! pending external identity; they are stateless and single-use by
//! convention only (the redeeming flow immediately converts them into a
//! session and the client discards the raw token).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, ExternalIdentity, Result};

const PURPOSE_LINK: &str = "link";
const PURPOSE_SESSION: &str = "session";

/// Link-confirmation tokens live for minutes, not hours
const DEFAULT_LINK_TTL_MINUTES: i64 = 10;
/// Standard application session lifetime
const DEFAULT_SESSION_TTL_DAYS: i64 = 14;

/// Claims carried by a link-confirmation token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkClaims {
    pub purpose: String,
    /// The external identity pending confirmation
    pub identity: ExternalIdentity,
    /// The matched account email the link was offered for
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims carried by an application session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub purpose: String,
    /// Account identifier
    pub sub: String,
    pub email: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates the application's own tokens (HS256)
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    link_ttl: Duration,
    session_ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str) -> Self {
        Self::with_ttls(
            secret,
            Duration::minutes(DEFAULT_LINK_TTL_MINUTES),
            Duration::days(DEFAULT_SESSION_TTL_DAYS),
        )
    }

    pub fn with_ttls(secret: &str, link_ttl: Duration, session_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            link_ttl,
            session_ttl,
        }
    }

    /// Issue a link-confirmation token for a pending identity
    pub fn issue_link(&self, identity: &ExternalIdentity, email: &str) -> Result<String> {
        let now = Utc::now();
        let claims = LinkClaims {
            purpose: PURPOSE_LINK.to_string(),
            identity: identity.clone(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.link_ttl).timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Validate a link-confirmation token and return its claims
    pub fn redeem_link(&self, token: &str) -> Result<LinkClaims> {
        let data = decode::<LinkClaims>(token, &self.decoding_key, &Self::validation())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => Error::LinkTokenExpired,
                _ => Error::LinkTokenInvalid,
            })?;

        if data.claims.purpose != PURPOSE_LINK {
            return Err(Error::LinkTokenInvalid);
        }

        Ok(data.claims)
    }

    /// Issue an application session token for an account
    pub fn issue_session(&self, account_id: &str, email: &str) -> Result<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            purpose: PURPOSE_SESSION.to_string(),
            sub: account_id.to_string(),
            email: email.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + self.session_ttl).timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Validate an application session token and return its claims
    pub fn verify_session(&self, token: &str) -> Result<SessionClaims> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &Self::validation())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => Error::SessionTokenExpired,
                _ => Error::SessionTokenInvalid,
            })?;

        if data.claims.purpose != PURPOSE_SESSION {
            return Err(Error::SessionTokenInvalid);
        }

        Ok(data.claims)
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation
    }
}
