//! Identity provider adapter
//!
//! Converts a raw provider credential (an ID token, or an authorization
//! code to be exchanged first) into a verified [`ExternalIdentity`].

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, decode_header, encode, Algorithm, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::keyset::{resolve_key, KeySetCache, KeySetFetcher};
use crate::{Error, ExternalIdentity, Provider, Result};

/// How long a provider client assertion stays valid.
///
/// Apple caps these at six months; one assertion is only ever used for a
/// single exchange, so the long validity is never load-bearing.
const CLIENT_ASSERTION_TTL_DAYS: i64 = 150;

/// The raw credential a client hands us at sign-in.
///
/// Google's SDKs deliver an ID token directly; Apple's web flow delivers
/// an authorization code that must be exchanged at the token endpoint.
#[derive(Debug, Clone)]
pub enum RawCredential {
    IdToken(String),
    AuthorizationCode(String),
}

/// Trait for exchanging an authorization code for the provider's ID token
pub trait CodeExchanger: Send + Sync {
    fn exchange(&self, provider: Provider, code: &str) -> Result<String>;
}

/// Claims read out of a verified provider ID token
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Verify a raw credential and produce the external identity it attests.
///
/// Authorization codes are exchanged first; everything then flows through
/// [`verify_id_token`].
pub fn verify_credential<F, X>(
    provider: Provider,
    credential: RawCredential,
    audiences: &[String],
    cache: &KeySetCache,
    fetcher: &F,
    exchanger: &X,
) -> Result<ExternalIdentity>
where
    F: KeySetFetcher + ?Sized,
    X: CodeExchanger + ?Sized,
{
    let raw_token = match credential {
        RawCredential::IdToken(token) => token,
        RawCredential::AuthorizationCode(code) => exchanger.exchange(provider, &code)?,
    };

    verify_id_token(provider, &raw_token, audiences, cache, fetcher)
}

/// Verify a provider-issued ID token.
///
/// Checks signature (against the provider's published key for the token's
/// `kid`), expiry, issuer, and audience, then extracts the subject, email,
/// and display-name claims.
pub fn verify_id_token<F>(
    provider: Provider,
    token: &str,
    audiences: &[String],
    cache: &KeySetCache,
    fetcher: &F,
) -> Result<ExternalIdentity>
where
    F: KeySetFetcher + ?Sized,
{
    let header = decode_header(token).map_err(|_| Error::MalformedToken)?;
    let kid = header.kid.ok_or(Error::MalformedToken)?;

    let key = resolve_key(provider, &kid, cache, fetcher)?;

    let mut validation = Validation::new(key.algorithm);
    validation.set_issuer(provider.issuers());
    validation.set_audience(audiences);
    validation.leeway = 30;

    let data = decode::<IdTokenClaims>(token, &key.key, &validation)
        .map_err(|e| Error::TokenVerificationFailed(e.to_string()))?;

    Ok(ExternalIdentity {
        provider,
        subject: data.claims.sub,
        email: data.claims.email,
        display_name: data.claims.name,
    })
}

/// Credentials for signing client assertions toward a provider's token
/// endpoint (Apple's "client secret" JWT).
#[derive(Debug, Clone)]
pub struct ClientAssertionConfig {
    pub team_id: String,
    pub client_id: String,
    pub key_id: String,
    pub private_key_pem: String,
}

#[derive(Debug, Serialize)]
struct ClientAssertionClaims {
    iss: String,
    sub: String,
    aud: String,
    iat: i64,
    exp: i64,
}

/// Build the ES256-signed client assertion POSTed with an authorization code
pub fn build_client_assertion(config: &ClientAssertionConfig) -> Result<String> {
    let now = Utc::now();
    let claims = ClientAssertionClaims {
        iss: config.team_id.clone(),
        sub: config.client_id.clone(),
        aud: Provider::Apple.issuers()[0].to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::days(CLIENT_ASSERTION_TTL_DAYS)).timestamp(),
    };

    let mut header = Header::new(Algorithm::ES256);
    header.kid = Some(config.key_id.clone());

    let key = EncodingKey::from_ec_pem(config.private_key_pem.as_bytes())?;
    Ok(encode(&header, &claims, &key)?)
}
