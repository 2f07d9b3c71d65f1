//! Common test utilities for sign-in integration tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use axum_test::TestServer;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use ed25519_dalek::SigningKey;
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use serde_json::{json, Value};

use giglink_core::{
    CodeExchanger, Error as CoreError, KeySetFetcher, Provider, ProviderKeySet, TokenSigner,
    VerificationKey,
};
use giglink_signin::{
    routes, Account, AccountStore, AppState, InMemoryAccountStore, NewAccount,
    ProviderClientConfig,
};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const WEB_CLIENT_ID: &str = "giglink-web";

pub const GOOGLE_KID: &str = "google-key-1";
pub const APPLE_KID: &str = "apple-key-1";
pub const GOOGLE_SEED: [u8; 32] = [11u8; 32];
pub const APPLE_SEED: [u8; 32] = [22u8; 32];

/// Signer sharing the test server's secret
pub fn signer() -> TokenSigner {
    TokenSigner::new(TEST_SECRET)
}

/// Build a PKCS#8 DER for an Ed25519 seed so jsonwebtoken can sign with it
pub fn ed25519_encoding_key(seed: &[u8; 32]) -> EncodingKey {
    let pkcs8_prefix: &[u8] = &[
        0x30, 0x2e, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x04, 0x22, 0x04,
        0x20,
    ];
    let mut der = Vec::with_capacity(48);
    der.extend_from_slice(pkcs8_prefix);
    der.extend_from_slice(seed);
    EncodingKey::from_ed_der(&der)
}

/// Key directory standing in for the providers' JWKS endpoints
#[derive(Clone, Default)]
pub struct MockKeyDirectory {
    published: Arc<RwLock<HashMap<Provider, Vec<(String, [u8; 32])>>>>,
    fetches: Arc<AtomicUsize>,
}

impl MockKeyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, provider: Provider, kid: &str, seed: [u8; 32]) {
        self.published
            .write()
            .unwrap()
            .entry(provider)
            .or_default()
            .push((kid.to_string(), seed));
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl KeySetFetcher for MockKeyDirectory {
    fn fetch(&self, provider: Provider) -> giglink_core::Result<ProviderKeySet> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let published = self.published.read().unwrap();
        let mut keys = HashMap::new();
        for (kid, seed) in published.get(&provider).into_iter().flatten() {
            let verifying_key = SigningKey::from_bytes(seed).verifying_key();
            let encoded = URL_SAFE_NO_PAD.encode(verifying_key.to_bytes());
            let key = VerificationKey {
                algorithm: Algorithm::EdDSA,
                key: DecodingKey::from_ed_components(&encoded).unwrap(),
            };
            keys.insert(kid.clone(), key);
        }
        Ok(ProviderKeySet::new(provider, keys))
    }
}

/// Code exchanger standing in for Apple's token endpoint
#[derive(Clone, Default)]
pub struct MockCodeExchanger {
    codes: Arc<RwLock<HashMap<String, String>>>,
}

impl MockCodeExchanger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an authorization code and the ID token it exchanges into
    pub fn register(&self, code: &str, id_token: &str) {
        self.codes
            .write()
            .unwrap()
            .insert(code.to_string(), id_token.to_string());
    }
}

impl CodeExchanger for MockCodeExchanger {
    fn exchange(&self, _provider: Provider, code: &str) -> giglink_core::Result<String> {
        self.codes
            .read()
            .unwrap()
            .get(code)
            .cloned()
            .ok_or_else(|| CoreError::ProviderExchangeFailed("unknown code".to_string()))
    }
}

pub struct TestHarness {
    pub server: TestServer,
    pub store: Arc<InMemoryAccountStore>,
    pub directory: MockKeyDirectory,
    pub exchanger: MockCodeExchanger,
}

/// Create a test server with both providers' keys published
pub fn create_test_server() -> TestHarness {
    let store = Arc::new(InMemoryAccountStore::new());
    let directory = MockKeyDirectory::new();
    directory.publish(Provider::Google, GOOGLE_KID, GOOGLE_SEED);
    directory.publish(Provider::Apple, APPLE_KID, APPLE_SEED);
    let exchanger = MockCodeExchanger::new();

    let client_config = ProviderClientConfig {
        client_ids: vec![WEB_CLIENT_ID.to_string(), "giglink-mobile".to_string()],
        redirect_uri: "https://giglink.example/auth/callback".to_string(),
    };

    let state = Arc::new(AppState::new(
        store.clone(),
        signer(),
        directory.clone(),
        exchanger.clone(),
        client_config.clone(),
        client_config,
    ));

    let app = routes::create_router(state);
    let server = TestServer::new(app).expect("Failed to create test server");

    TestHarness {
        server,
        store,
        directory,
        exchanger,
    }
}

/// Standard claims for a provider ID token aimed at the test server
pub fn standard_claims(provider: Provider, email: &str) -> Value {
    let now = Utc::now().timestamp();
    json!({
        "iss": provider.issuers()[0],
        "aud": WEB_CLIENT_ID,
        "sub": format!("{}-sub-{}", provider, email),
        "email": email,
        "name": "Pat Doe",
        "iat": now,
        "exp": now + 300,
    })
}

/// Mint a provider ID token signed with the given Ed25519 seed
pub fn mint_id_token(kid: &str, seed: &[u8; 32], claims: &Value) -> String {
    let mut header = Header::new(Algorithm::EdDSA);
    header.kid = Some(kid.to_string());
    encode(&header, claims, &ed25519_encoding_key(seed)).unwrap()
}

/// Convenience: a valid Google ID token for the given email
pub fn google_id_token(email: &str) -> String {
    mint_id_token(GOOGLE_KID, &GOOGLE_SEED, &standard_claims(Provider::Google, email))
}

/// Convenience: a valid Apple ID token for the given email
pub fn apple_id_token(email: &str) -> String {
    mint_id_token(APPLE_KID, &APPLE_SEED, &standard_claims(Provider::Apple, email))
}

/// Seed a password-based account directly in the store
pub fn seed_password_account(store: &InMemoryAccountStore, email: &str, password: &str) -> Account {
    store
        .create(NewAccount {
            email: email.to_string(),
            password_hash: Some(giglink_signin::crypto::hash_password(password).unwrap()),
            display_name: Some("Pat Doe".to_string()),
            provider: None,
            email_verified: true,
        })
        .unwrap()
}
