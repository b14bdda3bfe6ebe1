/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for scholarpay-core tests

#![allow(dead_code)]

use std::sync::Arc;

use scholarpay_core::auth::verify_challenge_signature;
use scholarpay_core::{
    ClientConfig, KeyProofClient, LocalKeyWallet, MemorySessionStore, Network, PlatformClient,
    PublicKey, SessionManager, StellarKeypair, VerifyRequest, WalletSlot,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Account address of [`donor_keypair`]
pub fn donor_address() -> PublicKey {
    donor_keypair().public_key()
}

/// Deterministic donor keypair
pub fn donor_keypair() -> StellarKeypair {
    StellarKeypair::from_secret_bytes(&[1u8; 32])
}

/// Deterministic recipient account
pub fn recipient_address() -> PublicKey {
    StellarKeypair::from_secret_bytes(&[2u8; 32]).public_key()
}

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client pointing both APIs at the mock server
pub fn client_for(server: &MockServer) -> PlatformClient {
    PlatformClient::with_config_and_base_urls(ClientConfig::default(), &server.uri(), &server.uri())
        .expect("client init")
}

/// Wallet slot holding a local wallet for the donor key
pub fn donor_wallet_slot() -> WalletSlot {
    WalletSlot::with_wallet(Arc::new(LocalKeyWallet::new(donor_keypair())))
}

pub fn key_proof(slot: &WalletSlot) -> KeyProofClient {
    KeyProofClient::new(Arc::new(slot.clone()))
}

/// Session manager over the mock server with in-memory storage
pub fn session_manager(
    server: &MockServer,
    slot: &WalletSlot,
    store: Arc<MemorySessionStore>,
) -> SessionManager {
    SessionManager::with_client(client_for(server), key_proof(slot), store, Network::Testnet)
}

/// Answers `/auth/verify` like the real service: the signature must match
/// the challenge for the claimed key
pub struct SignatureCheckingVerifier {
    pub token: String,
}

impl Respond for SignatureCheckingVerifier {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let Ok(body) = serde_json::from_slice::<VerifyRequest>(&request.body) else {
            return ResponseTemplate::new(400).set_body_json(serde_json::json!({"detail": "bad body"}));
        };
        let Ok(public_key) = body.public_key.parse::<PublicKey>() else {
            return ResponseTemplate::new(400).set_body_json(serde_json::json!({"detail": "bad key"}));
        };
        if verify_challenge_signature(&public_key, &body.challenge, &body.signature) {
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": self.token}))
        } else {
            ResponseTemplate::new(401).set_body_json(serde_json::json!({"detail": "invalid signature"}))
        }
    }
}

pub async fn mount_challenge(server: &MockServer, challenge: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/challenge"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"challenge": challenge})),
        )
        .mount(server)
        .await;
}

pub async fn mount_account(server: &MockServer, address: &PublicKey, sequence: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/ledger/accounts/{address}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": address.as_str(),
                "sequence": sequence
            })),
        )
        .mount(server)
        .await;
}
