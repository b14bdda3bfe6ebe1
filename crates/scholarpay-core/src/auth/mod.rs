/*
[INPUT]:  Wallet capability, platform client and durable storage
[OUTPUT]: Key proofs, challenges, session tokens and the session lifecycle
[POS]:    Auth layer - wallet-based authentication
[UPDATE]: When adding wallet types or changing the auth flow
*/

pub mod challenge;
pub mod key_proof;
pub mod keypair;
pub mod local_wallet;
pub mod session;
pub mod store;
pub mod verifier;
pub mod wallet;

pub use challenge::{ChallengeService, DEFAULT_CHALLENGE_TTL_SECONDS};
pub use key_proof::KeyProofClient;
pub use keypair::{StellarKeypair, verify_challenge_signature};
pub use local_wallet::LocalKeyWallet;
pub use session::SessionManager;
pub use store::{AUTH_TOKEN_KEY, FileSessionStore, MemorySessionStore, PUBLIC_KEY_KEY, SessionStore};
pub use verifier::{HttpSignatureVerifier, SignatureVerifier};
pub use wallet::{
    MockWallet, SignTransactionOptions, WalletCapability, WalletHost, WalletRejection, WalletSlot,
};
