/*
[INPUT]:  Message bytes and optional secret seed (strkey or raw bytes)
[OUTPUT]: Ed25519 signatures, account addresses and signature hints
[POS]:    Auth layer - cryptographic key material for local wallets
[UPDATE]: When changing signing algorithm or key format
*/

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use stellar_strkey::ed25519::PrivateKey as StrkeyPrivateKey;

use crate::http::{Result, WalletError};
use crate::types::PublicKey;

/// Ed25519 keypair addressed as a ledger account
pub struct StellarKeypair {
    signing_key: SigningKey,
}

impl StellarKeypair {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Create keypair from existing secret key bytes (32 bytes)
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(bytes);
        Self { signing_key }
    }

    /// Create keypair from an `S...` secret seed
    pub fn from_secret_seed(seed: &str) -> Result<Self> {
        let key = StrkeyPrivateKey::from_string(seed.trim())
            .map_err(|_| WalletError::Config("secret seed is not a valid S... strkey".to_string()))?;
        Ok(Self::from_secret_bytes(&key.0))
    }

    /// Secret seed in `S...` form
    pub fn secret_seed(&self) -> String {
        StrkeyPrivateKey(self.signing_key.to_bytes()).to_string()
    }

    /// Account address for this keypair
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_bytes(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message and return the signature
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }

    /// Last four bytes of the public key, used by the ledger to match signatures to signers
    pub fn signature_hint(&self) -> [u8; 4] {
        let bytes = self.signing_key.verifying_key().to_bytes();
        [bytes[28], bytes[29], bytes[30], bytes[31]]
    }

    /// Verify a signature against a message
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.signing_key
            .verifying_key()
            .verify(message, signature)
            .is_ok()
    }
}

impl fmt::Debug for StellarKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StellarKeypair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Check a base64 challenge signature against an account address.
///
/// This is the verifier's side of the handshake; the client never relies on
/// it to decide whether it is authenticated.
pub fn verify_challenge_signature(public_key: &PublicKey, message: &str, signature_b64: &str) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key.as_bytes()) else {
        return false;
    };
    let Ok(bytes) = BASE64.decode(signature_b64.trim()) else {
        return false;
    };
    let Ok(bytes) = <[u8; 64]>::try_from(bytes.as_slice()) else {
        return false;
    };
    verifying_key
        .verify(message.as_bytes(), &Signature::from_bytes(&bytes))
        .is_ok()
}
