/*
[INPUT]:  Ed25519 keypair held in process
[OUTPUT]: Base64 challenge signatures and signed XDR envelopes
[POS]:    Auth layer - local-key wallet implementation
[UPDATE]: When signature format or envelope signing changes
*/

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::auth::wallet::{SignTransactionOptions, WalletCapability, WalletRejection};
use crate::auth::StellarKeypair;
use crate::ledger::xdr::sign_envelope;

/// Wallet backed by a keypair in memory.
///
/// Stands in for a browser extension where none exists (CLI, services,
/// tests). Challenge signatures are plain ed25519 over the challenge bytes.
#[derive(Debug)]
pub struct LocalKeyWallet {
    keypair: StellarKeypair,
    locked: AtomicBool,
}

impl LocalKeyWallet {
    pub fn new(keypair: StellarKeypair) -> Self {
        Self {
            keypair,
            locked: AtomicBool::new(false),
        }
    }

    pub fn keypair(&self) -> &StellarKeypair {
        &self.keypair
    }

    /// Refuse public key access until [`unlock`](Self::unlock)
    pub fn lock(&self) {
        self.locked.store(true, Ordering::SeqCst);
    }

    pub fn unlock(&self) {
        self.locked.store(false, Ordering::SeqCst);
    }

    fn ensure_unlocked(&self) -> Result<(), WalletRejection> {
        if self.locked.load(Ordering::SeqCst) {
            Err(WalletRejection::Locked)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl WalletCapability for LocalKeyWallet {
    async fn is_connected(&self) -> Result<bool, WalletRejection> {
        Ok(true)
    }

    async fn get_public_key(&self) -> Result<String, WalletRejection> {
        self.ensure_unlocked()?;
        Ok(self.keypair.public_key().to_string())
    }

    async fn sign_message(&self, message: &str) -> Result<String, WalletRejection> {
        self.ensure_unlocked()?;
        let signature = self.keypair.sign(message.as_bytes());
        Ok(BASE64.encode(signature.to_bytes()))
    }

    async fn sign_transaction(
        &self,
        xdr: &str,
        opts: &SignTransactionOptions,
    ) -> Result<String, WalletRejection> {
        self.ensure_unlocked()?;
        sign_envelope(xdr, opts.network, &self.keypair)
            .map_err(|e| WalletRejection::Other(e.to_string()))
    }
}
