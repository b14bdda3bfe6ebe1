/*
[INPUT]:  Wallet host that may or may not carry a capability
[OUTPUT]: Validated public keys, signatures and signed transactions
[POS]:    Auth layer - capability detection and error conversion boundary
[UPDATE]: When the capability surface or rejection mapping changes
*/

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::auth::wallet::{SignTransactionOptions, WalletCapability, WalletHost, WalletRejection};
use crate::http::{Result, WalletError};
use crate::types::{Network, PublicKey, SignedTransaction};

/// Proof-of-key client over a host wallet capability.
///
/// Holds no state of its own. Every call looks the capability up again,
/// because an extension can be removed between two calls.
#[derive(Clone)]
pub struct KeyProofClient {
    host: Arc<dyn WalletHost>,
}

impl KeyProofClient {
    pub fn new(host: Arc<dyn WalletHost>) -> Self {
        Self { host }
    }

    /// Whether a wallet capability is present. Never fails.
    pub fn detect(&self) -> bool {
        self.host.capability().is_some()
    }

    pub async fn get_public_key(&self) -> Result<PublicKey> {
        let wallet = self.capability()?;
        let connected = wallet.is_connected().await.map_err(access_error)?;
        if !connected {
            return Err(WalletError::WalletUnavailable);
        }

        let raw = wallet.get_public_key().await.map_err(access_error)?;
        let public_key: PublicKey = raw.parse()?;
        debug!(public_key = %public_key, "wallet public key retrieved");
        Ok(public_key)
    }

    /// Sign a challenge; returns the wallet's base64 signature
    pub async fn sign_message(&self, challenge: &str) -> Result<String> {
        let wallet = self.capability()?;
        wallet
            .sign_message(challenge)
            .await
            .map_err(signing_error)
    }

    pub async fn sign_transaction(&self, xdr: &str, network: Network) -> Result<SignedTransaction> {
        let wallet = self.capability()?;
        let opts = SignTransactionOptions::for_network(network);
        let signed = wallet
            .sign_transaction(xdr, &opts)
            .await
            .map_err(signing_error)?;
        Ok(SignedTransaction::new(signed))
    }

    fn capability(&self) -> Result<Arc<dyn WalletCapability>> {
        self.host.capability().ok_or(WalletError::WalletUnavailable)
    }
}

impl fmt::Debug for KeyProofClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyProofClient")
            .field("detected", &self.detect())
            .finish()
    }
}

// Refusing access to the key means the wallet is locked for us.
fn access_error(rejection: WalletRejection) -> WalletError {
    match rejection {
        WalletRejection::Declined | WalletRejection::Locked => WalletError::WalletLocked,
        WalletRejection::Unavailable => WalletError::WalletUnavailable,
        WalletRejection::Other(detail) => WalletError::WalletFailure(detail),
    }
}

fn signing_error(rejection: WalletRejection) -> WalletError {
    match rejection {
        WalletRejection::Declined => WalletError::UserRejected,
        WalletRejection::Locked => WalletError::WalletLocked,
        WalletRejection::Unavailable => WalletError::WalletUnavailable,
        WalletRejection::Other(detail) => WalletError::WalletFailure(detail),
    }
}
