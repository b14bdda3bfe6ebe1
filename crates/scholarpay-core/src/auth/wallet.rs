/*
[INPUT]:  Host-injected wallet capability (extension, local key, test double)
[OUTPUT]: Raw public keys, message signatures and signed envelopes
[POS]:    Auth layer - wallet integration abstraction
[UPDATE]: When adding new wallet types or changing the capability surface
*/

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use thiserror::Error;

use crate::types::Network;

/// Raw failure reported by a wallet capability.
///
/// Never leaves the auth layer; [`KeyProofClient`](super::KeyProofClient)
/// converts it into the crate's error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletRejection {
    #[error("declined by the holder")]
    Declined,
    #[error("wallet is locked")]
    Locked,
    #[error("wallet is unavailable")]
    Unavailable,
    #[error("{0}")]
    Other(String),
}

/// Options passed along with a transaction to sign
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignTransactionOptions {
    pub network: Network,
    pub network_passphrase: &'static str,
}

impl SignTransactionOptions {
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            network_passphrase: network.passphrase(),
        }
    }
}

/// Wallet capability surface as injected by the host.
///
/// The trait is async because every call may wait on the holder.
#[async_trait]
pub trait WalletCapability: Send + Sync {
    async fn is_connected(&self) -> Result<bool, WalletRejection>;

    /// Account address (`G...`) of the active wallet account
    async fn get_public_key(&self) -> Result<String, WalletRejection>;

    /// Sign a challenge and return a base64 signature
    async fn sign_message(&self, message: &str) -> Result<String, WalletRejection>;

    /// Sign a base64 XDR envelope and return the signed envelope
    async fn sign_transaction(
        &self,
        xdr: &str,
        opts: &SignTransactionOptions,
    ) -> Result<String, WalletRejection>;
}

/// Where the wallet capability is looked up; it may be absent at any call
pub trait WalletHost: Send + Sync {
    fn capability(&self) -> Option<Arc<dyn WalletCapability>>;
}

/// Host whose capability can be installed and removed at runtime
#[derive(Clone, Default)]
pub struct WalletSlot {
    inner: Arc<RwLock<Option<Arc<dyn WalletCapability>>>>,
}

impl WalletSlot {
    /// Empty slot: no wallet installed
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wallet(wallet: Arc<dyn WalletCapability>) -> Self {
        let slot = Self::new();
        slot.install(wallet);
        slot
    }

    pub fn install(&self, wallet: Arc<dyn WalletCapability>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(wallet);
    }

    pub fn remove(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl WalletHost for WalletSlot {
    fn capability(&self) -> Option<Arc<dyn WalletCapability>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl fmt::Debug for WalletSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSlot")
            .field("installed", &self.capability().is_some())
            .finish()
    }
}

/// Mock wallet for testing
#[derive(Debug, Clone)]
pub struct MockWallet {
    public_key: String,
    signature: String,
    signed_xdr: Option<String>,
    connected: bool,
    locked: bool,
    reject_messages: bool,
    reject_transactions: bool,
    message_signs: Arc<AtomicUsize>,
    transaction_signs: Arc<AtomicUsize>,
}

impl MockWallet {
    /// Create a new mock wallet with a predetermined signature
    pub fn new(public_key: &str, signature: &str) -> Self {
        Self {
            public_key: public_key.to_string(),
            signature: signature.to_string(),
            signed_xdr: None,
            connected: true,
            locked: false,
            reject_messages: false,
            reject_transactions: false,
            message_signs: Arc::new(AtomicUsize::new(0)),
            transaction_signs: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Return this envelope from `sign_transaction` instead of echoing the input
    pub fn with_signed_xdr(mut self, xdr: &str) -> Self {
        self.signed_xdr = Some(xdr.to_string());
        self
    }

    pub fn disconnected(mut self) -> Self {
        self.connected = false;
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn rejecting_messages(mut self) -> Self {
        self.reject_messages = true;
        self
    }

    pub fn rejecting_transactions(mut self) -> Self {
        self.reject_transactions = true;
        self
    }

    pub fn message_sign_count(&self) -> usize {
        self.message_signs.load(Ordering::SeqCst)
    }

    pub fn transaction_sign_count(&self) -> usize {
        self.transaction_signs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletCapability for MockWallet {
    async fn is_connected(&self) -> Result<bool, WalletRejection> {
        Ok(self.connected)
    }

    async fn get_public_key(&self) -> Result<String, WalletRejection> {
        if self.locked {
            return Err(WalletRejection::Locked);
        }
        Ok(self.public_key.clone())
    }

    async fn sign_message(&self, _message: &str) -> Result<String, WalletRejection> {
        self.message_signs.fetch_add(1, Ordering::SeqCst);
        if self.reject_messages {
            return Err(WalletRejection::Declined);
        }
        Ok(self.signature.clone())
    }

    async fn sign_transaction(
        &self,
        xdr: &str,
        _opts: &SignTransactionOptions,
    ) -> Result<String, WalletRejection> {
        self.transaction_signs.fetch_add(1, Ordering::SeqCst);
        if self.reject_transactions {
            return Err(WalletRejection::Declined);
        }
        Ok(self.signed_xdr.clone().unwrap_or_else(|| xdr.to_string()))
    }
}
