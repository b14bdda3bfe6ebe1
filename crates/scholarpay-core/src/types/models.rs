/*
[INPUT]:  Ledger addresses, tokens, challenges and payment parameters
[OUTPUT]: Validated domain types shared by the auth and ledger layers
[POS]:    Data layer - type definitions for auth and ledger communication
[UPDATE]: When the identity, challenge or payment model changes
*/

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stellar_strkey::ed25519::PublicKey as StrkeyPublicKey;

use super::enums::Network;
use crate::http::{ErrorKind, WalletError};
use crate::ledger::{BASE_FEE, DEFAULT_TIMEOUT_SECONDS};

/// Ledger account address (`G...` strkey) with its raw ed25519 bytes
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKey {
    address: String,
    bytes: [u8; 32],
}

impl PublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self {
            address: StrkeyPublicKey(bytes).to_string(),
            bytes,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.address
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

impl FromStr for PublicKey {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let key = StrkeyPublicKey::from_string(trimmed)
            .map_err(|_| WalletError::InvalidAddress(format!("'{trimmed}' is not an account address")))?;
        Ok(Self {
            address: trimmed.to_string(),
            bytes: key.0,
        })
    }
}

impl TryFrom<String> for PublicKey {
    type Error = WalletError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PublicKey> for String {
    fn from(value: PublicKey) -> Self {
        value.address
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.address).finish()
    }
}

/// Bearer token issued by the signature verifier
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AuthenticatedSession {
    public_key: PublicKey,
    session_token: SessionToken,
}

/// Who the current user is, as seen by the rest of the application.
///
/// A token is held exactly when the identity is authenticated; the two cannot
/// be set independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    network: Network,
    session: Option<AuthenticatedSession>,
}

impl Identity {
    pub fn unauthenticated(network: Network) -> Self {
        Self {
            network,
            session: None,
        }
    }

    pub fn authenticated(public_key: PublicKey, session_token: SessionToken, network: Network) -> Self {
        Self {
            network,
            session: Some(AuthenticatedSession {
                public_key,
                session_token,
            }),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn public_key(&self) -> Option<&PublicKey> {
        self.session.as_ref().map(|s| &s.public_key)
    }

    pub fn session_token(&self) -> Option<&SessionToken> {
        self.session.as_ref().map(|s| &s.session_token)
    }
}

/// One-time server challenge bound to a public key.
///
/// Deliberately not `Clone`: the authentication flow consumes it.
#[derive(Debug)]
pub struct Challenge {
    token: String,
    issued_to: PublicKey,
    expires_at: DateTime<Utc>,
}

impl Challenge {
    pub fn new(token: impl Into<String>, issued_to: PublicKey, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            issued_to,
            expires_at,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn issued_to(&self) -> &PublicKey {
        &self.issued_to
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Consume the challenge, yielding the token to hand to the verifier
    pub fn into_token(self) -> String {
        self.token
    }
}

/// Caller-constructed donation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    from_public_key: String,
    to_public_key: String,
    amount: String,
    memo: Option<String>,
    fee: u32,
    timeout_seconds: u64,
}

impl PaymentIntent {
    pub fn new(
        from_public_key: impl Into<String>,
        to_public_key: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            from_public_key: from_public_key.into(),
            to_public_key: to_public_key.into(),
            amount: amount.into(),
            memo: None,
            fee: BASE_FEE,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Zero falls back to the default; submissions are never unbounded
    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = if timeout_seconds == 0 {
            DEFAULT_TIMEOUT_SECONDS
        } else {
            timeout_seconds
        };
        self
    }

    pub fn from_public_key(&self) -> &str {
        &self.from_public_key
    }

    pub fn to_public_key(&self) -> &str {
        &self.to_public_key
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn memo(&self) -> Option<&str> {
        self.memo.as_deref()
    }

    pub fn fee(&self) -> u32 {
        self.fee
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

/// Built but not yet signed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransactionEnvelope {
    /// Base64 XDR `TransactionEnvelope` with no signatures
    pub xdr: String,
    pub network: Network,
    /// Hex transaction hash the wallet signs
    pub hash: String,
    pub sequence: i64,
    pub timeout_seconds: u64,
}

/// Signed wire envelope; consumed by submission
#[derive(Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    xdr_blob: String,
}

impl SignedTransaction {
    pub fn new(xdr_blob: impl Into<String>) -> Self {
        Self {
            xdr_blob: xdr_blob.into(),
        }
    }

    pub fn xdr_blob(&self) -> &str {
        &self.xdr_blob
    }

    pub fn into_xdr(self) -> String {
        self.xdr_blob
    }
}

/// Outcome of a submission, shaped for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    Success { hash: String },
    Failure { kind: ErrorKind, detail: String },
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionResult::Success { .. })
    }

    pub fn hash(&self) -> Option<&str> {
        match self {
            SubmissionResult::Success { hash } => Some(hash),
            SubmissionResult::Failure { .. } => None,
        }
    }

    pub fn failure(err: &WalletError) -> Self {
        SubmissionResult::Failure {
            kind: err.kind(),
            detail: err.detail().map(str::to_string).unwrap_or_else(|| err.to_string()),
        }
    }
}
