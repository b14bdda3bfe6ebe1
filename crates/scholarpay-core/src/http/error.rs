/*
[INPUT]:  Error sources (wallet capability, HTTP, ledger, storage, serialization)
[OUTPUT]: Structured error taxonomy with kinds, user messages and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the wallet auth and payment core
#[derive(Error, Debug)]
pub enum WalletError {
    /// Wallet capability is not present in the host environment
    #[error("Wallet extension is not available")]
    WalletUnavailable,

    /// Wallet refused access to the public key
    #[error("Wallet is locked or refused access")]
    WalletLocked,

    /// Holder declined a signing prompt
    #[error("Request was rejected in the wallet")]
    UserRejected,

    /// Wallet failed for a reason it did not classify
    #[error("Wallet error: {0}")]
    WalletFailure(String),

    /// Transport failure talking to the auth service or ledger
    #[error("Network error: {0}")]
    Network(String),

    /// Auth service returned a non-2xx response
    #[error("Server error (status {status}): {detail}")]
    Server { status: u16, detail: String },

    /// Source account could not be fetched from the ledger
    #[error("Could not load source account: {0}")]
    AccountLoad(String),

    /// Payment amount is non-positive or malformed
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Holder declined to sign a payment transaction
    #[error("Transaction signing was rejected")]
    SigningRejected,

    /// Ledger returned a structured rejection
    #[error("Ledger rejected the transaction: {detail}")]
    LedgerRejected { detail: String },

    /// Challenge lifetime elapsed before it could be signed
    #[error("Challenge expired at {expires_at}")]
    ChallengeExpired { expires_at: DateTime<Utc> },

    /// Signed out while authentication was in flight; its result was dropped
    #[error("Session changed during authentication")]
    SessionChanged,

    /// Ledger address could not be parsed
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Memo does not fit the ledger's text memo
    #[error("Invalid memo: {0}")]
    InvalidMemo(String),

    /// Response body did not match the expected schema
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Transaction envelope encoding failed
    #[error("XDR error: {0}")]
    Xdr(String),

    /// Durable storage failed
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Fieldless classification of [`WalletError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    WalletUnavailable,
    WalletLocked,
    UserRejected,
    WalletFailure,
    NetworkError,
    ServerError,
    AccountLoadError,
    InvalidAmount,
    SigningRejected,
    LedgerRejected,
    ChallengeExpired,
    SessionChanged,
    InvalidAddress,
    InvalidMemo,
    InvalidResponse,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::WalletUnavailable => "WalletUnavailable",
            ErrorKind::WalletLocked => "WalletLocked",
            ErrorKind::UserRejected => "UserRejected",
            ErrorKind::WalletFailure => "WalletFailure",
            ErrorKind::NetworkError => "NetworkError",
            ErrorKind::ServerError => "ServerError",
            ErrorKind::AccountLoadError => "AccountLoadError",
            ErrorKind::InvalidAmount => "InvalidAmount",
            ErrorKind::SigningRejected => "SigningRejected",
            ErrorKind::LedgerRejected => "LedgerRejected",
            ErrorKind::ChallengeExpired => "ChallengeExpired",
            ErrorKind::SessionChanged => "SessionChanged",
            ErrorKind::InvalidAddress => "InvalidAddress",
            ErrorKind::InvalidMemo => "InvalidMemo",
            ErrorKind::InvalidResponse => "InvalidResponse",
            ErrorKind::Internal => "Internal",
        }
    }

    /// Short human-readable message for display next to a failed action
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::WalletUnavailable => "No wallet extension was found. Install or enable it and try again.",
            ErrorKind::WalletLocked => "Your wallet is locked. Unlock it and allow access.",
            ErrorKind::UserRejected => "The request was declined in your wallet.",
            ErrorKind::WalletFailure => "Your wallet reported an error.",
            ErrorKind::NetworkError => "Could not reach the server. Check your connection.",
            ErrorKind::ServerError => "The server could not complete the request.",
            ErrorKind::AccountLoadError => "Your account could not be loaded from the ledger.",
            ErrorKind::InvalidAmount => "Enter a positive amount with at most 7 decimal places.",
            ErrorKind::SigningRejected => "The donation was not signed.",
            ErrorKind::LedgerRejected => "The ledger rejected the donation.",
            ErrorKind::ChallengeExpired => "The login challenge expired. Please try again.",
            ErrorKind::SessionChanged => "You were signed out while logging in. Please try again.",
            ErrorKind::InvalidAddress => "The address is not a valid account address.",
            ErrorKind::InvalidMemo => "The memo is too long.",
            ErrorKind::InvalidResponse => "The server sent an unexpected response.",
            ErrorKind::Internal => "Something went wrong.",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WalletError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::WalletUnavailable => ErrorKind::WalletUnavailable,
            WalletError::WalletLocked => ErrorKind::WalletLocked,
            WalletError::UserRejected => ErrorKind::UserRejected,
            WalletError::WalletFailure(_) => ErrorKind::WalletFailure,
            WalletError::Network(_) => ErrorKind::NetworkError,
            WalletError::Server { .. } => ErrorKind::ServerError,
            WalletError::AccountLoad(_) => ErrorKind::AccountLoadError,
            WalletError::InvalidAmount(_) => ErrorKind::InvalidAmount,
            WalletError::SigningRejected => ErrorKind::SigningRejected,
            WalletError::LedgerRejected { .. } => ErrorKind::LedgerRejected,
            WalletError::ChallengeExpired { .. } => ErrorKind::ChallengeExpired,
            WalletError::SessionChanged => ErrorKind::SessionChanged,
            WalletError::InvalidAddress(_) => ErrorKind::InvalidAddress,
            WalletError::InvalidMemo(_) => ErrorKind::InvalidMemo,
            WalletError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            WalletError::Xdr(_)
            | WalletError::Storage(_)
            | WalletError::Serialization(_)
            | WalletError::UrlParse(_)
            | WalletError::Config(_) => ErrorKind::Internal,
        }
    }

    /// Short human-readable message for display next to a failed action
    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }

    /// Server or ledger supplied detail, when there is one
    pub fn detail(&self) -> Option<&str> {
        match self {
            WalletError::Server { detail, .. } | WalletError::LedgerRejected { detail } => {
                Some(detail)
            }
            WalletError::AccountLoad(detail)
            | WalletError::InvalidAmount(detail)
            | WalletError::WalletFailure(detail) => Some(detail),
            _ => None,
        }
    }

    /// Check if a fresh attempt could succeed.
    ///
    /// Nothing in this crate retries on its own; the hint is for callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            WalletError::Network(_)
            | WalletError::AccountLoad(_)
            | WalletError::ChallengeExpired { .. }
            | WalletError::SessionChanged => true,
            WalletError::Server { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Check if the holder declined something in the wallet
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            WalletError::UserRejected | WalletError::SigningRejected
        )
    }

    /// Create a server error from status code and detail
    pub fn server_error(status: StatusCode, detail: impl Into<String>) -> Self {
        WalletError::Server {
            status: status.as_u16(),
            detail: detail.into(),
        }
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            WalletError::InvalidResponse(err.to_string())
        } else {
            WalletError::Network(err.to_string())
        }
    }
}

/// Result type alias for wallet operations
pub type Result<T> = std::result::Result<T, WalletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        let network_err = WalletError::Network("connection refused".to_string());
        assert!(network_err.is_retryable());

        let rejected = WalletError::LedgerRejected {
            detail: "op_underfunded".to_string(),
        };
        assert!(!rejected.is_retryable());

        assert!(WalletError::server_error(StatusCode::BAD_GATEWAY, "upstream").is_retryable());
        assert!(!WalletError::server_error(StatusCode::BAD_REQUEST, "bad").is_retryable());
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(WalletError::WalletUnavailable.kind(), ErrorKind::WalletUnavailable);
        assert_eq!(WalletError::SigningRejected.kind(), ErrorKind::SigningRejected);
        assert_eq!(
            WalletError::Config("x".to_string()).kind(),
            ErrorKind::Internal
        );
        assert_eq!(ErrorKind::AccountLoadError.to_string(), "AccountLoadError");
        assert_eq!(WalletError::SessionChanged.kind(), ErrorKind::SessionChanged);
    }

    #[test]
    fn test_detail_preserved() {
        let err = WalletError::LedgerRejected {
            detail: "tx_failed: op_underfunded".to_string(),
        };
        assert_eq!(err.detail(), Some("tx_failed: op_underfunded"));
        assert!(!err.user_message().is_empty());
        assert_eq!(WalletError::UserRejected.detail(), None);
    }

    #[test]
    fn test_kind_user_message_matches_error() {
        let err = WalletError::LedgerRejected {
            detail: "op_underfunded".to_string(),
        };
        assert_eq!(err.user_message(), ErrorKind::LedgerRejected.user_message());
        assert_eq!(
            ErrorKind::LedgerRejected.user_message(),
            "The ledger rejected the donation."
        );
    }

    #[test]
    fn test_rejection_kinds() {
        assert!(WalletError::UserRejected.is_rejection());
        assert!(WalletError::SigningRejected.is_rejection());
        assert!(!WalletError::WalletLocked.is_rejection());
    }
}
