/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public ScholarPay wallet auth and payment crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod http;
pub mod ledger;
pub mod types;

// Re-export commonly used types from auth
pub use auth::{
    ChallengeService,
    FileSessionStore,
    HttpSignatureVerifier,
    KeyProofClient,
    LocalKeyWallet,
    MemorySessionStore,
    MockWallet,
    SessionManager,
    SessionStore,
    SignatureVerifier,
    StellarKeypair,
    WalletCapability,
    WalletHost,
    WalletSlot,
};

// Re-export commonly used types from http
pub use http::{
    ClientConfig,
    ErrorKind,
    PlatformClient,
    Result,
    WalletError,
};

// Re-export commonly used types from ledger
pub use ledger::{
    BASE_FEE,
    DEFAULT_TIMEOUT_SECONDS,
    PaymentSubmitter,
    PaymentTransactionBuilder,
};

// Re-export all types
pub use types::*;
