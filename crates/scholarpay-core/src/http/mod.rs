/*
[INPUT]:  HTTP client configuration and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - auth service and ledger communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod auth;
pub mod client;
pub mod error;
pub mod ledger;

pub use error::{ErrorKind, Result, WalletError};
pub use ledger::LedgerReply;

pub use client::{ClientConfig, PlatformClient, extract_detail};
