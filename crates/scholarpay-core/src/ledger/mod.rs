/*
[INPUT]:  Payment intents, account state and signed envelopes
[OUTPUT]: Unsigned payment envelopes and submission results
[POS]:    Ledger layer - payment transaction building and submission
[UPDATE]: When transaction shape or submission flow changes
*/

pub mod amount;
pub mod builder;
pub mod submitter;
pub mod xdr;

pub use amount::{format_stroops, parse_amount};
pub use builder::PaymentTransactionBuilder;
pub use submitter::PaymentSubmitter;

/// Fixed per-operation fee in stroops
pub const BASE_FEE: u32 = 100;

/// Submission window applied when the caller gives none
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 180;
