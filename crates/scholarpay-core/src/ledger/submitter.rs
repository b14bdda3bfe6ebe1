/*
[INPUT]:  Unsigned envelopes and a wallet signer
[OUTPUT]: Submission results (hash or classified failure)
[POS]:    Ledger layer - signing and submission
[UPDATE]: When failure classification or submission endpoint changes
*/

use std::time::Duration;

use tracing::{info, warn};

use crate::auth::KeyProofClient;
use crate::http::{LedgerReply, PlatformClient, Result, WalletError};
use crate::types::{SignedTransaction, SubmissionResult, UnsignedTransactionEnvelope};

/// Signs envelopes through the wallet and posts them to the ledger.
///
/// Never retries: a failed submission needs a rebuilt envelope with a fresh
/// sequence number, which is the caller's call.
#[derive(Debug, Clone)]
pub struct PaymentSubmitter {
    client: PlatformClient,
}

impl PaymentSubmitter {
    pub fn new(client: PlatformClient) -> Self {
        Self { client }
    }

    /// Sign `envelope` with `signer` and submit it
    pub async fn submit(
        &self,
        envelope: &UnsignedTransactionEnvelope,
        signer: &KeyProofClient,
    ) -> SubmissionResult {
        into_result(self.try_submit(envelope, signer).await)
    }

    /// Same as [`submit`](Self::submit) but returns the typed error
    pub async fn try_submit(
        &self,
        envelope: &UnsignedTransactionEnvelope,
        signer: &KeyProofClient,
    ) -> Result<String> {
        let signed = signer
            .sign_transaction(&envelope.xdr, envelope.network)
            .await
            .map_err(|e| match e {
                WalletError::UserRejected => WalletError::SigningRejected,
                other => other,
            })?;

        self.send(signed, Duration::from_secs(envelope.timeout_seconds))
            .await
    }

    /// Submit an already signed transaction, consuming it
    pub async fn submit_signed(&self, signed: SignedTransaction, timeout: Duration) -> SubmissionResult {
        into_result(self.send(signed, timeout).await)
    }

    async fn send(&self, signed: SignedTransaction, timeout: Duration) -> Result<String> {
        let xdr = signed.into_xdr();
        match self.client.post_transaction(&xdr, timeout).await? {
            LedgerReply::Accepted { hash } => {
                info!(hash = %hash, "transaction accepted by ledger");
                Ok(hash)
            }
            LedgerReply::Rejected { status, detail } => {
                warn!(status, detail = %detail, "transaction rejected by ledger");
                Err(WalletError::LedgerRejected { detail })
            }
        }
    }
}

fn into_result(outcome: Result<String>) -> SubmissionResult {
    match outcome {
        Ok(hash) => SubmissionResult::Success { hash },
        Err(err) => {
            warn!(kind = %err.kind(), error = %err, "payment submission failed");
            SubmissionResult::failure(&err)
        }
    }
}
