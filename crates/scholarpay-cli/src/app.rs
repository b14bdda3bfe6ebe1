/*
[INPUT]:  CLI configuration and parsed subcommands
[OUTPUT]: Sessions, donations and status reports
[POS]:    Application layer - wires the core components for the CLI
[UPDATE]: When adding subcommands or changing startup wiring
*/

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use scholarpay_core::{
    ErrorKind, FileSessionStore, Identity, KeyProofClient, LocalKeyWallet, PaymentIntent, PaymentSubmitter,
    PaymentTransactionBuilder, PlatformClient, PublicKey, SessionManager, SubmissionResult,
    WalletSlot,
};
use tracing::{info, warn};

use crate::config::CliConfig;
use crate::keyfile::KeyFile;

/// Everything a subcommand needs
#[derive(Debug)]
pub struct App {
    config: CliConfig,
    key_file: KeyFile,
    slot: WalletSlot,
    key_proof: KeyProofClient,
    sessions: SessionManager,
    builder: PaymentTransactionBuilder,
    submitter: PaymentSubmitter,
}

impl App {
    pub fn new(config: CliConfig) -> Result<Self> {
        let client = PlatformClient::with_config_and_base_urls(
            config.client_config(),
            &config.api_base_url,
            &config.ledger_base_url,
        )
        .context("create platform client")?;

        let key_file = KeyFile::new(config.key_path());
        let slot = WalletSlot::new();
        if let Some(keypair) = key_file.load()? {
            slot.install(Arc::new(LocalKeyWallet::new(keypair)));
        }

        let key_proof = KeyProofClient::new(Arc::new(slot.clone()));
        let store = Arc::new(FileSessionStore::new(config.session_path()));
        let sessions =
            SessionManager::with_client(client.clone(), key_proof.clone(), store, config.network);

        Ok(Self {
            builder: PaymentTransactionBuilder::new(client.clone(), config.network),
            submitter: PaymentSubmitter::new(client),
            config,
            key_file,
            slot,
            key_proof,
            sessions,
        })
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Create the local wallet key
    pub fn keygen(&self, force: bool) -> Result<PublicKey> {
        let keypair = self.key_file.create(force)?;
        let public_key = keypair.public_key();
        self.slot.install(Arc::new(LocalKeyWallet::new(keypair)));
        info!(public_key = %public_key, path = %self.key_file.path().display(), "wallet key created");
        Ok(public_key)
    }

    /// Sign in through challenge/response with the local wallet
    pub async fn login(&self) -> Result<Identity> {
        if !self.key_proof.detect() {
            return Err(anyhow!("no wallet key found; run `scholarpay keygen` first"));
        }
        let identity = self
            .sessions
            .authenticate()
            .await
            .map_err(|e| anyhow!("{} ({e})", e.user_message()))?;
        Ok(identity)
    }

    /// Restore the stored session and wait for the token check
    pub async fn status(&self) -> Result<Identity> {
        if let Some(check) = self.sessions.restore_session().await {
            check.await.context("token verification task")?;
        }
        Ok(self.sessions.identity())
    }

    pub fn logout(&self) {
        self.sessions.logout();
    }

    /// Donate `amount` from the signed-in account to `to`
    pub async fn donate(
        &self,
        to: &str,
        amount: &str,
        memo: Option<&str>,
        timeout_seconds: Option<u64>,
    ) -> Result<SubmissionResult> {
        let identity = self.status().await?;
        let from = identity
            .public_key()
            .ok_or_else(|| anyhow!("not logged in; run `scholarpay login` first"))?;

        let mut intent = PaymentIntent::new(from.as_str(), to, amount).with_timeout_seconds(
            timeout_seconds.unwrap_or(self.config.transaction_timeout_secs),
        );
        if let Some(memo) = memo {
            intent = intent.with_memo(memo);
        }

        let envelope = self
            .builder
            .build(&intent)
            .await
            .map_err(|e| anyhow!("{} ({e})", e.user_message()))?;
        info!(hash = %envelope.hash, sequence = envelope.sequence, "submitting donation");

        let result = self.submitter.submit(&envelope, &self.key_proof).await;
        if let SubmissionResult::Failure { kind, detail } = &result {
            warn!(%kind, %detail, "donation failed");
        }
        Ok(result)
    }
}

/// Line shown for a failed donation: the user message first, then the raw
/// kind and detail
pub fn describe_failure(kind: ErrorKind, detail: &str) -> String {
    format!("{} ({kind}: {detail})", kind.user_message())
}
