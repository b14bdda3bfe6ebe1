/*
[INPUT]:  Payment intents and the source account's ledger state
[OUTPUT]: Unsigned single-payment transaction envelopes
[POS]:    Ledger layer - payment transaction construction
[UPDATE]: When transaction preconditions, fees or memo handling change
*/

use chrono::Utc;
use stellar_xdr::curr::{
    Asset, Memo, MuxedAccount, Operation, OperationBody, PaymentOp, Preconditions,
    SequenceNumber, StringM, TimeBounds, TimePoint, Transaction, TransactionEnvelope,
    TransactionExt, TransactionV1Envelope, Uint256, VecM,
};
use tracing::{debug, info};

use crate::http::{PlatformClient, Result, WalletError};
use crate::ledger::amount::parse_amount;
use crate::ledger::xdr::{encode_envelope, transaction_hash};
use crate::types::{Network, PaymentIntent, PublicKey, UnsignedTransactionEnvelope};

/// Longest text memo the ledger accepts, in bytes
pub const MAX_MEMO_BYTES: usize = 28;

/// Builds native-asset payment transactions against the ledger API
#[derive(Debug, Clone)]
pub struct PaymentTransactionBuilder {
    client: PlatformClient,
    network: Network,
}

impl PaymentTransactionBuilder {
    pub fn new(client: PlatformClient, network: Network) -> Self {
        Self { client, network }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Build an unsigned envelope for `intent`.
    ///
    /// Input is validated before the ledger is contacted, so a bad amount
    /// never costs a network round trip. The envelope carries exactly one
    /// native payment and a finite time bound.
    pub async fn build(&self, intent: &PaymentIntent) -> Result<UnsignedTransactionEnvelope> {
        let amount = parse_amount(intent.amount())?;
        let source: PublicKey = intent.from_public_key().parse()?;
        let destination: PublicKey = intent.to_public_key().parse()?;
        let memo = text_memo(intent.memo())?;

        let sequence = self.next_sequence(&source).await?;
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        let max_time = now.saturating_add(intent.timeout_seconds());

        let tx = payment_transaction(
            &source,
            &destination,
            amount,
            intent.fee(),
            sequence,
            memo,
            max_time,
        )?;
        let hash = transaction_hash(&tx, self.network)?;
        let envelope = TransactionEnvelope::Tx(TransactionV1Envelope {
            tx,
            signatures: VecM::default(),
        });
        let xdr = encode_envelope(&envelope)?;
        let hash = hex::encode(hash);

        info!(
            from = %source,
            to = %destination,
            amount_stroops = amount,
            sequence,
            hash = %hash,
            network = %self.network,
            "built payment transaction"
        );

        Ok(UnsignedTransactionEnvelope {
            xdr,
            network: self.network,
            hash,
            sequence,
            timeout_seconds: intent.timeout_seconds(),
        })
    }

    /// Current account sequence + 1; any failure is an account load error
    async fn next_sequence(&self, source: &PublicKey) -> Result<i64> {
        let account = self.client.get_account(source).await.map_err(|e| match e {
            WalletError::Server { status: 404, .. } => WalletError::AccountLoad(format!(
                "account {source} does not exist on the ledger; it may be unfunded"
            )),
            other => WalletError::AccountLoad(other.to_string()),
        })?;

        let current: i64 = account.sequence.trim().parse().map_err(|_| {
            WalletError::AccountLoad(format!("invalid sequence number '{}'", account.sequence))
        })?;
        debug!(account = %source, current, "loaded account sequence");

        current
            .checked_add(1)
            .ok_or_else(|| WalletError::AccountLoad("sequence number overflow".to_string()))
    }
}

fn text_memo(memo: Option<&str>) -> Result<Memo> {
    let Some(text) = memo.filter(|m| !m.is_empty()) else {
        return Ok(Memo::None);
    };
    if text.len() > MAX_MEMO_BYTES {
        return Err(WalletError::InvalidMemo(format!(
            "memo is {} bytes; at most {MAX_MEMO_BYTES} are allowed",
            text.len()
        )));
    }
    let text = StringM::<28>::try_from(text.as_bytes().to_vec())
        .map_err(|e| WalletError::InvalidMemo(e.to_string()))?;
    Ok(Memo::Text(text))
}

fn payment_transaction(
    source: &PublicKey,
    destination: &PublicKey,
    amount: i64,
    fee: u32,
    sequence: i64,
    memo: Memo,
    max_time: u64,
) -> Result<Transaction> {
    let payment = Operation {
        source_account: None,
        body: OperationBody::Payment(PaymentOp {
            destination: MuxedAccount::Ed25519(Uint256(*destination.as_bytes())),
            asset: Asset::Native,
            amount,
        }),
    };

    let operations: VecM<Operation, 100> = vec![payment]
        .try_into()
        .map_err(|_| WalletError::Xdr("failed to create operations vector".to_string()))?;

    Ok(Transaction {
        source_account: MuxedAccount::Ed25519(Uint256(*source.as_bytes())),
        fee,
        seq_num: SequenceNumber(sequence),
        cond: Preconditions::Time(TimeBounds {
            min_time: TimePoint(0),
            max_time: TimePoint(max_time),
        }),
        memo,
        operations,
        ext: TransactionExt::V0,
    })
}
