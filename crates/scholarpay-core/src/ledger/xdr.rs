/*
[INPUT]:  Ledger transactions, envelopes and a signing keypair
[OUTPUT]: Base64 XDR envelopes, transaction hashes and decorated signatures
[POS]:    Ledger layer - wire format encoding and signing
[UPDATE]: When envelope versions or hashing rules change
*/

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use sha2::{Digest, Sha256};
use stellar_xdr::curr::{
    DecoratedSignature, Limits, ReadXdr, Signature as XdrSignature, SignatureHint, Transaction,
    TransactionEnvelope, WriteXdr,
};

use crate::auth::StellarKeypair;
use crate::http::{Result, WalletError};
use crate::types::Network;

/// `ENVELOPE_TYPE_TX` discriminant, prefixed to the transaction in the hash preimage
const ENVELOPE_TYPE_TX: u32 = 2;

/// Hash = SHA256(network id || ENVELOPE_TYPE_TX || transaction XDR)
pub fn transaction_hash(tx: &Transaction, network: Network) -> Result<[u8; 32]> {
    let tx_xdr = tx
        .to_xdr(Limits::none())
        .map_err(|e| WalletError::Xdr(format!("failed to encode transaction: {e}")))?;

    let mut preimage = Vec::with_capacity(36 + tx_xdr.len());
    preimage.extend_from_slice(&network.network_id());
    preimage.extend_from_slice(&ENVELOPE_TYPE_TX.to_be_bytes());
    preimage.extend_from_slice(&tx_xdr);

    Ok(Sha256::digest(&preimage).into())
}

pub fn encode_envelope(envelope: &TransactionEnvelope) -> Result<String> {
    let bytes = envelope
        .to_xdr(Limits::none())
        .map_err(|e| WalletError::Xdr(format!("failed to encode envelope: {e}")))?;
    Ok(BASE64.encode(bytes))
}

pub fn decode_envelope(xdr: &str) -> Result<TransactionEnvelope> {
    let bytes = BASE64
        .decode(xdr.trim())
        .map_err(|e| WalletError::Xdr(format!("envelope is not base64: {e}")))?;
    TransactionEnvelope::from_xdr(bytes, Limits::none())
        .map_err(|e| WalletError::Xdr(format!("failed to decode envelope: {e}")))
}

/// Hash of the transaction inside a v1 envelope
pub fn envelope_hash(envelope: &TransactionEnvelope, network: Network) -> Result<[u8; 32]> {
    match envelope {
        TransactionEnvelope::Tx(v1) => transaction_hash(&v1.tx, network),
        _ => Err(WalletError::Xdr(
            "only v1 transaction envelopes are supported".to_string(),
        )),
    }
}

/// Append `keypair`'s signature to a base64 v1 envelope
pub fn sign_envelope(xdr: &str, network: Network, keypair: &StellarKeypair) -> Result<String> {
    let mut envelope = decode_envelope(xdr)?;
    let hash = envelope_hash(&envelope, network)?;

    let TransactionEnvelope::Tx(v1) = &mut envelope else {
        return Err(WalletError::Xdr(
            "only v1 transaction envelopes are supported".to_string(),
        ));
    };

    let signature = keypair.sign(&hash);
    let decorated = DecoratedSignature {
        hint: SignatureHint(keypair.signature_hint()),
        signature: XdrSignature(
            signature
                .to_bytes()
                .to_vec()
                .try_into()
                .map_err(|_| WalletError::Xdr("invalid signature length".to_string()))?,
        ),
    };

    let mut signatures = v1.signatures.to_vec();
    signatures.push(decorated);
    v1.signatures = signatures
        .try_into()
        .map_err(|_| WalletError::Xdr("too many signatures on envelope".to_string()))?;

    encode_envelope(&envelope)
}
