/*
[INPUT]:  Public keys, challenge tokens, signatures and signed envelopes
[OUTPUT]: Typed request bodies for the auth and ledger endpoints
[POS]:    Data layer - type definitions for auth and ledger communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub public_key: String,
    pub challenge: String,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitTransactionRequest {
    #[serde(rename = "signedXDR")]
    pub signed_xdr: String,
}
