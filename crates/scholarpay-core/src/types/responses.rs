/*
[INPUT]:  JSON bodies returned by the auth service and ledger API
[OUTPUT]: Typed response schemas validated at the boundary
[POS]:    Data layer - type definitions for auth and ledger communication
[UPDATE]: When API schema changes or new types added
*/

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub challenge: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VerifyResponse {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenStatusResponse {
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountResponse {
    #[serde(default)]
    pub id: Option<String>,
    /// Current sequence number, sent as a string to survive JSON number limits
    pub sequence: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmitTransactionResponse {
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerErrorResponse {
    pub error_detail: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_response_optional_expiry() {
        let parsed: ChallengeResponse =
            serde_json::from_str(r#"{"challenge":"abc"}"#).unwrap();
        assert_eq!(parsed.challenge, "abc");
        assert!(parsed.expires_at.is_none());

        let parsed: ChallengeResponse = serde_json::from_str(
            r#"{"challenge":"abc","expiresAt":"2030-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(parsed.expires_at.is_some());
    }

    #[test]
    fn test_missing_fields_rejected() {
        assert!(serde_json::from_str::<VerifyResponse>(r#"{"jwt":"x"}"#).is_err());
        assert!(serde_json::from_str::<TokenStatusResponse>(r#"{"valid":"yes"}"#).is_err());
    }

    #[test]
    fn test_ledger_error_detail_any_shape() {
        let parsed: LedgerErrorResponse = serde_json::from_str(
            r#"{"errorDetail":{"result_codes":{"transaction":"tx_failed"}}}"#,
        )
        .unwrap();
        assert!(parsed.error_detail.is_object());
    }
}
