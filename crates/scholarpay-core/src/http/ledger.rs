/*
[INPUT]:  Account addresses and signed transaction envelopes
[OUTPUT]: Account sequence data and submission replies
[POS]:    HTTP layer - ledger endpoints
[UPDATE]: When ledger endpoints or reply shapes change
*/

use std::time::Duration;

use reqwest::Method;

use crate::http::{PlatformClient, Result, WalletError, extract_detail};
use crate::types::{
    AccountResponse, LedgerErrorResponse, PublicKey, SubmitTransactionRequest,
    SubmitTransactionResponse,
};

/// What the ledger said about a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerReply {
    Accepted { hash: String },
    Rejected { status: u16, detail: String },
}

impl PlatformClient {
    /// Load an account's current state
    ///
    /// GET /ledger/accounts/{publicKey}
    pub async fn get_account(&self, public_key: &PublicKey) -> Result<AccountResponse> {
        let endpoint = format!("/ledger/accounts/{public_key}");
        let builder = self.ledger_request(Method::GET, &endpoint)?;
        self.send_json(builder).await
    }

    /// Submit a signed envelope, bounded by `timeout`
    ///
    /// POST /ledger/transactions
    pub async fn post_transaction(&self, signed_xdr: &str, timeout: Duration) -> Result<LedgerReply> {
        let body = SubmitTransactionRequest {
            signed_xdr: signed_xdr.to_string(),
        };
        let builder = self
            .ledger_request(Method::POST, "/ledger/transactions")?
            .timeout(timeout)
            .json(&body);
        let (status, body) = self.send_raw(builder).await?;

        if status.is_success() {
            let accepted: SubmitTransactionResponse = serde_json::from_str(&body).map_err(|e| {
                WalletError::InvalidResponse(format!("unexpected submission body: {e}"))
            })?;
            if accepted.hash.is_empty() {
                return Err(WalletError::InvalidResponse(
                    "ledger accepted the transaction without a hash".to_string(),
                ));
            }
            return Ok(LedgerReply::Accepted {
                hash: accepted.hash,
            });
        }

        // Shown verbatim: the detail usually names the failing operation.
        let detail = match serde_json::from_str::<LedgerErrorResponse>(&body) {
            Ok(LedgerErrorResponse {
                error_detail: serde_json::Value::String(detail),
            }) => detail,
            Ok(LedgerErrorResponse { error_detail }) => error_detail.to_string(),
            Err(_) => extract_detail(status, &body),
        };

        Ok(LedgerReply::Rejected {
            status: status.as_u16(),
            detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::http::ClientConfig;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ADDRESS: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";

    async fn client_for(server: &MockServer) -> PlatformClient {
        PlatformClient::with_config_and_base_urls(
            ClientConfig::default(),
            &server.uri(),
            &server.uri(),
        )
        .expect("client init")
    }

    #[tokio::test]
    async fn test_get_account() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/ledger/accounts/{ADDRESS}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": ADDRESS,
                "sequence": "4294967296",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let key: PublicKey = ADDRESS.parse().unwrap();
        let account = client.get_account(&key).await.expect("account");
        assert_eq!(account.sequence, "4294967296");
    }

    #[tokio::test]
    async fn test_post_transaction_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ledger/transactions"))
            .and(body_json(serde_json::json!({"signedXDR": "AAAA"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"hash": "abc123"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let reply = client
            .post_transaction("AAAA", Duration::from_secs(5))
            .await
            .expect("reply");
        assert_eq!(
            reply,
            LedgerReply::Accepted {
                hash: "abc123".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_post_transaction_rejected_structured_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ledger/transactions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "errorDetail": {"result_codes": {"operations": ["op_underfunded"]}},
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let reply = client
            .post_transaction("AAAA", Duration::from_secs(5))
            .await
            .expect("reply");
        match reply {
            LedgerReply::Rejected { status, detail } => {
                assert_eq!(status, 400);
                assert!(detail.contains("op_underfunded"));
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }
}
