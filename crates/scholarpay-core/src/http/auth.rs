/*
[INPUT]:  Public keys, signed challenges and bearer tokens
[OUTPUT]: Challenge, session token and token status responses
[POS]:    HTTP layer - auth service endpoints
[UPDATE]: When auth endpoints or request shapes change
*/

use reqwest::{Method, StatusCode};

use crate::http::{PlatformClient, Result, WalletError, extract_detail};
use crate::types::{
    ChallengeRequest, ChallengeResponse, PublicKey, SessionToken, TokenStatusResponse,
    VerifyRequest, VerifyResponse,
};

impl PlatformClient {
    /// Request a one-time challenge for a public key
    ///
    /// POST /auth/challenge
    pub async fn post_challenge(&self, public_key: &PublicKey) -> Result<ChallengeResponse> {
        let body = ChallengeRequest {
            public_key: public_key.to_string(),
        };
        let builder = self.api_request(Method::POST, "/auth/challenge")?.json(&body);
        self.send_json(builder).await
    }

    /// Exchange a signed challenge for a session token
    ///
    /// POST /auth/verify
    pub async fn post_verify(&self, request: &VerifyRequest) -> Result<VerifyResponse> {
        let builder = self.api_request(Method::POST, "/auth/verify")?.json(request);
        self.send_json(builder).await
    }

    /// Check whether a session token is still accepted
    ///
    /// GET /auth/verify-token
    /// 401 and 403 are answers ("not valid"), not failures.
    pub async fn get_token_status(&self, token: &SessionToken) -> Result<TokenStatusResponse> {
        let builder = self
            .api_request(Method::GET, "/auth/verify-token")?
            .bearer_auth(token.as_str());
        let (status, body) = self.send_raw(builder).await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(TokenStatusResponse { valid: false });
        }
        if !status.is_success() {
            return Err(WalletError::server_error(status, extract_detail(status, &body)));
        }

        serde_json::from_str(&body)
            .map_err(|e| WalletError::InvalidResponse(format!("unexpected token status body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use crate::http::{ClientConfig, PlatformClient};
    use crate::types::SessionToken;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> PlatformClient {
        PlatformClient::with_config_and_base_urls(
            ClientConfig::default(),
            &server.uri(),
            &server.uri(),
        )
        .expect("client init")
    }

    #[tokio::test]
    async fn test_token_status_sends_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/verify-token"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"valid": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let status = client
            .get_token_status(&SessionToken::new("tok-1"))
            .await
            .expect("token status");
        assert!(status.valid);
    }

    #[tokio::test]
    async fn test_token_status_unauthorized_means_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/verify-token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let status = client
            .get_token_status(&SessionToken::new("expired"))
            .await
            .expect("token status");
        assert!(!status.valid);
    }
}
