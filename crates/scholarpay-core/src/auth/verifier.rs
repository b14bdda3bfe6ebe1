/*
[INPUT]:  Signed challenges and previously issued session tokens
[OUTPUT]: Session tokens and token validity answers
[POS]:    Auth layer - remote signature verification seam
[UPDATE]: When the verification protocol or token check changes
*/

use async_trait::async_trait;
use tracing::debug;

use crate::http::{PlatformClient, Result, WalletError};
use crate::types::{PublicKey, SessionToken, VerifyRequest};

/// Exchanges a signed challenge for a session token.
///
/// Single use and expiry of challenges are enforced by the implementation,
/// not by callers.
#[async_trait]
pub trait SignatureVerifier: Send + Sync {
    async fn verify(
        &self,
        public_key: &PublicKey,
        challenge: &str,
        signature: &str,
    ) -> Result<SessionToken>;

    /// Whether a previously issued token is still accepted
    async fn verify_token(&self, token: &SessionToken) -> Result<bool>;
}

/// Verifier backed by the platform auth API
#[derive(Debug, Clone)]
pub struct HttpSignatureVerifier {
    client: PlatformClient,
}

impl HttpSignatureVerifier {
    pub fn new(client: PlatformClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SignatureVerifier for HttpSignatureVerifier {
    async fn verify(
        &self,
        public_key: &PublicKey,
        challenge: &str,
        signature: &str,
    ) -> Result<SessionToken> {
        let request = VerifyRequest {
            public_key: public_key.to_string(),
            challenge: challenge.to_string(),
            signature: signature.to_string(),
        };
        let response = self.client.post_verify(&request).await?;
        if response.token.is_empty() {
            return Err(WalletError::InvalidResponse(
                "verify response carried an empty token".to_string(),
            ));
        }
        debug!(public_key = %public_key, "challenge signature accepted");
        Ok(SessionToken::new(response.token))
    }

    async fn verify_token(&self, token: &SessionToken) -> Result<bool> {
        let status = self.client.get_token_status(token).await?;
        Ok(status.valid)
    }
}
