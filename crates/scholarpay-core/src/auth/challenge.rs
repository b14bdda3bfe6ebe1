/*
[INPUT]:  Public key of the wallet that wants to sign in
[OUTPUT]: One-time challenges bound to that key
[POS]:    Auth layer - step one of the challenge/response flow
[UPDATE]: When challenge endpoint or lifetime rules change
*/

use chrono::{Duration, Utc};
use tracing::debug;

use crate::http::{PlatformClient, Result, WalletError};
use crate::types::{Challenge, PublicKey};

/// Lifetime assumed when the server does not send `expiresAt`
pub const DEFAULT_CHALLENGE_TTL_SECONDS: i64 = 5 * 60;

/// Requests challenges from the auth service
#[derive(Debug, Clone)]
pub struct ChallengeService {
    client: PlatformClient,
    ttl: Duration,
}

impl ChallengeService {
    pub fn new(client: PlatformClient) -> Self {
        Self {
            client,
            ttl: Duration::seconds(DEFAULT_CHALLENGE_TTL_SECONDS),
        }
    }

    /// Override the fallback lifetime
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Step 1: request a challenge
    ///
    /// POST /auth/challenge
    pub async fn request_challenge(&self, public_key: &PublicKey) -> Result<Challenge> {
        let response = self.client.post_challenge(public_key).await?;
        if response.challenge.is_empty() {
            return Err(WalletError::InvalidResponse(
                "challenge response carried an empty challenge".to_string(),
            ));
        }

        let expires_at = response.expires_at.unwrap_or_else(|| Utc::now() + self.ttl);
        debug!(public_key = %public_key, %expires_at, "challenge issued");
        Ok(Challenge::new(response.challenge, public_key.clone(), expires_at))
    }
}
