/*
[INPUT]:  Wallet key proofs, challenges, verifier answers and durable storage
[OUTPUT]: Current identity with change notifications
[POS]:    Auth layer - orchestrates login, restore, verification and logout
[UPDATE]: When session lifecycle or storage keys change
*/

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::store::{AUTH_TOKEN_KEY, PUBLIC_KEY_KEY};
use super::{ChallengeService, HttpSignatureVerifier, KeyProofClient, SessionStore, SignatureVerifier};
use crate::http::{PlatformClient, Result, WalletError};
use crate::types::{Challenge, Identity, Network, PublicKey, SessionToken};

#[derive(Debug)]
struct SessionState {
    identity: Identity,
    /// Bumped on every transition; background work started under an older
    /// epoch must not touch the state
    epoch: u64,
    /// Bumped on every move to unauthenticated; an `authenticate` started
    /// before a sign-out must not complete
    signouts: u64,
}

struct Inner {
    key_proof: KeyProofClient,
    challenges: ChallengeService,
    verifier: Arc<dyn SignatureVerifier>,
    store: Arc<dyn SessionStore>,
    network: Network,
    state: RwLock<SessionState>,
    notifier: watch::Sender<Identity>,
}

/// Owns the session lifecycle.
///
/// UNAUTHENTICATED moves to AUTHENTICATED through `authenticate`, `login` or
/// `restore_session`, and back through `logout` or a failed token check.
/// Storage holds both session keys or neither after every transition.
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    pub fn new(
        key_proof: KeyProofClient,
        challenges: ChallengeService,
        verifier: Arc<dyn SignatureVerifier>,
        store: Arc<dyn SessionStore>,
        network: Network,
    ) -> Self {
        let identity = Identity::unauthenticated(network);
        let (notifier, _) = watch::channel(identity.clone());
        Self {
            inner: Arc::new(Inner {
                key_proof,
                challenges,
                verifier,
                store,
                network,
                state: RwLock::new(SessionState {
                    identity,
                    epoch: 0,
                    signouts: 0,
                }),
                notifier,
            }),
        }
    }

    /// Manager talking to the platform auth API through `client`
    pub fn with_client(
        client: PlatformClient,
        key_proof: KeyProofClient,
        store: Arc<dyn SessionStore>,
        network: Network,
    ) -> Self {
        Self::new(
            key_proof,
            ChallengeService::new(client.clone()),
            Arc::new(HttpSignatureVerifier::new(client)),
            store,
            network,
        )
    }

    pub fn network(&self) -> Network {
        self.inner.network
    }

    pub fn key_proof(&self) -> &KeyProofClient {
        &self.inner.key_proof
    }

    /// Snapshot of the current identity
    pub fn identity(&self) -> Identity {
        self.read_state().identity.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_state().identity.is_authenticated()
    }

    /// Receive the identity after every transition
    pub fn subscribe(&self) -> watch::Receiver<Identity> {
        self.inner.notifier.subscribe()
    }

    /// Enter the authenticated state with an already issued token.
    ///
    /// Replaces any previous identity. If persisting fails, storage is
    /// cleared and the state ends unauthenticated.
    pub fn login(&self, public_key: PublicKey, network: Network, token: SessionToken) -> Result<()> {
        let mut state = self.write_state();
        self.establish(&mut state, public_key, network, token)
    }

    /// Complete challenge/response flow
    ///
    /// 1. Read the wallet's public key
    /// 2. Request a challenge for it
    /// 3. Sign the challenge in the wallet
    /// 4. Exchange the signature for a session token
    /// 5. Store the session
    ///
    /// Failures before step 5 leave the previous state untouched. If the
    /// session is signed out while the flow is in flight, the result is
    /// dropped with [`WalletError::SessionChanged`]. Two overlapping calls
    /// without a sign-out in between: the last to finish wins.
    pub async fn authenticate(&self) -> Result<Identity> {
        let inner = &self.inner;
        let signouts = self.read_state().signouts;

        // Step 1: Public key
        let public_key = inner.key_proof.get_public_key().await?;

        // Step 2: Challenge
        let challenge = inner.challenges.request_challenge(&public_key).await?;
        ensure_fresh(&challenge)?;

        // Step 3: Sign
        let signature = inner.key_proof.sign_message(challenge.token()).await?;
        ensure_fresh(&challenge)?;

        // Step 4: Verify
        let token = inner
            .verifier
            .verify(&public_key, &challenge.into_token(), &signature)
            .await?;

        // Step 5: Store
        let mut state = self.write_state();
        if state.signouts != signouts {
            debug!(public_key = %public_key, "signed out during authentication, dropping result");
            return Err(WalletError::SessionChanged);
        }
        self.establish(&mut state, public_key, inner.network, token)?;
        Ok(state.identity.clone())
    }

    /// Restore a stored session.
    ///
    /// With both keys present the state becomes authenticated at once and the
    /// token is checked in the background; the returned handle resolves when
    /// that check is done. A lone key is treated as corrupt and cleared.
    pub async fn restore_session(&self) -> Option<JoinHandle<()>> {
        let stored = self
            .inner
            .store
            .get(AUTH_TOKEN_KEY)
            .and_then(|token| Ok((token, self.inner.store.get(PUBLIC_KEY_KEY)?)));

        let (token, address) = match stored {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "failed to read stored session");
                self.reset();
                return None;
            }
        };

        let (token, public_key) = match (token, address) {
            (None, None) => {
                debug!("no stored session");
                return None;
            }
            (Some(token), Some(address)) if !token.is_empty() => match address.parse::<PublicKey>() {
                Ok(public_key) => (SessionToken::new(token), public_key),
                Err(e) => {
                    warn!(error = %e, "stored public key is invalid, clearing session");
                    self.reset();
                    return None;
                }
            },
            _ => {
                warn!("partial session in storage, clearing");
                self.reset();
                return None;
            }
        };

        let epoch = {
            let mut state = self.write_state();
            let identity = Identity::authenticated(public_key, token.clone(), self.inner.network);
            self.transition(&mut state, identity)
        };
        info!("session restored, verifying token in background");

        let manager = self.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = manager.check_token(&token, epoch).await {
                warn!(error = %e, "background token verification failed, keeping session");
            }
        }))
    }

    /// Check the current token remotely.
    ///
    /// An invalid answer ends the session. Transport and server failures are
    /// returned as errors and keep the session.
    pub async fn verify_token(&self) -> Result<bool> {
        let (token, epoch) = {
            let state = self.read_state();
            match state.identity.session_token() {
                Some(token) => (token.clone(), state.epoch),
                None => return Ok(false),
            }
        };
        self.check_token(&token, epoch).await
    }

    /// Drop the session. Never fails; storage errors are logged.
    pub fn logout(&self) {
        self.reset();
        info!("logged out");
    }

    fn establish(
        &self,
        state: &mut SessionState,
        public_key: PublicKey,
        network: Network,
        token: SessionToken,
    ) -> Result<()> {
        if let Err(e) = self.persist(&public_key, &token) {
            warn!(error = %e, "failed to persist session, clearing storage");
            self.clear_storage();
            self.transition(state, Identity::unauthenticated(network));
            return Err(e);
        }

        info!(public_key = %public_key, network = %network, "session established");
        self.transition(state, Identity::authenticated(public_key, token, network));
        Ok(())
    }

    async fn check_token(&self, token: &SessionToken, epoch: u64) -> Result<bool> {
        let valid = self.inner.verifier.verify_token(token).await?;
        if !valid {
            let mut state = self.write_state();
            if state.epoch != epoch {
                debug!(epoch, current = state.epoch, "discarding stale token verification");
                return Ok(false);
            }
            warn!("session token rejected, clearing session");
            self.clear_storage();
            self.transition(&mut state, Identity::unauthenticated(self.inner.network));
        }
        Ok(valid)
    }

    fn reset(&self) {
        let mut state = self.write_state();
        self.clear_storage();
        self.transition(&mut state, Identity::unauthenticated(self.inner.network));
    }

    fn persist(&self, public_key: &PublicKey, token: &SessionToken) -> Result<()> {
        self.inner.store.set(AUTH_TOKEN_KEY, token.as_str())?;
        self.inner.store.set(PUBLIC_KEY_KEY, public_key.as_str())
    }

    fn clear_storage(&self) {
        for key in [AUTH_TOKEN_KEY, PUBLIC_KEY_KEY] {
            if let Err(e) = self.inner.store.remove(key) {
                warn!(key, error = %e, "failed to clear session storage");
            }
        }
    }

    fn transition(&self, state: &mut SessionState, identity: Identity) -> u64 {
        state.epoch += 1;
        if !identity.is_authenticated() {
            state.signouts += 1;
        }
        state.identity = identity.clone();
        self.inner.notifier.send_replace(identity);
        state.epoch
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read_state();
        f.debug_struct("SessionManager")
            .field("network", &self.inner.network)
            .field("identity", &state.identity)
            .field("epoch", &state.epoch)
            .finish_non_exhaustive()
    }
}

fn ensure_fresh(challenge: &Challenge) -> Result<()> {
    if challenge.is_expired() {
        return Err(WalletError::ChallengeExpired {
            expires_at: challenge.expires_at(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::auth::{MemorySessionStore, MockWallet, WalletSlot};
    use crate::http::{ClientConfig, ErrorKind};

    const ADDRESS: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";

    struct FixedVerifier {
        valid: bool,
        checks: AtomicUsize,
    }

    #[async_trait]
    impl SignatureVerifier for FixedVerifier {
        async fn verify(&self, _: &PublicKey, _: &str, _: &str) -> Result<SessionToken> {
            Ok(SessionToken::new("fixed"))
        }

        async fn verify_token(&self, _: &SessionToken) -> Result<bool> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            Ok(self.valid)
        }
    }

    struct FailingStore;

    impl SessionStore for FailingStore {
        fn get(&self, _: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, _: &str, _: &str) -> Result<()> {
            Err(std::io::Error::other("disk full").into())
        }

        fn remove(&self, _: &str) -> Result<()> {
            Ok(())
        }
    }

    fn manager(valid: bool, store: Arc<dyn SessionStore>) -> SessionManager {
        let client = PlatformClient::with_config_and_base_urls(
            ClientConfig::default(),
            "http://127.0.0.1:9",
            "http://127.0.0.1:9",
        )
        .expect("client init");
        let slot = WalletSlot::with_wallet(Arc::new(MockWallet::new(ADDRESS, "sig")));
        SessionManager::new(
            KeyProofClient::new(Arc::new(slot)),
            ChallengeService::new(client),
            Arc::new(FixedVerifier {
                valid,
                checks: AtomicUsize::new(0),
            }),
            store,
            Network::Testnet,
        )
    }

    #[tokio::test]
    async fn test_login_persists_both_keys() {
        let store = Arc::new(MemorySessionStore::new());
        let manager = manager(true, store.clone());
        let mut rx = manager.subscribe();

        let key: PublicKey = ADDRESS.parse().unwrap();
        manager
            .login(key.clone(), Network::Testnet, SessionToken::new("tok"))
            .unwrap();

        assert!(manager.is_authenticated());
        assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("tok"));
        assert_eq!(store.get(PUBLIC_KEY_KEY).unwrap().as_deref(), Some(ADDRESS));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().public_key(), Some(&key));
    }

    #[tokio::test]
    async fn test_login_storage_failure_ends_unauthenticated() {
        let manager = manager(true, Arc::new(FailingStore));
        let key: PublicKey = ADDRESS.parse().unwrap();

        let err = manager
            .login(key, Network::Testnet, SessionToken::new("tok"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(!manager.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let store = Arc::new(MemorySessionStore::new());
        let manager = manager(true, store.clone());
        let key: PublicKey = ADDRESS.parse().unwrap();
        manager
            .login(key, Network::Testnet, SessionToken::new("tok"))
            .unwrap();

        manager.logout();
        assert!(!manager.is_authenticated());
        assert!(manager.identity().session_token().is_none());
        assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get(PUBLIC_KEY_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_invalid_token_clears() {
        let store = Arc::new(MemorySessionStore::new());
        store.set(AUTH_TOKEN_KEY, "stale").unwrap();
        store.set(PUBLIC_KEY_KEY, ADDRESS).unwrap();
        let manager = manager(false, store.clone());

        let handle = manager.restore_session().await.expect("background check");
        handle.await.unwrap();

        assert!(!manager.is_authenticated());
        assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_partial_state_clears() {
        let store = Arc::new(MemorySessionStore::new());
        store.set(AUTH_TOKEN_KEY, "orphan").unwrap();
        let manager = manager(true, store.clone());

        assert!(manager.restore_session().await.is_none());
        assert!(!manager.is_authenticated());
        assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_verify_token_without_session_is_false() {
        let manager = manager(true, Arc::new(MemorySessionStore::new()));
        assert!(!manager.verify_token().await.unwrap());
    }
}
