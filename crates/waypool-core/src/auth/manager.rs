//! Session lifecycle state machine.
//!
//! `AuthManager` owns the authoritative `AuthState` and publishes each
//! snapshot over a watch channel. Storage writes land before memory
//! transitions, so a process restart comes back in the last
//! acknowledged state. A generation counter fences the snapshot
//! against operations that were still in flight when the session
//! changed under them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, warn};

use crate::api::{ApiError, AuthBackend, AuthPayload};
use crate::models::{LoginCredentials, RegisterCredentials, User};
use crate::storage::{SessionStore, StoreError, StoreKeys};

use super::AuthState;

/// Error shown when the backend accepted the credentials but the
/// session could not be persisted on this device
const PERSIST_FAILED_MESSAGE: &str = "Could not save the session on this device";

pub struct AuthManager {
    store: Arc<dyn SessionStore>,
    backend: Arc<dyn AuthBackend>,
    state: watch::Sender<AuthState>,
    /// Bumped on every completed sign-in/sign-out. In-flight operations
    /// capture the value at dispatch and only apply if it still matches.
    generation: AtomicU64,
}

impl AuthManager {
    pub fn new(store: Arc<dyn SessionStore>, backend: Arc<dyn AuthBackend>) -> Self {
        let (state, _) = watch::channel(AuthState::unknown());
        Self {
            store,
            backend,
            state,
            generation: AtomicU64::new(0),
        }
    }

    /// Current snapshot
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Subscribe to snapshot updates
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    // ===== Transitions =====

    /// Rehydrate the session from storage. Call once at startup.
    ///
    /// The stored token is trusted without a network round trip; a dead
    /// credential surfaces as a 401 on the first real request. Corrupt
    /// or partial session data is deleted so the next start comes up
    /// clean.
    pub async fn restore(&self) {
        let generation = self.generation.load(Ordering::Acquire);

        match self.read_stored_session().await {
            Some((user, token)) => {
                let applied =
                    self.apply_identity(generation, |state| state.establish(user, token));
                if !applied {
                    debug!("Session changed during restore, discarding stored snapshot");
                }
            }
            None => {
                if self.generation.load(Ordering::Acquire) == generation {
                    self.clear_stored_session().await;
                }
                let applied = self.apply_fenced(generation, |state| {
                    state.is_loading = false;
                });
                if !applied {
                    debug!("Session changed during restore, leaving state as-is");
                }
            }
        }
    }

    /// Exchange credentials for a session.
    /// The snapshot goes loading for the duration; success persists the
    /// session before memory sees it.
    pub async fn login(&self, credentials: LoginCredentials) {
        self.begin_attempt();
        let generation = self.generation.load(Ordering::Acquire);
        match self.backend.login(&credentials).await {
            Ok(payload) => self.complete_sign_in(generation, payload, "login").await,
            Err(e) => self.fail_attempt(generation, &e, "login"),
        }
    }

    /// Create an account and sign in, same shape as `login`
    pub async fn register(&self, credentials: RegisterCredentials) {
        self.begin_attempt();
        let generation = self.generation.load(Ordering::Acquire);
        match self.backend.register(&credentials).await {
            Ok(payload) => self.complete_sign_in(generation, payload, "register").await,
            Err(e) => self.fail_attempt(generation, &e, "register"),
        }
    }

    /// End the session. The backend is notified best-effort, then the
    /// stored pair is deleted, then memory transitions - always, even
    /// when a step fails.
    pub async fn logout(&self) {
        // Invalidate in-flight completions before anything else
        self.generation.fetch_add(1, Ordering::AcqRel);

        self.backend.logout().await;
        self.clear_stored_session().await;

        self.state.send_modify(|state| state.sign_out());
    }

    /// Drop the error message from the snapshot, touching nothing else
    pub fn clear_error(&self) {
        self.state.send_if_modified(|state| {
            if state.error.is_some() {
                state.error = None;
                true
            } else {
                false
            }
        });
    }

    // ===== Attempt plumbing =====

    fn begin_attempt(&self) {
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });
    }

    async fn complete_sign_in(&self, generation: u64, payload: AuthPayload, operation: &str) {
        if self.generation.load(Ordering::Acquire) != generation {
            debug!(operation, "Session changed mid-flight, discarding result");
            return;
        }

        if let Err(e) = self.persist_session(&payload).await {
            warn!(operation, error = %e, "Could not persist session");
            // Never leave half a pair behind
            self.clear_stored_session().await;
            self.apply_fenced(generation, |state| {
                state.is_loading = false;
                state.error = Some(PERSIST_FAILED_MESSAGE.to_string());
            });
            return;
        }

        let AuthPayload { user, token } = payload;
        let applied = self.apply_identity(generation, |state| state.establish(user, token));
        if !applied && !self.state().is_authenticated {
            // A sign-out won the race after we persisted; compensate so
            // storage matches the signed-out snapshot
            debug!(operation, "Discarding stale sign-in, clearing persisted session");
            self.clear_stored_session().await;
        }
    }

    fn fail_attempt(&self, generation: u64, e: &ApiError, operation: &str) {
        debug!(operation, error = %e, "Attempt failed");
        let message = e.to_string();
        let applied = self.apply_fenced(generation, |state| {
            state.is_loading = false;
            state.error = Some(message);
        });
        if !applied {
            debug!(operation, "Session changed mid-flight, dropping error");
        }
    }

    /// Write the pair to storage, token first
    async fn persist_session(&self, payload: &AuthPayload) -> Result<(), StoreError> {
        let profile = serde_json::to_string(&payload.user)?;
        self.store.set(StoreKeys::AUTH_TOKEN, &payload.token).await?;
        self.store.set(StoreKeys::USER_DATA, &profile).await?;
        Ok(())
    }

    /// Read and decode the stored (user, token) pair.
    /// `None` covers missing keys, read failures and undecodable
    /// profile data.
    async fn read_stored_session(&self) -> Option<(User, String)> {
        let token = match self.store.get(StoreKeys::AUTH_TOKEN).await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Could not read stored credential");
                None
            }
        };
        let raw_user = match self.store.get(StoreKeys::USER_DATA).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Could not read stored profile");
                None
            }
        };

        let (token, raw_user) = (token?, raw_user?);
        match serde_json::from_str::<User>(&raw_user) {
            Ok(user) => Some((user, token)),
            Err(e) => {
                error!(error = %e, "Stored profile is corrupt");
                None
            }
        }
    }

    /// Best-effort removal of both stored keys
    async fn clear_stored_session(&self) {
        if let Err(e) = self.store.delete(StoreKeys::AUTH_TOKEN).await {
            warn!(error = %e, "Could not delete stored credential");
        }
        if let Err(e) = self.store.delete(StoreKeys::USER_DATA).await {
            warn!(error = %e, "Could not delete stored profile");
        }
    }

    // ===== Snapshot appliers =====

    /// Apply a mutation only if no identity transition completed since
    /// `generation` was captured
    fn apply_fenced(&self, generation: u64, mutate: impl FnOnce(&mut AuthState)) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::Acquire) != generation {
                return false;
            }
            mutate(state);
            applied = true;
            true
        });
        applied
    }

    /// Fenced apply that also starts a new generation. Used by the
    /// transitions that change who is signed in.
    fn apply_identity(&self, generation: u64, mutate: impl FnOnce(&mut AuthState)) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::Acquire) != generation {
                return false;
            }
            self.generation.fetch_add(1, Ordering::AcqRel);
            mutate(state);
            applied = true;
            true
        });
        applied
    }
}
