//! Session controller — the authenticated/anonymous state machine.
//!
//! ARCHITECTURE
//! ============
//! `Loading -> {Anonymous, Authenticated}` at startup, then
//! `Anonymous <-> Authenticated` via `sign_in`/`sign_up` and `sign_out`.
//! All state transitions and all token-store writes go through this
//! controller; pages render from [`SessionState`] and never talk to the
//! store or the API directly.
//!
//! CONCURRENCY
//! ===========
//! Legitimate UI flows run one operation at a time, but a sign-out can
//! race a pending login response. Every operation takes a ticket from a
//! monotonic counter and only the most recently issued operation may
//! commit its result; a stale response is discarded instead of
//! resurrecting a token the user already signed out of.

use std::sync::{Arc, Mutex, PoisonError};

use crate::api::AuthApi;
use crate::error::{AuthError, AuthErrorKind};
use crate::store::TokenStore;
use crate::types::{SignupRequest, UserProfile};

// =============================================================================
// SESSION STATE
// =============================================================================

/// Observable session state. Transitions only through [`SessionController`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Startup validation has not finished; pages render a wait indicator.
    #[default]
    Loading,
    /// No valid session. Protected pages redirect to login.
    Anonymous,
    /// Valid session with the backend-owned profile cached read-only.
    Authenticated(UserProfile),
}

impl SessionState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    #[must_use]
    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            SessionState::Authenticated(profile) => Some(profile),
            _ => None,
        }
    }
}

/// Successful sign-in result surfaced to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInOutcome {
    /// The session was committed; the state is now `Authenticated`.
    Authenticated,
    /// The backend accepted the credentials, but a newer operation (e.g.
    /// a sign-out) was issued while the response was in flight. No token
    /// was stored and the state was left alone.
    Superseded,
}

/// Successful signup result surfaced to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupOutcome {
    /// The account exists and the session was committed.
    ///
    /// `confirmation_pending` means the backend still expects an email
    /// confirmation step; the UI shows success-with-instructions, not an
    /// error.
    Authenticated { confirmation_pending: bool },
    /// The account exists, but a newer operation superseded this one
    /// before the session could be committed.
    Superseded,
}

// =============================================================================
// CONTROLLER
// =============================================================================

struct Inner {
    state: SessionState,
    /// Monotonic operation counter; see module docs.
    issued: u64,
    /// Startup validation runs exactly once per application load.
    initialized: bool,
}

/// Owns the session lifecycle. Clone-cheap via `Arc` internals is left to
/// the embedder; the controller itself is shared by reference.
pub struct SessionController {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn TokenStore>,
    inner: Mutex<Inner>,
}

impl SessionController {
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            store,
            inner: Mutex::new(Inner {
                state: SessionState::Loading,
                issued: 0,
                initialized: false,
            }),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take a ticket, invalidating any operation still in flight.
    fn issue(&self) -> u64 {
        let mut inner = self.lock();
        inner.issued += 1;
        inner.issued
    }

    /// Commit a state transition iff no newer operation has been issued.
    /// Returns whether the commit happened.
    fn commit(&self, ticket: u64, state: SessionState) -> bool {
        let mut inner = self.lock();
        if ticket != inner.issued {
            tracing::debug!(ticket, latest = inner.issued, "stale auth result discarded");
            return false;
        }
        inner.state = state;
        true
    }

    /// Restore the session from the stored token, once per load.
    ///
    /// No stored token means `Anonymous` with zero network calls; a stored
    /// token triggers exactly one validation round-trip. A rejected token
    /// is cleared silently and the state falls back to `Anonymous` — the
    /// user sees no error. Subsequent calls are no-ops; route changes never
    /// re-validate.
    pub async fn init(&self) {
        let ticket = {
            let mut inner = self.lock();
            if inner.initialized {
                return;
            }
            inner.initialized = true;
            inner.issued += 1;
            inner.issued
        };

        let token = match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "token store unreadable; treating as signed out");
                None
            }
        };

        let Some(token) = token else {
            self.commit(ticket, SessionState::Anonymous);
            return;
        };

        match self.api.current_session(&token).await {
            Ok(session) => {
                self.commit(ticket, SessionState::Authenticated(session.profile));
            }
            Err(e) => {
                tracing::debug!(kind = ?e.kind, "stored session rejected; clearing token");
                if let Err(e) = self.store.clear() {
                    tracing::warn!(error = %e, "failed to clear rejected token");
                }
                self.commit(ticket, SessionState::Anonymous);
            }
        }
    }

    /// Authenticate with email and password.
    ///
    /// On success the token is persisted and the state becomes
    /// `Authenticated`; on failure the state is untouched and the error is
    /// returned as a value for the UI to display. A response that arrives
    /// after a newer operation was issued yields
    /// [`SignInOutcome::Superseded`] and commits nothing.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] reported by the backend or the normalized
    /// network failure.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInOutcome, AuthError> {
        let ticket = self.issue();
        let session = self.api.login(email, password).await?;
        if self.commit_session(ticket, &session.token, session.profile)? {
            Ok(SignInOutcome::Authenticated)
        } else {
            Ok(SignInOutcome::Superseded)
        }
    }

    /// Create an account and authenticate in one step.
    ///
    /// The request is validated locally first; an invalid request is
    /// rejected before any network I/O and no token is stored.
    ///
    /// # Errors
    ///
    /// Returns a local validation error or the backend's [`AuthError`].
    pub async fn sign_up(&self, request: &SignupRequest) -> Result<SignupOutcome, AuthError> {
        request.validate()?;
        let ticket = self.issue();
        let session = self.api.signup(request).await?;
        let confirmation_pending = session.confirmation_pending;
        if self.commit_session(ticket, &session.token, session.profile)? {
            Ok(SignupOutcome::Authenticated { confirmation_pending })
        } else {
            Ok(SignupOutcome::Superseded)
        }
    }

    /// Drop the session locally: clear the store, become `Anonymous`.
    /// No server round-trip.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store cannot be cleared.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let ticket = self.issue();
        self.store
            .clear()
            .map_err(|e| AuthError::new(AuthErrorKind::Other, e.to_string()))?;
        self.commit(ticket, SessionState::Anonymous);
        Ok(())
    }

    /// Persist the token and enter `Authenticated`, unless a newer
    /// operation (e.g. a sign-out) superseded this one while the response
    /// was in flight. Returns whether the commit happened.
    fn commit_session(
        &self,
        ticket: u64,
        token: &str,
        profile: UserProfile,
    ) -> Result<bool, AuthError> {
        let mut inner = self.lock();
        if ticket != inner.issued {
            tracing::debug!(ticket, latest = inner.issued, "stale login response discarded");
            return Ok(false);
        }
        self.store
            .save(token)
            .map_err(|e| AuthError::new(AuthErrorKind::Other, e.to_string()))?;
        inner.state = SessionState::Authenticated(profile);
        Ok(true)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
