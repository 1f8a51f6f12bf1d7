//! Auth error taxonomy.
//!
//! ERROR HANDLING
//! ==============
//! Every failure is returned as a value; nothing in the auth flow panics
//! or throws past a call site. The backend reports a structured `kind`
//! alongside its message; older backends only send the message, so a
//! single substring adapter ([`classify_message`]) recovers the kind at
//! the boundary. That adapter is the only place message matching happens.

use serde::{Deserialize, Serialize};

/// Generic user-facing message for any transport failure.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

/// Classified failure categories for the auth flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorKind {
    /// Transport or connectivity failure. Never surfaced raw.
    Network,
    /// Backend rejected the login credentials.
    InvalidCredentials,
    /// Account exists but the email address is not confirmed yet.
    EmailNotConfirmed,
    /// Signup with an email that is already registered.
    EmailTaken,
    /// Password fails the minimum-length policy.
    WeakPassword,
    /// Request rejected by local or server-side input validation.
    InvalidRequest,
    /// Stored token was rejected by the backend. Handled silently.
    SessionExpired,
    /// Anything else; the raw backend message is shown as-is.
    Other,
}

/// A structured auth failure carrying a kind and the backend message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthError {
    pub kind: AuthErrorKind,
    pub message: String,
}

impl AuthError {
    #[must_use]
    pub fn new(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    /// A normalized transport failure.
    #[must_use]
    pub fn network() -> Self {
        Self::new(AuthErrorKind::Network, NETWORK_ERROR_MESSAGE)
    }

    /// The curated message to show the user, keyed by kind. Unrecognized
    /// kinds fall back to the raw backend message.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self.kind {
            AuthErrorKind::Network => NETWORK_ERROR_MESSAGE,
            AuthErrorKind::InvalidCredentials => "Invalid email or password",
            AuthErrorKind::EmailNotConfirmed => {
                "Please check your email and confirm your account"
            }
            AuthErrorKind::EmailTaken => "An account with this email already exists",
            AuthErrorKind::WeakPassword => "Password should be at least 6 characters long",
            AuthErrorKind::InvalidRequest
            | AuthErrorKind::SessionExpired
            | AuthErrorKind::Other => &self.message,
        }
    }
}

/// Fallback adapter: recover an error kind from a raw backend message.
///
/// Substrings match the messages the legacy backend emitted verbatim.
#[must_use]
pub fn classify_message(message: &str) -> AuthErrorKind {
    if message.contains("Invalid login credentials") {
        AuthErrorKind::InvalidCredentials
    } else if message.contains("Email not confirmed") {
        AuthErrorKind::EmailNotConfirmed
    } else if message.contains("User already registered") {
        AuthErrorKind::EmailTaken
    } else if message.contains("Password should be at least 6 characters") {
        AuthErrorKind::WeakPassword
    } else {
        AuthErrorKind::Other
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
