//! HTTP auth API client.
//!
//! SYSTEM CONTEXT
//! ==============
//! Wraps the three backend calls the session lifecycle needs: login,
//! signup, and session validation. Transport failures never escape raw —
//! every failure is normalized into an [`AuthError`] value so callers can
//! render it without a surrounding recovery block.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{AuthError, AuthErrorKind, classify_message};
use crate::types::{SignupRequest, User, UserProfile};

/// The single authorization scheme used on the wire. Consumed only here.
const AUTH_SCHEME: &str = "Bearer";

/// Header carrying the anti-CSRF token on state-changing requests.
const CSRF_HEADER: &str = "X-CSRFToken";

// =============================================================================
// RESPONSE BODIES
// =============================================================================

/// Successful login/signup response: a fresh token plus the profile.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
    pub profile: UserProfile,
    /// Set by signup when the account still needs email confirmation.
    #[serde(default)]
    pub confirmation_pending: bool,
}

/// Successful `GET /api/auth/me` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentSession {
    pub user: User,
    pub profile: UserProfile,
}

// =============================================================================
// API TRAIT
// =============================================================================

/// The backend auth contract. The session controller depends on this seam
/// rather than on a concrete transport.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /api/auth/login`.
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// `POST /api/auth/signup`.
    async fn signup(&self, request: &SignupRequest) -> Result<AuthSession, AuthError>;

    /// `GET /api/auth/me` with the stored bearer token.
    async fn current_session(&self, token: &str) -> Result<CurrentSession, AuthError>;
}

// =============================================================================
// HTTP IMPLEMENTATION
// =============================================================================

/// Reqwest-backed [`AuthApi`] against a configurable base URL.
pub struct HttpAuthApi {
    base_url: String,
    http: reqwest::Client,
    csrf_token: Option<String>,
}

impl HttpAuthApi {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { base_url, http: reqwest::Client::new(), csrf_token: None }
    }

    /// Attach an anti-CSRF token (read from a same-origin cookie by the
    /// embedder) to state-changing requests. Absence degrades to an empty
    /// header value.
    #[must_use]
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn csrf_value(&self) -> &str {
        self.csrf_token.as_deref().unwrap_or("")
    }

    async fn post_session(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<AuthSession, AuthError> {
        let resp = self
            .http
            .post(self.url(path))
            .header(CSRF_HEADER, self.csrf_value())
            .json(body)
            .send()
            .await
            .map_err(|_| AuthError::network())?;

        let status = resp.status().as_u16();
        let raw = resp.text().await.map_err(|_| AuthError::network())?;
        if !(200..300).contains(&status) {
            return Err(decode_error(status, &raw));
        }
        serde_json::from_str(&raw).map_err(|_| AuthError::network())
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.post_session("/api/auth/login", &body).await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<AuthSession, AuthError> {
        self.post_session("/api/auth/signup", request).await
    }

    async fn current_session(&self, token: &str) -> Result<CurrentSession, AuthError> {
        let resp = self
            .http
            .get(self.url("/api/auth/me"))
            .header("Authorization", format!("{AUTH_SCHEME} {token}"))
            .send()
            .await
            .map_err(|_| AuthError::network())?;

        let status = resp.status().as_u16();
        let raw = resp.text().await.map_err(|_| AuthError::network())?;
        if !(200..300).contains(&status) {
            return Err(decode_error(status, &raw));
        }
        serde_json::from_str(&raw).map_err(|_| AuthError::network())
    }
}

// =============================================================================
// ERROR DECODING
// =============================================================================

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    /// Kept as a raw string so an unrecognized tag from a newer backend
    /// degrades to message classification instead of a parse failure.
    kind: Option<String>,
    message: String,
}

/// Map a non-2xx response to an [`AuthError`].
///
/// A structured `kind` from the backend wins; otherwise the message is
/// classified by the substring adapter. `401` on validation means the
/// stored token is dead, which the controller handles silently.
fn decode_error(status: u16, body: &str) -> AuthError {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        let kind = parsed
            .error
            .kind
            .and_then(|tag| serde_json::from_value(serde_json::Value::String(tag)).ok())
            .unwrap_or_else(|| classify_message(&parsed.error.message));
        return AuthError::new(kind, parsed.error.message);
    }
    if status == 401 {
        return AuthError::new(AuthErrorKind::SessionExpired, "Session expired");
    }
    AuthError::new(AuthErrorKind::Other, format!("Request failed with status {status}"))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
