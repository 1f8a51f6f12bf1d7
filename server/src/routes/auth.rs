//! Auth routes — login, signup, session introspection, logout.
//!
//! ARCHITECTURE
//! ============
//! Requests authenticate with `Authorization: Bearer <token>`; the scheme
//! is a single constant. Error bodies are
//! `{"error": {"kind", "message"}}` so clients match on the kind tag, with
//! the message kept for older clients that still classify text.
//! State-changing endpoints apply a double-submit CSRF check, but only
//! when a `csrftoken` cookie accompanies the request — bare token clients
//! are unaffected.

use axum::extract::{FromRef, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Serialize;
use time::Duration;

use client::types::{Credential, SignupRequest, User, UserProfile};

use crate::services::{account, session};
use crate::state::AppState;

const AUTH_SCHEME: &str = "Bearer";
const CSRF_COOKIE_NAME: &str = "csrftoken";
const CSRF_HEADER_NAME: &str = "X-CSRFToken";
const CSRF_COOKIE_TTL: Duration = Duration::days(7);

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn cookie_secure() -> bool {
    if let Some(value) = env_bool("COOKIE_SECURE") {
        return value;
    }
    std::env::var("PUBLIC_BASE_URL")
        .map(|url| url.starts_with("https://"))
        .unwrap_or(false)
}

/// Extract the bearer token from an `Authorization` header value.
pub(crate) fn parse_bearer(header: &str) -> Option<&str> {
    let token = header.strip_prefix(AUTH_SCHEME)?.strip_prefix(' ')?.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// Double-submit CSRF check. No cookie means no browser session to
/// protect, so the request passes.
pub(crate) fn csrf_ok(cookie: Option<&str>, header: Option<&str>) -> bool {
    match cookie.filter(|v| !v.is_empty()) {
        None => true,
        Some(expected) => header == Some(expected),
    }
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated account extracted from the bearer token.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub account: account::Account,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_bearer)
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let app_state = AppState::from_ref(state);
        let account = session::validate_session(&app_state.pool, token)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(Self { account, token: token.to_owned() })
    }
}

// =============================================================================
// RESPONSE BODIES
// =============================================================================

/// Body of a successful login or signup: a fresh token plus the account.
/// `confirmation_pending` is present only on signup.
#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
    pub profile: UserProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_pending: Option<bool>,
}

/// Body of `GET /api/auth/me`.
#[derive(Serialize)]
pub struct MeResponse {
    pub user: User,
    pub profile: UserProfile,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub kind: &'static str,
    pub message: String,
}

fn error_response(err: &account::AccountError) -> Response {
    use crate::services::account::AccountError::*;
    let status = match err {
        InvalidCredentials => StatusCode::UNAUTHORIZED,
        EmailNotConfirmed => StatusCode::FORBIDDEN,
        EmailTaken => StatusCode::CONFLICT,
        WeakPassword | InvalidRequest(_) => StatusCode::BAD_REQUEST,
        Db(_) | Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = match err {
        Db(_) | Hash(_) => "Internal server error".to_owned(),
        other => other.to_string(),
    };
    let body = ErrorBody { error: ErrorDetail { kind: err.kind(), message } };
    (status, Json(body)).into_response()
}

fn csrf_rejection() -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            kind: "csrf_failed",
            message: "CSRF token missing or incorrect".to_owned(),
        },
    };
    (StatusCode::FORBIDDEN, Json(body)).into_response()
}

fn csrf_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(CSRF_HEADER_NAME).and_then(|v| v.to_str().ok())
}

/// Fresh `csrftoken` cookie, readable by page scripts (not `HttpOnly`) so
/// the client can echo it in the `X-CSRFToken` header.
fn csrf_cookie() -> Cookie<'static> {
    Cookie::build((CSRF_COOKIE_NAME, session::generate_token()))
        .path("/")
        .same_site(axum_extra::extract::cookie::SameSite::Lax)
        .secure(cookie_secure())
        .max_age(CSRF_COOKIE_TTL)
        .build()
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/auth/login` — check credentials, mint a session token.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(credential): Json<Credential>,
) -> Response {
    if !csrf_ok(jar.get(CSRF_COOKIE_NAME).map(Cookie::value), csrf_header(&headers)) {
        return csrf_rejection();
    }

    let account = match account::authenticate(
        &state.pool,
        &credential.email,
        &credential.password,
        state.config.require_email_confirmation,
    )
    .await
    {
        Ok(account) => account,
        Err(e) => {
            tracing::debug!(kind = e.kind(), "login rejected");
            return error_response(&e);
        }
    };

    let token = match session::create_session(&state.pool, account.id, state.config.session_ttl_days).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "session creation failed");
            return error_response(&account::AccountError::Db(e));
        }
    };

    let body = AuthResponse {
        token,
        user: account.user(),
        profile: account.profile(),
        confirmation_pending: None,
    };
    (jar.add(csrf_cookie()), Json(body)).into_response()
}

/// `POST /api/auth/signup` — create the account and sign it in.
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(request): Json<SignupRequest>,
) -> Response {
    if !csrf_ok(jar.get(CSRF_COOKIE_NAME).map(Cookie::value), csrf_header(&headers)) {
        return csrf_rejection();
    }

    let account = match account::create_account(&state.pool, &request).await {
        Ok(account) => account,
        Err(e) => {
            tracing::debug!(kind = e.kind(), "signup rejected");
            return error_response(&e);
        }
    };

    let token = match session::create_session(&state.pool, account.id, state.config.session_ttl_days).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "session creation failed");
            return error_response(&account::AccountError::Db(e));
        }
    };

    let confirmation_pending = state.config.require_email_confirmation && !account.email_confirmed;
    let body = AuthResponse {
        token,
        user: account.user(),
        profile: account.profile(),
        confirmation_pending: Some(confirmation_pending),
    };
    (jar.add(csrf_cookie()), Json(body)).into_response()
}

/// `GET /api/auth/me` — return the session's account.
pub async fn me(auth: AuthUser) -> Json<MeResponse> {
    Json(MeResponse { user: auth.account.user(), profile: auth.account.profile() })
}

/// `POST /api/auth/logout` — delete the session row.
///
/// The client contract treats sign-out as local-only; this endpoint lets
/// it also invalidate the token server-side.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    auth: AuthUser,
) -> Response {
    if !csrf_ok(jar.get(CSRF_COOKIE_NAME).map(Cookie::value), csrf_header(&headers)) {
        return csrf_rejection();
    }
    if let Err(e) = session::delete_session(&state.pool, &auth.token).await {
        tracing::warn!(error = %e, "session delete failed");
    }
    StatusCode::NO_CONTENT.into_response()
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
