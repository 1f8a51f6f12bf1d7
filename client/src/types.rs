//! Wire and domain types shared across the auth flow.
//!
//! DESIGN
//! ======
//! These mirror the backend's JSON bodies exactly. The server crate reuses
//! them when serializing responses so the two sides cannot drift.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, AuthErrorKind};

/// Minimum password length accepted at signup.
pub const MIN_PASSWORD_LEN: usize = 6;

// =============================================================================
// ROLE
// =============================================================================

/// Account role determining which dashboard a profile may access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    University,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::University => "university",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "university" => Ok(Role::University),
            "admin" => Ok(Role::Admin),
            other => Err(ParseRoleError(other.to_owned())),
        }
    }
}

// =============================================================================
// USER / PROFILE
// =============================================================================

/// Minimal account identity returned alongside the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
}

/// Read-only profile owned by the backend; the client caches a copy for
/// the duration of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution_name: Option<String>,
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Login credentials. Transient; never persisted beyond the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub email: String,
    pub password: String,
}

/// Signup payload. `institution_name` is required iff the role is
/// `university`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution_name: Option<String>,
}

impl SignupRequest {
    /// Local validation applied before any network request is issued.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] describing the first rejected field.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.full_name.trim().is_empty() {
            return Err(AuthError::new(
                AuthErrorKind::InvalidRequest,
                "Please enter your full name",
            ));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::new(
                AuthErrorKind::WeakPassword,
                "Password should be at least 6 characters",
            ));
        }
        if self.role == Role::University
            && self
                .institution_name
                .as_deref()
                .is_none_or(|name| name.trim().is_empty())
        {
            return Err(AuthError::new(
                AuthErrorKind::InvalidRequest,
                "Please enter your institution name",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
