//! Account service — signup validation, password hashing, authentication.
//!
//! ERROR HANDLING
//! ==============
//! `AccountError` variants carry the exact wire messages the client's
//! fallback classifier recognizes, and each maps to a stable `kind` tag so
//! newer clients never need to match on message text.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use client::types::{MIN_PASSWORD_LEN, Role, SignupRequest, User, UserProfile};

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Invalid login credentials")]
    InvalidCredentials,
    #[error("Email not confirmed")]
    EmailNotConfirmed,
    #[error("User already registered")]
    EmailTaken,
    #[error("Password should be at least 6 characters")]
    WeakPassword,
    #[error("{0}")]
    InvalidRequest(String),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    Hash(String),
}

impl AccountError {
    /// Stable machine-readable tag carried in error response bodies.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            AccountError::InvalidCredentials => "invalid_credentials",
            AccountError::EmailNotConfirmed => "email_not_confirmed",
            AccountError::EmailTaken => "email_taken",
            AccountError::WeakPassword => "weak_password",
            AccountError::InvalidRequest(_) => "invalid_request",
            AccountError::Db(_) | AccountError::Hash(_) => "internal",
        }
    }
}

// =============================================================================
// ACCOUNT ROW
// =============================================================================

/// User row as stored, minus the password hash unless explicitly fetched.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub institution_name: Option<String>,
    pub email_confirmed: bool,
}

impl Account {
    pub(crate) fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let role: String = row.try_get("role")?;
        let role = role
            .parse::<Role>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            full_name: row.try_get("full_name")?,
            role,
            institution_name: row.try_get("institution_name")?,
            email_confirmed: row.try_get("email_confirmed")?,
        })
    }

    #[must_use]
    pub fn user(&self) -> User {
        User { id: self.id, email: self.email.clone() }
    }

    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            role: self.role,
            institution_name: self.institution_name.clone(),
        }
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    if normalized.is_empty() || !normalized.contains('@') {
        return None;
    }
    let parts = normalized.split('@').collect::<Vec<_>>();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return None;
    }
    Some(normalized)
}

/// Validate a signup request; returns the normalized email on success.
///
/// # Errors
///
/// Returns an [`AccountError`] naming the first rejected field.
pub fn validate_signup(request: &SignupRequest) -> Result<String, AccountError> {
    let email = normalize_email(&request.email)
        .ok_or_else(|| AccountError::InvalidRequest("Please provide a valid email address".into()))?;
    if request.full_name.trim().is_empty() {
        return Err(AccountError::InvalidRequest("Full name is required".into()));
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AccountError::WeakPassword);
    }
    if request.role == Role::University
        && request
            .institution_name
            .as_deref()
            .is_none_or(|name| name.trim().is_empty())
    {
        return Err(AccountError::InvalidRequest(
            "Institution name is required for university accounts".into(),
        ));
    }
    Ok(email)
}

// =============================================================================
// PASSWORD HASHING
// =============================================================================

/// Hash a password with Argon2id and a fresh salt (PHC string output).
///
/// # Errors
///
/// Returns [`AccountError::Hash`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AccountError::Hash(e.to_string()))
}

/// Verify a password against a stored PHC hash string.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Create an account from a validated signup request.
///
/// # Errors
///
/// `EmailTaken` on a duplicate email; validation and database errors
/// otherwise.
pub async fn create_account(pool: &PgPool, request: &SignupRequest) -> Result<Account, AccountError> {
    let email = validate_signup(request)?;
    let password_hash = hash_password(&request.password)?;
    let institution_name = match request.role {
        Role::University => request.institution_name.as_deref().map(str::trim),
        Role::Admin => None,
    };

    let row = sqlx::query(
        r"INSERT INTO users (email, password_hash, full_name, role, institution_name)
          VALUES ($1, $2, $3, $4, $5)
          RETURNING id, email, full_name, role, institution_name, email_confirmed",
    )
    .bind(&email)
    .bind(&password_hash)
    .bind(request.full_name.trim())
    .bind(request.role.as_str())
    .bind(institution_name)
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AccountError::EmailTaken,
        _ => AccountError::Db(e),
    })?;

    Account::from_row(&row).map_err(AccountError::Db)
}

/// Check credentials and return the account.
///
/// # Errors
///
/// `InvalidCredentials` for an unknown email or a wrong password (the two
/// are indistinguishable on the wire); `EmailNotConfirmed` when
/// confirmation is enforced and pending.
pub async fn authenticate(
    pool: &PgPool,
    email: &str,
    password: &str,
    require_confirmed: bool,
) -> Result<Account, AccountError> {
    let email = normalize_email(email).ok_or(AccountError::InvalidCredentials)?;

    let row = sqlx::query(
        r"SELECT id, email, password_hash, full_name, role, institution_name, email_confirmed
          FROM users WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Err(AccountError::InvalidCredentials);
    };

    let password_hash: String = row.try_get("password_hash")?;
    if !verify_password(password, &password_hash) {
        return Err(AccountError::InvalidCredentials);
    }

    let account = Account::from_row(&row)?;
    if require_confirmed && !account.email_confirmed {
        return Err(AccountError::EmailNotConfirmed);
    }
    Ok(account)
}

#[cfg(test)]
#[path = "account_test.rs"]
mod tests;
