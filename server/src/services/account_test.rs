use super::*;

fn signup(role: Role, institution: Option<&str>) -> SignupRequest {
    SignupRequest {
        email: "Applicant@Univ.EDU".into(),
        password: "secret1".into(),
        full_name: "Asha Verma".into(),
        role,
        institution_name: institution.map(str::to_owned),
    }
}

// =============================================================================
// normalize_email
// =============================================================================

#[test]
fn normalize_email_lowercases_and_trims() {
    assert_eq!(normalize_email("  User@Example.COM "), Some("user@example.com".to_owned()));
}

#[test]
fn normalize_email_rejects_missing_at() {
    assert_eq!(normalize_email("not-an-email"), None);
}

#[test]
fn normalize_email_rejects_empty_local_or_domain() {
    assert_eq!(normalize_email("@example.com"), None);
    assert_eq!(normalize_email("user@"), None);
    assert_eq!(normalize_email("a@b@c"), None);
}

#[test]
fn normalize_email_rejects_blank() {
    assert_eq!(normalize_email("   "), None);
}

// =============================================================================
// validate_signup
// =============================================================================

#[test]
fn validate_signup_returns_normalized_email() {
    let email = validate_signup(&signup(Role::University, Some("Ranchi University"))).unwrap();
    assert_eq!(email, "applicant@univ.edu");
}

#[test]
fn validate_signup_admin_needs_no_institution() {
    assert!(validate_signup(&signup(Role::Admin, None)).is_ok());
}

#[test]
fn validate_signup_university_requires_institution() {
    let err = validate_signup(&signup(Role::University, None)).unwrap_err();
    assert_eq!(err.kind(), "invalid_request");
}

#[test]
fn validate_signup_rejects_blank_institution() {
    let err = validate_signup(&signup(Role::University, Some(" "))).unwrap_err();
    assert_eq!(err.kind(), "invalid_request");
}

#[test]
fn validate_signup_rejects_short_password() {
    let mut request = signup(Role::Admin, None);
    request.password = "12345".into();
    let err = validate_signup(&request).unwrap_err();
    assert_eq!(err.kind(), "weak_password");
    assert_eq!(err.to_string(), "Password should be at least 6 characters");
}

#[test]
fn validate_signup_rejects_invalid_email() {
    let mut request = signup(Role::Admin, None);
    request.email = "nope".into();
    assert_eq!(validate_signup(&request).unwrap_err().kind(), "invalid_request");
}

// =============================================================================
// password hashing
// =============================================================================

#[test]
fn hash_then_verify_round_trip() {
    let hash = hash_password("secret1").unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(verify_password("secret1", &hash));
    assert!(!verify_password("secret2", &hash));
}

#[test]
fn same_password_hashes_differently() {
    let a = hash_password("secret1").unwrap();
    let b = hash_password("secret1").unwrap();
    assert_ne!(a, b);
}

#[test]
fn verify_garbage_hash_is_false() {
    assert!(!verify_password("secret1", "not-a-phc-string"));
}

// =============================================================================
// AccountError wire mapping
// =============================================================================

#[test]
fn error_messages_match_the_legacy_wire_text() {
    assert_eq!(AccountError::InvalidCredentials.to_string(), "Invalid login credentials");
    assert_eq!(AccountError::EmailNotConfirmed.to_string(), "Email not confirmed");
    assert_eq!(AccountError::EmailTaken.to_string(), "User already registered");
    assert_eq!(
        AccountError::WeakPassword.to_string(),
        "Password should be at least 6 characters"
    );
}

#[test]
fn error_kinds_are_stable_tags() {
    assert_eq!(AccountError::InvalidCredentials.kind(), "invalid_credentials");
    assert_eq!(AccountError::EmailNotConfirmed.kind(), "email_not_confirmed");
    assert_eq!(AccountError::EmailTaken.kind(), "email_taken");
    assert_eq!(AccountError::WeakPassword.kind(), "weak_password");
    assert_eq!(AccountError::InvalidRequest("x".into()).kind(), "invalid_request");
}

// =============================================================================
// Account projections
// =============================================================================

#[test]
fn account_projects_user_and_profile() {
    let account = Account {
        id: Uuid::nil(),
        email: "u@uni.edu".into(),
        full_name: "Uni User".into(),
        role: Role::University,
        institution_name: Some("Ranchi University".into()),
        email_confirmed: false,
    };
    let user = account.user();
    assert_eq!(user.id, account.id);
    assert_eq!(user.email, "u@uni.edu");

    let profile = account.profile();
    assert_eq!(profile.role, Role::University);
    assert_eq!(profile.institution_name.as_deref(), Some("Ranchi University"));
}
