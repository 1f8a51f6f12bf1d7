use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;
use uuid::Uuid;

use super::*;
use crate::api::{AuthSession, CurrentSession};
use crate::error::AuthErrorKind;
use crate::store::MemoryTokenStore;
use crate::types::{Role, User};

// =============================================================================
// SCRIPTED MOCK API
// =============================================================================

#[derive(Default)]
struct MockApi {
    login_result: Mutex<Option<Result<AuthSession, AuthError>>>,
    signup_result: Mutex<Option<Result<AuthSession, AuthError>>>,
    session_result: Mutex<Option<Result<CurrentSession, AuthError>>>,
    login_calls: AtomicUsize,
    signup_calls: AtomicUsize,
    session_calls: AtomicUsize,
    /// When set, `login` waits on this before resolving (race tests).
    login_gate: Option<Arc<Notify>>,
}

impl MockApi {
    fn scripted(&self, slot: &Mutex<Option<Result<AuthSession, AuthError>>>) -> Result<AuthSession, AuthError> {
        slot.lock()
            .unwrap()
            .clone()
            .expect("mock result not scripted")
    }
}

#[async_trait]
impl AuthApi for MockApi {
    async fn login(&self, _email: &str, _password: &str) -> Result<AuthSession, AuthError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.login_gate.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.scripted(&self.login_result)
    }

    async fn signup(&self, _request: &SignupRequest) -> Result<AuthSession, AuthError> {
        self.signup_calls.fetch_add(1, Ordering::SeqCst);
        self.scripted(&self.signup_result)
    }

    async fn current_session(&self, _token: &str) -> Result<CurrentSession, AuthError> {
        self.session_calls.fetch_add(1, Ordering::SeqCst);
        self.session_result
            .lock()
            .unwrap()
            .clone()
            .expect("mock session result not scripted")
    }
}

fn profile(role: Role) -> UserProfile {
    UserProfile {
        id: Uuid::nil(),
        email: "a@b.com".into(),
        full_name: "Asha Verma".into(),
        role,
        institution_name: match role {
            Role::University => Some("Ranchi University".into()),
            Role::Admin => None,
        },
    }
}

fn auth_session(token: &str, role: Role) -> AuthSession {
    AuthSession {
        token: token.into(),
        user: User { id: Uuid::nil(), email: "a@b.com".into() },
        profile: profile(role),
        confirmation_pending: false,
    }
}

fn current_session(role: Role) -> CurrentSession {
    CurrentSession { user: User { id: Uuid::nil(), email: "a@b.com".into() }, profile: profile(role) }
}

fn signup_request() -> SignupRequest {
    SignupRequest {
        email: "a@b.com".into(),
        password: "secret1".into(),
        full_name: "Asha Verma".into(),
        role: Role::University,
        institution_name: Some("Ranchi University".into()),
    }
}

fn controller(api: MockApi) -> (Arc<SessionController>, Arc<MemoryTokenStore>) {
    let store = Arc::new(MemoryTokenStore::new());
    let controller = Arc::new(SessionController::new(Arc::new(api), store.clone()));
    (controller, store)
}

// =============================================================================
// Startup
// =============================================================================

#[test]
fn state_starts_loading() {
    let (controller, _) = controller(MockApi::default());
    assert_eq!(controller.state(), SessionState::Loading);
}

#[tokio::test]
async fn init_without_token_is_anonymous_without_network() {
    let api = MockApi::default();
    let store = Arc::new(MemoryTokenStore::new());
    let api = Arc::new(api);
    let controller = SessionController::new(api.clone(), store);
    controller.init().await;
    assert_eq!(controller.state(), SessionState::Anonymous);
    assert_eq!(api.session_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn init_with_valid_token_authenticates() {
    let api = MockApi::default();
    *api.session_result.lock().unwrap() = Some(Ok(current_session(Role::University)));
    let (controller, store) = controller(api);
    store.save("tok123").unwrap();

    controller.init().await;

    assert_eq!(controller.state(), SessionState::Authenticated(profile(Role::University)));
    assert_eq!(store.load().unwrap().as_deref(), Some("tok123"));
}

#[tokio::test]
async fn init_with_rejected_token_clears_store_and_demotes() {
    let api = MockApi::default();
    *api.session_result.lock().unwrap() =
        Some(Err(AuthError::new(AuthErrorKind::SessionExpired, "Session expired")));
    let (controller, store) = controller(api);
    store.save("stale-token").unwrap();

    controller.init().await;

    assert_eq!(controller.state(), SessionState::Anonymous);
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn init_validates_exactly_once_per_load() {
    let api = MockApi::default();
    *api.session_result.lock().unwrap() = Some(Ok(current_session(Role::Admin)));
    let api = Arc::new(api);
    let store = Arc::new(MemoryTokenStore::new());
    store.save("tok").unwrap();
    let controller = SessionController::new(api.clone(), store);

    controller.init().await;
    controller.init().await;
    controller.init().await;

    assert_eq!(api.session_calls.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Sign-in
// =============================================================================

#[tokio::test]
async fn sign_in_persists_token_and_authenticates() {
    let api = MockApi::default();
    *api.login_result.lock().unwrap() = Some(Ok(auth_session("tok123", Role::University)));
    let (controller, store) = controller(api);
    controller.init().await;

    let outcome = controller.sign_in("a@b.com", "secret1").await.unwrap();

    assert_eq!(outcome, SignInOutcome::Authenticated);
    assert_eq!(store.load().unwrap().as_deref(), Some("tok123"));
    assert_eq!(controller.state(), SessionState::Authenticated(profile(Role::University)));
}

#[tokio::test]
async fn after_login_the_login_page_redirects_to_the_role_dashboard() {
    use crate::guard::{Page, RouteAction, route_action};

    let api = MockApi::default();
    *api.login_result.lock().unwrap() = Some(Ok(auth_session("tok123", Role::University)));
    let (controller, store) = controller(api);
    controller.init().await;
    controller.sign_in("a@b.com", "secret1").await.unwrap();

    assert_eq!(store.load().unwrap().as_deref(), Some("tok123"));
    assert_eq!(
        route_action(&controller.state(), Page::Login),
        RouteAction::RedirectTo(Page::UniversityDashboard)
    );
}

#[tokio::test]
async fn sign_in_failure_returns_error_and_stays_anonymous() {
    let api = MockApi::default();
    *api.login_result.lock().unwrap() = Some(Err(AuthError::new(
        AuthErrorKind::InvalidCredentials,
        "Invalid login credentials",
    )));
    let (controller, store) = controller(api);
    controller.init().await;

    let err = controller.sign_in("a@b.com", "wrong").await.unwrap_err();

    assert_eq!(err.kind, AuthErrorKind::InvalidCredentials);
    assert_eq!(controller.state(), SessionState::Anonymous);
    assert!(store.load().unwrap().is_none());
}

// =============================================================================
// Sign-up
// =============================================================================

#[tokio::test]
async fn sign_up_rejects_invalid_request_before_any_network_call() {
    let api = Arc::new(MockApi::default());
    let store = Arc::new(MemoryTokenStore::new());
    let controller = SessionController::new(api.clone(), store.clone());
    controller.init().await;

    let mut request = signup_request();
    request.institution_name = Some(String::new());
    let err = controller.sign_up(&request).await.unwrap_err();

    assert_eq!(err.kind, AuthErrorKind::InvalidRequest);
    assert_eq!(api.signup_calls.load(Ordering::SeqCst), 0);
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn sign_up_success_authenticates_and_persists() {
    let api = MockApi::default();
    *api.signup_result.lock().unwrap() = Some(Ok(auth_session("tok789", Role::University)));
    let (controller, store) = controller(api);
    controller.init().await;

    let outcome = controller.sign_up(&signup_request()).await.unwrap();

    assert_eq!(outcome, SignupOutcome::Authenticated { confirmation_pending: false });
    assert_eq!(store.load().unwrap().as_deref(), Some("tok789"));
    assert!(controller.state().is_authenticated());
}

#[tokio::test]
async fn sign_up_surfaces_pending_confirmation_as_success() {
    let api = MockApi::default();
    let mut session = auth_session("tok790", Role::University);
    session.confirmation_pending = true;
    *api.signup_result.lock().unwrap() = Some(Ok(session));
    let (controller, _) = controller(api);
    controller.init().await;

    let outcome = controller.sign_up(&signup_request()).await.unwrap();

    assert_eq!(outcome, SignupOutcome::Authenticated { confirmation_pending: true });
    assert!(controller.state().is_authenticated());
}

// =============================================================================
// Sign-out
// =============================================================================

#[tokio::test]
async fn sign_out_clears_store_and_demotes() {
    let api = MockApi::default();
    *api.login_result.lock().unwrap() = Some(Ok(auth_session("tok123", Role::Admin)));
    let (controller, store) = controller(api);
    controller.init().await;
    controller.sign_in("a@b.com", "secret1").await.unwrap();

    controller.sign_out().await.unwrap();

    assert_eq!(controller.state(), SessionState::Anonymous);
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn sign_out_when_already_anonymous_leaves_store_empty() {
    let (controller, store) = controller(MockApi::default());
    controller.init().await;
    controller.sign_out().await.unwrap();
    assert!(store.load().unwrap().is_none());
}

// =============================================================================
// Race: sign-out during a pending login
// =============================================================================

#[tokio::test]
async fn stale_login_response_does_not_resurrect_session() {
    let gate = Arc::new(Notify::new());
    let api = MockApi {
        login_gate: Some(gate.clone()),
        ..MockApi::default()
    };
    *api.login_result.lock().unwrap() = Some(Ok(auth_session("tok123", Role::University)));
    let (controller, store) = controller(api);
    controller.init().await;

    // Login blocks on the gate inside the mock transport.
    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.sign_in("a@b.com", "secret1").await }
    });
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    // User signs out while the login response is still in flight.
    controller.sign_out().await.unwrap();
    gate.notify_one();
    let outcome = pending.await.unwrap().unwrap();

    // The newer sign-out wins; the stale token is never committed, and the
    // caller is told its result was dropped rather than shown a success.
    assert_eq!(outcome, SignInOutcome::Superseded);
    assert_eq!(controller.state(), SessionState::Anonymous);
    assert!(store.load().unwrap().is_none());
}
