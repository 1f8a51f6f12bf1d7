use uuid::Uuid;

use super::*;
use crate::types::UserProfile;

fn authed(role: Role) -> SessionState {
    SessionState::Authenticated(UserProfile {
        id: Uuid::nil(),
        email: "a@b.com".into(),
        full_name: "Asha Verma".into(),
        role,
        institution_name: None,
    })
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn loading_waits_everywhere() {
    for page in [Page::Login, Page::AdminDashboard, Page::UniversityDashboard] {
        assert_eq!(route_action(&SessionState::Loading, page), RouteAction::Wait);
    }
}

// =============================================================================
// Anonymous
// =============================================================================

#[test]
fn anonymous_stays_on_login() {
    assert_eq!(route_action(&SessionState::Anonymous, Page::Login), RouteAction::Stay);
}

#[test]
fn anonymous_redirected_from_protected_pages() {
    for page in [Page::AdminDashboard, Page::UniversityDashboard] {
        assert_eq!(
            route_action(&SessionState::Anonymous, page),
            RouteAction::RedirectToLogin
        );
    }
}

// =============================================================================
// Authenticated
// =============================================================================

#[test]
fn authenticated_login_visit_redirects_to_role_dashboard() {
    assert_eq!(
        route_action(&authed(Role::Admin), Page::Login),
        RouteAction::RedirectTo(Page::AdminDashboard)
    );
    assert_eq!(
        route_action(&authed(Role::University), Page::Login),
        RouteAction::RedirectTo(Page::UniversityDashboard)
    );
}

#[test]
fn wrong_dashboard_redirects_to_own() {
    assert_eq!(
        route_action(&authed(Role::Admin), Page::UniversityDashboard),
        RouteAction::RedirectTo(Page::AdminDashboard)
    );
    assert_eq!(
        route_action(&authed(Role::University), Page::AdminDashboard),
        RouteAction::RedirectTo(Page::UniversityDashboard)
    );
}

#[test]
fn own_dashboard_stays() {
    assert_eq!(
        route_action(&authed(Role::Admin), Page::AdminDashboard),
        RouteAction::Stay
    );
    assert_eq!(
        route_action(&authed(Role::University), Page::UniversityDashboard),
        RouteAction::Stay
    );
}

#[test]
fn redirect_is_idempotent_no_loops() {
    // Deciding again from the redirect target always yields Stay.
    let state = authed(Role::Admin);
    let RouteAction::RedirectTo(target) = route_action(&state, Page::UniversityDashboard) else {
        panic!("expected redirect");
    };
    assert_eq!(route_action(&state, target), RouteAction::Stay);
}

#[test]
fn dashboard_for_maps_roles() {
    assert_eq!(Page::dashboard_for(Role::Admin), Page::AdminDashboard);
    assert_eq!(Page::dashboard_for(Role::University), Page::UniversityDashboard);
}

#[test]
fn login_is_not_protected() {
    assert!(!Page::Login.is_protected());
    assert!(Page::AdminDashboard.is_protected());
    assert!(Page::UniversityDashboard.is_protected());
}
