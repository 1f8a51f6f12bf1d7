//! Role-based route guard.
//!
//! DESIGN
//! ======
//! One pure decision function applied by every page shell. Dashboards do
//! not re-validate the session or read storage themselves; they render the
//! controller's state through this function, which makes the redirect
//! behavior uniform and idempotent (deciding again from the target page
//! always yields `Stay`, so no loops).

use crate::session::SessionState;
use crate::types::Role;

/// The pages participating in the guard contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    AdminDashboard,
    UniversityDashboard,
}

impl Page {
    /// The dashboard a role lands on. Anything that is not an admin goes
    /// to the university dashboard.
    #[must_use]
    pub fn dashboard_for(role: Role) -> Page {
        match role {
            Role::Admin => Page::AdminDashboard,
            Role::University => Page::UniversityDashboard,
        }
    }

    /// Whether the page requires an authenticated session.
    #[must_use]
    pub fn is_protected(self) -> bool {
        !matches!(self, Page::Login)
    }
}

/// What a page shell should do for the current session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAction {
    /// Startup validation in progress: render a wait indicator.
    Wait,
    /// Render the page.
    Stay,
    /// Unauthenticated visitor on a protected page.
    RedirectToLogin,
    /// Authenticated user on the wrong page; go to the role's dashboard.
    RedirectTo(Page),
}

/// Decide the guard action for `page` under `state`.
#[must_use]
pub fn route_action(state: &SessionState, page: Page) -> RouteAction {
    match state {
        SessionState::Loading => RouteAction::Wait,
        SessionState::Anonymous => {
            if page.is_protected() {
                RouteAction::RedirectToLogin
            } else {
                RouteAction::Stay
            }
        }
        SessionState::Authenticated(profile) => {
            let home = Page::dashboard_for(profile.role);
            if page == home {
                RouteAction::Stay
            } else {
                RouteAction::RedirectTo(home)
            }
        }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
