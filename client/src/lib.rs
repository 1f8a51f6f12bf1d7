//! # client
//!
//! Client-side authentication core for the CertVera certificate
//! verification platform. Owns the session lifecycle: durable token
//! storage, the HTTP auth API client, the anonymous/authenticated state
//! machine, and the role-based route guard consumed by every page shell.
//!
//! The UI layer renders from [`session::SessionState`] and routes through
//! [`guard::route_action`]; nothing outside [`store`] touches persisted
//! state directly.

pub mod api;
pub mod error;
pub mod guard;
pub mod session;
pub mod store;
pub mod types;

pub use api::{AuthApi, AuthSession, CurrentSession, HttpAuthApi};
pub use error::{AuthError, AuthErrorKind};
pub use guard::{Page, RouteAction, route_action};
pub use session::{SessionController, SessionState, SignInOutcome, SignupOutcome};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use types::{Credential, Role, SignupRequest, User, UserProfile};
