//! Authentication Module
//! Mission: JWT sessions, bearer-token middleware, and literal role sets

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod roles;
pub mod user_store;

pub use api::{AuthApiError, AuthState};
pub use jwt::{Claims, TokenError, TokenService};
pub use middleware::{
    auth_middleware, extract_current_user, optional_auth_middleware, require_role, AuthError,
    CurrentUser,
};
pub use models::{LoginRequest, LoginResponse, User, UserResponse};
pub use roles::{Role, ADMIN_ROLES, PROFILE_VIEWER_ROLES};
pub use user_store::UserStore;
