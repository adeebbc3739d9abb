//! Session & Admin API
//! Mission: Login, claims echo, and back-office account management

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::jwt::TokenService;
use crate::auth::middleware::extract_current_user;
use crate::auth::models::{CreateUserRequest, LoginRequest, LoginResponse, MeResponse, UserResponse};
use crate::auth::user_store::{is_unique_violation, UserStore};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub tokens: Arc<TokenService>,
}

impl AuthState {
    pub fn new(user_store: Arc<UserStore>, tokens: Arc<TokenService>) -> Self {
        Self { user_store, tokens }
    }
}

#[derive(Debug)]
pub enum AuthApiError {
    InvalidCredentials,
    Unauthorized,
    WeakPassword,
    EmailTaken,
    InvalidUserId,
    UserNotFound,
    CannotDeleteSelf,
    InternalError,
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AuthApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid email or password",
            ),
            AuthApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required",
            ),
            AuthApiError::WeakPassword => (
                StatusCode::BAD_REQUEST,
                "weak_password",
                "Password must be at least 8 characters",
            ),
            AuthApiError::EmailTaken => (
                StatusCode::CONFLICT,
                "email_taken",
                "An account with this email already exists",
            ),
            AuthApiError::InvalidUserId => (
                StatusCode::BAD_REQUEST,
                "invalid_user_id",
                "User id must be a UUID",
            ),
            AuthApiError::UserNotFound => (
                StatusCode::NOT_FOUND,
                "user_not_found",
                "No account with this id",
            ),
            AuthApiError::CannotDeleteSelf => (
                StatusCode::BAD_REQUEST,
                "cannot_delete_self",
                "Refusing to delete the currently authenticated account",
            ),
            AuthApiError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error",
            ),
        };

        (
            status,
            Json(json!({
                "error": error,
                "message": message,
            })),
        )
            .into_response()
    }
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AuthState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthApiError> {
    info!("🔐 Login attempt: {}", request.email);

    let valid = state
        .user_store
        .verify_password(&request.email, &request.password)
        .map_err(|e| {
            error!("Password verification failed: {}", e);
            AuthApiError::InternalError
        })?;

    if !valid {
        warn!("❌ Failed login for: {}", request.email);
        return Err(AuthApiError::InvalidCredentials);
    }

    let user = state
        .user_store
        .get_user_by_email(&request.email)
        .map_err(|e| {
            error!("User lookup failed: {}", e);
            AuthApiError::InternalError
        })?
        .ok_or(AuthApiError::InvalidCredentials)?;

    let (token, expires_in) = state.tokens.issue(&user).map_err(|e| {
        error!("Token issuance failed: {}", e);
        AuthApiError::InternalError
    })?;

    info!("✅ Login: {} ({})", user.email, user.user_type.as_str());

    Ok(Json(LoginResponse {
        token,
        expires_in,
        user: UserResponse::from_user(&user),
    }))
}

/// GET /api/auth/me
///
/// Echoes the verified claims already attached by the auth middleware.
/// No store lookup: the token is the source of truth for this endpoint.
pub async fn get_current_user(req: Request) -> Result<Json<MeResponse>, AuthApiError> {
    let user = extract_current_user(&req).ok_or(AuthApiError::Unauthorized)?;

    Ok(Json(MeResponse {
        id: user.id.clone(),
        email: user.email.clone(),
        user_type: user.user_type.clone(),
    }))
}

/// GET /api/admin/users
///
/// Role enforcement happens in the route layer, not here.
pub async fn list_users(
    State(state): State<AuthState>,
) -> Result<Json<Vec<UserResponse>>, AuthApiError> {
    let users = state.user_store.list_users().map_err(|e| {
        error!("User listing failed: {}", e);
        AuthApiError::InternalError
    })?;

    Ok(Json(users.iter().map(UserResponse::from_user).collect()))
}

/// POST /api/admin/users
pub async fn create_user(
    State(state): State<AuthState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AuthApiError> {
    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(AuthApiError::WeakPassword);
    }

    let taken = state
        .user_store
        .get_user_by_email(&request.email)
        .map_err(|e| {
            error!("User lookup failed: {}", e);
            AuthApiError::InternalError
        })?
        .is_some();
    if taken {
        warn!("Refused duplicate account: {}", request.email);
        return Err(AuthApiError::EmailTaken);
    }

    let user = state
        .user_store
        .create_user(
            &request.email,
            &request.name,
            &request.password,
            request.user_type,
        )
        .map_err(|e| {
            // Racing creates can both pass the pre-check; the UNIQUE
            // constraint decides, and its refusal is still a 409.
            if is_unique_violation(&e) {
                warn!("Refused duplicate account: {}", request.email);
                AuthApiError::EmailTaken
            } else {
                error!("User creation failed: {}", e);
                AuthApiError::InternalError
            }
        })?;

    Ok((StatusCode::CREATED, Json(UserResponse::from_user(&user))))
}

/// DELETE /api/admin/users/:id
pub async fn delete_user(
    State(state): State<AuthState>,
    Path(user_id): Path<String>,
    req: Request,
) -> Result<StatusCode, AuthApiError> {
    let current = extract_current_user(&req).ok_or(AuthApiError::Unauthorized)?;

    let target = Uuid::parse_str(&user_id).map_err(|_| AuthApiError::InvalidUserId)?;

    if current.id == target.to_string() {
        return Err(AuthApiError::CannotDeleteSelf);
    }

    // The delete itself reports whether the row existed; a separate
    // lookup would race a concurrent delete of the same account.
    let deleted = state.user_store.delete_user(&target).map_err(|e| {
        error!("User deletion failed: {}", e);
        AuthApiError::InternalError
    })?;
    if !deleted {
        return Err(AuthApiError::UserNotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_codes() {
        let cases = [
            (AuthApiError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthApiError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AuthApiError::WeakPassword, StatusCode::BAD_REQUEST),
            (AuthApiError::EmailTaken, StatusCode::CONFLICT),
            (AuthApiError::InvalidUserId, StatusCode::BAD_REQUEST),
            (AuthApiError::UserNotFound, StatusCode::NOT_FOUND),
            (AuthApiError::CannotDeleteSelf, StatusCode::BAD_REQUEST),
            (
                AuthApiError::InternalError,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
