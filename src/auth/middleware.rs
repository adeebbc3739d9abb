//! Request Gate
//! Mission: Authenticate bearer tokens, populate the request context, and
//! gate routes by role

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

use crate::auth::jwt::{Claims, TokenError, TokenService};
use crate::auth::roles::Role;

/// Identity attached to a request after its token verified.
///
/// Either the whole struct is present in the request extensions or nothing
/// is; downstream code never sees a partially-populated identity.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub user_type: Role,
}

impl CurrentUser {
    fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.sub.clone(),
            email: claims.email.clone(),
            user_type: claims.user_type.clone(),
        }
    }
}

/// Gate failures, rendered as `{"error", "message"}` JSON.
///
/// 401 means "no usable credentials were presented"; 403 means
/// "credentials were presented and judged insufficient".
#[derive(Debug)]
pub enum AuthError {
    /// No `Authorization` header, or one without the `Bearer ` scheme
    MissingCredentials,
    /// A role-gated route was reached with no identity in the context
    MissingIdentity,
    /// The bearer token failed verification
    TokenRejected(TokenError),
    /// The caller's role is not in the route's allowed set
    RoleNotAllowed { allowed: &'static [Role] },
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AuthError::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Missing or malformed Authorization header; expected `Bearer <token>`".to_string(),
            ),
            AuthError::MissingIdentity => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required".to_string(),
            ),
            AuthError::TokenRejected(TokenError::Expired) => (
                StatusCode::FORBIDDEN,
                "token_expired",
                "Session token has expired, log in again".to_string(),
            ),
            AuthError::TokenRejected(reason) => (
                StatusCode::FORBIDDEN,
                "invalid_token",
                format!("Session token rejected: {}", reason),
            ),
            AuthError::RoleNotAllowed { allowed } => {
                let roles = allowed
                    .iter()
                    .map(|r| r.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                (
                    StatusCode::FORBIDDEN,
                    "forbidden",
                    format!("Access restricted to roles: {}", roles),
                )
            }
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

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Blocking authentication. Rejects the request unless a valid bearer
/// token is presented; on success the verified identity is inserted into
/// the request extensions before the inner handler runs.
pub async fn auth_middleware(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers()).ok_or(AuthError::MissingCredentials)?;

    let claims = tokens.verify(token).map_err(|e| {
        debug!(path = %req.uri().path(), reason = %e, "Rejected session token");
        AuthError::TokenRejected(e)
    })?;

    req.extensions_mut().insert(CurrentUser::from_claims(&claims));

    Ok(next.run(req).await)
}

/// Non-blocking variant for routes that personalize but do not require
/// login. A valid token attaches an identity; anything else (absent
/// header, wrong scheme, failed verification) falls through to an
/// anonymous request. Never produces an error response.
pub async fn optional_auth_middleware(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(req.headers()) {
        match tokens.verify(token) {
            Ok(claims) => {
                req.extensions_mut().insert(CurrentUser::from_claims(&claims));
            }
            Err(e) => {
                debug!(path = %req.uri().path(), reason = %e, "Optional auth falling back to anonymous");
            }
        }
    }
    next.run(req).await
}

/// Role gate factory. The returned middleware admits only callers whose
/// role appears in `allowed`; pair it with [`auth_middleware`] layered
/// outside so that the identity is populated first.
///
/// Membership is literal. A route for admins and super-admins takes
/// `&[Role::Admin, Role::SuperAdmin]`; neither tag stands in for the other.
pub fn require_role(
    allowed: &'static [Role],
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Response> + Send>> + Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let Some(user) = req.extensions().get::<CurrentUser>() else {
                return AuthError::MissingIdentity.into_response();
            };

            if !allowed.contains(&user.user_type) {
                debug!(
                    user = %user.id,
                    role = user.user_type.as_str(),
                    "Role gate refused request"
                );
                return AuthError::RoleNotAllowed { allowed }.into_response();
            }

            next.run(req).await
        })
    }
}

/// Read the authenticated identity off a request, if one was attached.
pub fn extract_current_user(req: &Request) -> Option<&CurrentUser> {
    req.extensions().get::<CurrentUser>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_auth_error_status_codes() {
        let missing = AuthError::MissingCredentials.into_response();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let anonymous = AuthError::MissingIdentity.into_response();
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let expired = AuthError::TokenRejected(TokenError::Expired).into_response();
        assert_eq!(expired.status(), StatusCode::FORBIDDEN);

        let bad_signature =
            AuthError::TokenRejected(TokenError::InvalidSignature).into_response();
        assert_eq!(bad_signature.status(), StatusCode::FORBIDDEN);

        let wrong_role = AuthError::RoleNotAllowed {
            allowed: crate::auth::roles::ADMIN_ROLES,
        }
        .into_response();
        assert_eq!(wrong_role.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwdw==".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        // Scheme is case-sensitive and the space is required.
        headers.insert(header::AUTHORIZATION, "bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_extract_current_user() {
        let mut req = Request::new(Body::empty());
        assert!(extract_current_user(&req).is_none());

        req.extensions_mut().insert(CurrentUser {
            id: "7c9e6679-7425-40de-944b-e07fc1f90ae7".to_string(),
            email: "mira@brandlift.example".to_string(),
            user_type: Role::Brand,
        });

        let user = extract_current_user(&req).unwrap();
        assert_eq!(user.email, "mira@brandlift.example");
        assert_eq!(user.user_type, Role::Brand);
    }
}
