//! Account Models
//! Mission: Wire types for accounts and the session endpoints

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::roles::Role;

/// A marketplace account as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub user_type: Role,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Account view safe to return to clients (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub user_type: Role,
    pub created_at: String,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            user_type: user.user_type.clone(),
            created_at: user.created_at.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub user_type: Role,
}

/// Echo of the verified claims for `GET /api/auth/me`. Built straight from
/// the request context, never from a store lookup.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub email: String,
    pub user_type: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_response_drops_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "nadia@agency.example".to_string(),
            name: "Nadia".to_string(),
            password_hash: "bcrypt-hash-here".to_string(),
            user_type: Role::Agent,
            created_at: "2025-03-10T09:30:00Z".to_string(),
        };

        let response = UserResponse::from_user(&user);
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("nadia@agency.example"));
        assert!(json.contains(r#""user_type":"agent""#));
        assert!(!json.contains("bcrypt-hash-here"));
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn test_user_serialization_skips_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "dev@collabmarket.local".to_string(),
            name: "Dev".to_string(),
            password_hash: "secret-hash".to_string(),
            user_type: Role::Creator,
            created_at: "2025-03-10T09:30:00Z".to_string(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }

    #[test]
    fn test_create_user_request_parses_role_tag() {
        let body = r#"{"email":"kai@creators.example","name":"Kai","password":"hunter2hunter2","user_type":"creator"}"#;
        let req: CreateUserRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.user_type, Role::Creator);
    }
}
