//! JWT Session Tokens
//! Mission: Issue and verify the short-lived bearer tokens behind every
//! authenticated request

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::auth::models::User;
use crate::auth::roles::Role;

/// Claims carried inside every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id (UUID as string)
    pub sub: String,
    /// Account email at issue time
    pub email: String,
    /// Role tag at issue time
    pub user_type: Role,
    /// Expiry (unix seconds)
    pub exp: usize,
    /// Issued-at (unix seconds)
    pub iat: usize,
}

/// Why a token failed verification. The HTTP layer maps all three
/// variants to 403; the split exists for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Signed with a different secret, or the signature was tampered with
    InvalidSignature,
    /// `exp` is in the past (no leeway)
    Expired,
    /// Not a parseable JWT at all, or an unacceptable header/payload
    Malformed,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::InvalidSignature => write!(f, "token signature is invalid"),
            TokenError::Expired => write!(f, "token has expired"),
            TokenError::Malformed => write!(f, "token is malformed"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Issues and verifies session tokens with a single symmetric secret.
///
/// The secret and lifetime are injected once at construction; verification
/// never consults the environment, so two services built with the same
/// inputs accept exactly the same tokens.
pub struct TokenService {
    secret: String,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: String, ttl_secs: i64) -> Self {
        Self { secret, ttl_secs }
    }

    /// Sign a token for `user`. Returns the token and its lifetime in
    /// seconds, ready for a login response.
    pub fn issue(&self, user: &User) -> Result<(String, i64)> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::seconds(self.ttl_secs))
            .context("Invalid expiration timestamp")?
            .timestamp() as usize;

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            user_type: user.user_type.clone(),
            exp: expiration,
            iat: now.timestamp() as usize,
        };

        debug!(user = %user.email, role = user.user_type.as_str(), "Issuing session token");

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign session token")?;

        Ok((token, self.ttl_secs))
    }

    /// Verify a token and return its claims.
    ///
    /// Expiry is checked against the wall clock with zero leeway: a token
    /// is valid strictly until its `exp` second and rejected after.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        })?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            email: "casey@brandlift.example".to_string(),
            name: "Casey".to_string(),
            password_hash: "hash".to_string(),
            user_type: role,
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let service = TokenService::new("test-secret-key-for-round-trips".to_string(), 3600);
        let user = test_user(Role::Brand);

        let (token, expires_in) = service.issue(&user).unwrap();
        assert_eq!(expires_in, 3600);

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.user_type, Role::Brand);
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let service = TokenService::new("test-secret-key".to_string(), 3600);

        assert_eq!(service.verify("not-a-jwt"), Err(TokenError::Malformed));
        assert_eq!(service.verify(""), Err(TokenError::Malformed));
        assert_eq!(
            service.verify("aaaa.bbbb.cccc"),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_foreign_secret_is_rejected() {
        let ours = TokenService::new("secret-a-secret-a-secret-a".to_string(), 3600);
        let theirs = TokenService::new("secret-b-secret-b-secret-b".to_string(), 3600);
        let user = test_user(Role::Agent);

        let (token, _) = theirs.issue(&user).unwrap();
        assert_eq!(ours.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Negative lifetime puts `exp` in the past at issue time.
        let service = TokenService::new("test-secret-key".to_string(), -120);
        let user = test_user(Role::Creator);

        let (token, _) = service.issue(&user).unwrap();
        assert_eq!(service.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let service = TokenService::new("test-secret-key".to_string(), 3600);
        let user = test_user(Role::Creator);

        let (token, _) = service.issue(&user).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);

        // Swap in a forged payload; the original signature no longer matches.
        let forged = jsonwebtoken::encode(
            &Header::default(),
            &Claims {
                sub: user.id.to_string(),
                email: user.email.clone(),
                user_type: Role::SuperAdmin,
                exp: (Utc::now().timestamp() + 3600) as usize,
                iat: Utc::now().timestamp() as usize,
            },
            &EncodingKey::from_secret("another-secret".as_bytes()),
        )
        .unwrap();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        parts[1] = forged_parts[1];
        let tampered = parts.join(".");

        assert_eq!(service.verify(&tampered), Err(TokenError::InvalidSignature));
    }
}
