//! Creator Directory
//! Mission: Browseable creator listing with contact details gated by role

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;
use uuid::Uuid;

use crate::auth::middleware::extract_current_user;
use crate::auth::roles::Role;
use crate::auth::user_store::UserStore;
use crate::cache::ExpiringCache;

#[derive(Clone)]
pub struct DirectoryState {
    store: Arc<UserStore>,
    listing_cache: Arc<ExpiringCache<Role, Vec<DirectoryEntry>>>,
}

impl DirectoryState {
    pub fn new(store: Arc<UserStore>, cache_ttl: Duration) -> Self {
        Self {
            store,
            listing_cache: Arc::new(ExpiringCache::new(cache_ttl)),
        }
    }
}

// Cached listing row. Caller-specific shaping happens at response time so
// one cached listing serves both anonymous and identified requests.
#[derive(Debug, Clone)]
struct DirectoryEntry {
    id: String,
    name: String,
    email: String,
}

#[derive(Debug, Serialize)]
pub struct CreatorListing {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DirectoryResponse {
    pub count: usize,
    pub authenticated: bool,
    pub creators: Vec<CreatorListing>,
}

#[derive(Debug, Serialize)]
pub struct CreatorProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub user_type: Role,
    pub created_at: String,
}

#[derive(Debug)]
pub enum DirectoryError {
    Database(anyhow::Error),
    InvalidCreatorId,
    CreatorNotFound,
}

impl From<anyhow::Error> for DirectoryError {
    fn from(err: anyhow::Error) -> Self {
        DirectoryError::Database(err)
    }
}

impl IntoResponse for DirectoryError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            DirectoryError::Database(e) => {
                error!("Directory query failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
            DirectoryError::InvalidCreatorId => (
                StatusCode::BAD_REQUEST,
                "invalid_creator_id",
                "Creator id must be a UUID",
            ),
            DirectoryError::CreatorNotFound => (
                StatusCode::NOT_FOUND,
                "creator_not_found",
                "No creator with this id",
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

/// GET /api/directory/creators
///
/// Open to everyone; sits behind the optional auth layer. Identified
/// callers additionally get each creator's contact email. The listing is
/// served from the expiring cache and refilled on miss.
pub async fn list_creators(
    State(state): State<DirectoryState>,
    req: Request,
) -> Result<Json<DirectoryResponse>, DirectoryError> {
    let authenticated = extract_current_user(&req).is_some();

    let entries = match state.listing_cache.get(&Role::Creator) {
        Some(cached) => cached,
        None => {
            let fresh: Vec<DirectoryEntry> = state
                .store
                .list_users_by_role(&Role::Creator)?
                .into_iter()
                .map(|user| DirectoryEntry {
                    id: user.id.to_string(),
                    name: user.name,
                    email: user.email,
                })
                .collect();
            state.listing_cache.insert(Role::Creator, fresh.clone());
            fresh
        }
    };

    let creators: Vec<CreatorListing> = entries
        .into_iter()
        .map(|entry| CreatorListing {
            id: entry.id,
            name: entry.name,
            email: authenticated.then_some(entry.email),
        })
        .collect();

    Ok(Json(DirectoryResponse {
        count: creators.len(),
        authenticated,
        creators,
    }))
}

/// GET /api/directory/creators/:id
///
/// Full contact profile. The route layer restricts this to brand, agent,
/// admin and super-admin callers; only creator accounts are resolvable.
pub async fn creator_profile(
    State(state): State<DirectoryState>,
    Path(creator_id): Path<String>,
) -> Result<Json<CreatorProfile>, DirectoryError> {
    let id = Uuid::parse_str(&creator_id).map_err(|_| DirectoryError::InvalidCreatorId)?;

    let user = state
        .store
        .get_user_by_id(&id)?
        .ok_or(DirectoryError::CreatorNotFound)?;

    if user.user_type != Role::Creator {
        // Non-creator accounts are not part of the directory.
        return Err(DirectoryError::CreatorNotFound);
    }

    Ok(Json(CreatorProfile {
        id: user.id.to_string(),
        name: user.name,
        email: user.email,
        user_type: user.user_type,
        created_at: user.created_at,
    }))
}
