//! Startup Configuration
//! Mission: Read the environment exactly once into an immutable config
//! object

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::env;
use std::path::{Path, PathBuf};
use tracing::warn;

const DEV_JWT_SECRET: &str = "dev-secret-change-in-production-minimum-32-characters";

/// Everything the service needs from the environment, captured at boot.
///
/// Downstream code receives this struct (or values copied out of it) and
/// never reads the environment itself. In particular the token verifier is
/// constructed from `jwt_secret` once; changing the variable after startup
/// has no effect until restart.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub auth_db_path: String,
    pub directory_cache_ttl_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("⚠️  JWT_SECRET not set - using the dev secret, DO NOT deploy like this");
            DEV_JWT_SECRET.to_string()
        });

        let token_ttl_secs = env::var("TOKEN_TTL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<i64>()
            .context("Invalid TOKEN_TTL_SECS")?;

        let auth_db_path =
            resolve_data_path(env::var("AUTH_DB_PATH").ok(), "collabmarket_auth.db");

        let directory_cache_ttl_secs = env::var("DIRECTORY_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .context("Invalid DIRECTORY_CACHE_TTL_SECS")?;

        Ok(Self {
            bind_addr,
            jwt_secret,
            token_ttl_secs,
            auth_db_path,
            directory_cache_ttl_secs,
        })
    }
}

pub fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the crate dir .env (common when running with
    // --manifest-path from elsewhere). CARGO_MANIFEST_DIR is fixed at
    // compile time.
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let candidates = [manifest_dir.join(".env"), manifest_dir.join("../.env")];

    for p in candidates {
        if p.exists() {
            let _ = dotenv::from_path(&p);
        }
    }
}

fn default_data_path(filename: &str) -> String {
    // Anchor defaults to the crate directory so running from another cwd
    // doesn't silently create a second empty database.
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    base.join(filename).to_string_lossy().to_string()
}

fn resolve_data_path(env_value: Option<String>, default_filename: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let Some(raw) = env_value.filter(|v| !v.trim().is_empty()) else {
        return default_data_path(default_filename);
    };

    let p = PathBuf::from(raw);
    if p.is_absolute() {
        return p.to_string_lossy().to_string();
    }

    base.join(p).to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_data_path_anchors_defaults() {
        let resolved = resolve_data_path(None, "auth.db");
        assert!(Path::new(&resolved).is_absolute());
        assert!(resolved.ends_with("auth.db"));
    }

    #[test]
    fn test_resolve_data_path_keeps_absolute_paths() {
        let resolved = resolve_data_path(Some("/var/lib/collabmarket/auth.db".to_string()), "x.db");
        assert_eq!(resolved, "/var/lib/collabmarket/auth.db");
    }

    #[test]
    fn test_resolve_data_path_treats_blank_as_unset() {
        let resolved = resolve_data_path(Some("   ".to_string()), "auth.db");
        assert!(resolved.ends_with("auth.db"));
    }
}
