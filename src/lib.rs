//! CollabMarket authentication service.
//!
//! JWT session issuing and verification, bearer-token middleware with a
//! non-blocking variant, literal role sets with no hierarchy, and the
//! SQLite account store behind them. `app::build_router` assembles the
//! whole HTTP surface and is shared by the binary and the integration
//! tests.

pub mod api;
pub mod app;
pub mod auth;
pub mod cache;
pub mod config;
pub mod middleware;
