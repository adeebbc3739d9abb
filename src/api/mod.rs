//! Marketplace API surface beyond the auth endpoints.

pub mod directory;

pub use directory::{DirectoryError, DirectoryState};
