//! Storage abstraction for reelog.
//!
//! Backend crates (e.g., reelog-store-sqlite) implement the [`Store`] trait so
//! `reelog-core` doesn't depend on any specific database engine or schema details.
//!
//! All default reads are soft-delete-aware: rows with a `deleted_at` timestamp
//! are invisible unless a method explicitly says otherwise.

use thiserror::Error;

pub mod store;
pub mod types;

pub use store::Store;
pub use types::*;

/// Uniform error type for all storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("conflict")]
    Conflict,
    #[error("backend error: {0}")]
    Backend(String),
}
