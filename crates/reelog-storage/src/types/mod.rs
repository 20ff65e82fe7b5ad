//! Type definitions for reelog storage.

mod groups;
mod ids;
mod roles;
mod users;
mod watches;

// Re-export all types from submodules
pub use groups::*;
pub use ids::*;
pub use roles::*;
pub use users::*;
pub use watches::*;
