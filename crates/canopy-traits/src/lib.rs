//! Canopy Traits - Store abstractions the permission engine runs against.
//!
//! The engine in `canopy-core` never touches a database directly; it reads
//! roles, grants, block permissions and directory records through the traits
//! defined here. `canopy-storage` provides the embedded implementations,
//! and tests substitute in-memory stubs (including call-counting ones for
//! cache-bound properties).

pub mod error;
pub mod store;

pub use error::{PermissionError, Result};
pub use store::{BlockPermissionStore, GrantStore, MembershipStore, ObjectStore};
