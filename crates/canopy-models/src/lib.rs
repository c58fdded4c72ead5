//! Canopy Models - Shared permission-domain types.
//!
//! This crate defines the data model the permission engine operates on:
//! roles, capabilities, abilities, grants, block permissions and the minimal
//! directory records (pages, spaces, membership rows) the engine reads.
//!
//! Everything here is plain data: serde-derived, no I/O, no policy logic
//! beyond the closed capability mappings. The engine lives in `canopy-core`,
//! persistence in `canopy-storage`.

pub mod ability;
pub mod block;
pub mod capability;
pub mod grant;
pub mod membership;
pub mod page;
pub mod role;

pub use ability::Ability;
pub use block::{
    Block, BlockAction, BlockPermission, BlockPermissionLevel, BlockRole, restricted_placeholder,
};
pub use capability::{
    Capability, GrantAction, GrantObject, PageCapability, ScopeType, SpaceCapability,
    WorkspaceCapability,
};
pub use grant::{Grant, GrantTarget, Principal};
pub use membership::{GroupMember, SpaceMember, WorkspaceMember};
pub use page::{Page, Space};
pub use role::{SpaceRole, WorkspaceRole};
