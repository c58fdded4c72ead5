//! Coarse scope-wide roles for spaces and workspaces.
//!
//! Roles are a total order; variant order is precedence order so that
//! `Ord::max` picks the effective role when a user holds several through
//! direct and group membership. "No membership at all" is represented as
//! `Option::None` by the resolver, not as a sentinel variant.

use serde::{Deserialize, Serialize};

/// Role a principal holds inside a space.
///
/// Ordered least to most privileged: `Reader < Writer < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceRole {
    Reader,
    Writer,
    Admin,
}

/// Role a user holds in the workspace.
///
/// Ordered least to most privileged: `Member < Admin < Owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceRole {
    Member,
    Admin,
    Owner,
}

impl SpaceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpaceRole::Reader => "reader",
            SpaceRole::Writer => "writer",
            SpaceRole::Admin => "admin",
        }
    }
}

impl WorkspaceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceRole::Member => "member",
            WorkspaceRole::Admin => "admin",
            WorkspaceRole::Owner => "owner",
        }
    }

    /// Whether this role sits in the administrative tier of the workspace.
    pub fn is_admin_tier(&self) -> bool {
        matches!(self, WorkspaceRole::Admin | WorkspaceRole::Owner)
    }
}
