//! Membership rows supplied by the external membership system.
//!
//! The engine only reads these; creating and updating them happens outside
//! the core when workspace/space membership changes.

use serde::{Deserialize, Serialize};

use crate::grant::Principal;
use crate::role::{SpaceRole, WorkspaceRole};

/// A principal's role in a space. A user can hold several of these at once
/// (directly and through groups); the resolver reduces them to one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceMember {
    pub space_id: String,
    pub principal: Principal,
    pub role: SpaceRole,
}

/// A user's role in a workspace. Workspace membership is per-user only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceMember {
    pub workspace_id: String,
    pub user_id: String,
    pub role: WorkspaceRole,
}

/// One user's membership in one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub group_id: String,
    pub user_id: String,
}
