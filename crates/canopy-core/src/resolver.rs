//! Effective role resolution for spaces and workspaces.

use std::sync::Arc;

use canopy_models::{SpaceRole, WorkspaceRole};
use canopy_traits::{MembershipStore, Result};

/// Reduces a user's membership rows to one effective role per scope.
///
/// A user may hold several roles in the same scope — directly and through
/// any number of groups. Role precedence is a total order, so the effective
/// role is simply the maximum across all sources; equal duplicates collapse.
/// `None` means no membership at all and is treated as "no access" by the
/// ability layer.
pub struct RoleResolver {
    memberships: Arc<dyn MembershipStore>,
}

impl RoleResolver {
    pub fn new(memberships: Arc<dyn MembershipStore>) -> Self {
        Self { memberships }
    }

    pub fn resolve_space_role(&self, user_id: &str, space_id: &str) -> Result<Option<SpaceRole>> {
        let roles = self.memberships.space_roles(user_id, space_id)?;
        Ok(roles.into_iter().max())
    }

    pub fn resolve_workspace_role(
        &self,
        user_id: &str,
        workspace_id: &str,
    ) -> Result<Option<WorkspaceRole>> {
        let roles = self.memberships.workspace_roles(user_id, workspace_id)?;
        Ok(roles.into_iter().max())
    }
}
