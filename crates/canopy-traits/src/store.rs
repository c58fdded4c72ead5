//! Store traits consumed by the permission engine.
//!
//! All reads are point lookups or small scans; implementations only promise
//! snapshot consistency with the latest committed writes visible to the
//! read. Every method can fail with [`crate::PermissionError::Store`], which
//! the engine treats as a deny.

use canopy_models::{
    Block, BlockPermission, Grant, GrantTarget, Page, Space, SpaceRole, WorkspaceRole,
};

use crate::error::Result;

// ── MembershipStore ──────────────────────────────────────────────────

/// Read-only view over space/workspace membership.
pub trait MembershipStore: Send + Sync {
    /// Every space role the user holds, directly or through any group they
    /// belong to. Duplicates are fine; the resolver reduces to the maximum.
    fn space_roles(&self, user_id: &str, space_id: &str) -> Result<Vec<SpaceRole>>;

    /// Every workspace role the user holds. Workspace membership is
    /// per-user, so this is at most one row in practice.
    fn workspace_roles(&self, user_id: &str, workspace_id: &str) -> Result<Vec<WorkspaceRole>>;

    /// Ids of all groups the user belongs to.
    fn group_ids(&self, user_id: &str) -> Result<Vec<String>>;
}

// ── GrantStore ───────────────────────────────────────────────────────

/// Persisted explicit grants.
///
/// `grants_for_target` is authorization-relevant: returning grants for other
/// targets or other principals is a security bug, not a functional one.
pub trait GrantStore: Send + Sync {
    /// Grants on `target` held by the user directly or by any of the given
    /// groups. Must never return grants for other targets or principals.
    fn grants_for_target(
        &self,
        target: &GrantTarget,
        user_id: &str,
        group_ids: &[String],
    ) -> Result<Vec<Grant>>;

    /// All grants on a page, any principal. Management listing only.
    fn grants_for_page(&self, page_id: &str) -> Result<Vec<Grant>>;

    /// All grants on a space, any principal. Management listing only.
    fn grants_for_space(&self, space_id: &str) -> Result<Vec<Grant>>;

    fn find_grant(&self, grant_id: &str) -> Result<Option<Grant>>;

    fn insert_grant(&self, grant: &Grant) -> Result<()>;

    /// Delete by id; returns whether the grant existed.
    fn delete_grant(&self, grant_id: &str) -> Result<bool>;
}

// ── BlockPermissionStore ─────────────────────────────────────────────

/// Per-block, per-user access rows.
pub trait BlockPermissionStore: Send + Sync {
    fn permissions_for_page(&self, page_id: &str) -> Result<Vec<BlockPermission>>;

    fn permissions_for_block(&self, page_id: &str, block_id: &str) -> Result<Vec<BlockPermission>>;

    fn permission_for_user(
        &self,
        page_id: &str,
        block_id: &str,
        user_id: &str,
    ) -> Result<Option<BlockPermission>>;

    /// Insert or update on the `(page_id, block_id, user_id)` triple.
    /// Re-saving the same triple replaces the row, never duplicates it.
    fn upsert_permission(&self, permission: &BlockPermission) -> Result<()>;
}

// ── ObjectStore ──────────────────────────────────────────────────────

/// Existence and directory lookups for the objects permissions attach to.
pub trait ObjectStore: Send + Sync {
    fn find_page(&self, page_id: &str) -> Result<Option<Page>>;

    fn find_space(&self, space_id: &str) -> Result<Option<Space>>;

    /// The blocks of a page in position order.
    fn blocks_for_page(&self, page_id: &str) -> Result<Vec<Block>>;
}
