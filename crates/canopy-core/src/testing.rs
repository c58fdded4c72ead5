//! In-memory stub stores for tests.
//!
//! Each stub counts its read calls (for cache-bound assertions) and can be
//! switched into a failing mode to exercise the fail-closed path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use canopy_models::{
    Block, BlockPermission, Grant, GrantTarget, GroupMember, Page, Principal, Space, SpaceMember,
    SpaceRole, WorkspaceMember, WorkspaceRole,
};
use canopy_traits::{
    BlockPermissionStore, GrantStore, MembershipStore, ObjectStore, PermissionError, Result,
};
use parking_lot::Mutex;

fn store_failure() -> PermissionError {
    PermissionError::store(anyhow::anyhow!("stub store in failing mode"))
}

// ── MemoryMembershipStore ────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryMembershipStore {
    space_members: Mutex<Vec<SpaceMember>>,
    workspace_members: Mutex<Vec<WorkspaceMember>>,
    group_members: Mutex<Vec<GroupMember>>,
    pub read_calls: AtomicUsize,
    pub failing: AtomicBool,
}

impl MemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_space_member(&self, space_id: &str, principal: Principal, role: SpaceRole) {
        self.space_members.lock().push(SpaceMember {
            space_id: space_id.to_string(),
            principal,
            role,
        });
    }

    pub fn add_workspace_member(&self, workspace_id: &str, user_id: &str, role: WorkspaceRole) {
        self.workspace_members.lock().push(WorkspaceMember {
            workspace_id: workspace_id.to_string(),
            user_id: user_id.to_string(),
            role,
        });
    }

    pub fn add_group_member(&self, group_id: &str, user_id: &str) {
        self.group_members.lock().push(GroupMember {
            group_id: group_id.to_string(),
            user_id: user_id.to_string(),
        });
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(store_failure());
        }
        Ok(())
    }
}

impl MembershipStore for MemoryMembershipStore {
    fn space_roles(&self, user_id: &str, space_id: &str) -> Result<Vec<SpaceRole>> {
        self.check()?;
        let groups: Vec<String> = self
            .group_members
            .lock()
            .iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.group_id.clone())
            .collect();
        Ok(self
            .space_members
            .lock()
            .iter()
            .filter(|m| m.space_id == space_id)
            .filter(|m| match &m.principal {
                Principal::User(id) => id == user_id,
                Principal::Group(id) => groups.iter().any(|g| g == id),
            })
            .map(|m| m.role)
            .collect())
    }

    fn workspace_roles(&self, user_id: &str, workspace_id: &str) -> Result<Vec<WorkspaceRole>> {
        self.check()?;
        Ok(self
            .workspace_members
            .lock()
            .iter()
            .filter(|m| m.workspace_id == workspace_id && m.user_id == user_id)
            .map(|m| m.role)
            .collect())
    }

    fn group_ids(&self, user_id: &str) -> Result<Vec<String>> {
        self.check()?;
        Ok(self
            .group_members
            .lock()
            .iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.group_id.clone())
            .collect())
    }
}

// ── MemoryGrantStore ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryGrantStore {
    grants: Mutex<Vec<Grant>>,
    pub read_calls: AtomicUsize,
    pub failing: AtomicBool,
}

impl MemoryGrantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(store_failure());
        }
        Ok(())
    }
}

impl GrantStore for MemoryGrantStore {
    fn grants_for_target(
        &self,
        target: &GrantTarget,
        user_id: &str,
        group_ids: &[String],
    ) -> Result<Vec<Grant>> {
        self.check()?;
        Ok(self
            .grants
            .lock()
            .iter()
            .filter(|g| &g.target == target)
            .filter(|g| match &g.principal {
                Principal::User(id) => id == user_id,
                Principal::Group(id) => group_ids.iter().any(|group| group == id),
            })
            .cloned()
            .collect())
    }

    fn grants_for_page(&self, page_id: &str) -> Result<Vec<Grant>> {
        self.check()?;
        Ok(self
            .grants
            .lock()
            .iter()
            .filter(|g| matches!(&g.target, GrantTarget::Page(id) if id == page_id))
            .cloned()
            .collect())
    }

    fn grants_for_space(&self, space_id: &str) -> Result<Vec<Grant>> {
        self.check()?;
        Ok(self
            .grants
            .lock()
            .iter()
            .filter(|g| matches!(&g.target, GrantTarget::Space(id) if id == space_id))
            .cloned()
            .collect())
    }

    fn find_grant(&self, grant_id: &str) -> Result<Option<Grant>> {
        self.check()?;
        Ok(self
            .grants
            .lock()
            .iter()
            .find(|g| g.id == grant_id)
            .cloned())
    }

    fn insert_grant(&self, grant: &Grant) -> Result<()> {
        self.grants.lock().push(grant.clone());
        Ok(())
    }

    fn delete_grant(&self, grant_id: &str) -> Result<bool> {
        let mut grants = self.grants.lock();
        let before = grants.len();
        grants.retain(|g| g.id != grant_id);
        Ok(grants.len() < before)
    }
}

// ── MemoryBlockPermissionStore ───────────────────────────────────────

#[derive(Default)]
pub struct MemoryBlockPermissionStore {
    rows: Mutex<Vec<BlockPermission>>,
    pub read_calls: AtomicUsize,
}

impl MemoryBlockPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().len()
    }
}

impl BlockPermissionStore for MemoryBlockPermissionStore {
    fn permissions_for_page(&self, page_id: &str) -> Result<Vec<BlockPermission>> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .lock()
            .iter()
            .filter(|p| p.page_id == page_id)
            .cloned()
            .collect())
    }

    fn permissions_for_block(&self, page_id: &str, block_id: &str) -> Result<Vec<BlockPermission>> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .lock()
            .iter()
            .filter(|p| p.page_id == page_id && p.block_id == block_id)
            .cloned()
            .collect())
    }

    fn permission_for_user(
        &self,
        page_id: &str,
        block_id: &str,
        user_id: &str,
    ) -> Result<Option<BlockPermission>> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .lock()
            .iter()
            .find(|p| p.page_id == page_id && p.block_id == block_id && p.user_id == user_id)
            .cloned())
    }

    fn upsert_permission(&self, permission: &BlockPermission) -> Result<()> {
        let mut rows = self.rows.lock();
        rows.retain(|p| {
            !(p.page_id == permission.page_id
                && p.block_id == permission.block_id
                && p.user_id == permission.user_id)
        });
        rows.push(permission.clone());
        Ok(())
    }
}

// ── MemoryObjectStore ────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryObjectStore {
    pages: Mutex<HashMap<String, Page>>,
    spaces: Mutex<HashMap<String, Space>>,
    blocks: Mutex<Vec<Block>>,
    pub read_calls: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&self, page: Page) {
        self.pages.lock().insert(page.id.clone(), page);
    }

    pub fn add_space(&self, space: Space) {
        self.spaces.lock().insert(space.id.clone(), space);
    }

    pub fn add_block(&self, block: Block) {
        self.blocks.lock().push(block);
    }
}

impl ObjectStore for MemoryObjectStore {
    fn find_page(&self, page_id: &str) -> Result<Option<Page>> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pages.lock().get(page_id).cloned())
    }

    fn find_space(&self, space_id: &str) -> Result<Option<Space>> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.spaces.lock().get(space_id).cloned())
    }

    fn blocks_for_page(&self, page_id: &str) -> Result<Vec<Block>> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        let mut blocks: Vec<Block> = self
            .blocks
            .lock()
            .iter()
            .filter(|b| b.page_id == page_id)
            .cloned()
            .collect();
        blocks.sort_by_key(|b| b.position);
        Ok(blocks)
    }
}
