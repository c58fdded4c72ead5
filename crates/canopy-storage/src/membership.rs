//! Membership storage - space roles, workspace roles and group membership.

use std::sync::Arc;

use canopy_models::{GroupMember, Principal, SpaceMember, SpaceRole, WorkspaceMember, WorkspaceRole};
use canopy_traits::{MembershipStore, Result};
use redb::Database;

use crate::codec::{self, Table};

pub const SPACE_MEMBERS_TABLE: Table = Table::new("space_members");
pub const WORKSPACE_MEMBERS_TABLE: Table = Table::new("workspace_members");
pub const GROUP_MEMBERS_TABLE: Table = Table::new("group_members");

/// Membership rows as maintained by the external membership system.
///
/// Keys are composite so that re-adding the same membership overwrites the
/// existing row: `{space_id}:{principal}`, `{workspace_id}:{user_id}` and
/// `{group_id}:{user_id}`.
#[derive(Clone)]
pub struct MembershipStorage {
    db: Arc<Database>,
}

impl MembershipStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        codec::init_table(&db, SPACE_MEMBERS_TABLE)?;
        codec::init_table(&db, WORKSPACE_MEMBERS_TABLE)?;
        codec::init_table(&db, GROUP_MEMBERS_TABLE)?;
        Ok(Self { db })
    }

    pub fn add_space_member(&self, member: &SpaceMember) -> Result<()> {
        let key = format!("{}:{}", member.space_id, member.principal.storage_key());
        codec::put(&self.db, SPACE_MEMBERS_TABLE, &key, member)
    }

    pub fn remove_space_member(&self, space_id: &str, principal: &Principal) -> Result<bool> {
        let key = format!("{}:{}", space_id, principal.storage_key());
        codec::remove(&self.db, SPACE_MEMBERS_TABLE, &key)
    }

    pub fn add_workspace_member(&self, member: &WorkspaceMember) -> Result<()> {
        let key = format!("{}:{}", member.workspace_id, member.user_id);
        codec::put(&self.db, WORKSPACE_MEMBERS_TABLE, &key, member)
    }

    pub fn add_group_member(&self, member: &GroupMember) -> Result<()> {
        let key = format!("{}:{}", member.group_id, member.user_id);
        codec::put(&self.db, GROUP_MEMBERS_TABLE, &key, member)
    }

    pub fn remove_group_member(&self, group_id: &str, user_id: &str) -> Result<bool> {
        let key = format!("{group_id}:{user_id}");
        codec::remove(&self.db, GROUP_MEMBERS_TABLE, &key)
    }
}

impl MembershipStore for MembershipStorage {
    fn space_roles(&self, user_id: &str, space_id: &str) -> Result<Vec<SpaceRole>> {
        let groups = self.group_ids(user_id)?;
        let members: Vec<SpaceMember> = codec::scan(&self.db, SPACE_MEMBERS_TABLE)?;

        let roles = members
            .into_iter()
            .filter(|m| m.space_id == space_id)
            .filter(|m| match &m.principal {
                Principal::User(id) => id == user_id,
                Principal::Group(id) => groups.iter().any(|g| g == id),
            })
            .map(|m| m.role)
            .collect();
        Ok(roles)
    }

    fn workspace_roles(&self, user_id: &str, workspace_id: &str) -> Result<Vec<WorkspaceRole>> {
        let members: Vec<WorkspaceMember> = codec::scan(&self.db, WORKSPACE_MEMBERS_TABLE)?;
        Ok(members
            .into_iter()
            .filter(|m| m.workspace_id == workspace_id && m.user_id == user_id)
            .map(|m| m.role)
            .collect())
    }

    fn group_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let members: Vec<GroupMember> = codec::scan(&self.db, GROUP_MEMBERS_TABLE)?;
        Ok(members
            .into_iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.group_id)
            .collect())
    }
}
