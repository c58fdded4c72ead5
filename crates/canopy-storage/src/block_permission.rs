//! Block permission storage - per-block, per-user access rows.

use std::sync::Arc;

use canopy_models::BlockPermission;
use canopy_traits::{BlockPermissionStore, Result};
use redb::Database;

use crate::codec::{self, Table};

pub const BLOCK_PERMISSIONS_TABLE: Table = Table::new("block_permissions");

/// Rows keyed by the unique `(page_id, block_id, user_id)` triple, so an
/// upsert on the same triple replaces the existing row instead of
/// duplicating it.
#[derive(Clone)]
pub struct BlockPermissionStorage {
    db: Arc<Database>,
}

impl BlockPermissionStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        codec::init_table(&db, BLOCK_PERMISSIONS_TABLE)?;
        Ok(Self { db })
    }

    fn triple_key(page_id: &str, block_id: &str, user_id: &str) -> String {
        format!("{page_id}:{block_id}:{user_id}")
    }
}

impl BlockPermissionStore for BlockPermissionStorage {
    fn permissions_for_page(&self, page_id: &str) -> Result<Vec<BlockPermission>> {
        let rows: Vec<BlockPermission> = codec::scan(&self.db, BLOCK_PERMISSIONS_TABLE)?;
        Ok(rows.into_iter().filter(|p| p.page_id == page_id).collect())
    }

    fn permissions_for_block(&self, page_id: &str, block_id: &str) -> Result<Vec<BlockPermission>> {
        let rows: Vec<BlockPermission> = codec::scan(&self.db, BLOCK_PERMISSIONS_TABLE)?;
        Ok(rows
            .into_iter()
            .filter(|p| p.page_id == page_id && p.block_id == block_id)
            .collect())
    }

    fn permission_for_user(
        &self,
        page_id: &str,
        block_id: &str,
        user_id: &str,
    ) -> Result<Option<BlockPermission>> {
        let key = Self::triple_key(page_id, block_id, user_id);
        codec::get(&self.db, BLOCK_PERMISSIONS_TABLE, &key)
    }

    fn upsert_permission(&self, permission: &BlockPermission) -> Result<()> {
        let key = Self::triple_key(
            &permission.page_id,
            &permission.block_id,
            &permission.user_id,
        );
        codec::put(&self.db, BLOCK_PERMISSIONS_TABLE, &key, permission)
    }
}
