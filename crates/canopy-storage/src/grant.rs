//! Grant storage - persisted explicit permission grants.

use std::sync::Arc;

use canopy_models::{Grant, GrantTarget, Principal};
use canopy_traits::{GrantStore, Result};
use redb::Database;

use crate::codec::{self, Table};

pub const GRANTS_TABLE: Table = Table::new("grants");

/// Grants keyed by grant id; the per-target queries scan and filter.
#[derive(Clone)]
pub struct GrantStorage {
    db: Arc<Database>,
}

impl GrantStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        codec::init_table(&db, GRANTS_TABLE)?;
        Ok(Self { db })
    }

    fn all(&self) -> Result<Vec<Grant>> {
        codec::scan(&self.db, GRANTS_TABLE)
    }
}

impl GrantStore for GrantStorage {
    fn grants_for_target(
        &self,
        target: &GrantTarget,
        user_id: &str,
        group_ids: &[String],
    ) -> Result<Vec<Grant>> {
        // Scoping is security-relevant: only this target, only this user or
        // one of their groups.
        Ok(self
            .all()?
            .into_iter()
            .filter(|g| &g.target == target)
            .filter(|g| match &g.principal {
                Principal::User(id) => id == user_id,
                Principal::Group(id) => group_ids.iter().any(|group| group == id),
            })
            .collect())
    }

    fn grants_for_page(&self, page_id: &str) -> Result<Vec<Grant>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|g| matches!(&g.target, GrantTarget::Page(id) if id == page_id))
            .collect())
    }

    fn grants_for_space(&self, space_id: &str) -> Result<Vec<Grant>> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|g| matches!(&g.target, GrantTarget::Space(id) if id == space_id))
            .collect())
    }

    fn find_grant(&self, grant_id: &str) -> Result<Option<Grant>> {
        codec::get(&self.db, GRANTS_TABLE, grant_id)
    }

    fn insert_grant(&self, grant: &Grant) -> Result<()> {
        codec::put(&self.db, GRANTS_TABLE, &grant.id, grant)
    }

    fn delete_grant(&self, grant_id: &str) -> Result<bool> {
        codec::remove(&self.db, GRANTS_TABLE, grant_id)
    }
}
