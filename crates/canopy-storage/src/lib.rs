//! Canopy Storage - Embedded persistence for permission records.
//!
//! Uses redb as the embedded database with one table per entity type.
//! Records are stored as serde_json bytes keyed by id (or by composite key
//! where the entity has a natural unique tuple). The storage structs
//! implement the `canopy-traits` store traits; the engine in `canopy-core`
//! only ever sees those traits.
//!
//! # Tables
//!
//! - `spaces`, `pages`, `page_blocks` - directory records
//! - `space_members`, `workspace_members`, `group_members` - membership rows
//! - `grants` - explicit permission grants, keyed by grant id
//! - `block_permissions` - per-block rows, keyed by `(page, block, user)`

pub mod block_permission;
pub mod directory;
pub mod grant;
pub mod membership;

mod codec;

use std::sync::Arc;

use canopy_traits::Result;
use redb::Database;
use tracing::debug;

pub use block_permission::BlockPermissionStorage;
pub use directory::DirectoryStorage;
pub use grant::GrantStorage;
pub use membership::MembershipStorage;

/// Central storage manager that initializes all permission tables.
pub struct Storage {
    db: Arc<Database>,
    pub memberships: MembershipStorage,
    pub grants: GrantStorage,
    pub block_permissions: BlockPermissionStorage,
    pub directory: DirectoryStorage,
}

impl Storage {
    /// Open (or create) the database at the given path and initialize all
    /// required tables.
    pub fn new(path: &str) -> Result<Self> {
        let db = Arc::new(Database::create(path).map_err(canopy_traits::PermissionError::store)?);
        debug!(path, "opened permission database");
        Self::with_db(db)
    }

    /// Build a storage instance over an already-open database.
    pub fn with_db(db: Arc<Database>) -> Result<Self> {
        let memberships = MembershipStorage::new(db.clone())?;
        let grants = GrantStorage::new(db.clone())?;
        let block_permissions = BlockPermissionStorage::new(db.clone())?;
        let directory = DirectoryStorage::new(db.clone())?;

        Ok(Self {
            db,
            memberships,
            grants,
            block_permissions,
            directory,
        })
    }

    /// Get a reference to the underlying database.
    pub fn get_db(&self) -> Arc<Database> {
        self.db.clone()
    }
}
