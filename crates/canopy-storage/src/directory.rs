//! Directory storage - pages, spaces and page blocks.
//!
//! Page and block CRUD proper lives with the page service outside this
//! core; these tables carry the records the engine needs for existence
//! checks, creator lookups and block listing, plus the write paths the
//! external persist flow calls.

use std::sync::Arc;

use canopy_models::{Block, Page, Space};
use canopy_traits::{ObjectStore, Result};
use redb::Database;

use crate::codec::{self, Table};

pub const PAGES_TABLE: Table = Table::new("pages");
pub const SPACES_TABLE: Table = Table::new("spaces");
pub const PAGE_BLOCKS_TABLE: Table = Table::new("page_blocks");

#[derive(Clone)]
pub struct DirectoryStorage {
    db: Arc<Database>,
}

impl DirectoryStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        codec::init_table(&db, PAGES_TABLE)?;
        codec::init_table(&db, SPACES_TABLE)?;
        codec::init_table(&db, PAGE_BLOCKS_TABLE)?;
        Ok(Self { db })
    }

    pub fn put_page(&self, page: &Page) -> Result<()> {
        codec::put(&self.db, PAGES_TABLE, &page.id, page)
    }

    pub fn put_space(&self, space: &Space) -> Result<()> {
        codec::put(&self.db, SPACES_TABLE, &space.id, space)
    }

    /// Persist one block. Blocks are keyed by block id; saving the same id
    /// again replaces the record.
    pub fn put_block(&self, block: &Block) -> Result<()> {
        codec::put(&self.db, PAGE_BLOCKS_TABLE, &block.id, block)
    }

    pub fn delete_block(&self, block_id: &str) -> Result<bool> {
        codec::remove(&self.db, PAGE_BLOCKS_TABLE, block_id)
    }
}

impl ObjectStore for DirectoryStorage {
    fn find_page(&self, page_id: &str) -> Result<Option<Page>> {
        codec::get(&self.db, PAGES_TABLE, page_id)
    }

    fn find_space(&self, space_id: &str) -> Result<Option<Space>> {
        codec::get(&self.db, SPACES_TABLE, space_id)
    }

    fn blocks_for_page(&self, page_id: &str) -> Result<Vec<Block>> {
        let blocks: Vec<Block> = codec::scan(&self.db, PAGE_BLOCKS_TABLE)?;
        let mut blocks: Vec<Block> = blocks
            .into_iter()
            .filter(|b| b.page_id == page_id)
            .collect();
        blocks.sort_by_key(|b| b.position);
        Ok(blocks)
    }
}
