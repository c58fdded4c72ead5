//! Block-level access gating within a page.

use std::collections::HashMap;
use std::sync::Arc;

use canopy_models::{
    Ability, Block, BlockAction, BlockPermission, BlockPermissionLevel, Page, PageCapability,
};
use canopy_traits::{BlockPermissionStore, Result};
use tracing::debug;

/// Narrows access inside a page the caller can already reach.
///
/// A block with no permission rows is open to everyone who can read the
/// page. Once any row exists, only users with a row at the required level
/// (or the page creator) get through. Rows can therefore only restrict,
/// never widen, what the page-level ability allows.
pub struct BlockAccessGate {
    block_permissions: Arc<dyn BlockPermissionStore>,
}

impl BlockAccessGate {
    pub fn new(block_permissions: Arc<dyn BlockPermissionStore>) -> Self {
        Self { block_permissions }
    }

    /// Does `user_id` hold at least `required` on one block?
    ///
    /// The page creator always passes. Otherwise the user's own row decides,
    /// and an unrestricted block (zero rows) is open at every level.
    pub fn block_access_allowed(
        &self,
        user_id: &str,
        page: &Page,
        block_id: &str,
        required: BlockPermissionLevel,
    ) -> Result<bool> {
        if page.creator_id == user_id {
            return Ok(true);
        }
        if let Some(row) = self
            .block_permissions
            .permission_for_user(&page.id, block_id, user_id)?
        {
            return Ok(row.permission >= required);
        }
        let rows = self.block_permissions.permissions_for_block(&page.id, block_id)?;
        Ok(rows.is_empty())
    }

    /// Replace unreadable blocks with their redacted form, preserving order
    /// and count so positions stay meaningful to the caller.
    pub fn filter_blocks(&self, user_id: &str, page: &Page, blocks: &[Block]) -> Result<Vec<Block>> {
        let by_block = self.rows_by_block(&page.id)?;
        let mut out = Vec::with_capacity(blocks.len());
        let mut hidden = 0usize;
        for block in blocks {
            if self.readable(user_id, page, block, &by_block) {
                out.push(block.clone());
            } else {
                hidden += 1;
                out.push(block.redacted());
            }
        }
        if hidden > 0 {
            debug!(user_id, page_id = %page.id, hidden, "redacted restricted blocks");
        }
        Ok(out)
    }

    /// Ids of the blocks the user can read, in page order.
    pub fn accessible_block_ids(
        &self,
        user_id: &str,
        page: &Page,
        blocks: &[Block],
    ) -> Result<Vec<String>> {
        let by_block = self.rows_by_block(&page.id)?;
        Ok(blocks
            .iter()
            .filter(|b| self.readable(user_id, page, b, &by_block))
            .map(|b| b.id.clone())
            .collect())
    }

    /// Combine the page-level ability with the block-level row for one
    /// concrete action.
    ///
    /// Moving is editing (a move rewrites the block's position), and page
    /// delete rights extend to every block on the page regardless of rows.
    pub fn can_act(
        &self,
        user_id: &str,
        page: &Page,
        ability: &Ability<PageCapability>,
        block_id: &str,
        action: BlockAction,
    ) -> Result<bool> {
        match action {
            BlockAction::Read => {
                if !ability.allows(PageCapability::ReadContent) {
                    return Ok(false);
                }
                self.block_access_allowed(user_id, page, block_id, BlockPermissionLevel::Read)
            }
            BlockAction::Edit | BlockAction::Move => {
                if !ability.allows(PageCapability::EditContent) {
                    return Ok(false);
                }
                self.block_access_allowed(user_id, page, block_id, BlockPermissionLevel::Edit)
            }
            BlockAction::Delete => {
                if ability.allows(PageCapability::DeletePage) {
                    return Ok(true);
                }
                if !ability.allows(PageCapability::EditContent) {
                    return Ok(false);
                }
                self.block_access_allowed(user_id, page, block_id, BlockPermissionLevel::Owner)
            }
        }
    }

    /// Seed an owner row for the page creator on every still-unrestricted
    /// block. Blocks that already carry rows are left alone, so running this
    /// twice writes nothing the second time. Returns how many rows were
    /// written.
    pub fn record_initial_owners(&self, page: &Page, blocks: &[Block]) -> Result<usize> {
        let by_block = self.rows_by_block(&page.id)?;
        let mut written = 0usize;
        for block in blocks {
            if by_block.contains_key(block.id.as_str()) {
                continue;
            }
            let row = BlockPermission::implicit_owner(&page.id, &block.id, &page.creator_id);
            self.block_permissions.upsert_permission(&row)?;
            written += 1;
        }
        Ok(written)
    }

    fn rows_by_block(&self, page_id: &str) -> Result<HashMap<String, Vec<BlockPermission>>> {
        let mut by_block: HashMap<String, Vec<BlockPermission>> = HashMap::new();
        for row in self.block_permissions.permissions_for_page(page_id)? {
            by_block.entry(row.block_id.clone()).or_default().push(row);
        }
        Ok(by_block)
    }

    fn readable(
        &self,
        user_id: &str,
        page: &Page,
        block: &Block,
        by_block: &HashMap<String, Vec<BlockPermission>>,
    ) -> bool {
        if page.creator_id == user_id {
            return true;
        }
        match by_block.get(block.id.as_str()) {
            None => true,
            Some(rows) => rows
                .iter()
                .any(|r| r.user_id == user_id && r.permission >= BlockPermissionLevel::Read),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryBlockPermissionStore;
    use canopy_models::{restricted_placeholder, BlockRole};
    use serde_json::json;

    struct Fixture {
        store: Arc<MemoryBlockPermissionStore>,
        gate: BlockAccessGate,
        page: Page,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryBlockPermissionStore::new());
        let gate = BlockAccessGate::new(store.clone());
        let page = Page::new("s1", "creator");
        Fixture { store, gate, page }
    }

    fn block(page: &Page, id: &str, position: i64) -> Block {
        Block {
            id: id.to_string(),
            page_id: page.id.clone(),
            block_type: "paragraph".to_string(),
            content: json!({ "text": format!("block {id}") }),
            position,
        }
    }

    fn grant(f: &Fixture, block_id: &str, user_id: &str, level: BlockPermissionLevel) {
        f.store
            .upsert_permission(&BlockPermission::new(
                &f.page.id,
                block_id,
                user_id,
                BlockRole::Writer,
                level,
            ))
            .unwrap();
    }

    #[test]
    fn test_unrestricted_block_is_open() {
        let f = fixture();
        assert!(f
            .gate
            .block_access_allowed("alice", &f.page, "b1", BlockPermissionLevel::Owner)
            .unwrap());
    }

    #[test]
    fn test_restricted_block_requires_a_row() {
        let f = fixture();
        grant(&f, "b1", "alice", BlockPermissionLevel::Read);

        assert!(f
            .gate
            .block_access_allowed("alice", &f.page, "b1", BlockPermissionLevel::Read)
            .unwrap());
        assert!(!f
            .gate
            .block_access_allowed("alice", &f.page, "b1", BlockPermissionLevel::Edit)
            .unwrap());
        assert!(!f
            .gate
            .block_access_allowed("bob", &f.page, "b1", BlockPermissionLevel::Read)
            .unwrap());
    }

    #[test]
    fn test_creator_bypasses_rows() {
        let f = fixture();
        grant(&f, "b1", "alice", BlockPermissionLevel::Owner);

        assert!(f
            .gate
            .block_access_allowed("creator", &f.page, "b1", BlockPermissionLevel::Owner)
            .unwrap());
    }

    #[test]
    fn test_filter_blocks_redacts_in_place() {
        let f = fixture();
        let blocks = vec![block(&f.page, "b1", 0), block(&f.page, "b2", 1)];
        grant(&f, "b2", "bob", BlockPermissionLevel::Read);

        let filtered = f.gate.filter_blocks("alice", &f.page, &blocks).unwrap();
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].content, blocks[0].content);
        assert_eq!(filtered[1].content, restricted_placeholder());
        assert_eq!(filtered[1].id, "b2");

        // Bob's row lets him through; alice only sees the open block.
        let ids = f
            .gate
            .accessible_block_ids("bob", &f.page, &blocks)
            .unwrap();
        assert_eq!(ids, vec!["b1".to_string(), "b2".to_string()]);
        let ids = f
            .gate
            .accessible_block_ids("alice", &f.page, &blocks)
            .unwrap();
        assert_eq!(ids, vec!["b1".to_string()]);
    }

    #[test]
    fn test_can_act_requires_page_capability_first() {
        let f = fixture();
        let no_read: Ability<PageCapability> = Ability::none();
        assert!(!f
            .gate
            .can_act("alice", &f.page, &no_read, "b1", BlockAction::Read)
            .unwrap());

        let read_only: Ability<PageCapability> =
            [PageCapability::ReadContent].into_iter().collect();
        assert!(f
            .gate
            .can_act("alice", &f.page, &read_only, "b1", BlockAction::Read)
            .unwrap());
        assert!(!f
            .gate
            .can_act("alice", &f.page, &read_only, "b1", BlockAction::Edit)
            .unwrap());
    }

    #[test]
    fn test_move_requires_edit_level() {
        let f = fixture();
        let editor: Ability<PageCapability> =
            [PageCapability::ReadContent, PageCapability::EditContent]
                .into_iter()
                .collect();
        grant(&f, "b1", "alice", BlockPermissionLevel::Read);

        assert!(!f
            .gate
            .can_act("alice", &f.page, &editor, "b1", BlockAction::Move)
            .unwrap());

        grant(&f, "b1", "alice", BlockPermissionLevel::Edit);
        assert!(f
            .gate
            .can_act("alice", &f.page, &editor, "b1", BlockAction::Move)
            .unwrap());
    }

    #[test]
    fn test_delete_needs_owner_row_or_page_delete() {
        let f = fixture();
        let editor: Ability<PageCapability> =
            [PageCapability::ReadContent, PageCapability::EditContent]
                .into_iter()
                .collect();
        grant(&f, "b1", "alice", BlockPermissionLevel::Edit);

        assert!(!f
            .gate
            .can_act("alice", &f.page, &editor, "b1", BlockAction::Delete)
            .unwrap());

        grant(&f, "b1", "alice", BlockPermissionLevel::Owner);
        assert!(f
            .gate
            .can_act("alice", &f.page, &editor, "b1", BlockAction::Delete)
            .unwrap());

        // Page-level delete overrides block rows entirely.
        let deleter: Ability<PageCapability> =
            [PageCapability::DeletePage].into_iter().collect();
        assert!(f
            .gate
            .can_act("bob", &f.page, &deleter, "b1", BlockAction::Delete)
            .unwrap());
    }

    #[test]
    fn test_record_initial_owners_is_idempotent() {
        let f = fixture();
        let blocks = vec![block(&f.page, "b1", 0), block(&f.page, "b2", 1)];
        grant(&f, "b2", "bob", BlockPermissionLevel::Read);

        let written = f.gate.record_initial_owners(&f.page, &blocks).unwrap();
        assert_eq!(written, 1);
        let row = f
            .store
            .permission_for_user(&f.page.id, "b1", "creator")
            .unwrap()
            .unwrap();
        assert_eq!(row.permission, BlockPermissionLevel::Owner);

        // Second run finds rows everywhere and writes nothing.
        let written = f.gate.record_initial_owners(&f.page, &blocks).unwrap();
        assert_eq!(written, 0);
    }
}
