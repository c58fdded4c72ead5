//! The engine facade: cached ability lookups, content filtering, and the
//! grant/block-sharing write paths with their cache invalidation.

use std::sync::Arc;

use canopy_models::{
    Ability, Block, BlockAction, BlockPermission, BlockPermissionLevel, BlockRole, Grant,
    GrantAction, GrantObject, GrantTarget, Page, PageCapability, Principal, SpaceCapability,
    WorkspaceCapability,
};
use canopy_storage::Storage;
use canopy_traits::{
    BlockPermissionStore, GrantStore, MembershipStore, ObjectStore, PermissionError, Result,
};
use tracing::info;

use crate::ability::AbilityBuilder;
use crate::cache::{AbilityCache, CachedAbility, ScopeKey};
use crate::config::PermissionConfig;
use crate::gate::BlockAccessGate;

/// Entry point for every permission question and permission-changing write.
///
/// Reads go through the ability cache; writes (grants, block sharing) go
/// straight to the stores and invalidate the affected target's cached
/// abilities so the change is visible immediately rather than after the
/// TTL.
pub struct PermissionCore {
    builder: AbilityBuilder,
    cache: AbilityCache,
    gate: BlockAccessGate,
    grants: Arc<dyn GrantStore>,
    block_permissions: Arc<dyn BlockPermissionStore>,
    objects: Arc<dyn ObjectStore>,
}

impl PermissionCore {
    pub fn new(
        memberships: Arc<dyn MembershipStore>,
        grants: Arc<dyn GrantStore>,
        block_permissions: Arc<dyn BlockPermissionStore>,
        objects: Arc<dyn ObjectStore>,
        config: PermissionConfig,
    ) -> Self {
        Self {
            builder: AbilityBuilder::new(memberships, grants.clone(), objects.clone()),
            cache: AbilityCache::new(config.ability_ttl()),
            gate: BlockAccessGate::new(block_permissions.clone()),
            grants,
            block_permissions,
            objects,
        }
    }

    /// Wire the engine over an opened [`Storage`].
    pub fn from_storage(storage: &Storage, config: PermissionConfig) -> Self {
        Self::new(
            Arc::new(storage.memberships.clone()),
            Arc::new(storage.grants.clone()),
            Arc::new(storage.block_permissions.clone()),
            Arc::new(storage.directory.clone()),
            config,
        )
    }

    // ── Ability reads ────────────────────────────────────────────────

    /// Cache is consulted before the page record: a hit within the TTL does
    /// no store reads at all, not even the existence check.
    pub fn page_ability(&self, user_id: &str, page_id: &str) -> Result<Ability<PageCapability>> {
        let key = ScopeKey::page(user_id, page_id);
        if let Some(CachedAbility::Page(ability)) = self.cache.get(&key) {
            return Ok(ability);
        }
        let page = self.require_page(page_id)?;
        let ability = self.builder.build_for_page_record(user_id, &page)?;
        self.cache.insert(key, CachedAbility::Page(ability.clone()));
        Ok(ability)
    }

    pub fn space_ability(&self, user_id: &str, space_id: &str) -> Result<Ability<SpaceCapability>> {
        let key = ScopeKey::space(user_id, space_id);
        if let Some(CachedAbility::Space(ability)) = self.cache.get(&key) {
            return Ok(ability);
        }
        let ability = self.builder.build_for_space(user_id, space_id)?;
        self.cache.insert(key, CachedAbility::Space(ability.clone()));
        Ok(ability)
    }

    pub fn workspace_ability(
        &self,
        user_id: &str,
        workspace_id: &str,
    ) -> Result<Ability<WorkspaceCapability>> {
        let key = ScopeKey::workspace(user_id, workspace_id);
        if let Some(CachedAbility::Workspace(ability)) = self.cache.get(&key) {
            return Ok(ability);
        }
        let ability = self.builder.build_for_workspace(user_id, workspace_id)?;
        self.cache
            .insert(key, CachedAbility::Workspace(ability.clone()));
        Ok(ability)
    }

    // ── Content access ───────────────────────────────────────────────

    /// The page's blocks with restricted ones redacted, in position order.
    ///
    /// The page creator always reads their own page; everyone else needs
    /// `ReadContent` or gets `Forbidden`. Redaction is only for users who
    /// can see the page but not every block.
    pub fn filter_content(&self, user_id: &str, page_id: &str) -> Result<Vec<Block>> {
        let page = self.require_page(page_id)?;
        if !self.can_read_page(user_id, &page)? {
            return Err(PermissionError::Forbidden);
        }
        let blocks = self.objects.blocks_for_page(page_id)?;
        self.gate.filter_blocks(user_id, &page, &blocks)
    }

    /// Ids of the blocks the user can read. A user who cannot read the page
    /// sees an empty list, not an error.
    pub fn list_visible_block_ids(&self, user_id: &str, page_id: &str) -> Result<Vec<String>> {
        let page = self.require_page(page_id)?;
        if !self.can_read_page(user_id, &page)? {
            return Ok(Vec::new());
        }
        let blocks = self.objects.blocks_for_page(page_id)?;
        self.gate.accessible_block_ids(user_id, &page, &blocks)
    }

    /// May the user perform `action` on one block of the page?
    pub fn can_act(
        &self,
        user_id: &str,
        page_id: &str,
        block_id: &str,
        action: BlockAction,
    ) -> Result<bool> {
        let page = self.require_page(page_id)?;
        let ability = self.cached_page_ability(user_id, &page)?;
        self.gate.can_act(user_id, &page, &ability, block_id, action)
    }

    // ── Block sharing ────────────────────────────────────────────────

    /// Seed owner rows for the page creator on every unrestricted block.
    /// Safe to call repeatedly; returns the number of rows written.
    pub fn record_initial_block_owners(&self, page_id: &str) -> Result<usize> {
        let page = self.require_page(page_id)?;
        let blocks = self.objects.blocks_for_page(page_id)?;
        self.gate.record_initial_owners(&page, &blocks)
    }

    /// Give `user_id` a block-level row. Only the page creator or a holder
    /// of page permission management may share; re-sharing the same
    /// (block, user) replaces the previous row.
    pub fn share_block(
        &self,
        actor_id: &str,
        page_id: &str,
        block_id: &str,
        user_id: &str,
        role: BlockRole,
        permission: BlockPermissionLevel,
    ) -> Result<BlockPermission> {
        let page = self.require_page(page_id)?;
        if page.creator_id != actor_id {
            let ability = self.cached_page_ability(actor_id, &page)?;
            if !ability.allows(PageCapability::ManagePermission) {
                return Err(PermissionError::Forbidden);
            }
        }
        let blocks = self.objects.blocks_for_page(page_id)?;
        if !blocks.iter().any(|b| b.id == block_id) {
            return Err(PermissionError::not_found("block", block_id));
        }

        let row = BlockPermission::new(page_id, block_id, user_id, role, permission);
        self.block_permissions.upsert_permission(&row)?;
        info!(actor_id, page_id, block_id, user_id, "shared block");
        Ok(row)
    }

    // ── Grant management ─────────────────────────────────────────────

    /// Record an explicit grant. The `(action, object)` pair must map into
    /// the target scope's capability vocabulary, and the target must exist.
    pub fn create_grant(
        &self,
        principal: Principal,
        target: GrantTarget,
        action: GrantAction,
        object: GrantObject,
        added_by: &str,
    ) -> Result<Grant> {
        let mappable = match &target {
            GrantTarget::Page(_) => {
                <PageCapability as canopy_models::Capability>::from_grant(action, object).is_some()
            }
            GrantTarget::Space(_) => {
                <SpaceCapability as canopy_models::Capability>::from_grant(action, object).is_some()
            }
        };
        if !mappable {
            return Err(PermissionError::InvalidGrant(format!(
                "{action:?} {object:?} has no meaning on this target"
            )));
        }
        match &target {
            GrantTarget::Page(id) => {
                self.require_page(id)?;
            }
            GrantTarget::Space(id) => {
                if self.objects.find_space(id)?.is_none() {
                    return Err(PermissionError::not_found("space", id));
                }
            }
        }

        let grant = Grant::new(principal, target, action, object, added_by);
        self.grants.insert_grant(&grant)?;
        self.cache.invalidate_target(grant.target.id());
        info!(grant_id = %grant.id, target_id = grant.target.id(), "grant created");
        Ok(grant)
    }

    /// Remove a grant by id, returning the removed record.
    pub fn delete_grant(&self, grant_id: &str) -> Result<Grant> {
        let grant = self
            .grants
            .find_grant(grant_id)?
            .ok_or_else(|| PermissionError::not_found("grant", grant_id))?;
        self.grants.delete_grant(grant_id)?;
        self.cache.invalidate_target(grant.target.id());
        info!(grant_id, target_id = grant.target.id(), "grant deleted");
        Ok(grant)
    }

    pub fn list_page_grants(&self, page_id: &str) -> Result<Vec<Grant>> {
        self.grants.grants_for_page(page_id)
    }

    pub fn list_space_grants(&self, space_id: &str) -> Result<Vec<Grant>> {
        self.grants.grants_for_space(space_id)
    }

    pub fn find_grant(&self, grant_id: &str) -> Result<Option<Grant>> {
        self.grants.find_grant(grant_id)
    }

    /// Drop every cached ability touching a target. Exposed for callers
    /// that change memberships outside this facade.
    pub fn invalidate_target(&self, target_id: &str) {
        self.cache.invalidate_target(target_id);
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Page-level read check: the creator unconditionally, anyone else via
    /// their computed ability.
    fn can_read_page(&self, user_id: &str, page: &Page) -> Result<bool> {
        if page.creator_id == user_id {
            return Ok(true);
        }
        let ability = self.cached_page_ability(user_id, page)?;
        Ok(ability.allows(PageCapability::ReadContent))
    }

    fn require_page(&self, page_id: &str) -> Result<Page> {
        self.objects
            .find_page(page_id)?
            .ok_or_else(|| PermissionError::not_found("page", page_id))
    }

    fn cached_page_ability(&self, user_id: &str, page: &Page) -> Result<Ability<PageCapability>> {
        let key = ScopeKey::page(user_id, &page.id);
        if let Some(CachedAbility::Page(ability)) = self.cache.get(&key) {
            return Ok(ability);
        }
        let ability = self.builder.build_for_page_record(user_id, page)?;
        self.cache.insert(key, CachedAbility::Page(ability.clone()));
        Ok(ability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        MemoryBlockPermissionStore, MemoryGrantStore, MemoryMembershipStore, MemoryObjectStore,
    };
    use canopy_models::{Space, SpaceRole};
    use serde_json::json;
    use std::sync::atomic::Ordering;

    struct Fixture {
        memberships: Arc<MemoryMembershipStore>,
        blocks: Arc<MemoryBlockPermissionStore>,
        objects: Arc<MemoryObjectStore>,
        core: PermissionCore,
        space: Space,
        page: Page,
    }

    fn fixture_with_config(config: PermissionConfig) -> Fixture {
        let memberships = Arc::new(MemoryMembershipStore::new());
        let grants = Arc::new(MemoryGrantStore::new());
        let blocks = Arc::new(MemoryBlockPermissionStore::new());
        let objects = Arc::new(MemoryObjectStore::new());

        let space = Space::new("w1");
        let page = Page::new(&space.id, "creator");
        objects.add_space(space.clone());
        objects.add_page(page.clone());

        let core = PermissionCore::new(
            memberships.clone(),
            grants.clone(),
            blocks.clone(),
            objects.clone(),
            config,
        );
        Fixture {
            memberships,
            blocks,
            objects,
            core,
            space,
            page,
        }
    }

    fn fixture() -> Fixture {
        fixture_with_config(PermissionConfig::default())
    }

    fn add_block(f: &Fixture, id: &str, position: i64) {
        f.objects.add_block(Block {
            id: id.to_string(),
            page_id: f.page.id.clone(),
            block_type: "paragraph".to_string(),
            content: json!({ "text": id }),
            position,
        });
    }

    #[test]
    fn test_second_read_within_ttl_does_no_store_reads() {
        let f = fixture();
        f.memberships
            .add_space_member(&f.space.id, Principal::user("alice"), SpaceRole::Admin);

        let first = f.core.page_ability("alice", &f.page.id).unwrap();
        let membership_reads = f.memberships.read_calls.load(Ordering::SeqCst);
        let object_reads = f.objects.read_calls.load(Ordering::SeqCst);

        // The hit answers from the cache alone: no membership lookup and no
        // page existence check.
        let second = f.core.page_ability("alice", &f.page.id).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            f.memberships.read_calls.load(Ordering::SeqCst),
            membership_reads
        );
        assert_eq!(f.objects.read_calls.load(Ordering::SeqCst), object_reads);
    }

    #[test]
    fn test_creator_reads_own_page_without_grants() {
        let f = fixture();
        add_block(&f, "b1", 0);

        // No membership, no grant: authorship alone is enough to read.
        let content = f.core.filter_content("creator", &f.page.id).unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0].content, json!({ "text": "b1" }));

        let ids = f.core.list_visible_block_ids("creator", &f.page.id).unwrap();
        assert_eq!(ids, vec!["b1".to_string()]);
    }

    #[test]
    fn test_zero_ttl_recomputes_every_read() {
        let f = fixture_with_config(PermissionConfig { ability_ttl_ms: 0 });
        f.core.page_ability("alice", &f.page.id).unwrap();
        let reads = f.memberships.read_calls.load(Ordering::SeqCst);
        f.core.page_ability("alice", &f.page.id).unwrap();
        assert!(f.memberships.read_calls.load(Ordering::SeqCst) > reads);
    }

    #[test]
    fn test_create_grant_invalidates_cached_ability() {
        let f = fixture();
        // Cache alice's empty ability first.
        let before = f.core.page_ability("alice", &f.page.id).unwrap();
        assert!(before.is_empty());

        f.core
            .create_grant(
                Principal::user("alice"),
                GrantTarget::Page(f.page.id.clone()),
                GrantAction::Read,
                GrantObject::Content,
                "admin",
            )
            .unwrap();

        // Visible immediately, well before the TTL would expire the entry.
        let after = f.core.page_ability("alice", &f.page.id).unwrap();
        assert!(after.allows(PageCapability::ReadContent));
    }

    #[test]
    fn test_delete_grant_invalidates_cached_ability() {
        let f = fixture();
        let grant = f
            .core
            .create_grant(
                Principal::user("alice"),
                GrantTarget::Page(f.page.id.clone()),
                GrantAction::Read,
                GrantObject::Content,
                "admin",
            )
            .unwrap();
        assert!(f
            .core
            .page_ability("alice", &f.page.id)
            .unwrap()
            .allows(PageCapability::ReadContent));

        let removed = f.core.delete_grant(&grant.id).unwrap();
        assert_eq!(removed.id, grant.id);
        assert!(f.core.page_ability("alice", &f.page.id).unwrap().is_empty());
    }

    #[test]
    fn test_create_grant_rejects_unmappable_pair() {
        let f = fixture();
        // Create/Page only means something at space scope.
        let err = f
            .core
            .create_grant(
                Principal::user("alice"),
                GrantTarget::Page(f.page.id.clone()),
                GrantAction::Create,
                GrantObject::Page,
                "admin",
            )
            .unwrap_err();
        assert!(matches!(err, PermissionError::InvalidGrant(_)));
        assert!(f.core.list_page_grants(&f.page.id).unwrap().is_empty());
    }

    #[test]
    fn test_create_grant_requires_existing_target() {
        let f = fixture();
        let err = f
            .core
            .create_grant(
                Principal::user("alice"),
                GrantTarget::Page("missing".to_string()),
                GrantAction::Read,
                GrantObject::Content,
                "admin",
            )
            .unwrap_err();
        assert!(matches!(err, PermissionError::NotFound { kind: "page", .. }));
    }

    #[test]
    fn test_delete_missing_grant_is_not_found() {
        let f = fixture();
        let err = f.core.delete_grant("missing").unwrap_err();
        assert!(matches!(
            err,
            PermissionError::NotFound { kind: "grant", .. }
        ));
    }

    #[test]
    fn test_filter_content_forbidden_without_read() {
        let f = fixture();
        add_block(&f, "b1", 0);
        let err = f.core.filter_content("alice", &f.page.id).unwrap_err();
        assert!(matches!(err, PermissionError::Forbidden));

        // The visible-ids variant degrades to empty instead.
        let ids = f.core.list_visible_block_ids("alice", &f.page.id).unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn test_filter_content_redacts_for_reader() {
        let f = fixture();
        add_block(&f, "b1", 0);
        add_block(&f, "b2", 1);
        f.core
            .create_grant(
                Principal::user("alice"),
                GrantTarget::Page(f.page.id.clone()),
                GrantAction::Read,
                GrantObject::Content,
                "admin",
            )
            .unwrap();
        f.core
            .share_block(
                "creator",
                &f.page.id,
                "b2",
                "bob",
                BlockRole::Reader,
                BlockPermissionLevel::Read,
            )
            .unwrap();

        let content = f.core.filter_content("alice", &f.page.id).unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content[0].content, json!({ "text": "b1" }));
        assert_eq!(content[1].content, canopy_models::restricted_placeholder());
    }

    #[test]
    fn test_share_block_requires_creator_or_manager() {
        let f = fixture();
        add_block(&f, "b1", 0);

        let err = f
            .core
            .share_block(
                "alice",
                &f.page.id,
                "b1",
                "bob",
                BlockRole::Reader,
                BlockPermissionLevel::Read,
            )
            .unwrap_err();
        assert!(matches!(err, PermissionError::Forbidden));

        // Space admin holds ManagePermission and may share.
        f.memberships
            .add_space_member(&f.space.id, Principal::user("alice"), SpaceRole::Admin);
        f.core.invalidate_target(&f.page.id);
        f.core
            .share_block(
                "alice",
                &f.page.id,
                "b1",
                "bob",
                BlockRole::Reader,
                BlockPermissionLevel::Read,
            )
            .unwrap();
        assert_eq!(f.blocks.row_count(), 1);
    }

    #[test]
    fn test_share_block_missing_block_is_not_found() {
        let f = fixture();
        let err = f
            .core
            .share_block(
                "creator",
                &f.page.id,
                "missing",
                "bob",
                BlockRole::Reader,
                BlockPermissionLevel::Read,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            PermissionError::NotFound { kind: "block", .. }
        ));
    }

    #[test]
    fn test_can_act_on_missing_page_is_not_found() {
        let f = fixture();
        let err = f
            .core
            .can_act("alice", "missing", "b1", BlockAction::Read)
            .unwrap_err();
        assert!(matches!(err, PermissionError::NotFound { kind: "page", .. }));
    }

    #[test]
    fn test_record_initial_owners_via_facade() {
        let f = fixture();
        add_block(&f, "b1", 0);
        add_block(&f, "b2", 1);

        assert_eq!(f.core.record_initial_block_owners(&f.page.id).unwrap(), 2);
        assert_eq!(f.core.record_initial_block_owners(&f.page.id).unwrap(), 0);
        assert_eq!(f.blocks.row_count(), 2);
    }

    #[test]
    fn test_space_and_workspace_abilities_cached_separately() {
        let f = fixture();
        f.memberships
            .add_space_member(&f.space.id, Principal::user("alice"), SpaceRole::Admin);
        f.memberships.add_workspace_member(
            "w1",
            "alice",
            canopy_models::WorkspaceRole::Owner,
        );

        let space = f.core.space_ability("alice", &f.space.id).unwrap();
        assert!(space.allows(SpaceCapability::ManageSpace));

        let workspace = f.core.workspace_ability("alice", "w1").unwrap();
        assert!(workspace.allows(WorkspaceCapability::ManagePermission));

        // A cached space entry must never answer a workspace lookup.
        let bob = f.core.workspace_ability("bob", "w1").unwrap();
        assert!(bob.is_empty());
    }
}
