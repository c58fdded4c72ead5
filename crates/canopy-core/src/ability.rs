//! Ability derivation: role layer plus grant layer.

use std::sync::Arc;

use canopy_models::{
    Ability, Capability, GrantTarget, Page, PageCapability, SpaceCapability, SpaceRole,
    WorkspaceCapability,
};
use canopy_traits::{GrantStore, MembershipStore, ObjectStore, PermissionError, Result};
use tracing::debug;

use crate::resolver::RoleResolver;

/// Builds the capability set for one (user, target) pair.
///
/// Space admins receive the full fixed ability for the scope and bypass the
/// grant layer entirely — an intentional override, not a computed union.
/// Everyone else gets exactly the union of their applicable grants, mapped
/// through the closed capability vocabulary. Building is pure given the
/// store state: the same data always yields an equal ability.
pub struct AbilityBuilder {
    resolver: RoleResolver,
    memberships: Arc<dyn MembershipStore>,
    grants: Arc<dyn GrantStore>,
    objects: Arc<dyn ObjectStore>,
}

impl AbilityBuilder {
    pub fn new(
        memberships: Arc<dyn MembershipStore>,
        grants: Arc<dyn GrantStore>,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            resolver: RoleResolver::new(memberships.clone()),
            memberships,
            grants,
            objects,
        }
    }

    /// Ability on a page. Fails with `NotFound` if the page does not exist;
    /// a user with no role and no grants gets a valid empty ability.
    pub fn build_for_page(&self, user_id: &str, page_id: &str) -> Result<Ability<PageCapability>> {
        let page = self
            .objects
            .find_page(page_id)?
            .ok_or_else(|| PermissionError::not_found("page", page_id))?;
        self.build_for_page_record(user_id, &page)
    }

    /// Same as [`Self::build_for_page`] for callers that already hold the
    /// page record.
    pub fn build_for_page_record(
        &self,
        user_id: &str,
        page: &Page,
    ) -> Result<Ability<PageCapability>> {
        let role = self.resolver.resolve_space_role(user_id, &page.space_id)?;
        if role == Some(SpaceRole::Admin) {
            debug!(user_id, page_id = %page.id, "space admin override on page");
            return Ok(Ability::full());
        }

        let target = GrantTarget::Page(page.id.clone());
        self.grant_union(user_id, &target)
    }

    /// Ability on a space. Fails with `NotFound` if the space does not exist.
    pub fn build_for_space(
        &self,
        user_id: &str,
        space_id: &str,
    ) -> Result<Ability<SpaceCapability>> {
        if self.objects.find_space(space_id)?.is_none() {
            return Err(PermissionError::not_found("space", space_id));
        }

        let role = self.resolver.resolve_space_role(user_id, space_id)?;
        if role == Some(SpaceRole::Admin) {
            debug!(user_id, space_id, "space admin override");
            return Ok(Ability::full());
        }

        let target = GrantTarget::Space(space_id.to_string());
        self.grant_union(user_id, &target)
    }

    /// Workspace-level ability. Only the administrative tier (owner/admin)
    /// gets anything, and the only thing it gets is permission management —
    /// this ability is never a substitute for space- or page-level ones.
    pub fn build_for_workspace(
        &self,
        user_id: &str,
        workspace_id: &str,
    ) -> Result<Ability<WorkspaceCapability>> {
        let role = self.resolver.resolve_workspace_role(user_id, workspace_id)?;
        match role {
            Some(role) if role.is_admin_tier() => Ok(Ability::full()),
            _ => Ok(Ability::none()),
        }
    }

    /// Union the mapped capabilities of every grant applicable to the user
    /// on this target. Grants whose pair has no mapping for the target's
    /// scope cannot exist (rejected at write time), but are skipped here
    /// anyway rather than trusted.
    fn grant_union<C: Capability>(&self, user_id: &str, target: &GrantTarget) -> Result<Ability<C>> {
        let group_ids = self.memberships.group_ids(user_id)?;
        let grants = self.grants.grants_for_target(target, user_id, &group_ids)?;
        Ok(grants
            .iter()
            .filter_map(|g| C::from_grant(g.action, g.object))
            .collect())
    }
}
