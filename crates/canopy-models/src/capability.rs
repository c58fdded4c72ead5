//! Closed capability vocabulary per scope type.
//!
//! A grant stores an `(action, object)` pair from a small closed vocabulary.
//! Each scope type has its own capability enum, and the pair-to-capability
//! mapping is a total function returning `Option` — a pair with no mapping
//! is invalid for that target type and is rejected when the grant is
//! created. This keeps invalid combinations out of the engine entirely
//! instead of validating strings at evaluation time.

use serde::{Deserialize, Serialize};

/// The three nested permission scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeType {
    Page,
    Space,
    Workspace,
}

impl ScopeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeType::Page => "page",
            ScopeType::Space => "space",
            ScopeType::Workspace => "workspace",
        }
    }
}

/// Action half of a grant's capability pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantAction {
    Manage,
    Create,
    Read,
    Edit,
    Delete,
}

/// Object half of a grant's capability pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantObject {
    Content,
    Page,
    Space,
    Permission,
    Members,
}

/// A capability enum for one scope type.
///
/// Implementors are fieldless enums whose variants enumerate every right
/// that exists at that scope. `from_grant` maps a stored `(action, object)`
/// pair onto a variant; `as_pair` is the inverse, used when an ability is
/// serialized as a flat list of string pairs.
pub trait Capability: Copy + Eq + Ord + std::fmt::Debug + 'static {
    /// Scope this capability family belongs to.
    const SCOPE: ScopeType;

    /// Every capability defined for this scope, in a stable order.
    const ALL: &'static [Self];

    /// Map a grant pair to a capability; `None` means the pair is invalid
    /// for this scope type.
    fn from_grant(action: GrantAction, object: GrantObject) -> Option<Self>
    where
        Self: Sized;

    /// The `(action, object)` pair this capability serializes to.
    fn as_pair(self) -> (GrantAction, GrantObject);
}

/// Rights on a single page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageCapability {
    ReadContent,
    EditContent,
    DeletePage,
    ManagePage,
    ManagePermission,
}

impl Capability for PageCapability {
    const SCOPE: ScopeType = ScopeType::Page;

    const ALL: &'static [Self] = &[
        PageCapability::ReadContent,
        PageCapability::EditContent,
        PageCapability::DeletePage,
        PageCapability::ManagePage,
        PageCapability::ManagePermission,
    ];

    fn from_grant(action: GrantAction, object: GrantObject) -> Option<Self> {
        match (action, object) {
            (GrantAction::Read, GrantObject::Content) => Some(PageCapability::ReadContent),
            (GrantAction::Edit, GrantObject::Content) => Some(PageCapability::EditContent),
            (GrantAction::Delete, GrantObject::Page) => Some(PageCapability::DeletePage),
            (GrantAction::Manage, GrantObject::Page) => Some(PageCapability::ManagePage),
            (GrantAction::Manage, GrantObject::Permission) => {
                Some(PageCapability::ManagePermission)
            }
            _ => None,
        }
    }

    fn as_pair(self) -> (GrantAction, GrantObject) {
        match self {
            PageCapability::ReadContent => (GrantAction::Read, GrantObject::Content),
            PageCapability::EditContent => (GrantAction::Edit, GrantObject::Content),
            PageCapability::DeletePage => (GrantAction::Delete, GrantObject::Page),
            PageCapability::ManagePage => (GrantAction::Manage, GrantObject::Page),
            PageCapability::ManagePermission => (GrantAction::Manage, GrantObject::Permission),
        }
    }
}

/// Rights within a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceCapability {
    CreatePage,
    EditPage,
    ViewSpace,
    DeleteSpace,
    ManageSpace,
    ManageMembers,
    ManagePermission,
}

impl Capability for SpaceCapability {
    const SCOPE: ScopeType = ScopeType::Space;

    const ALL: &'static [Self] = &[
        SpaceCapability::CreatePage,
        SpaceCapability::EditPage,
        SpaceCapability::ViewSpace,
        SpaceCapability::DeleteSpace,
        SpaceCapability::ManageSpace,
        SpaceCapability::ManageMembers,
        SpaceCapability::ManagePermission,
    ];

    fn from_grant(action: GrantAction, object: GrantObject) -> Option<Self> {
        match (action, object) {
            (GrantAction::Create, GrantObject::Page) => Some(SpaceCapability::CreatePage),
            (GrantAction::Edit, GrantObject::Page) => Some(SpaceCapability::EditPage),
            (GrantAction::Read, GrantObject::Space) => Some(SpaceCapability::ViewSpace),
            (GrantAction::Delete, GrantObject::Space) => Some(SpaceCapability::DeleteSpace),
            (GrantAction::Manage, GrantObject::Space) => Some(SpaceCapability::ManageSpace),
            (GrantAction::Manage, GrantObject::Members) => Some(SpaceCapability::ManageMembers),
            (GrantAction::Manage, GrantObject::Permission) => {
                Some(SpaceCapability::ManagePermission)
            }
            _ => None,
        }
    }

    fn as_pair(self) -> (GrantAction, GrantObject) {
        match self {
            SpaceCapability::CreatePage => (GrantAction::Create, GrantObject::Page),
            SpaceCapability::EditPage => (GrantAction::Edit, GrantObject::Page),
            SpaceCapability::ViewSpace => (GrantAction::Read, GrantObject::Space),
            SpaceCapability::DeleteSpace => (GrantAction::Delete, GrantObject::Space),
            SpaceCapability::ManageSpace => (GrantAction::Manage, GrantObject::Space),
            SpaceCapability::ManageMembers => (GrantAction::Manage, GrantObject::Members),
            SpaceCapability::ManagePermission => (GrantAction::Manage, GrantObject::Permission),
        }
    }
}

/// Rights at the workspace level.
///
/// Deliberately minimal: the workspace ability only ever carries permission
/// management for the administrative tier and is not a substitute for
/// space- or page-level abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceCapability {
    ManagePermission,
}

impl Capability for WorkspaceCapability {
    const SCOPE: ScopeType = ScopeType::Workspace;

    const ALL: &'static [Self] = &[WorkspaceCapability::ManagePermission];

    fn from_grant(action: GrantAction, object: GrantObject) -> Option<Self> {
        match (action, object) {
            (GrantAction::Manage, GrantObject::Permission) => {
                Some(WorkspaceCapability::ManagePermission)
            }
            _ => None,
        }
    }

    fn as_pair(self) -> (GrantAction, GrantObject) {
        match self {
            WorkspaceCapability::ManagePermission => (GrantAction::Manage, GrantObject::Permission),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_pair_mapping_round_trips() {
        for cap in PageCapability::ALL {
            let (action, object) = cap.as_pair();
            assert_eq!(PageCapability::from_grant(action, object), Some(*cap));
        }
    }

    #[test]
    fn test_space_pair_mapping_round_trips() {
        for cap in SpaceCapability::ALL {
            let (action, object) = cap.as_pair();
            assert_eq!(SpaceCapability::from_grant(action, object), Some(*cap));
        }
    }

    #[test]
    fn test_invalid_pairs_have_no_mapping() {
        // "create content" exists in no scope's vocabulary.
        assert_eq!(
            PageCapability::from_grant(GrantAction::Create, GrantObject::Content),
            None
        );
        // "delete members" is likewise undefined.
        assert_eq!(
            SpaceCapability::from_grant(GrantAction::Delete, GrantObject::Members),
            None
        );
        // A space-shaped pair is invalid against a page target.
        assert_eq!(
            PageCapability::from_grant(GrantAction::Create, GrantObject::Page),
            None
        );
    }

    #[test]
    fn test_workspace_vocabulary_is_manage_permission_only() {
        assert_eq!(WorkspaceCapability::ALL.len(), 1);
        assert_eq!(
            WorkspaceCapability::from_grant(GrantAction::Manage, GrantObject::Permission),
            Some(WorkspaceCapability::ManagePermission)
        );
        assert_eq!(
            WorkspaceCapability::from_grant(GrantAction::Read, GrantObject::Content),
            None
        );
    }
}
