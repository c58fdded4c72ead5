//! Content blocks and per-block access rows.

use serde::{Deserialize, Serialize};

/// A content block inside a page.
///
/// Content is opaque to the permission engine: the engine either passes it
/// through unchanged or replaces it with the restricted placeholder. The
/// structural fields (id, type, position) always survive redaction so the
/// document tree stays renderable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub page_id: String,
    pub block_type: String,
    pub content: serde_json::Value,
    pub position: i64,
}

impl Block {
    pub fn new(
        page_id: impl Into<String>,
        block_type: impl Into<String>,
        content: serde_json::Value,
        position: i64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            page_id: page_id.into(),
            block_type: block_type.into(),
            content,
            position,
        }
    }

    /// Copy of this block with its content replaced by the restricted
    /// placeholder. Structural metadata is preserved.
    pub fn redacted(&self) -> Self {
        Self {
            content: restricted_placeholder(),
            ..self.clone()
        }
    }
}

/// The fixed placeholder that replaces content the caller may not see.
///
/// Every redacted block carries exactly this value so nothing about the
/// original content (not even its length) leaks to an unauthorized caller.
pub fn restricted_placeholder() -> serde_json::Value {
    serde_json::json!({ "restricted": true })
}

/// Descriptive role attached to a block permission row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockRole {
    Reader,
    Writer,
    Admin,
}

/// Access level a block permission row conveys.
///
/// Ordered `Read < Edit < Owner`; a required level is satisfied by any held
/// level greater or equal to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockPermissionLevel {
    Read,
    Edit,
    Owner,
}

/// A per-block, per-user access row layered beneath the page-level ability.
///
/// `(page_id, block_id, user_id)` is unique; saving again updates the
/// existing row. There are no group-level block rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPermission {
    pub id: String,
    pub page_id: String,
    pub block_id: String,
    pub user_id: String,
    pub role: BlockRole,
    pub permission: BlockPermissionLevel,
}

impl BlockPermission {
    pub fn new(
        page_id: impl Into<String>,
        block_id: impl Into<String>,
        user_id: impl Into<String>,
        role: BlockRole,
        permission: BlockPermissionLevel,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            page_id: page_id.into(),
            block_id: block_id.into(),
            user_id: user_id.into(),
            role,
            permission,
        }
    }

    /// The implicit row assigned to a page's creator when a block is first
    /// persisted without any explicit permission.
    pub fn implicit_owner(
        page_id: impl Into<String>,
        block_id: impl Into<String>,
        creator_id: impl Into<String>,
    ) -> Self {
        Self::new(
            page_id,
            block_id,
            creator_id,
            BlockRole::Admin,
            BlockPermissionLevel::Owner,
        )
    }
}

/// Actions a caller can attempt against a single block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockAction {
    Read,
    Edit,
    Move,
    Delete,
}
