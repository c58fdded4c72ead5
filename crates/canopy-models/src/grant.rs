//! Explicit permission grants binding a principal to a target.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capability::{GrantAction, GrantObject};

/// The subject of a grant or membership row: a user or a group.
///
/// The enum makes the "exactly one of user/group" invariant structural;
/// there is no record shape where both or neither are set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Principal {
    User(String),
    Group(String),
}

impl Principal {
    pub fn user(id: impl Into<String>) -> Self {
        Principal::User(id.into())
    }

    pub fn group(id: impl Into<String>) -> Self {
        Principal::Group(id.into())
    }

    /// Stable key fragment for composite storage keys.
    pub fn storage_key(&self) -> String {
        match self {
            Principal::User(id) => format!("user:{id}"),
            Principal::Group(id) => format!("group:{id}"),
        }
    }
}

/// The object a grant applies to: exactly one page or one space.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum GrantTarget {
    Page(String),
    Space(String),
}

impl GrantTarget {
    pub fn id(&self) -> &str {
        match self {
            GrantTarget::Page(id) | GrantTarget::Space(id) => id,
        }
    }
}

/// A persisted, additive permission record.
///
/// Grants never deny; absence of a grant simply means no access beyond what
/// the role layer provides. The `(action, object)` pair is validated against
/// the target's capability vocabulary before a grant is ever stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub id: String,
    pub principal: Principal,
    pub target: GrantTarget,
    pub action: GrantAction,
    pub object: GrantObject,
    pub added_by: String,
    pub created_at: DateTime<Utc>,
}

impl Grant {
    pub fn new(
        principal: Principal,
        target: GrantTarget,
        action: GrantAction,
        object: GrantObject,
        added_by: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            principal,
            target,
            action,
            object,
            added_by: added_by.into(),
            created_at: Utc::now(),
        }
    }
}
