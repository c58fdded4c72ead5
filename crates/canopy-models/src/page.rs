//! Minimal directory records for pages and spaces.
//!
//! Page CRUD lives outside the engine; these are the fields the engine
//! itself needs: ownership for the creator bypass and the space link for
//! resolving the enclosing role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A page inside a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub space_id: String,
    pub creator_id: String,
    pub created_at: DateTime<Utc>,
}

impl Page {
    pub fn new(space_id: impl Into<String>, creator_id: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            space_id: space_id.into(),
            creator_id: creator_id.into(),
            created_at: Utc::now(),
        }
    }
}

/// A space inside a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub id: String,
    pub workspace_id: String,
    pub created_at: DateTime<Utc>,
}

impl Space {
    pub fn new(workspace_id: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            workspace_id: workspace_id.into(),
            created_at: Utc::now(),
        }
    }
}
