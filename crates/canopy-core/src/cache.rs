//! TTL cache for computed abilities.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use canopy_models::{
    Ability, PageCapability, ScopeType, SpaceCapability, WorkspaceCapability,
};
use parking_lot::Mutex;
use tracing::debug;

/// Cache key: one entry per (scope, user, target) triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeKey {
    pub scope: ScopeType,
    pub user_id: String,
    pub target_id: String,
}

impl ScopeKey {
    pub fn page(user_id: &str, page_id: &str) -> Self {
        Self {
            scope: ScopeType::Page,
            user_id: user_id.to_string(),
            target_id: page_id.to_string(),
        }
    }

    pub fn space(user_id: &str, space_id: &str) -> Self {
        Self {
            scope: ScopeType::Space,
            user_id: user_id.to_string(),
            target_id: space_id.to_string(),
        }
    }

    pub fn workspace(user_id: &str, workspace_id: &str) -> Self {
        Self {
            scope: ScopeType::Workspace,
            user_id: user_id.to_string(),
            target_id: workspace_id.to_string(),
        }
    }
}

/// A cached ability, tagged by scope so one map serves all three.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedAbility {
    Page(Ability<PageCapability>),
    Space(Ability<SpaceCapability>),
    Workspace(Ability<WorkspaceCapability>),
}

struct Entry {
    ability: CachedAbility,
    inserted_at: Instant,
}

/// Bounded-staleness ability cache.
///
/// Entries expire a fixed TTL after insertion; expiry is checked on read,
/// and expired entries are swept opportunistically on insert. Only
/// successful computations are cached — errors are never stored, so a
/// failing store is re-consulted on every request.
pub struct AbilityCache {
    ttl: Duration,
    entries: Mutex<HashMap<ScopeKey, Entry>>,
}

impl AbilityCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &ScopeKey) -> Option<CachedAbility> {
        let entries = self.entries.lock();
        let entry = entries.get(key)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.ability.clone())
    }

    pub fn insert(&self, key: ScopeKey, ability: CachedAbility) {
        let mut entries = self.entries.lock();
        entries.retain(|_, e| e.inserted_at.elapsed() < self.ttl);
        entries.insert(
            key,
            Entry {
                ability,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop one user's entry for one target.
    pub fn invalidate(&self, key: &ScopeKey) {
        self.entries.lock().remove(key);
    }

    /// Drop every user's entry for a target. Used after a grant or
    /// membership write so the change is visible before the TTL elapses.
    pub fn invalidate_target(&self, target_id: &str) {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|k, _| k.target_id != target_id);
        let dropped = before - entries.len();
        if dropped > 0 {
            debug!(target_id, dropped, "invalidated cached abilities");
        }
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
