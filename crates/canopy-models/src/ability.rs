//! The resolved capability set for one (user, target) pair.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::capability::{Capability, GrantAction, GrantObject};

/// An ephemeral set of capabilities a user provably holds on one target.
///
/// Abilities are derived from role and grant state, cached briefly, and
/// never persisted. An empty ability is a legitimate value meaning
/// "no access" — it is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability<C: Capability> {
    caps: BTreeSet<C>,
}

impl<C: Capability> Ability<C> {
    /// The empty ability: no access.
    pub fn none() -> Self {
        Self {
            caps: BTreeSet::new(),
        }
    }

    /// Every capability defined for this scope. Used for the unconditional
    /// administrator override.
    pub fn full() -> Self {
        Self {
            caps: C::ALL.iter().copied().collect(),
        }
    }

    pub fn insert(&mut self, cap: C) {
        self.caps.insert(cap);
    }

    /// Whether this ability permits the given capability.
    pub fn allows(&self, cap: C) -> bool {
        self.caps.contains(&cap)
    }

    pub fn is_empty(&self) -> bool {
        self.caps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.caps.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = C> + '_ {
        self.caps.iter().copied()
    }

    /// Flatten into `(action, object)` pairs, the wire shape for callers
    /// that serialize abilities across a process boundary.
    pub fn to_pairs(&self) -> Vec<(GrantAction, GrantObject)> {
        self.caps.iter().map(|cap| cap.as_pair()).collect()
    }
}

impl<C: Capability> Default for Ability<C> {
    fn default() -> Self {
        Self::none()
    }
}

impl<C: Capability> FromIterator<C> for Ability<C> {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self {
            caps: iter.into_iter().collect(),
        }
    }
}
