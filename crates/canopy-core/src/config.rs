//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for the permission engine.
///
/// The ability TTL bounds how stale a cached ability may be: a grant or
/// membership change is guaranteed visible once every entry inserted before
/// the change has expired, even for callers that bypass the explicit
/// invalidation hooks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionConfig {
    /// How long a computed ability stays cached, in milliseconds, measured
    /// from insertion (no sliding expiration).
    #[serde(default = "default_ability_ttl_ms")]
    pub ability_ttl_ms: u64,
}

fn default_ability_ttl_ms() -> u64 {
    5_000
}

impl Default for PermissionConfig {
    fn default() -> Self {
        Self {
            ability_ttl_ms: default_ability_ttl_ms(),
        }
    }
}

impl PermissionConfig {
    pub fn ability_ttl(&self) -> Duration {
        Duration::from_millis(self.ability_ttl_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttl_is_five_seconds() {
        let config = PermissionConfig::default();
        assert_eq!(config.ability_ttl(), Duration::from_secs(5));
    }

    #[test]
    fn test_missing_field_uses_default() {
        let config: PermissionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.ability_ttl_ms, 5_000);
    }
}
