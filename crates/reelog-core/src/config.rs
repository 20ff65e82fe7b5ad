//! Quota configuration for the free tier.

use serde::{Deserialize, Serialize};

/// Free-tier group limits. Premium users are exempt from both.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Maximum non-deleted groups a free user may own.
    pub free_owned_group_limit: i64,
    /// Maximum non-deleted groups a free user may belong to without owning.
    pub free_joined_group_limit: i64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            free_owned_group_limit: 1,
            free_joined_group_limit: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let config = QuotaConfig::default();
        assert_eq!(config.free_owned_group_limit, 1);
        assert_eq!(config.free_joined_group_limit, 1);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: QuotaConfig =
            serde_json::from_str(r#"{"free_owned_group_limit": 5}"#).unwrap();
        assert_eq!(config.free_owned_group_limit, 5);
        assert_eq!(config.free_joined_group_limit, 1);
    }
}
