//! Registry and unload policy configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Deadlines for the unload confirmation loop
///
/// Two escalating deadlines: past `warn_after` a single warning is emitted
/// and polling continues; past `fail_after` the attempt is abandoned and the
/// module stays registered. The defaults mirror the reference policy of
/// 200 ms and 1000 ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnloadPolicy {
    /// Elapsed time after which the one-time slow-unload warning fires
    #[serde(with = "humantime_serde")]
    pub warn_after: Duration,

    /// Elapsed time after which the attempt times out
    #[serde(with = "humantime_serde")]
    pub fail_after: Duration,
}

impl Default for UnloadPolicy {
    fn default() -> Self {
        Self {
            warn_after: Duration::from_millis(200),
            fail_after: Duration::from_millis(1000),
        }
    }
}

/// Registry configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Foundational module names visible to every domain's resolver
    ///
    /// Fixed at registry construction, never mutated afterwards.
    pub shared_modules: Vec<String>,

    /// Unload confirmation deadlines
    pub unload: UnloadPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_defaults() {
        let policy = UnloadPolicy::default();
        assert_eq!(policy.warn_after, Duration::from_millis(200));
        assert_eq!(policy.fail_after, Duration::from_millis(1000));
    }

    #[test]
    fn test_config_from_json() {
        let config: RegistryConfig = serde_json::from_str(
            r#"{
                "shared_modules": ["core", "codec"],
                "unload": { "warn_after": "50ms", "fail_after": "250ms" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.shared_modules, vec!["core", "codec"]);
        assert_eq!(config.unload.warn_after, Duration::from_millis(50));
        assert_eq!(config.unload.fail_after, Duration::from_millis(250));
    }

    #[test]
    fn test_config_defaults() {
        let config: RegistryConfig = serde_json::from_str("{}").unwrap();
        assert!(config.shared_modules.is_empty());
        assert_eq!(config.unload, UnloadPolicy::default());
    }
}
