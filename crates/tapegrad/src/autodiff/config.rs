//! Options for a `value_and_grad` call.

use serde::{Deserialize, Serialize};

/// Options for [`value_and_grad`](super::value_and_grad).
///
/// Missing fields take their defaults when deserialized, so the struct can be
/// embedded in a larger configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradConfig {
    /// Copy every incoming gradient before storing or adding it.
    pub safe: bool,
    /// Call the device cache-release hook when accelerator gradients were seen.
    pub release_device_cache: bool,
}

impl Default for GradConfig {
    fn default() -> Self {
        Self {
            safe: false,
            release_device_cache: true,
        }
    }
}

impl GradConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn safe(mut self, safe: bool) -> Self {
        self.safe = safe;
        self
    }

    pub fn release_device_cache(mut self, release: bool) -> Self {
        self.release_device_cache = release;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = GradConfig::default();
        assert!(!c.safe);
        assert!(c.release_device_cache);
    }

    #[test]
    fn test_builder() {
        let c = GradConfig::new().safe(true).release_device_cache(false);
        assert!(c.safe);
        assert!(!c.release_device_cache);
    }

    #[test]
    fn test_deserialize_partial() {
        let c: GradConfig = serde_json::from_str(r#"{"safe": true}"#).unwrap();
        assert_eq!(c, GradConfig::new().safe(true));

        let c: GradConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(c, GradConfig::default());
    }
}
