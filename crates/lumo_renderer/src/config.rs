//! Render and bake settings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse render config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("samples_per_pixel must be at least 1")]
    ZeroSamples,
}

/// Sampling settings shared by rendering and baking.
///
/// Missing JSON fields take their [`Default`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub samples_per_pixel: u32,
    /// Indirect bounces; 0 leaves only direct lighting and emission.
    pub bounces: u32,
    /// Base of the per-pixel random streams.
    pub seed: u64,
    /// Bake only: drop the shadow-ray term at the texel itself.
    pub ignore_direct: bool,
    /// Evaluate the pixels of each row on the rayon pool.
    pub parallel: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 16,
            bounces: 2,
            seed: 0,
            ignore_direct: false,
            parallel: true,
        }
    }
}

impl RenderConfig {
    /// Path segments followed per camera ray or bake sample.
    pub fn max_depth(&self) -> u32 {
        self.bounces.saturating_add(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RenderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = RenderConfig::from_json_str(r#"{ "samples_per_pixel": 4, "seed": 9 }"#).unwrap();
        assert_eq!(config.samples_per_pixel, 4);
        assert_eq!(config.seed, 9);
        assert_eq!(config.bounces, RenderConfig::default().bounces);
        assert!(config.parallel);
    }

    #[test]
    fn test_zero_samples_rejected() {
        let err = RenderConfig::from_json_str(r#"{ "samples_per_pixel": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroSamples));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = RenderConfig::from_json_str("{ samples_per_pixel: ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_max_depth_is_bounces_plus_one() {
        let config = RenderConfig {
            bounces: 0,
            ..RenderConfig::default()
        };
        assert_eq!(config.max_depth(), 1);
    }

    #[test]
    fn test_round_trip_through_json() {
        let config = RenderConfig {
            samples_per_pixel: 3,
            bounces: 5,
            seed: 42,
            ignore_direct: true,
            parallel: false,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(RenderConfig::from_json_str(&json).unwrap(), config);
    }
}
