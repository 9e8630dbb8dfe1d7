//! Pipeline configuration

use crate::error::{BodyFitError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the measurement estimation pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Square silhouette edge length the predictor expects, in pixels
    pub target_size: u32,
    /// Minimum fraction of bright silhouette pixels required to treat the
    /// isolation output as containing a subject
    pub min_subject_fraction: f32,
}

impl PipelineConfig {
    /// Create a new pipeline configuration builder
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_size: 128,
            min_subject_fraction: 0.005,
        }
    }
}

/// Builder for [`PipelineConfig`]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Silhouette edge length in pixels
    #[must_use]
    pub fn target_size(mut self, size: u32) -> Self {
        self.config.target_size = size;
        self
    }

    /// Minimum bright-pixel fraction for the degenerate-silhouette check
    #[must_use]
    pub fn min_subject_fraction(mut self, fraction: f32) -> Self {
        self.config.min_subject_fraction = fraction;
        self
    }

    /// Build the pipeline configuration
    ///
    /// # Errors
    /// Returns `InvalidConfig` for a zero target size or a subject fraction
    /// outside `[0, 1)`.
    pub fn build(self) -> Result<PipelineConfig> {
        if self.config.target_size == 0 {
            return Err(BodyFitError::invalid_config("target size must be positive"));
        }
        if !self.config.min_subject_fraction.is_finite()
            || self.config.min_subject_fraction < 0.0
            || self.config.min_subject_fraction >= 1.0
        {
            return Err(BodyFitError::invalid_config(format!(
                "minimum subject fraction must be in [0, 1), got {}",
                self.config.min_subject_fraction
            )));
        }

        Ok(self.config)
    }
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
