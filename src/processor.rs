//! Unified measurement estimation processor
//!
//! This module provides the main `BodyMeasurementProcessor` that composes the
//! per-request pipeline: validation, background isolation, feature
//! preprocessing, model inference, height calibration, and size resolution.
//! Failure at any stage aborts the remaining stages and surfaces the
//! stage-tagged error without partial results.

use crate::{
    calibration::MeasurementCalibrator,
    config::PipelineConfig,
    error::{BodyFitError, Result},
    inference::MeasurementModel,
    isolation::{SilhouetteRenderer, SubjectIsolator},
    preprocessing::FeaturePreprocessor,
    sizing::{SizeChartSet, SizeResolver},
    types::{
        CalibrationInput, EstimateReport, PipelineStage, ProcessingMetadata, ProcessingTimings,
    },
    validation::ImageValidator,
};
use instant::Instant;
use log::{debug, info};
use std::sync::Arc;
use tracing::{info as trace_info, instrument};

/// Unified processor for per-request measurement estimation
///
/// Holds only process-wide read-only collaborators (model, isolator, charts,
/// config); it keeps no state between invocations and is safe to share across
/// concurrent requests.
pub struct BodyMeasurementProcessor {
    config: PipelineConfig,
    model: Arc<dyn MeasurementModel>,
    isolator: Arc<dyn SubjectIsolator>,
    charts: Arc<SizeChartSet>,
}

impl std::fmt::Debug for BodyMeasurementProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BodyMeasurementProcessor")
            .field("config", &self.config)
            .field("model", &"<dyn MeasurementModel>")
            .field("isolator", &"<dyn SubjectIsolator>")
            .field("charts", &self.charts)
            .finish()
    }
}

impl BodyMeasurementProcessor {
    /// Create a new processor builder
    #[must_use]
    pub fn builder() -> BodyMeasurementProcessorBuilder {
        BodyMeasurementProcessorBuilder::new()
    }

    /// The size charts this processor resolves against
    #[must_use]
    pub fn charts(&self) -> &SizeChartSet {
        &self.charts
    }

    /// Run the full estimation pipeline for one request
    ///
    /// Stages run synchronously in order: Validating, Isolating,
    /// Preprocessing, Predicting, Calibrating, Resolving.
    ///
    /// # Errors
    /// The first failing stage's error, tagged via [`BodyFitError::stage`]:
    /// - `InvalidCalibrationInput` / `InvalidImage` during validation
    /// - `Processing` when background isolation fails
    /// - `Preprocessing` for degenerate silhouettes
    /// - `Inference` from the measurement model
    /// - `Calibration` for an undefined scale factor
    /// - `NoMatchingChart` for a missing size chart
    #[instrument(
        skip(self, front_bytes, side_bytes, input),
        fields(
            gender = %input.gender,
            apparel = %input.apparel_type,
        )
    )]
    pub fn estimate(
        &self,
        front_bytes: &[u8],
        side_bytes: &[u8],
        input: &CalibrationInput,
    ) -> Result<EstimateReport> {
        let mut timings = ProcessingTimings::default();
        let total_start = Instant::now();

        trace_info!("starting measurement estimation");

        // Stage: Validating. Rejects bad input before any expensive work.
        let stage_start = Instant::now();
        input.validate()?;
        let front = ImageValidator::validate(front_bytes, "front")?;
        let side = ImageValidator::validate(side_bytes, "side")?;
        timings.validation_ms = elapsed_ms(stage_start);
        debug!("stage {} complete in {}ms", PipelineStage::Validating, timings.validation_ms);

        // Stage: Isolating. External capability; any failure maps to Processing.
        let stage_start = Instant::now();
        let front_isolated = self
            .isolator
            .isolate(&front)
            .map_err(|e| as_processing("front", e))?;
        let side_isolated = self
            .isolator
            .isolate(&side)
            .map_err(|e| as_processing("side", e))?;
        let front_silhouette = SilhouetteRenderer::render(&front_isolated);
        let side_silhouette = SilhouetteRenderer::render(&side_isolated);
        timings.isolation_ms = elapsed_ms(stage_start);
        debug!("stage {} complete in {}ms", PipelineStage::Isolating, timings.isolation_ms);

        // Stage: Preprocessing
        let stage_start = Instant::now();
        let features = FeaturePreprocessor::prepare(
            &front_silhouette,
            &side_silhouette,
            input,
            &self.config,
        )?;
        timings.preprocessing_ms = elapsed_ms(stage_start);
        debug!("stage {} complete in {}ms", PipelineStage::Preprocessing, timings.preprocessing_ms);

        // Stage: Predicting
        let stage_start = Instant::now();
        let raw = self.model.predict(&features)?;
        timings.inference_ms = elapsed_ms(stage_start);
        debug!("stage {} complete in {}ms", PipelineStage::Predicting, timings.inference_ms);

        // Stage: Calibrating
        let stage_start = Instant::now();
        let (measurements, warnings) = MeasurementCalibrator::calibrate(&raw, input)?;
        timings.calibration_ms = elapsed_ms(stage_start);
        debug!("stage {} complete in {}ms", PipelineStage::Calibrating, timings.calibration_ms);

        // Stage: Resolving
        let stage_start = Instant::now();
        let sizes = SizeResolver::resolve(&measurements, input, &self.charts)?;
        timings.resolution_ms = elapsed_ms(stage_start);
        debug!("stage {} complete in {}ms", PipelineStage::Resolving, timings.resolution_ms);

        timings.total_ms = elapsed_ms(total_start);
        info!(
            "estimation complete in {}ms ({} warnings)",
            timings.total_ms,
            warnings.len()
        );

        Ok(EstimateReport {
            measurements,
            sizes,
            warnings,
            metadata: ProcessingMetadata::new(timings),
        })
    }

    /// Run the pipeline on images read from async sources
    ///
    /// Convenience wrapper for callers holding streams (network bodies, files)
    /// rather than byte buffers; the pipeline itself stays synchronous.
    ///
    /// # Errors
    /// Read failures surface as `InvalidImage`; everything else as
    /// [`BodyMeasurementProcessor::estimate`].
    pub async fn estimate_from_readers<F, S>(
        &self,
        mut front: F,
        mut side: S,
        input: &CalibrationInput,
    ) -> Result<EstimateReport>
    where
        F: tokio::io::AsyncRead + Unpin,
        S: tokio::io::AsyncRead + Unpin,
    {
        use tokio::io::AsyncReadExt;

        let mut front_bytes = Vec::new();
        front
            .read_to_end(&mut front_bytes)
            .await
            .map_err(|e| BodyFitError::invalid_image(format!("failed to read front image: {}", e)))?;

        let mut side_bytes = Vec::new();
        side.read_to_end(&mut side_bytes)
            .await
            .map_err(|e| BodyFitError::invalid_image(format!("failed to read side image: {}", e)))?;

        self.estimate(&front_bytes, &side_bytes, input)
    }
}

/// Map any isolator failure to the pipeline's Processing stage
fn as_processing(view: &str, error: BodyFitError) -> BodyFitError {
    match error {
        BodyFitError::Processing(msg) => {
            BodyFitError::processing(format!("{} image: {}", view, msg))
        },
        other => BodyFitError::processing(format!("{} image: {}", view, other)),
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Builder for [`BodyMeasurementProcessor`]
pub struct BodyMeasurementProcessorBuilder {
    config: PipelineConfig,
    model: Option<Arc<dyn MeasurementModel>>,
    isolator: Option<Arc<dyn SubjectIsolator>>,
    charts: Option<Arc<SizeChartSet>>,
}

impl BodyMeasurementProcessorBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            model: None,
            isolator: None,
            charts: None,
        }
    }

    /// Pipeline configuration (defaults to [`PipelineConfig::default`])
    #[must_use]
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// The trained measurement model (required)
    #[must_use]
    pub fn model(mut self, model: Arc<dyn MeasurementModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// The background-removal capability (required)
    #[must_use]
    pub fn isolator(mut self, isolator: Arc<dyn SubjectIsolator>) -> Self {
        self.isolator = Some(isolator);
        self
    }

    /// Size charts (defaults to the built-in charts)
    #[must_use]
    pub fn charts(mut self, charts: Arc<SizeChartSet>) -> Self {
        self.charts = Some(charts);
        self
    }

    /// Build the processor
    ///
    /// # Errors
    /// Returns `InvalidConfig` when the model or isolator is missing.
    pub fn build(self) -> Result<BodyMeasurementProcessor> {
        let model = self
            .model
            .ok_or_else(|| BodyFitError::invalid_config("a measurement model is required"))?;
        let isolator = self
            .isolator
            .ok_or_else(|| BodyFitError::invalid_config("a subject isolator is required"))?;

        info!("initialized body measurement processor");
        Ok(BodyMeasurementProcessor {
            config: self.config,
            model,
            isolator,
            charts: self
                .charts
                .unwrap_or_else(|| Arc::new(SizeChartSet::default())),
        })
    }
}

impl Default for BodyMeasurementProcessorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
