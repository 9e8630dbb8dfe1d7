#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # BodyFit Measurement Estimation Library
//!
//! A Rust library that estimates a person's body measurements from two
//! photographs (front and side view) and maps the estimates to clothing-size
//! recommendations.
//!
//! The crate owns the measurement inference pipeline: image ingestion and
//! validation, background isolation, feature normalization, model-based
//! measurement prediction, height-anchored calibration, and size-chart
//! resolution. The trained predictor and the background-removal function are
//! external collaborators injected behind traits.
//!
//! ## Features
//!
//! - **Fourteen measurements**: ankle through wrist, in a fixed predictor slot
//!   order, reported in centimeters
//! - **Height-anchored calibration**: raw model output rescaled against the
//!   stated height, with advisory anatomical-plausibility checks
//! - **Chart-driven sizing**: ordered-range size charts per apparel type and
//!   gender, with boundary clamping flagged as extrapolated
//! - **Injected collaborators**: bring your own segmentation and regression
//!   backends via [`SubjectIsolator`] and [`MeasurementModel`]
//! - **Stage-tagged errors**: every failure identifies the pipeline stage that
//!   produced it
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bodyfit::{
//!     ApparelType, BodyMeasurementProcessor, CalibrationInput, FeatureTensor, Gender,
//!     MeasurementModel, RawMeasurementVector, Result, SubjectIsolator,
//! };
//! use image::DynamicImage;
//!
//! // Wire in the external collaborators: a segmentation function and the
//! // trained regression model, however they are packaged.
//! struct Segmenter;
//! impl SubjectIsolator for Segmenter {
//!     fn isolate(&self, image: &DynamicImage) -> Result<DynamicImage> {
//!         // e.g. call an ONNX session and return the alpha-masked image
//!         # Ok(image.clone())
//!     }
//! }
//!
//! struct Regressor;
//! impl MeasurementModel for Regressor {
//!     fn predict(&self, features: &FeatureTensor) -> Result<RawMeasurementVector> {
//!         // e.g. run the trained network on features.front/side/meta
//!         # let _ = features;
//!         # RawMeasurementVector::from_slice(&[0.0; 14])
//!     }
//!     fn input_shape(&self) -> (usize, usize, usize, usize) {
//!         (1, 1, 128, 128)
//!     }
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let processor = BodyMeasurementProcessor::builder()
//!     .model(Arc::new(Regressor))
//!     .isolator(Arc::new(Segmenter))
//!     .build()?;
//!
//! let front = std::fs::read("front.jpg")?;
//! let side = std::fs::read("side.jpg")?;
//! let report = processor.estimate(
//!     &front,
//!     &side,
//!     &CalibrationInput {
//!         gender: Gender::Male,
//!         height_cm: 175.0,
//!         weight_kg: 70.0,
//!         apparel_type: ApparelType::All,
//!     },
//! )?;
//!
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Size charts
//!
//! [`SizeChartSet::default`] embeds the built-in charts; custom charts load
//! from JSON via [`SizeChartSet::from_json_str`] or
//! [`SizeChartSet::from_file`] and are validated once at startup. After load
//! they are shared read-only across requests — no locks on the hot path.

pub mod calibration;
pub mod config;
pub mod error;
pub mod inference;
pub mod isolation;
pub mod preprocessing;
pub mod processor;
pub mod sizing;
pub mod types;
pub mod validation;

// Public API exports
pub use calibration::MeasurementCalibrator;
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{BodyFitError, Result};
pub use inference::MeasurementModel;
pub use isolation::{SilhouetteRenderer, SubjectIsolator};
pub use preprocessing::{FeaturePreprocessor, FeatureTensor};
pub use processor::{BodyMeasurementProcessor, BodyMeasurementProcessorBuilder};
pub use sizing::{MeasurementRange, SizeChart, SizeChartSet, SizeResolver, SizeRule};
pub use types::{
    ApparelType, CalibratedMeasurements, CalibrationInput, EstimateReport, Gender, Measurement,
    PipelineStage, PlausibilityWarning, ProcessingMetadata, ProcessingTimings,
    RawMeasurementVector, SizeFit, SizeRecommendation, MEASUREMENT_COUNT,
};
