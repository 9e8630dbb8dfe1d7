//! Core types for the measurement estimation pipeline

use crate::error::{BodyFitError, Result};
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of measurement slots produced by the predictor
pub const MEASUREMENT_COUNT: usize = 14;

/// Subject gender, wire-encoded as 0 (male) or 1 (female)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Decode the numeric wire representation used by the request surface
    ///
    /// # Errors
    /// Returns `InvalidCalibrationInput` for any code other than 0 or 1.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Male),
            1 => Ok(Self::Female),
            other => Err(BodyFitError::invalid_calibration_input(format!(
                "Gender must be 0 (male) or 1 (female), got {}",
                other
            ))),
        }
    }

    /// Numeric code folded into the feature tensor meta row
    #[must_use]
    pub fn code(self) -> f32 {
        match self {
            Self::Male => 0.0,
            Self::Female => 1.0,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

/// Apparel category a size recommendation is requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApparelType {
    Tshirt,
    Pants,
    All,
}

impl ApparelType {
    /// Whether a t-shirt size should be resolved for this request
    #[must_use]
    pub fn wants_tshirt(self) -> bool {
        matches!(self, Self::Tshirt | Self::All)
    }

    /// Whether a pants size should be resolved for this request
    #[must_use]
    pub fn wants_pants(self) -> bool {
        matches!(self, Self::Pants | Self::All)
    }
}

impl FromStr for ApparelType {
    type Err = BodyFitError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tshirt" => Ok(Self::Tshirt),
            "pants" => Ok(Self::Pants),
            "all" => Ok(Self::All),
            other => Err(BodyFitError::invalid_calibration_input(format!(
                "Apparel type must be 'tshirt', 'pants', or 'all', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ApparelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tshirt => write!(f, "tshirt"),
            Self::Pants => write!(f, "pants"),
            Self::All => write!(f, "all"),
        }
    }
}

/// User-supplied ground-truth scalars that anchor model output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationInput {
    /// Subject gender
    pub gender: Gender,
    /// Stated height in centimeters, used as the physical reference scale
    pub height_cm: f32,
    /// Stated weight in kilograms
    pub weight_kg: f32,
    /// Apparel category to resolve sizes for
    pub apparel_type: ApparelType,
}

impl CalibrationInput {
    /// Plausible human height range in centimeters
    pub const HEIGHT_RANGE_CM: (f32, f32) = (100.0, 250.0);
    /// Plausible human weight range in kilograms
    pub const WEIGHT_RANGE_KG: (f32, f32) = (30.0, 300.0);

    /// Validate that the stated scalars fall within plausible human ranges
    ///
    /// Out-of-range values are rejected, never silently clamped.
    ///
    /// # Errors
    /// Returns `InvalidCalibrationInput` with the offending field and valid range.
    pub fn validate(&self) -> Result<()> {
        let (min_h, max_h) = Self::HEIGHT_RANGE_CM;
        if !self.height_cm.is_finite() || self.height_cm < min_h || self.height_cm > max_h {
            return Err(BodyFitError::invalid_calibration_input(format!(
                "Height must be between {}-{} cm, got {}",
                min_h, max_h, self.height_cm
            )));
        }

        let (min_w, max_w) = Self::WEIGHT_RANGE_KG;
        if !self.weight_kg.is_finite() || self.weight_kg < min_w || self.weight_kg > max_w {
            return Err(BodyFitError::invalid_calibration_input(format!(
                "Weight must be between {}-{} kg, got {}",
                min_w, max_w, self.weight_kg
            )));
        }

        Ok(())
    }
}

/// The fourteen canonical body measurements, in predictor slot order
///
/// The discriminant order is the model's output slot order and must not change:
/// the predictor contract and the persisted charts both depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Measurement {
    Ankle,
    ArmLength,
    Bicep,
    Calf,
    Chest,
    Forearm,
    Height,
    Hip,
    LegLength,
    ShoulderBreadth,
    ShoulderToCrotch,
    Thigh,
    Waist,
    Wrist,
}

impl Measurement {
    /// All measurements in predictor slot order
    pub const ALL: [Self; MEASUREMENT_COUNT] = [
        Self::Ankle,
        Self::ArmLength,
        Self::Bicep,
        Self::Calf,
        Self::Chest,
        Self::Forearm,
        Self::Height,
        Self::Hip,
        Self::LegLength,
        Self::ShoulderBreadth,
        Self::ShoulderToCrotch,
        Self::Thigh,
        Self::Waist,
        Self::Wrist,
    ];

    /// Slot index within the raw measurement vector
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Canonical hyphenated name used on the response surface
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ankle => "ankle",
            Self::ArmLength => "arm-length",
            Self::Bicep => "bicep",
            Self::Calf => "calf",
            Self::Chest => "chest",
            Self::Forearm => "forearm",
            Self::Height => "height",
            Self::Hip => "hip",
            Self::LegLength => "leg-length",
            Self::ShoulderBreadth => "shoulder-breadth",
            Self::ShoulderToCrotch => "shoulder-to-crotch",
            Self::Thigh => "thigh",
            Self::Waist => "waist",
            Self::Wrist => "wrist",
        }
    }

    /// Whether this measurement belongs to the upper-body group
    #[must_use]
    pub fn is_upper_body(self) -> bool {
        matches!(
            self,
            Self::Chest
                | Self::ShoulderBreadth
                | Self::Bicep
                | Self::Forearm
                | Self::Wrist
                | Self::ArmLength
                | Self::ShoulderToCrotch
        )
    }

    /// Whether this measurement belongs to the lower-body group
    #[must_use]
    pub fn is_lower_body(self) -> bool {
        matches!(
            self,
            Self::Waist | Self::Hip | Self::Thigh | Self::Calf | Self::Ankle | Self::LegLength
        )
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Unscaled predictor output, one slot per measurement
///
/// Produced once per request and immutable thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMeasurementVector {
    values: [f32; MEASUREMENT_COUNT],
}

impl RawMeasurementVector {
    /// Build from a predictor output slice
    ///
    /// # Errors
    /// Returns an `Inference` error when the slice length does not match the
    /// canonical measurement count.
    pub fn from_slice(values: &[f32]) -> Result<Self> {
        let len = values.len();
        let values: [f32; MEASUREMENT_COUNT] = values.try_into().map_err(|_| {
            BodyFitError::inference(format!(
                "model returned {} values, expected {}",
                len, MEASUREMENT_COUNT
            ))
        })?;
        Ok(Self { values })
    }

    /// Raw value for a measurement slot
    #[must_use]
    pub fn get(&self, measurement: Measurement) -> f32 {
        self.values[measurement.index()]
    }

    /// The predictor's own height estimate (the calibration reference slot)
    #[must_use]
    pub fn height(&self) -> f32 {
        self.get(Measurement::Height)
    }

    /// Iterate slots in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Measurement, f32)> + '_ {
        Measurement::ALL
            .iter()
            .map(|&m| (m, self.values[m.index()]))
    }
}

/// Final measurements in centimeters after height calibration
///
/// Serializes as a map of the fourteen canonical names to centimeter values.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibratedMeasurements {
    values: [f32; MEASUREMENT_COUNT],
}

impl CalibratedMeasurements {
    pub(crate) fn new(values: [f32; MEASUREMENT_COUNT]) -> Self {
        Self { values }
    }

    /// Calibrated value in centimeters
    #[must_use]
    pub fn get(&self, measurement: Measurement) -> f32 {
        self.values[measurement.index()]
    }

    /// Iterate measurements in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Measurement, f32)> + '_ {
        Measurement::ALL
            .iter()
            .map(|&m| (m, self.values[m.index()]))
    }

    /// Upper-body measurements (t-shirt fitting group)
    #[must_use]
    pub fn upper_body(&self) -> Vec<(Measurement, f32)> {
        self.iter().filter(|(m, _)| m.is_upper_body()).collect()
    }

    /// Lower-body measurements (pants fitting group)
    #[must_use]
    pub fn lower_body(&self) -> Vec<(Measurement, f32)> {
        self.iter().filter(|(m, _)| m.is_lower_body()).collect()
    }
}

impl Serialize for CalibratedMeasurements {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(MEASUREMENT_COUNT))?;
        for (measurement, value) in self.iter() {
            map.serialize_entry(measurement.name(), &value)?;
        }
        map.end()
    }
}

/// Advisory anatomical-plausibility violation
///
/// Carried alongside the numeric result, never instead of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlausibilityWarning {
    /// The violated constraint, e.g. `calf <= thigh`
    pub constraint: String,
    /// Human-readable detail with the offending values
    pub detail: String,
}

impl fmt::Display for PlausibilityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} violated: {}", self.constraint, self.detail)
    }
}

/// A resolved garment size
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizeFit {
    /// Size label drawn from the chart's label set
    pub label: String,
    /// True when the measurement fell outside the chart and was clamped to the
    /// nearest boundary size
    pub extrapolated: bool,
}

/// Garment sizes derived from calibrated measurements
///
/// Fields are present only for the apparel types requested.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SizeRecommendation {
    /// T-shirt size, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tshirt: Option<SizeFit>,
    /// Pants size, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pants: Option<SizeFit>,
}

/// Stages of the per-request estimation pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    /// Validating calibration input and decoding uploaded images
    Validating,
    /// Clearing image backgrounds via the subject isolator
    Isolating,
    /// Normalizing silhouettes into feature tensors
    Preprocessing,
    /// Running the measurement model
    Predicting,
    /// Rescaling raw output against stated height
    Calibrating,
    /// Mapping measurements to garment sizes
    Resolving,
    /// Pipeline completed
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validating => "validating",
            Self::Isolating => "isolating",
            Self::Preprocessing => "preprocessing",
            Self::Predicting => "predicting",
            Self::Calibrating => "calibrating",
            Self::Resolving => "resolving",
            Self::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// Per-stage wall-clock timings in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessingTimings {
    pub validation_ms: u64,
    pub isolation_ms: u64,
    pub preprocessing_ms: u64,
    pub inference_ms: u64,
    pub calibration_ms: u64,
    pub resolution_ms: u64,
    pub total_ms: u64,
}

/// Metadata attached to an estimation result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingMetadata {
    /// Per-stage timings
    pub timings: ProcessingTimings,
    /// Completion timestamp
    pub completed_at: DateTime<Utc>,
}

impl ProcessingMetadata {
    #[must_use]
    pub fn new(timings: ProcessingTimings) -> Self {
        Self {
            timings,
            completed_at: Utc::now(),
        }
    }
}

/// Complete result of one estimation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateReport {
    /// All fourteen calibrated measurements in centimeters
    pub measurements: CalibratedMeasurements,
    /// Garment sizes for the requested apparel types
    pub sizes: SizeRecommendation,
    /// Advisory plausibility violations, empty when all checks pass
    pub warnings: Vec<PlausibilityWarning>,
    /// Timings and completion timestamp
    pub metadata: ProcessingMetadata,
}
