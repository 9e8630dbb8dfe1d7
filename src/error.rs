//! Error types for the measurement estimation pipeline

use crate::types::PipelineStage;
use thiserror::Error;

/// Result type alias for measurement estimation operations
pub type Result<T> = std::result::Result<T, BodyFitError>;

/// Comprehensive error types for the measurement estimation pipeline
///
/// Every pipeline stage fails fast with its own variant; [`BodyFitError::stage`]
/// reports which stage a given error belongs to so callers can surface a
/// structured, stage-tagged failure instead of a raw internal error.
#[derive(Error, Debug)]
pub enum BodyFitError {
    /// Input/output errors (chart file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image format or processing errors from the image crate
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Malformed or undecodable uploaded image
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Out-of-range height/weight/gender/apparel type
    #[error("Invalid calibration input: {0}")]
    InvalidCalibrationInput(String),

    /// Background isolation failed to produce a usable subject
    #[error("Background isolation failed: {0}")]
    Processing(String),

    /// Degenerate image after isolation (e.g. near-zero subject area)
    #[error("Preprocessing failed: {0}")]
    Preprocessing(String),

    /// Measurement model inference errors
    #[error("Inference error: {0}")]
    Inference(String),

    /// Undefined scale factor during height calibration
    #[error("Calibration failed: {0}")]
    Calibration(String),

    /// Missing size chart for the requested apparel/gender combination
    #[error("No size chart configured for apparel '{apparel}' and gender '{gender}'")]
    NoMatchingChart {
        /// Requested apparel type
        apparel: String,
        /// Requested gender
        gender: String,
    },

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BodyFitError {
    /// Create a new invalid image error
    pub fn invalid_image<S: Into<String>>(msg: S) -> Self {
        Self::InvalidImage(msg.into())
    }

    /// Create a new invalid calibration input error
    pub fn invalid_calibration_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidCalibrationInput(msg.into())
    }

    /// Create a new processing error
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    /// Create a new preprocessing error
    pub fn preprocessing<S: Into<String>>(msg: S) -> Self {
        Self::Preprocessing(msg.into())
    }

    /// Create a new inference error
    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a new calibration error
    pub fn calibration<S: Into<String>>(msg: S) -> Self {
        Self::Calibration(msg.into())
    }

    /// Create a new missing chart error
    pub fn no_matching_chart(
        apparel: impl std::fmt::Display,
        gender: impl std::fmt::Display,
    ) -> Self {
        Self::NoMatchingChart {
            apparel: apparel.to_string(),
            gender: gender.to_string(),
        }
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an image decode error with view context (front/side)
    pub fn image_decode_error(view: &str, error: &image::ImageError) -> Self {
        Self::InvalidImage(format!(
            "failed to decode {} image: {}. Supported formats: PNG, JPEG, TIFF",
            view, error
        ))
    }

    /// The pipeline stage this error belongs to, if any
    ///
    /// Configuration errors (`Io`, `InvalidConfig`) can occur outside a request
    /// and map to no stage.
    #[must_use]
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            Self::InvalidImage(_) | Self::InvalidCalibrationInput(_) | Self::Image(_) => {
                Some(PipelineStage::Validating)
            },
            Self::Processing(_) => Some(PipelineStage::Isolating),
            Self::Preprocessing(_) => Some(PipelineStage::Preprocessing),
            Self::Inference(_) => Some(PipelineStage::Predicting),
            Self::Calibration(_) => Some(PipelineStage::Calibrating),
            Self::NoMatchingChart { .. } => Some(PipelineStage::Resolving),
            Self::Io(_) | Self::InvalidConfig(_) => None,
        }
    }
}
