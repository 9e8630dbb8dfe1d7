//! Upload validation
//!
//! Rejects malformed input before any isolation or model work is attempted,
//! so bad uploads never reach the expensive downstream stages.

use crate::error::{BodyFitError, Result};
use image::{DynamicImage, GenericImageView};

/// Validator for uploaded image bytes
pub struct ImageValidator;

impl ImageValidator {
    /// Decode and validate an uploaded image
    ///
    /// The `view` label ("front"/"side") is carried into error messages.
    ///
    /// # Errors
    /// Returns `InvalidImage` when the buffer is empty, not a supported image
    /// encoding, or decodes to a zero-area pixel grid.
    pub fn validate(raw_bytes: &[u8], view: &str) -> Result<DynamicImage> {
        if raw_bytes.is_empty() {
            return Err(BodyFitError::invalid_image(format!(
                "{} image is an empty byte buffer",
                view
            )));
        }

        let image = image::load_from_memory(raw_bytes)
            .map_err(|e| BodyFitError::image_decode_error(view, &e))?;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(BodyFitError::invalid_image(format!(
                "{} image decoded to a zero-area grid ({}x{})",
                view, width, height
            )));
        }

        Ok(image)
    }
}
