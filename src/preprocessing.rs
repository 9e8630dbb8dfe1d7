//! Feature preprocessing
//!
//! Normalizes front and side silhouettes into the tensor shape and value range
//! the measurement model expects, and folds in the calibration scalars.

use crate::{
    config::PipelineConfig,
    error::{BodyFitError, Result},
    types::CalibrationInput,
};
use image::{imageops, GrayImage};
use ndarray::{Array2, Array4};
use tracing::debug;

/// Luma level above which a silhouette pixel counts as subject
const SUBJECT_LUMA_THRESHOLD: u8 = 16;

/// Model input package: one NCHW tensor per view plus the calibration row
#[derive(Debug, Clone)]
pub struct FeatureTensor {
    /// Front view, shape `[1, 1, S, S]`, values in `[0, 1]`
    pub front: Array4<f32>,
    /// Side view, shape `[1, 1, S, S]`, values in `[0, 1]`
    pub side: Array4<f32>,
    /// Calibration scalars `[gender_code, height_cm, weight_kg]`, shape `[1, 3]`
    pub meta: Array2<f32>,
}

/// Shared preprocessing for the two silhouette views
pub struct FeaturePreprocessor;

impl FeaturePreprocessor {
    /// Prepare the model input from rendered silhouettes and calibration scalars
    ///
    /// Both views are resized deterministically (Triangle filter, no
    /// randomness) to the configured square resolution and normalized to
    /// `[0, 1]`.
    ///
    /// # Errors
    /// Returns `Preprocessing` when either silhouette is degenerate after
    /// isolation: zero-area, or bright-pixel coverage below the configured
    /// minimum (the isolator most likely failed to find a subject).
    pub fn prepare(
        front: &GrayImage,
        side: &GrayImage,
        calibration: &CalibrationInput,
        config: &PipelineConfig,
    ) -> Result<FeatureTensor> {
        let front_tensor = Self::silhouette_to_tensor(front, "front", config)?;
        let side_tensor = Self::silhouette_to_tensor(side, "side", config)?;

        let meta = Array2::from_shape_vec(
            (1, 3),
            vec![
                calibration.gender.code(),
                calibration.height_cm,
                calibration.weight_kg,
            ],
        )
        .map_err(|e| BodyFitError::preprocessing(format!("meta row shape error: {}", e)))?;

        Ok(FeatureTensor {
            front: front_tensor,
            side: side_tensor,
            meta,
        })
    }

    /// Resize one silhouette and normalize it into an NCHW tensor
    fn silhouette_to_tensor(
        silhouette: &GrayImage,
        view: &str,
        config: &PipelineConfig,
    ) -> Result<Array4<f32>> {
        let (width, height) = silhouette.dimensions();
        if width == 0 || height == 0 {
            return Err(BodyFitError::preprocessing(format!(
                "{} silhouette has degenerate dimensions ({}x{})",
                view, width, height
            )));
        }

        let fraction = Self::subject_fraction(silhouette);
        if fraction < config.min_subject_fraction {
            return Err(BodyFitError::preprocessing(format!(
                "{} silhouette contains no discernible subject ({:.3}% coverage, minimum {:.3}%)",
                view,
                f64::from(fraction) * 100.0,
                f64::from(config.min_subject_fraction) * 100.0
            )));
        }

        debug!(
            view,
            width,
            height,
            coverage = fraction,
            "normalizing silhouette"
        );

        let target = config.target_size;
        let resized = imageops::resize(silhouette, target, target, imageops::FilterType::Triangle);

        let target_usize: usize = target.try_into().map_err(|_| {
            BodyFitError::preprocessing("target size too large for tensor allocation")
        })?;

        let mut tensor = Array4::<f32>::zeros((1, 1, target_usize, target_usize));
        #[allow(clippy::indexing_slicing)]
        // Safe: tensor dimensions pre-allocated to match the resized silhouette
        for (x, y, pixel) in resized.enumerate_pixels() {
            tensor[[0, 0, y as usize, x as usize]] = f32::from(pixel[0]) / 255.0;
        }

        Ok(tensor)
    }

    /// Fraction of pixels bright enough to count as subject
    fn subject_fraction(silhouette: &GrayImage) -> f32 {
        let total = silhouette.width() as u64 * silhouette.height() as u64;
        if total == 0 {
            return 0.0;
        }
        let subject = silhouette
            .pixels()
            .filter(|p| p[0] > SUBJECT_LUMA_THRESHOLD)
            .count() as u64;
        subject as f32 / total as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ApparelType, Gender};
    use image::Luma;

    fn calibration() -> CalibrationInput {
        CalibrationInput {
            gender: Gender::Female,
            height_cm: 165.0,
            weight_kg: 60.0,
            apparel_type: ApparelType::All,
        }
    }

    fn silhouette_with_subject(width: u32, height: u32) -> GrayImage {
        let mut img = GrayImage::from_pixel(width, height, Luma([0]));
        // Centered rectangle covering a quarter of the frame
        for y in height / 4..(3 * height / 4) {
            for x in width / 4..(3 * width / 4) {
                img.put_pixel(x, y, Luma([255]));
            }
        }
        img
    }

    #[test]
    fn test_prepare_shapes_and_meta() {
        let config = PipelineConfig::default();
        let front = silhouette_with_subject(100, 200);
        let side = silhouette_with_subject(90, 180);

        let features =
            FeaturePreprocessor::prepare(&front, &side, &calibration(), &config).unwrap();

        assert_eq!(features.front.shape(), &[1, 1, 128, 128]);
        assert_eq!(features.side.shape(), &[1, 1, 128, 128]);
        assert_eq!(features.meta.shape(), &[1, 3]);
        assert_eq!(features.meta[[0, 0]], 1.0); // female
        assert_eq!(features.meta[[0, 1]], 165.0);
        assert_eq!(features.meta[[0, 2]], 60.0);
    }

    #[test]
    fn test_values_normalized_to_unit_range() {
        let config = PipelineConfig::builder().target_size(32).build().unwrap();
        let front = silhouette_with_subject(64, 64);
        let side = silhouette_with_subject(64, 64);

        let features =
            FeaturePreprocessor::prepare(&front, &side, &calibration(), &config).unwrap();

        for &v in features.front.iter() {
            assert!((0.0..=1.0).contains(&v));
        }
        // The subject block must survive the resize as bright values
        assert!(features.front.iter().any(|&v| v > 0.9));
    }

    #[test]
    fn test_blank_silhouette_rejected() {
        let config = PipelineConfig::default();
        let blank = GrayImage::from_pixel(64, 64, Luma([0]));
        let side = silhouette_with_subject(64, 64);

        let err = FeaturePreprocessor::prepare(&blank, &side, &calibration(), &config).unwrap_err();
        assert!(matches!(err, BodyFitError::Preprocessing(_)));
        assert!(err.to_string().contains("front"));
    }

    #[test]
    fn test_near_empty_silhouette_rejected() {
        let config = PipelineConfig::default();
        let mut sparse = GrayImage::from_pixel(100, 100, Luma([0]));
        sparse.put_pixel(50, 50, Luma([255])); // one pixel: 0.01% coverage
        let side = silhouette_with_subject(64, 64);

        assert!(FeaturePreprocessor::prepare(&sparse, &side, &calibration(), &config).is_err());
    }

    #[test]
    fn test_resize_is_deterministic() {
        let config = PipelineConfig::default();
        let front = silhouette_with_subject(123, 77);
        let side = silhouette_with_subject(123, 77);

        let a = FeaturePreprocessor::prepare(&front, &side, &calibration(), &config).unwrap();
        let b = FeaturePreprocessor::prepare(&front, &side, &calibration(), &config).unwrap();

        assert_eq!(a.front, b.front);
        assert_eq!(a.side, b.side);
    }
}
