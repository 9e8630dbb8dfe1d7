//! Measurement model abstraction
//!
//! The trained predictor is an external collaborator: the pipeline only pins
//! down its input/output shape contract and injects an implementation at
//! processor construction, in the same way a segmentation backend would be.

use crate::{
    error::Result,
    preprocessing::FeatureTensor,
    types::{RawMeasurementVector, MEASUREMENT_COUNT},
};

/// Trait for the trained body-measurement predictor
///
/// Implementations must be deterministic: identical feature tensors and
/// identical model weights produce identical output. The output vector's slot
/// order follows [`crate::types::Measurement::ALL`].
///
/// Implementations are shared read-only across concurrent requests, hence the
/// `Send + Sync` bound and `&self` receiver.
pub trait MeasurementModel: Send + Sync {
    /// Run inference on the prepared feature tensors
    ///
    /// # Errors
    /// - Model execution failures
    /// - Output length mismatches against the canonical measurement count
    fn predict(&self, features: &FeatureTensor) -> Result<RawMeasurementVector>;

    /// Expected per-view input shape `(batch, channels, height, width)`
    fn input_shape(&self) -> (usize, usize, usize, usize);

    /// Number of measurement slots the model emits
    fn output_len(&self) -> usize {
        MEASUREMENT_COUNT
    }
}
