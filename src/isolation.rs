//! Background isolation boundary and silhouette rendering
//!
//! The segmentation model itself is an external capability; this module only
//! defines the trait the pipeline calls and the rendering step that turns the
//! isolator's alpha-masked output into the canonical silhouette the predictor
//! was trained on.

use crate::error::Result;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use tracing::debug;

/// External background-removal capability
///
/// Implementations must return an RGBA image of the same dimensions whose
/// alpha channel marks the subject (opaque) against the cleared background
/// (transparent). Aspect ratio and subject silhouette must be preserved.
/// Failures surface to the pipeline as `Processing` errors.
pub trait SubjectIsolator: Send + Sync {
    /// Produce a background-cleared image from a decoded upload
    ///
    /// # Errors
    /// Any error from the underlying segmentation function; the orchestrator
    /// maps it to a stage-tagged `Processing` failure.
    fn isolate(&self, image: &DynamicImage) -> Result<DynamicImage>;
}

/// Renders isolator output into the silhouette format downstream stages expect
pub struct SilhouetteRenderer;

impl SilhouetteRenderer {
    /// Composite the isolated subject to white over a black background
    ///
    /// Alpha-compositing white over black reduces to copying the alpha channel
    /// into the luma plane, so partially transparent subject edges keep their
    /// anti-aliased falloff.
    #[must_use]
    pub fn render(isolated: &DynamicImage) -> GrayImage {
        let rgba = isolated.to_rgba8();
        let (width, height) = rgba.dimensions();

        let silhouette: GrayImage = ImageBuffer::from_fn(width, height, |x, y| {
            let alpha = rgba.get_pixel(x, y)[3];
            Luma([alpha])
        });

        debug!(width, height, "rendered subject silhouette");
        silhouette
    }
}
