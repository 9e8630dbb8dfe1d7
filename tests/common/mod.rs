//! Shared stubs and fixtures for the integration suite
#![allow(dead_code)]
#![allow(unreachable_pub)]

use bodyfit::{
    FeatureTensor, MeasurementModel, RawMeasurementVector, Result, SubjectIsolator,
    MEASUREMENT_COUNT,
};
use image::{DynamicImage, ImageBuffer, Rgb, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A plausible raw prediction: height slot 170, chest 95, the rest consistent
///
/// Slot order: ankle, arm-length, bicep, calf, chest, forearm, height, hip,
/// leg-length, shoulder-breadth, shoulder-to-crotch, thigh, waist, wrist.
pub fn plausible_raw_values() -> [f32; MEASUREMENT_COUNT] {
    [
        22.0, 60.0, 33.0, 38.0, 95.0, 28.0, 170.0, 98.0, 80.0, 43.0, 65.0, 55.0, 80.0, 17.0,
    ]
}

/// Deterministic measurement model returning a fixed raw vector
pub struct StubModel {
    values: [f32; MEASUREMENT_COUNT],
}

impl StubModel {
    pub fn new(values: [f32; MEASUREMENT_COUNT]) -> Self {
        Self { values }
    }

    pub fn plausible() -> Self {
        Self::new(plausible_raw_values())
    }

    /// A model whose height slot leaves the scale factor undefined
    pub fn zero_height() -> Self {
        let mut values = plausible_raw_values();
        values[6] = 0.0;
        Self::new(values)
    }
}

impl MeasurementModel for StubModel {
    fn predict(&self, _features: &FeatureTensor) -> Result<RawMeasurementVector> {
        RawMeasurementVector::from_slice(&self.values)
    }

    fn input_shape(&self) -> (usize, usize, usize, usize) {
        (1, 1, 128, 128)
    }
}

/// Isolator stub marking a centered rectangle as the subject
pub struct StubIsolator;

impl SubjectIsolator for StubIsolator {
    fn isolate(&self, image: &DynamicImage) -> Result<DynamicImage> {
        let (width, height) = (image.width(), image.height());
        let mut rgba = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
        for y in height / 4..(3 * height / 4) {
            for x in width / 4..(3 * width / 4) {
                rgba.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
        Ok(DynamicImage::ImageRgba8(rgba))
    }
}

/// Isolator counting how often it was invoked, for fail-fast assertions
pub struct CountingIsolator {
    pub calls: AtomicUsize,
}

impl CountingIsolator {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SubjectIsolator for CountingIsolator {
    fn isolate(&self, image: &DynamicImage) -> Result<DynamicImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        StubIsolator.isolate(image)
    }
}

/// Isolator that always fails, simulating a broken segmentation backend
pub struct FailingIsolator;

impl SubjectIsolator for FailingIsolator {
    fn isolate(&self, _image: &DynamicImage) -> Result<DynamicImage> {
        Err(bodyfit::BodyFitError::processing(
            "segmentation backend unavailable",
        ))
    }
}

/// Isolator returning a fully transparent image: no subject found
pub struct EmptyIsolator;

impl SubjectIsolator for EmptyIsolator {
    fn isolate(&self, image: &DynamicImage) -> Result<DynamicImage> {
        let rgba = RgbaImage::from_pixel(image.width(), image.height(), Rgba([0, 0, 0, 0]));
        Ok(DynamicImage::ImageRgba8(rgba))
    }
}

/// Encode a plain PNG of the given dimensions
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_pixel(width, height, Rgb([90, 110, 130]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}
