//! Height-anchored measurement calibration
//!
//! Raw predictions arrive in an uncalibrated scale; the stated height is the
//! physical reference that pins them to centimeters. The correction is a
//! single uniform scale factor on the assumption that predictor error is
//! primarily an overall scale error rather than per-dimension bias. Keep it
//! that way: per-measurement calibration would change every downstream result.

use crate::{
    error::{BodyFitError, Result},
    types::{
        CalibratedMeasurements, CalibrationInput, Measurement, PlausibilityWarning,
        RawMeasurementVector, MEASUREMENT_COUNT,
    },
};
use tracing::debug;

/// Anatomical orderings checked after scaling. Violations are advisory: they
/// ride along as warnings and never fail the request.
const ORDERING_CHECKS: [(Measurement, Measurement); 3] = [
    (Measurement::Calf, Measurement::Thigh),
    (Measurement::Wrist, Measurement::Forearm),
    (Measurement::Forearm, Measurement::Bicep),
];

/// Rescales raw predictions against the stated height
pub struct MeasurementCalibrator;

impl MeasurementCalibrator {
    /// Calibrate a raw measurement vector against the stated height
    ///
    /// Returns the final centimeter measurements (rounded to two decimals)
    /// together with any advisory plausibility warnings.
    ///
    /// # Errors
    /// Returns `Calibration` only when the raw height slot is non-positive or
    /// non-finite, leaving the scale factor undefined. Every other implausible
    /// value is reported as a warning, never an error.
    pub fn calibrate(
        raw: &RawMeasurementVector,
        input: &CalibrationInput,
    ) -> Result<(CalibratedMeasurements, Vec<PlausibilityWarning>)> {
        let raw_height = raw.height();
        if !raw_height.is_finite() || raw_height <= 0.0 {
            return Err(BodyFitError::calibration(format!(
                "raw height prediction {} leaves the scale factor undefined",
                raw_height
            )));
        }

        let scale = input.height_cm / raw_height;
        debug!(raw_height, stated_height = input.height_cm, scale, "calibrating measurements");

        let mut values = [0.0_f32; MEASUREMENT_COUNT];
        for (measurement, raw_value) in raw.iter() {
            values[measurement.index()] = round_cm(raw_value * scale);
        }

        let measurements = CalibratedMeasurements::new(values);
        let warnings = Self::plausibility_warnings(&measurements, input);
        for warning in &warnings {
            log::warn!("plausibility check: {}", warning);
        }

        Ok((measurements, warnings))
    }

    /// Soft anatomical-plausibility checks on the calibrated values
    fn plausibility_warnings(
        measurements: &CalibratedMeasurements,
        input: &CalibrationInput,
    ) -> Vec<PlausibilityWarning> {
        let mut warnings = Vec::new();

        for (smaller, larger) in ORDERING_CHECKS {
            let sv = measurements.get(smaller);
            let lv = measurements.get(larger);
            if sv > lv {
                warnings.push(PlausibilityWarning {
                    constraint: format!("{} <= {}", smaller, larger),
                    detail: format!("{} is {:.2} cm but {} is {:.2} cm", smaller, sv, larger, lv),
                });
            }
        }

        for (measurement, value) in measurements.iter() {
            if measurement == Measurement::Height {
                continue;
            }
            if value <= 0.0 {
                warnings.push(PlausibilityWarning {
                    constraint: format!("{} > 0", measurement),
                    detail: format!("{} came out at {:.2} cm", measurement, value),
                });
            } else if value > input.height_cm {
                warnings.push(PlausibilityWarning {
                    constraint: format!("{} <= height", measurement),
                    detail: format!(
                        "{} is {:.2} cm against a stated height of {:.2} cm",
                        measurement, value, input.height_cm
                    ),
                });
            }
        }

        warnings
    }
}

/// Round to two decimals, the precision the response surface reports
fn round_cm(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}
