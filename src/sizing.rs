//! Size charts and measurement-to-size resolution
//!
//! Charts are static, versioned tables keyed by (apparel type, gender). They
//! load once at startup (from JSON or the embedded defaults) and are read-only
//! for the lifetime of the process.

use crate::{
    error::{BodyFitError, Result},
    types::{ApparelType, CalibratedMeasurements, CalibrationInput, Gender, Measurement, SizeFit,
        SizeRecommendation},
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Weight above which the t-shirt recommendation is overridden, per gender
const WEIGHT_OVERRIDE_KG: (f32, f32) = (95.0, 80.0); // (male, female)
/// Stated height above which male pants sizes bump one step up
const TALL_HEIGHT_CM: f32 = 180.0;
/// Numeric pants labels at or above this value are never bumped
const PANTS_BUMP_CEILING: i32 = 40;

/// Inclusive-lower / exclusive-upper numeric range over one measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRange {
    /// Governing measurement
    pub measurement: Measurement,
    /// Inclusive lower bound in centimeters
    pub min: f32,
    /// Exclusive upper bound in centimeters
    pub max: f32,
}

impl MeasurementRange {
    fn contains(&self, value: f32) -> bool {
        value >= self.min && value < self.max
    }
}

/// One ordered chart rule: governing ranges and the resulting size label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeRule {
    /// Resulting size label
    pub label: String,
    /// Governing ranges; the first is the primary measurement used for
    /// extrapolation boundaries
    pub ranges: Vec<MeasurementRange>,
}

/// Ordered rule list for one (apparel type, gender) combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeChart {
    /// Apparel type this chart covers (never `all`)
    pub apparel: ApparelType,
    /// Gender this chart covers
    pub gender: Gender,
    /// Rules ordered ascending by measurement range
    pub rules: Vec<SizeRule>,
}

impl SizeChart {
    /// The measurement whose range boundaries drive extrapolation
    ///
    /// # Errors
    /// Returns `InvalidConfig` when the chart has no rules or a rule has no
    /// ranges; [`SizeChart::validate`] rejects such charts at load.
    pub fn primary_measurement(&self) -> Result<Measurement> {
        self.rules
            .first()
            .and_then(|rule| rule.ranges.first())
            .map(|range| range.measurement)
            .ok_or_else(|| {
                BodyFitError::invalid_config(format!(
                    "size chart ({}, {}) has no governing ranges",
                    self.apparel, self.gender
                ))
            })
    }

    /// All labels this chart can produce, in rule order
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.label.as_str()).collect()
    }

    /// Check structural invariants: ordered, non-overlapping, well-formed ranges
    ///
    /// # Errors
    /// Returns `InvalidConfig` describing the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        if self.apparel == ApparelType::All {
            return Err(BodyFitError::invalid_config(
                "size charts are keyed per concrete apparel type, 'all' is a request alias",
            ));
        }
        if self.rules.is_empty() {
            return Err(BodyFitError::invalid_config(format!(
                "size chart ({}, {}) has no rules",
                self.apparel, self.gender
            )));
        }

        let primary = self.primary_measurement()?;
        for rule in &self.rules {
            if rule.label.is_empty() {
                return Err(BodyFitError::invalid_config("size rule with empty label"));
            }
            if rule.ranges.is_empty() {
                return Err(BodyFitError::invalid_config(format!(
                    "size rule '{}' has no governing ranges",
                    rule.label
                )));
            }
            for range in &rule.ranges {
                if !range.min.is_finite() || !range.max.is_finite() || range.min >= range.max {
                    return Err(BodyFitError::invalid_config(format!(
                        "size rule '{}' has a malformed range for {}: [{}, {})",
                        rule.label, range.measurement, range.min, range.max
                    )));
                }
            }
            let rule_primary = rule.ranges.first().map(|r| r.measurement);
            if rule_primary != Some(primary) {
                return Err(BodyFitError::invalid_config(format!(
                    "size rule '{}' leads with a different primary measurement than the chart",
                    rule.label
                )));
            }
        }

        // Ranges must be ascending and non-overlapping per measurement.
        for measurement in self.governing_measurements() {
            let mut previous_max = f32::NEG_INFINITY;
            for rule in &self.rules {
                let Some(range) = rule.ranges.iter().find(|r| r.measurement == measurement)
                else {
                    continue;
                };
                if range.min < previous_max {
                    return Err(BodyFitError::invalid_config(format!(
                        "size chart ({}, {}) has overlapping {} ranges at rule '{}'",
                        self.apparel, self.gender, measurement, rule.label
                    )));
                }
                previous_max = range.max;
            }
        }

        Ok(())
    }

    fn governing_measurements(&self) -> Vec<Measurement> {
        let mut seen = Vec::new();
        for rule in &self.rules {
            for range in &rule.ranges {
                if !seen.contains(&range.measurement) {
                    seen.push(range.measurement);
                }
            }
        }
        seen
    }
}

/// Immutable set of charts, one per (apparel type, gender)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeChartSet {
    charts: Vec<SizeChart>,
}

impl SizeChartSet {
    /// Build from explicit charts, validating each
    ///
    /// # Errors
    /// Returns `InvalidConfig` for malformed charts or duplicate
    /// (apparel, gender) keys.
    pub fn new(charts: Vec<SizeChart>) -> Result<Self> {
        let set = Self { charts };
        set.validate()?;
        Ok(set)
    }

    /// Load from a JSON string
    ///
    /// # Errors
    /// Returns `InvalidConfig` for unparseable JSON or invalid chart data.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let set: Self = serde_json::from_str(json)
            .map_err(|e| BodyFitError::invalid_config(format!("size chart JSON: {}", e)))?;
        set.validate()?;
        debug!("loaded {} size charts from JSON", set.charts.len());
        Ok(set)
    }

    /// Load from a JSON file
    ///
    /// # Errors
    /// Propagates IO failures and chart validation errors.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Look up the chart for an (apparel, gender) pair
    #[must_use]
    pub fn get(&self, apparel: ApparelType, gender: Gender) -> Option<&SizeChart> {
        self.charts
            .iter()
            .find(|chart| chart.apparel == apparel && chart.gender == gender)
    }

    fn validate(&self) -> Result<()> {
        for chart in &self.charts {
            chart.validate()?;
        }
        for (i, chart) in self.charts.iter().enumerate() {
            let duplicate = self.charts[..i]
                .iter()
                .any(|c| c.apparel == chart.apparel && c.gender == chart.gender);
            if duplicate {
                return Err(BodyFitError::invalid_config(format!(
                    "duplicate size chart for ({}, {})",
                    chart.apparel, chart.gender
                )));
            }
        }
        Ok(())
    }
}

impl Default for SizeChartSet {
    /// The built-in charts: chest/shoulder-governed t-shirts and
    /// waist/hip-governed pants, per gender
    fn default() -> Self {
        let charts = vec![
            tshirt_chart(
                Gender::Male,
                &[90.0, 97.0, 104.0, 112.0, 120.0, 128.0, 136.0],
                &[39.0, 42.0, 45.0, 48.0, 51.0, 54.0, 57.0],
            ),
            tshirt_chart(
                Gender::Female,
                &[82.0, 89.0, 96.0, 104.0, 112.0, 120.0, 128.0],
                &[35.0, 38.0, 41.0, 44.0, 47.0, 50.0, 53.0],
            ),
            pants_chart(
                Gender::Male,
                &["30", "32", "34", "36", "38", "40", "42"],
                &[71.0, 76.0, 81.0, 86.0, 91.0, 97.0, 102.0, 107.0],
                &[97.0, 102.0, 107.0, 112.0, 117.0, 122.0, 127.0, 132.0],
            ),
            pants_chart(
                Gender::Female,
                &["26", "28", "30", "32", "34", "36", "38"],
                &[61.0, 66.0, 71.0, 76.0, 81.0, 86.0, 91.0, 97.0],
                &[87.0, 92.0, 97.0, 102.0, 107.0, 112.0, 117.0, 122.0],
            ),
        ];
        Self { charts }
    }
}

const TSHIRT_LABELS: [&str; 6] = ["S", "M", "L", "XL", "XXL", "XXXL"];

/// Build a t-shirt chart from chest and shoulder breakpoint sequences
fn tshirt_chart(gender: Gender, chest_bounds: &[f32], shoulder_bounds: &[f32]) -> SizeChart {
    let rules = TSHIRT_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| SizeRule {
            label: (*label).to_string(),
            ranges: vec![
                MeasurementRange {
                    measurement: Measurement::Chest,
                    min: chest_bounds[i],
                    max: chest_bounds[i + 1],
                },
                MeasurementRange {
                    measurement: Measurement::ShoulderBreadth,
                    min: shoulder_bounds[i],
                    max: shoulder_bounds[i + 1],
                },
            ],
        })
        .collect();
    SizeChart {
        apparel: ApparelType::Tshirt,
        gender,
        rules,
    }
}

/// Build a pants chart from waist and hip breakpoint sequences
fn pants_chart(
    gender: Gender,
    labels: &[&str],
    waist_bounds: &[f32],
    hip_bounds: &[f32],
) -> SizeChart {
    let rules = labels
        .iter()
        .enumerate()
        .map(|(i, label)| SizeRule {
            label: (*label).to_string(),
            ranges: vec![
                MeasurementRange {
                    measurement: Measurement::Waist,
                    min: waist_bounds[i],
                    max: waist_bounds[i + 1],
                },
                MeasurementRange {
                    measurement: Measurement::Hip,
                    min: hip_bounds[i],
                    max: hip_bounds[i + 1],
                },
            ],
        })
        .collect();
    SizeChart {
        apparel: ApparelType::Pants,
        gender,
        rules,
    }
}

/// Maps calibrated measurements to discrete garment sizes
pub struct SizeResolver;

impl SizeResolver {
    /// Resolve sizes for every apparel type the request asked for
    ///
    /// # Errors
    /// Returns `NoMatchingChart` when no chart exists for a requested
    /// (apparel, gender) pair. Out-of-range measurements never fail; they
    /// clamp to the nearest boundary size and flag the fit as extrapolated.
    pub fn resolve(
        measurements: &CalibratedMeasurements,
        input: &CalibrationInput,
        charts: &SizeChartSet,
    ) -> Result<SizeRecommendation> {
        let mut recommendation = SizeRecommendation::default();

        if input.apparel_type.wants_tshirt() {
            let chart = charts
                .get(ApparelType::Tshirt, input.gender)
                .ok_or_else(|| BodyFitError::no_matching_chart(ApparelType::Tshirt, input.gender))?;
            let (fit, _) = Self::resolve_chart(chart, measurements)?;
            recommendation.tshirt = Some(Self::adjust_tshirt(fit, chart, input));
        }

        if input.apparel_type.wants_pants() {
            let chart = charts
                .get(ApparelType::Pants, input.gender)
                .ok_or_else(|| BodyFitError::no_matching_chart(ApparelType::Pants, input.gender))?;
            let (fit, matched_index) = Self::resolve_chart(chart, measurements)?;
            recommendation.pants = Some(Self::adjust_pants(fit, chart, input, matched_index));
        }

        Ok(recommendation)
    }

    /// Scan a chart's ordered rules for the first that admits every governing
    /// measurement; clamp to the boundary rule when none does
    fn resolve_chart(
        chart: &SizeChart,
        measurements: &CalibratedMeasurements,
    ) -> Result<(SizeFit, usize)> {
        let primary = chart.primary_measurement()?;
        let primary_value = measurements.get(primary);

        let matched = chart.rules.iter().position(|rule| {
            rule.ranges
                .iter()
                .all(|range| measurements.get(range.measurement) < range.max)
        });

        // Either some governing measurement sits past every rule's ceiling
        // (clamp to the largest size) or a rule admitted all of them.
        let (index, past_ceiling) = match matched {
            Some(index) => (index, false),
            None => (chart.rules.len() - 1, true),
        };

        let in_primary_range = chart.rules[index]
            .ranges
            .iter()
            .find(|range| range.measurement == primary)
            .is_some_and(|range| range.contains(primary_value));
        let extrapolated = past_ceiling || !in_primary_range;

        debug!(
            "chart ({}, {}): {} = {:.1} cm -> '{}'{}",
            chart.apparel,
            chart.gender,
            primary,
            primary_value,
            chart.rules[index].label,
            if extrapolated { " (extrapolated)" } else { "" }
        );

        Ok((
            SizeFit {
                label: chart.rules[index].label.clone(),
                extrapolated,
            },
            index,
        ))
    }

    /// Heavy builds size up regardless of the ranged result
    fn adjust_tshirt(fit: SizeFit, chart: &SizeChart, input: &CalibrationInput) -> SizeFit {
        let threshold = match input.gender {
            Gender::Male => WEIGHT_OVERRIDE_KG.0,
            Gender::Female => WEIGHT_OVERRIDE_KG.1,
        };
        if input.weight_kg > threshold {
            if let Some(rule) = chart.rules.iter().find(|rule| rule.label == "XXL") {
                return SizeFit {
                    label: rule.label.clone(),
                    extrapolated: fit.extrapolated,
                };
            }
        }
        fit
    }

    /// Tall male subjects take the next pants size up, within the chart
    fn adjust_pants(
        fit: SizeFit,
        chart: &SizeChart,
        input: &CalibrationInput,
        matched_index: usize,
    ) -> SizeFit {
        if input.gender != Gender::Male || input.height_cm <= TALL_HEIGHT_CM {
            return fit;
        }
        let Ok(numeric_label) = fit.label.parse::<i32>() else {
            return fit;
        };
        if numeric_label >= PANTS_BUMP_CEILING {
            return fit;
        }
        match chart.rules.get(matched_index + 1) {
            Some(next_rule) => SizeFit {
                label: next_rule.label.clone(),
                extrapolated: fit.extrapolated,
            },
            None => fit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ApparelType, MEASUREMENT_COUNT};

    fn measurements_with(pairs: &[(Measurement, f32)]) -> CalibratedMeasurements {
        let mut values = [50.0_f32; MEASUREMENT_COUNT];
        values[Measurement::Height.index()] = 175.0;
        values[Measurement::ShoulderBreadth.index()] = 43.0;
        values[Measurement::Hip.index()] = 100.0;
        for &(m, v) in pairs {
            values[m.index()] = v;
        }
        CalibratedMeasurements::new(values)
    }

    fn input(gender: Gender, apparel: ApparelType) -> CalibrationInput {
        CalibrationInput {
            gender,
            height_cm: 175.0,
            weight_kg: 70.0,
            apparel_type: apparel,
        }
    }

    #[test]
    fn test_default_charts_validate() {
        let charts = SizeChartSet::default();
        assert!(charts.validate().is_ok());
        assert!(charts.get(ApparelType::Tshirt, Gender::Male).is_some());
        assert!(charts.get(ApparelType::Pants, Gender::Female).is_some());
        assert!(charts.get(ApparelType::Tshirt, Gender::Male).unwrap().labels().contains(&"XXL"));
    }

    #[test]
    fn test_in_range_resolution() {
        let charts = SizeChartSet::default();
        let measurements = measurements_with(&[(Measurement::Chest, 100.0)]);

        let rec = SizeResolver::resolve(
            &measurements,
            &input(Gender::Male, ApparelType::Tshirt),
            &charts,
        )
        .unwrap();

        let fit = rec.tshirt.unwrap();
        assert_eq!(fit.label, "M");
        assert!(!fit.extrapolated);
        assert!(rec.pants.is_none());
    }

    #[test]
    fn test_larger_governing_measurement_wins() {
        // Chest alone says M, but broad shoulders push the fit to XL.
        let charts = SizeChartSet::default();
        let measurements = measurements_with(&[
            (Measurement::Chest, 100.0),
            (Measurement::ShoulderBreadth, 49.0),
        ]);

        let rec = SizeResolver::resolve(
            &measurements,
            &input(Gender::Male, ApparelType::Tshirt),
            &charts,
        )
        .unwrap();

        assert_eq!(rec.tshirt.unwrap().label, "XL");
    }

    #[test]
    fn test_boundary_is_lower_inclusive() {
        // Exactly 104 leaves the M range [97, 104) and lands in L [104, 112).
        let charts = SizeChartSet::default();
        let measurements = measurements_with(&[(Measurement::Chest, 104.0)]);

        let rec = SizeResolver::resolve(
            &measurements,
            &input(Gender::Male, ApparelType::Tshirt),
            &charts,
        )
        .unwrap();

        let fit = rec.tshirt.unwrap();
        assert_eq!(fit.label, "L");
        assert!(!fit.extrapolated);
    }

    #[test]
    fn test_below_chart_floor_extrapolates_to_smallest() {
        let charts = SizeChartSet::default();
        let measurements = measurements_with(&[
            (Measurement::Chest, 70.0),
            (Measurement::ShoulderBreadth, 36.0),
        ]);

        let rec = SizeResolver::resolve(
            &measurements,
            &input(Gender::Male, ApparelType::Tshirt),
            &charts,
        )
        .unwrap();

        let fit = rec.tshirt.unwrap();
        assert_eq!(fit.label, "S");
        assert!(fit.extrapolated);
    }

    #[test]
    fn test_above_chart_ceiling_extrapolates_to_largest() {
        let charts = SizeChartSet::default();
        let measurements = measurements_with(&[
            (Measurement::Chest, 150.0),
            (Measurement::ShoulderBreadth, 60.0),
        ]);

        let rec = SizeResolver::resolve(
            &measurements,
            &input(Gender::Male, ApparelType::Tshirt),
            &charts,
        )
        .unwrap();

        let fit = rec.tshirt.unwrap();
        assert_eq!(fit.label, "XXXL");
        assert!(fit.extrapolated);
    }

    #[test]
    fn test_weight_override_forces_xxl() {
        let charts = SizeChartSet::default();
        let measurements = measurements_with(&[(Measurement::Chest, 100.0)]);
        let mut heavy = input(Gender::Male, ApparelType::Tshirt);
        heavy.weight_kg = 100.0;

        let rec = SizeResolver::resolve(&measurements, &heavy, &charts).unwrap();
        assert_eq!(rec.tshirt.unwrap().label, "XXL");

        let mut heavy_female = input(Gender::Female, ApparelType::Tshirt);
        heavy_female.weight_kg = 85.0;
        let rec = SizeResolver::resolve(&measurements, &heavy_female, &charts).unwrap();
        assert_eq!(rec.tshirt.unwrap().label, "XXL");
    }

    #[test]
    fn test_tall_male_pants_bump() {
        let charts = SizeChartSet::default();
        let measurements = measurements_with(&[
            (Measurement::Waist, 78.0),
            (Measurement::Hip, 104.0),
        ]);
        let mut tall = input(Gender::Male, ApparelType::Pants);
        tall.height_cm = 185.0;

        let rec = SizeResolver::resolve(&measurements, &tall, &charts).unwrap();
        // Waist 78 resolves to "32"; tall bump takes the next rule up.
        assert_eq!(rec.pants.unwrap().label, "34");

        // Same measurements without the height do not bump.
        let rec = SizeResolver::resolve(
            &measurements,
            &input(Gender::Male, ApparelType::Pants),
            &charts,
        )
        .unwrap();
        assert_eq!(rec.pants.unwrap().label, "32");
    }

    #[test]
    fn test_tall_bump_stops_at_ceiling_label() {
        let charts = SizeChartSet::default();
        let measurements = measurements_with(&[
            (Measurement::Waist, 104.0),
            (Measurement::Hip, 129.0),
        ]);
        let mut tall = input(Gender::Male, ApparelType::Pants);
        tall.height_cm = 190.0;

        let rec = SizeResolver::resolve(&measurements, &tall, &charts).unwrap();
        // Resolves to "42", which is past the bump ceiling and stays put.
        assert_eq!(rec.pants.unwrap().label, "42");
    }

    #[test]
    fn test_all_requests_both_sizes() {
        let charts = SizeChartSet::default();
        let measurements = measurements_with(&[
            (Measurement::Chest, 100.0),
            (Measurement::Waist, 80.0),
        ]);

        let rec = SizeResolver::resolve(
            &measurements,
            &input(Gender::Male, ApparelType::All),
            &charts,
        )
        .unwrap();

        assert!(rec.tshirt.is_some());
        assert!(rec.pants.is_some());
    }

    #[test]
    fn test_missing_chart_errors() {
        let charts = SizeChartSet::new(vec![]).unwrap();
        let measurements = measurements_with(&[]);

        let err = SizeResolver::resolve(
            &measurements,
            &input(Gender::Male, ApparelType::Tshirt),
            &charts,
        )
        .unwrap_err();

        assert!(matches!(err, BodyFitError::NoMatchingChart { .. }));
    }

    #[test]
    fn test_json_round_trip() {
        let charts = SizeChartSet::default();
        let json = serde_json::to_string(&charts).unwrap();
        let reloaded = SizeChartSet::from_json_str(&json).unwrap();
        assert_eq!(charts, reloaded);
    }

    #[test]
    fn test_overlapping_ranges_rejected() {
        let chart = SizeChart {
            apparel: ApparelType::Tshirt,
            gender: Gender::Male,
            rules: vec![
                SizeRule {
                    label: "S".to_string(),
                    ranges: vec![MeasurementRange {
                        measurement: Measurement::Chest,
                        min: 90.0,
                        max: 100.0,
                    }],
                },
                SizeRule {
                    label: "M".to_string(),
                    ranges: vec![MeasurementRange {
                        measurement: Measurement::Chest,
                        min: 95.0,
                        max: 105.0,
                    }],
                },
            ],
        };
        assert!(SizeChartSet::new(vec![chart]).is_err());
    }

    #[test]
    fn test_all_alias_chart_rejected() {
        let chart = SizeChart {
            apparel: ApparelType::All,
            gender: Gender::Male,
            rules: vec![],
        };
        assert!(SizeChartSet::new(vec![chart]).is_err());
    }
}
