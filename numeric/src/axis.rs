// numeric/src/axis.rs
// Axis specifications and their sample sequences in base units.

use std::cmp::Ordering;

use bivarcontours_core::{
    ContourError, Limits, PhysicalDimension, Quantity, UnitRegistry, UnitSpec,
};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A step ratio this close to an integer counts as exact.
const STEP_RATIO_TOLERANCE: f64 = 1e-9;

/// How an axis is sampled, as given on the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub start: f64,
    pub stop: f64,
    /// A step when `is_count` is false, otherwise the number of samples.
    pub step_or_count: f64,
    pub is_count: bool,
    pub is_log: bool,
    pub unit: String,
}

impl AxisSpec {
    /// `[start, stop)` by `step`.
    pub fn stepped(start: f64, stop: f64, step: f64, unit: impl Into<String>) -> Self {
        Self {
            start,
            stop,
            step_or_count: step,
            is_count: false,
            is_log: false,
            unit: unit.into(),
        }
    }

    /// `count` evenly spaced samples over `[start, stop]`.
    pub fn counted(start: f64, stop: f64, count: usize, unit: impl Into<String>) -> Self {
        Self {
            start,
            stop,
            step_or_count: count as f64,
            is_count: true,
            is_log: false,
            unit: unit.into(),
        }
    }

    /// `count` log-spaced samples over `[start, stop]`.
    pub fn logarithmic(start: f64, stop: f64, count: usize, unit: impl Into<String>) -> Self {
        Self {
            is_log: true,
            ..Self::counted(start, stop, count, unit)
        }
    }

    pub fn generate(
        &self,
        registry: &UnitRegistry,
        limits: &Limits,
    ) -> Result<SampleSequence, ContourError> {
        let unit = registry.resolve(&self.unit)?;
        self.generate_in(unit, limits)
    }

    /// Like [`AxisSpec::generate`] with the unit already resolved.
    pub fn generate_in(
        &self,
        unit: UnitSpec,
        limits: &Limits,
    ) -> Result<SampleSequence, ContourError> {
        self.check_bounds()?;
        let start = base_magnitude(self.start, &unit)?;
        let stop = base_magnitude(self.stop, &unit)?;
        let span = stop - start;
        if !span.is_finite() {
            return Err(ContourError::config(format!(
                "axis range {} to {} {} overflows in base units",
                self.start,
                self.stop,
                unit.display_name()
            )));
        }

        let samples = match (self.is_count, self.is_log) {
            (false, true) => {
                return Err(ContourError::config(
                    "logarithmic axes need a sample count, not a step",
                ))
            }
            (false, false) => {
                let step = base_magnitude(self.step_or_count, &unit)?;
                let count = step_count(self.start, self.stop, self.step_or_count, limits)?;
                Array1::from_shape_fn(count, |i| start + i as f64 * step)
            }
            (true, false) => {
                let count = self.sample_count(limits)?;
                let last = (count - 1) as f64;
                Array1::from_shape_fn(count, |i| match i {
                    0 => start,
                    i if i + 1 == count => stop,
                    i => start + span * (i as f64 / last),
                })
            }
            (true, true) => {
                if self.start <= 0.0 || self.stop <= 0.0 {
                    return Err(ContourError::config(format!(
                        "logarithmic axis needs positive bounds, got {} to {}",
                        self.start, self.stop
                    )));
                }
                let count = self.sample_count(limits)?;
                let (lo, hi) = (start.ln(), stop.ln());
                let last = (count - 1) as f64;
                Array1::from_shape_fn(count, |i| match i {
                    0 => start,
                    i if i + 1 == count => stop,
                    i => (lo + (hi - lo) * (i as f64 / last)).exp(),
                })
            }
        };

        if let Some(i) = samples.iter().position(|v| !v.is_finite()) {
            return Err(ContourError::config(format!(
                "axis sample {} is not finite ({})",
                i, samples[i]
            )));
        }
        if let Some(i) = (1..samples.len())
            .find(|&i| samples[i].partial_cmp(&samples[i - 1]) != Some(Ordering::Greater))
        {
            return Err(ContourError::config(format!(
                "axis samples stop increasing at index {} ({}); the step is below floating point resolution",
                i, samples[i]
            )));
        }

        debug!(
            unit = %unit.display_name(),
            count = samples.len(),
            first = samples[0],
            last = samples[samples.len() - 1],
            "axis sampled"
        );
        Ok(SampleSequence::new(samples, unit))
    }

    fn check_bounds(&self) -> Result<(), ContourError> {
        if !self.start.is_finite() || !self.stop.is_finite() || !self.step_or_count.is_finite() {
            return Err(ContourError::config(format!(
                "axis bounds must be finite, got start={} stop={} step={}",
                self.start, self.stop, self.step_or_count
            )));
        }
        if self.start >= self.stop {
            return Err(ContourError::config(format!(
                "axis start {} must be below stop {}",
                self.start, self.stop
            )));
        }
        if self.step_or_count <= 0.0 {
            let what = if self.is_count { "count" } else { "step" };
            return Err(ContourError::config(format!(
                "axis {} must be positive, got {}",
                what, self.step_or_count
            )));
        }
        Ok(())
    }

    fn sample_count(&self, limits: &Limits) -> Result<usize, ContourError> {
        let count = self.step_or_count;
        if count.fract() != 0.0 {
            return Err(ContourError::config(format!(
                "axis sample count must be an integer, got {}",
                count
            )));
        }
        if count < 2.0 {
            return Err(ContourError::config(format!(
                "axis needs at least 2 samples, got {}",
                count
            )));
        }
        if count > limits.max_cells as f64 {
            return Err(ContourError::limit(
                "max_cells",
                count.min(usize::MAX as f64) as usize,
                limits.max_cells,
            ));
        }
        Ok(count as usize)
    }
}

/// `value` in `unit` converted to a finite base-unit magnitude.
fn base_magnitude(value: f64, unit: &UnitSpec) -> Result<f64, ContourError> {
    Ok(Quantity::from_spec(value, unit.clone())?.to_base()?.magnitude())
}

/// Number of samples of `[start, stop)` by `step`.
fn step_count(start: f64, stop: f64, step: f64, limits: &Limits) -> Result<usize, ContourError> {
    let ratio = (stop - start) / step;
    if !ratio.is_finite() {
        return Err(ContourError::config(format!(
            "axis step {} is too small for range {} to {}",
            step, start, stop
        )));
    }
    let nearest = ratio.round();
    let count = if (ratio - nearest).abs() <= STEP_RATIO_TOLERANCE * ratio.abs().max(1.0) {
        nearest
    } else {
        ratio.ceil()
    };
    if count > limits.max_cells as f64 {
        return Err(ContourError::limit(
            "max_cells",
            count.min(usize::MAX as f64) as usize,
            limits.max_cells,
        ));
    }
    if count < 2.0 {
        return Err(ContourError::config(format!(
            "axis step {} leaves fewer than 2 samples between {} and {}",
            step, start, stop
        )));
    }
    Ok(count as usize)
}

/// Ordered samples of one axis, stored in the base unit of `unit`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSequence {
    pub samples: Array1<f64>,
    pub base_unit: String,
    pub unit: UnitSpec,
}

impl SampleSequence {
    /// Wraps base-unit samples; `unit` is the unit they are displayed in.
    pub fn new(samples: Array1<f64>, unit: UnitSpec) -> Self {
        Self {
            base_unit: unit.dimension.base_unit(),
            samples,
            unit,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn dimension(&self) -> PhysicalDimension {
        self.unit.dimension
    }

    /// Samples converted back to the unit the axis was specified in.
    pub fn to_display(&self) -> Array1<f64> {
        self.samples.mapv(|v| self.unit.from_base(v))
    }

    pub fn display_bounds(&self) -> Option<(f64, f64)> {
        let first = *self.samples.first()?;
        let last = *self.samples.last()?;
        Some((self.unit.from_base(first), self.unit.from_base(last)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(spec: &AxisSpec) -> Result<SampleSequence, ContourError> {
        spec.generate(UnitRegistry::global(), &Limits::default())
    }

    #[test]
    fn decimal_step_stops_before_the_end() {
        let seq = generate(&AxisSpec::stepped(1.0, 2.0, 0.1, "m")).expect("axis");
        assert_eq!(seq.len(), 10);
        assert_eq!(seq.samples[0], 1.0);
        assert!((seq.samples[9] - 1.9).abs() < 1e-12);
        assert!(seq.samples.iter().all(|v| *v < 2.0));
    }

    #[test]
    fn inexact_step_includes_the_partial_last_sample() {
        let seq = generate(&AxisSpec::stepped(0.0, 1.0, 0.3, "")).expect("axis");
        assert_eq!(seq.len(), 4);
        assert!((seq.samples[3] - 0.9).abs() < 1e-12);
    }

    #[test]
    fn counted_axis_hits_both_ends() {
        let seq = generate(&AxisSpec::counted(1.0, 2.0, 10, "m")).expect("axis");
        assert_eq!(seq.len(), 10);
        assert_eq!(seq.samples[0], 1.0);
        assert_eq!(seq.samples[9], 2.0);
    }

    #[test]
    fn log_axis_is_geometric() {
        let seq = generate(&AxisSpec::logarithmic(1.0, 1000.0, 4, "Hz")).expect("axis");
        let expected = [1.0, 10.0, 100.0, 1000.0];
        for (got, want) in seq.samples.iter().zip(expected) {
            assert!((got - want).abs() <= 1e-9 * want, "{} vs {}", got, want);
        }
        assert_eq!(seq.samples[3], 1000.0);
    }

    #[test]
    fn log_axis_rejects_non_positive_bounds() {
        let err = generate(&AxisSpec::logarithmic(0.0, 10.0, 5, "")).expect_err("zero");
        assert_eq!(err.code(), "E_CONFIG");
    }

    #[test]
    fn stepped_log_axis_is_unsupported() {
        let spec = AxisSpec {
            is_log: true,
            ..AxisSpec::stepped(1.0, 10.0, 1.0, "")
        };
        assert_eq!(generate(&spec).expect_err("step/log").code(), "E_CONFIG");
    }

    #[test]
    fn samples_are_stored_in_base_units() {
        let seq = generate(&AxisSpec::counted(1.0, 2.0, 2, "km")).expect("axis");
        assert_eq!(seq.samples.to_vec(), vec![1000.0, 2000.0]);
        assert_eq!(seq.base_unit, "m");
        assert_eq!(seq.to_display().to_vec(), vec![1.0, 2.0]);
        assert_eq!(seq.display_bounds(), Some((1.0, 2.0)));
    }

    #[test]
    fn invalid_ranges_are_configuration_errors() {
        let cases = [
            AxisSpec::stepped(2.0, 1.0, 0.1, "m"),
            AxisSpec::stepped(1.0, 1.0, 0.1, "m"),
            AxisSpec::stepped(1.0, 2.0, 0.0, "m"),
            AxisSpec::stepped(1.0, 2.0, -0.5, "m"),
            AxisSpec::stepped(f64::NAN, 2.0, 0.1, "m"),
            AxisSpec::stepped(1.0, 2.0, 5.0, "m"),
            AxisSpec::counted(1.0, 2.0, 1, "m"),
            AxisSpec {
                step_or_count: 2.5,
                ..AxisSpec::counted(1.0, 2.0, 2, "m")
            },
        ];
        for spec in cases {
            let err = generate(&spec).expect_err("invalid");
            assert_eq!(err.code(), "E_CONFIG", "{:?}", spec);
        }
    }

    #[test]
    fn step_below_resolution_is_rejected() {
        let err = generate(&AxisSpec::stepped(1e16, 1e16 + 8.0, 0.5, "")).expect_err("ulp");
        assert_eq!(err.code(), "E_CONFIG");
    }

    #[test]
    fn bounds_overflowing_in_base_units_are_rejected() {
        let cases = [
            AxisSpec::counted(0.0, 1e306, 2, "km"),
            AxisSpec::counted(-1e308, 1e308, 2, "m"),
            AxisSpec::stepped(0.0, 1e306, 1e305, "km"),
        ];
        for spec in cases {
            let err = generate(&spec).expect_err("overflow");
            assert_eq!(err.code(), "E_CONFIG", "{:?}", spec);
        }
    }

    #[test]
    fn counted_axis_starts_exactly_at_start() {
        let seq = generate(&AxisSpec::counted(-3.0, 7.0, 5, "")).expect("axis");
        assert_eq!(seq.samples[0], -3.0);
        assert!(seq.samples.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn huge_sample_counts_hit_the_cell_limit() {
        let err = generate(&AxisSpec::stepped(0.0, 1.0, 1e-12, "")).expect_err("cells");
        assert_eq!(err.code(), "E_LIMIT");
    }

    #[test]
    fn unknown_unit_fails_before_sampling() {
        let err = generate(&AxisSpec::stepped(1.0, 2.0, 0.1, "furlongs")).expect_err("unit");
        assert_eq!(err.code(), "E_UNIT_UNDEFINED");
    }
}
