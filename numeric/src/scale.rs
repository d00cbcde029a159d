// numeric/src/scale.rs

use bivarcontours_core::UnitSpec;
use ndarray::Array2;

/// Magnitude of one reference sample in `result_unit` divided by its
/// magnitude in `display_unit`.
///
/// Display magnitudes are result magnitudes divided by this factor. Both units
/// must share a dimension; callers run the validator first.
pub fn scale_factor(result_unit: &UnitSpec, display_unit: &UnitSpec) -> f64 {
    debug_assert_eq!(result_unit.dimension, display_unit.dimension);
    let reference = 1.0;
    let in_display = display_unit.from_base(result_unit.to_base(reference));
    reference / in_display
}

/// Converts result-unit magnitudes to display magnitudes.
pub fn rescale(values: &Array2<f64>, factor: f64) -> Array2<f64> {
    values.mapv(|v| v / factor)
}
