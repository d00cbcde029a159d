// numeric/src/validate.rs
// Two checks of the result dimension against the requested unit: one before
// any grid exists, one on the grid the numeric path produced.

use bivarcontours_core::{ContourError, PhysicalDimension, UnitRegistry, UnitSpec};
use bivarcontours_lang::{propagate, Formula};
use tracing::debug;

use crate::eval::evaluate_scalar;
use crate::grid::ResultGrid;

/// Point-evaluates at `x = y = 1`, then propagates dimensions statically and
/// compares with `target`. Returns the propagated dimension.
pub fn pre_check(
    formula: &Formula,
    dim_x: PhysicalDimension,
    dim_y: PhysicalDimension,
    target: &UnitSpec,
) -> Result<PhysicalDimension, ContourError> {
    let at_one = evaluate_scalar(formula, 1.0, 1.0)?;
    let actual = propagate(formula, dim_x, dim_y)?;
    debug!(at_one, actual = %actual, expected = %target.dimension, "pre-check");
    if actual != target.dimension {
        return Err(ContourError::Dimensionality {
            stage: "pre-check",
            actual,
            expected: target.dimension,
        });
    }
    Ok(actual)
}

/// Re-reads the unit attached to `grid` and compares it with `target`.
pub fn post_check(
    grid: &ResultGrid,
    target: &UnitSpec,
    registry: &UnitRegistry,
) -> Result<PhysicalDimension, ContourError> {
    let attached = registry.resolve(&grid.unit.expr)?;
    if attached.dimension != grid.dimension {
        return Err(ContourError::Dimensionality {
            stage: "post-check (grid unit)",
            actual: attached.dimension,
            expected: grid.dimension,
        });
    }
    if attached.dimension != target.dimension {
        return Err(ContourError::Dimensionality {
            stage: "post-check",
            actual: attached.dimension,
            expected: target.dimension,
        });
    }
    debug!(unit = %grid.unit.display_name(), "post-check");
    Ok(attached.dimension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bivarcontours_core::BaseQuantity;
    use bivarcontours_lang::parse;
    use ndarray::array;

    fn unit(expr: &str) -> UnitSpec {
        UnitRegistry::global().resolve(expr).expect("unit")
    }

    fn length() -> PhysicalDimension {
        PhysicalDimension::of(BaseQuantity::Length)
    }

    #[test]
    fn matching_target_passes_pre_check() {
        let formula = parse("x*y").expect("parse");
        let dim = pre_check(&formula, length(), length(), &unit("meter**2")).expect("ok");
        assert_eq!(dim, unit("m**2").dimension);
    }

    #[test]
    fn wrong_target_is_a_dimensionality_error() {
        let formula = parse("x*y").expect("parse");
        let err = pre_check(&formula, length(), length(), &unit("m")).expect_err("target");
        assert_eq!(err.code(), "E_DIMENSIONALITY");
        assert!(err.to_string().contains("pre-check"));
    }

    #[test]
    fn singular_check_point_aborts() {
        let formula = parse("x/(x - y)").expect("parse");
        let err = pre_check(&formula, length(), length(), &unit("")).expect_err("singular");
        assert_eq!(err.code(), "E_MATH_DIV_ZERO");
    }

    #[test]
    fn post_check_reads_the_grid_unit() {
        let grid = ResultGrid::in_base_unit(array![[1.0]], length());
        assert_eq!(post_check(&grid, &unit("km"), UnitRegistry::global()), Ok(length()));
        let err = post_check(&grid, &unit("s"), UnitRegistry::global()).expect_err("time");
        assert_eq!(err.code(), "E_DIMENSIONALITY");
    }

    #[test]
    fn post_check_catches_a_mislabelled_grid() {
        let mut grid = ResultGrid::in_base_unit(array![[1.0]], length());
        grid.unit = unit("s");
        let err = post_check(&grid, &unit("m"), UnitRegistry::global()).expect_err("label");
        assert_eq!(err.code(), "E_DIMENSIONALITY");
    }
}
