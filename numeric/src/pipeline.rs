// numeric/src/pipeline.rs
// AxisSpec -> SampleSequence -> ResultGrid -> ValidatedResult

use bivarcontours_core::{ContourError, Limits, UnitRegistry, UnitSpec};
use bivarcontours_lang::{parse_with_limits, Formula};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::axis::{AxisSpec, SampleSequence};
use crate::eval::evaluate_grid;
use crate::grid::ResultGrid;
use crate::scale::scale_factor;
use crate::validate::{post_check, pre_check};

/// One contour job: a formula over two axes and the unit its result must have.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourRequest {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub formula: String,
    pub target_unit: String,
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    /// Put `y` on the horizontal axis. The formula still binds `x` and `y`
    /// to their own axes.
    #[serde(default)]
    pub swap_axes: bool,
}

/// An axis as drawn: its label and its samples.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedAxis {
    pub label: String,
    pub samples: SampleSequence,
}

/// Output of a successful run. Only constructed once both checks pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedResult {
    pub formula: Formula,
    /// Shape `(vertical.len(), horizontal.len())`, in the base unit of the result.
    pub grid: ResultGrid,
    pub horizontal: PlacedAxis,
    pub vertical: PlacedAxis,
    pub display_unit: UnitSpec,
    pub scale_factor: f64,
    pub swapped: bool,
}

pub fn run(
    request: &ContourRequest,
    registry: &UnitRegistry,
    limits: &Limits,
) -> Result<ValidatedResult, ContourError> {
    let span = info_span!("contour", title = %request.title);
    let _enter = span.enter();

    // every unit must resolve before any work starts
    let x_unit = registry.resolve(&request.x_axis.unit)?;
    let y_unit = registry.resolve(&request.y_axis.unit)?;
    let target = registry.resolve(&request.target_unit)?;

    let formula = parse_with_limits(&request.formula, limits)?;
    debug!(formula = %formula, nodes = formula.len(), "parsed");

    pre_check(&formula, x_unit.dimension, y_unit.dimension, &target)?;

    let x = request.x_axis.generate_in(x_unit, limits)?;
    let y = request.y_axis.generate_in(y_unit, limits)?;

    let grid = evaluate_grid(&formula, &x, &y, limits)?;
    post_check(&grid, &target, registry)?;

    let factor = scale_factor(&grid.unit, &target);
    info!(
        rows = y.len(),
        cols = x.len(),
        unit = %grid.unit.display_name(),
        display = %target.display_name(),
        scale_factor = factor,
        "contour validated"
    );

    let x_axis = PlacedAxis {
        label: request.x_label.clone(),
        samples: x,
    };
    let y_axis = PlacedAxis {
        label: request.y_label.clone(),
        samples: y,
    };
    let (grid, horizontal, vertical) = if request.swap_axes {
        (grid.transposed(), y_axis, x_axis)
    } else {
        (grid, x_axis, y_axis)
    };

    Ok(ValidatedResult {
        formula,
        grid,
        horizontal,
        vertical,
        display_unit: target,
        scale_factor: factor,
        swapped: request.swap_axes,
    })
}
