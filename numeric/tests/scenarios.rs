use bivarcontours_core::{ContourError, Limits, Quantity, UnitRegistry, UnitSpec};
use bivarcontours_lang::parse;
use bivarcontours_numeric::{
    evaluate_grid, evaluate_scalar, run, AxisSpec, ContourRequest, SampleSequence,
    ValidatedResult,
};
use ndarray::Array1;

fn request(formula: &str, x_unit: &str, y_unit: &str, target: &str) -> ContourRequest {
    ContourRequest {
        title: "scenario".to_string(),
        x_label: "x".to_string(),
        y_label: "y".to_string(),
        formula: formula.to_string(),
        target_unit: target.to_string(),
        x_axis: AxisSpec::stepped(1.0, 2.0, 0.1, x_unit),
        y_axis: AxisSpec::counted(1.0, 2.0, 10, y_unit),
        swap_axes: false,
    }
}

fn run_default(req: &ContourRequest) -> Result<ValidatedResult, ContourError> {
    run(req, UnitRegistry::global(), &Limits::default())
}

#[test]
fn sum_of_lengths_is_a_length() {
    let result = run_default(&request("x + y", "m", "m", "m")).expect("validates");
    assert_eq!(result.grid.unit.expr, "m");
    assert_eq!(result.grid.shape(), (10, 10));
    assert_eq!(result.scale_factor, 1.0);
    assert_eq!(result.grid.values[[0, 0]], 2.0);
    assert_eq!(result.grid.values[[9, 0]], 3.0);
}

#[test]
fn sum_of_length_and_time_fails_for_any_target() {
    for target in ["m", "s", "", "m*s"] {
        let err = run_default(&request("x + y", "m", "s", target)).expect_err("mismatch");
        assert!(
            matches!(err, ContourError::DimensionMismatch { .. }),
            "{}: {:?}",
            target,
            err
        );
    }
}

#[test]
fn product_of_lengths_matches_spelled_out_area() {
    let result = run_default(&request("x * y", "m", "m", "meter**2")).expect("validates");
    assert_eq!(result.grid.unit.expr, "m**2");
    assert_eq!(result.display_unit.expr, "meter**2");
    assert_eq!(result.scale_factor, 1.0);
}

#[test]
fn ratio_of_times_is_dimensionless() {
    let result = run_default(&request("x / y", "s", "s", "dimensionless")).expect("validates");
    assert!(result.grid.dimension.is_dimensionless());
    assert_eq!(result.scale_factor, 1.0);
    let result = run_default(&request("x / y", "s", "min", "")).expect("validates");
    assert!(result.grid.dimension.is_dimensionless());
}

#[test]
fn point_division_by_zero_is_an_error_but_grid_division_is_not() {
    let formula = parse("x/y").expect("parse");
    let err = evaluate_scalar(&formula, 5.0, 0.0).expect_err("div0");
    assert_eq!(err.code(), "E_MATH_DIV_ZERO");

    let xs = SampleSequence::new(Array1::from(vec![5.0]), UnitSpec::dimensionless());
    let ys = SampleSequence::new(Array1::from(vec![0.0, 1.0]), UnitSpec::dimensionless());
    let grid = evaluate_grid(&formula, &xs, &ys, &Limits::default()).expect("grid");
    let cells: Vec<f64> = grid.values.iter().copied().collect();
    assert_eq!(cells, vec![f64::INFINITY, 5.0]);
}

#[test]
fn squared_length_and_dimensioned_exponent() {
    let result = run_default(&request("x**2", "m", "s", "m**2")).expect("validates");
    assert_eq!(result.grid.unit.expr, "m**2");

    let err = run_default(&request("x**y", "m", "s", "m")).expect_err("exponent");
    assert!(matches!(err, ContourError::NonDimensionlessExponent { .. }));
}

#[test]
fn wrong_target_is_caught_before_any_grid() {
    let mut req = request("x * y", "m", "m", "m");
    // an axis that could never be sampled proves the grid was never built
    req.x_axis = AxisSpec::stepped(2.0, 1.0, 0.1, "m");
    let err = run_default(&req).expect_err("target");
    assert!(matches!(
        err,
        ContourError::Dimensionality { stage: "pre-check", .. }
    ));
}

#[test]
fn step_axis_boundary_counts() {
    let seq = AxisSpec::stepped(1.0, 2.0, 0.1, "m")
        .generate(UnitRegistry::global(), &Limits::default())
        .expect("axis");
    assert_eq!(seq.len(), 10);
    assert!(seq.samples.iter().all(|v| (1.0..2.0).contains(v)));

    let seq = AxisSpec::counted(1.0, 2.0, 10, "m")
        .generate(UnitRegistry::global(), &Limits::default())
        .expect("axis");
    assert_eq!(seq.len(), 10);
    assert_eq!(seq.samples[0], 1.0);
    assert_eq!(seq.samples[9], 2.0);
}

#[test]
fn quantity_round_trips_through_base_units() {
    let registry = UnitRegistry::global();
    for (value, unit) in [(3.5, "km"), (0.25, "mph"), (12.0, "psi"), (7.0, "kWh")] {
        let q = Quantity::new(value, unit, registry).expect("quantity");
        let back = q.to_base().expect("base").to_unit(q.unit()).expect("back");
        assert!(
            ((back.magnitude() - value) / value).abs() < 1e-9,
            "{} {}",
            value,
            unit
        );
    }
}

#[test]
fn mixed_units_are_evaluated_in_base_units() {
    // 1 km + 500 m on the first cell
    let mut req = request("x + y", "km", "m", "m");
    req.x_axis = AxisSpec::counted(1.0, 2.0, 2, "km");
    req.y_axis = AxisSpec::counted(500.0, 600.0, 2, "m");
    let result = run_default(&req).expect("validates");
    assert_eq!(result.grid.values[[0, 0]], 1500.0);
    assert_eq!(result.horizontal.samples.to_display().to_vec(), vec![1.0, 2.0]);
}
