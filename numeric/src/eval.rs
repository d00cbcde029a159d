// numeric/src/eval.rs
// Point and grid evaluation of a parsed formula.
//
// Grid evaluation follows IEEE 754: 1/0 is inf, 0/0 is NaN, and the grid
// simply carries them. Point evaluation treats division by zero as an error.

use std::time::Instant;

use bivarcontours_core::{ContourError, Limits, PhysicalDimension};
use bivarcontours_lang::{combine_dimension, BinOp, Formula, Node, Var};
use ndarray::{Array2, Zip};
use tracing::{debug, trace};

use crate::axis::SampleSequence;
use crate::grid::ResultGrid;

/// Evaluates `formula` at a single point.
pub fn evaluate_scalar(formula: &Formula, x: f64, y: f64) -> Result<f64, ContourError> {
    let mut stack: Vec<f64> = Vec::with_capacity(formula.len());
    for id in formula.postorder() {
        let value = match *formula.node(id) {
            Node::Var(Var::X) => x,
            Node::Var(Var::Y) => y,
            Node::Literal(value) => value,
            Node::Binary { op, .. } => {
                let (r, l) = pop_pair(&mut stack)?;
                let divides_by_zero = match op {
                    BinOp::Div => r == 0.0,
                    BinOp::Pow => l == 0.0 && r < 0.0,
                    _ => false,
                };
                if divides_by_zero {
                    return Err(ContourError::ZeroDivision {
                        subexpression: formula.render(id),
                        x,
                        y,
                    });
                }
                apply(op, l, r)
            }
        };
        stack.push(value);
    }
    stack.pop().ok_or_else(malformed)
}

/// Evaluates `formula` over the outer grid of the two sample sequences.
///
/// The returned grid has shape `(y.len(), x.len())` and carries the
/// dimension realized by the numeric path itself; it is expressed in the base
/// unit of that dimension.
pub fn evaluate_grid(
    formula: &Formula,
    x: &SampleSequence,
    y: &SampleSequence,
    limits: &Limits,
) -> Result<ResultGrid, ContourError> {
    let xs = x.samples.to_vec();
    let ys = y.samples.to_vec();
    let (values, dimension) =
        evaluate_field(formula, &xs, &ys, x.dimension(), y.dimension(), limits)?;
    Ok(ResultGrid::in_base_unit(values, dimension))
}

#[derive(Debug, Clone)]
enum Magnitude {
    Scalar(f64),
    Field(Array2<f64>),
}

#[derive(Debug, Clone)]
struct Operand {
    magnitude: Magnitude,
    dimension: PhysicalDimension,
}

/// Grid magnitudes plus the dimension they carry.
///
/// Every intermediate value holds its own dimension, so the result dimension
/// comes from the same walk that produces the numbers.
pub fn evaluate_field(
    formula: &Formula,
    xs: &[f64],
    ys: &[f64],
    dim_x: PhysicalDimension,
    dim_y: PhysicalDimension,
    limits: &Limits,
) -> Result<(Array2<f64>, PhysicalDimension), ContourError> {
    let shape = (ys.len(), xs.len());
    let cells = ys.len().checked_mul(xs.len()).unwrap_or(usize::MAX);
    if cells > limits.max_cells {
        return Err(ContourError::limit("max_cells", cells, limits.max_cells));
    }

    let started = Instant::now();
    let budget = limits.time_budget();
    let x_field = Array2::from_shape_fn(shape, |(_, i)| xs[i]);
    let y_field = Array2::from_shape_fn(shape, |(j, _)| ys[j]);

    let mut stack: Vec<Operand> = Vec::with_capacity(formula.len());
    for id in formula.postorder() {
        let operand = match *formula.node(id) {
            Node::Var(Var::X) => Operand {
                magnitude: Magnitude::Field(x_field.clone()),
                dimension: dim_x,
            },
            Node::Var(Var::Y) => Operand {
                magnitude: Magnitude::Field(y_field.clone()),
                dimension: dim_y,
            },
            Node::Literal(value) => Operand {
                magnitude: Magnitude::Scalar(value),
                dimension: PhysicalDimension::DIMENSIONLESS,
            },
            Node::Binary { op, right, .. } => {
                let (r, l) = match (stack.pop(), stack.pop()) {
                    (Some(r), Some(l)) => (r, l),
                    _ => return Err(malformed()),
                };
                let right_constant = match r.magnitude {
                    Magnitude::Scalar(value) => Some(value),
                    Magnitude::Field(_) => None,
                };
                let dimension = combine_dimension(
                    formula,
                    id,
                    right,
                    op,
                    l.dimension,
                    r.dimension,
                    right_constant,
                )?;
                Operand {
                    magnitude: combine(op, l.magnitude, r.magnitude),
                    dimension,
                }
            }
        };
        stack.push(operand);

        let elapsed = started.elapsed();
        if elapsed > budget {
            return Err(ContourError::LimitExceeded {
                limit: "time_budget_ms",
                actual: elapsed.as_millis() as u64,
                max: limits.time_budget_ms,
            });
        }
    }

    let result = stack.pop().ok_or_else(malformed)?;
    let values = match result.magnitude {
        Magnitude::Field(values) => values,
        Magnitude::Scalar(value) => Array2::from_elem(shape, value),
    };
    debug!(
        rows = shape.0,
        cols = shape.1,
        dimension = %result.dimension,
        elapsed_us = started.elapsed().as_micros() as u64,
        "grid evaluated"
    );
    Ok((values, result.dimension))
}

fn combine(op: BinOp, left: Magnitude, right: Magnitude) -> Magnitude {
    match (left, right) {
        (Magnitude::Scalar(a), Magnitude::Scalar(b)) => Magnitude::Scalar(apply(op, a, b)),
        (Magnitude::Field(mut a), Magnitude::Scalar(b)) => {
            a.mapv_inplace(|v| apply(op, v, b));
            Magnitude::Field(a)
        }
        (Magnitude::Scalar(a), Magnitude::Field(mut b)) => {
            b.mapv_inplace(|v| apply(op, a, v));
            Magnitude::Field(b)
        }
        (Magnitude::Field(mut a), Magnitude::Field(b)) => {
            Zip::from(&mut a).and(&b).for_each(|l, &r| *l = apply(op, *l, r));
            Magnitude::Field(a)
        }
    }
}

fn apply(op: BinOp, l: f64, r: f64) -> f64 {
    match op {
        BinOp::Add => l + r,
        BinOp::Sub => l - r,
        BinOp::Mul => l * r,
        BinOp::Div => l / r,
        BinOp::Pow => l.powf(r),
    }
}

fn pop_pair(stack: &mut Vec<f64>) -> Result<(f64, f64), ContourError> {
    match (stack.pop(), stack.pop()) {
        (Some(r), Some(l)) => Ok((r, l)),
        _ => Err(malformed()),
    }
}

fn malformed() -> ContourError {
    trace!("operand stack underflow");
    ContourError::FormulaSyntax {
        pos: 0,
        message: "malformed formula tree".to_string(),
    }
}
