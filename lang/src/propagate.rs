// lang/src/propagate.rs
// Static dimension analysis of a parsed formula.

use bivarcontours_core::{ContourError, PhysicalDimension};
use num_rational::Rational32;
use tracing::debug;

use crate::ast::{BinOp, Formula, Node, NodeId, Var};

/// Largest denominator accepted when reading a float exponent as a fraction.
const MAX_EXPONENT_DENOM: i32 = 1000;

#[derive(Debug, Clone, Copy)]
struct Typed {
    dimension: PhysicalDimension,
    /// Folded value when the subtree has no variables.
    constant: Option<f64>,
}

/// Computes the dimension of `formula` given the dimensions bound to `x` and `y`.
pub fn propagate(
    formula: &Formula,
    dim_x: PhysicalDimension,
    dim_y: PhysicalDimension,
) -> Result<PhysicalDimension, ContourError> {
    let mut stack: Vec<Typed> = Vec::with_capacity(formula.len());
    for id in formula.postorder() {
        let typed = match *formula.node(id) {
            Node::Var(Var::X) => Typed {
                dimension: dim_x,
                constant: None,
            },
            Node::Var(Var::Y) => Typed {
                dimension: dim_y,
                constant: None,
            },
            Node::Literal(value) => Typed {
                dimension: PhysicalDimension::DIMENSIONLESS,
                constant: Some(value),
            },
            Node::Binary { op, right, .. } => {
                let (r, l) = match (stack.pop(), stack.pop()) {
                    (Some(r), Some(l)) => (r, l),
                    _ => {
                        return Err(ContourError::FormulaSyntax {
                            pos: 0,
                            message: "malformed formula tree".to_string(),
                        })
                    }
                };
                combine(formula, id, op, right, l, r)?
            }
        };
        stack.push(typed);
    }
    let result = stack.pop().map(|t| t.dimension).ok_or_else(|| {
        ContourError::FormulaSyntax {
            pos: 0,
            message: "empty formula".to_string(),
        }
    })?;
    debug!(formula = %formula, dimension = %result, "propagated");
    Ok(result)
}

fn combine(
    formula: &Formula,
    id: NodeId,
    op: BinOp,
    right_id: NodeId,
    l: Typed,
    r: Typed,
) -> Result<Typed, ContourError> {
    let constant = match (l.constant, r.constant) {
        (Some(a), Some(b)) => Some(fold(op, a, b)),
        _ => None,
    };
    let dimension = combine_dimension(
        formula,
        id,
        right_id,
        op,
        l.dimension,
        r.dimension,
        r.constant,
    )?;
    Ok(Typed {
        dimension,
        constant,
    })
}

/// Dimension of the binary node `id` from the dimensions of its operands.
///
/// `right_constant` is the folded value of the right operand when it has no
/// variables; a dimensioned base needs one to be raised to a power. Static
/// propagation and grid evaluation both go through here.
pub fn combine_dimension(
    formula: &Formula,
    id: NodeId,
    right_id: NodeId,
    op: BinOp,
    left: PhysicalDimension,
    right: PhysicalDimension,
    right_constant: Option<f64>,
) -> Result<PhysicalDimension, ContourError> {
    match op {
        BinOp::Add | BinOp::Sub => {
            if left != right {
                return Err(ContourError::DimensionMismatch {
                    subexpression: formula.render(id),
                    left,
                    right,
                });
            }
            Ok(left)
        }
        BinOp::Mul => left.checked_mul(&right).ok_or_else(overflow),
        BinOp::Div => left.checked_div(&right).ok_or_else(overflow),
        BinOp::Pow => {
            if !right.is_dimensionless() {
                return Err(ContourError::NonDimensionlessExponent {
                    subexpression: formula.render(right_id),
                    dimension: right,
                });
            }
            if left.is_dimensionless() {
                return Ok(PhysicalDimension::DIMENSIONLESS);
            }
            let Some(value) = right_constant else {
                return Err(ContourError::NonConstantExponent {
                    subexpression: formula.render(right_id),
                    detail: "depends on x or y but its base has a dimension",
                });
            };
            let Some(power) = rational_exponent(value) else {
                return Err(ContourError::NonConstantExponent {
                    subexpression: formula.render(right_id),
                    detail: "is not a simple fraction, so the result dimension is undefined",
                });
            };
            left.checked_pow(power).ok_or_else(overflow)
        }
    }
}

fn fold(op: BinOp, a: f64, b: f64) -> f64 {
    match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        BinOp::Pow => a.powf(b),
    }
}

/// Reads `value` as `n/d` with `d <= MAX_EXPONENT_DENOM`, if it is one.
pub fn rational_exponent(value: f64) -> Option<Rational32> {
    if !value.is_finite() {
        return None;
    }
    let tolerance = 1e-9 * value.abs().max(1.0);
    for denom in 1..=MAX_EXPONENT_DENOM {
        let numer = (value * f64::from(denom)).round();
        if numer.abs() > f64::from(i32::MAX) {
            return None;
        }
        if (numer / f64::from(denom) - value).abs() <= tolerance {
            return Some(Rational32::new(numer as i32, denom));
        }
    }
    None
}

fn overflow() -> ContourError {
    ContourError::LimitExceeded {
        limit: "dimension_exponent",
        actual: i32::MAX as u64 + 1,
        max: i32::MAX as u64,
    }
}
