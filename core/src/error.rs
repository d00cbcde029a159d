use thiserror::Error;

use crate::dimension::PhysicalDimension;

/// Every failure the contour core can raise.
///
/// Errors are produced where they are detected and travel unchanged to the
/// invocation boundary, which owns formatting and exit status.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContourError {
    #[error("formula syntax error at offset {pos}: {message}")]
    FormulaSyntax { pos: usize, message: String },

    #[error("unknown variable `{name}` at offset {pos}; only `x` and `y` are allowed")]
    UnknownVariable { name: String, pos: usize },

    #[error("unsupported operator {op}")]
    UnsupportedOperator { op: String },

    #[error("dimension mismatch in `{subexpression}`: {left} vs {right}")]
    DimensionMismatch {
        subexpression: String,
        left: PhysicalDimension,
        right: PhysicalDimension,
    },

    #[error("exponent `{subexpression}` must be dimensionless, found {dimension}")]
    NonDimensionlessExponent {
        subexpression: String,
        dimension: PhysicalDimension,
    },

    #[error("exponent `{subexpression}` {detail}")]
    NonConstantExponent {
        subexpression: String,
        detail: &'static str,
    },

    #[error("undefined unit `{unit}`: {reason}")]
    UndefinedUnit { unit: String, reason: String },

    #[error("{stage}: result dimension {actual} does not match expected {expected}")]
    Dimensionality {
        stage: &'static str,
        actual: PhysicalDimension,
        expected: PhysicalDimension,
    },

    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("division by zero in `{subexpression}` at x={x}, y={y}")]
    ZeroDivision { subexpression: String, x: f64, y: f64 },

    #[error("limit `{limit}` exceeded: {actual} > {max}")]
    LimitExceeded {
        limit: &'static str,
        actual: u64,
        max: u64,
    },
}

impl ContourError {
    pub fn code(&self) -> &'static str {
        match self {
            ContourError::FormulaSyntax { .. } => "E_FORMULA_SYNTAX",
            ContourError::UnknownVariable { .. } => "E_FORMULA_UNKNOWN_VARIABLE",
            ContourError::UnsupportedOperator { .. } => "E_FORMULA_UNSUPPORTED_OPERATOR",
            ContourError::DimensionMismatch { .. } => "E_DIM_MISMATCH",
            ContourError::NonDimensionlessExponent { .. } => "E_DIM_EXPONENT",
            ContourError::NonConstantExponent { .. } => "E_DIM_EXPONENT_CONST",
            ContourError::UndefinedUnit { .. } => "E_UNIT_UNDEFINED",
            ContourError::Dimensionality { .. } => "E_DIMENSIONALITY",
            ContourError::Configuration { .. } => "E_CONFIG",
            ContourError::ZeroDivision { .. } => "E_MATH_DIV_ZERO",
            ContourError::LimitExceeded { .. } => "E_LIMIT",
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        ContourError::Configuration {
            message: message.into(),
        }
    }

    pub fn limit(limit: &'static str, actual: usize, max: usize) -> Self {
        ContourError::LimitExceeded {
            limit,
            actual: actual as u64,
            max: max as u64,
        }
    }
}
