// numeric/src/grid.rs

use bivarcontours_core::{PhysicalDimension, UnitSpec};
use ndarray::Array2;
use serde::Serialize;

/// Evaluated magnitudes tagged with the single unit they are expressed in.
///
/// Shape is `(vertical samples, horizontal samples)`; row `j`, column `i`
/// holds the value at the `i`-th horizontal and `j`-th vertical sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultGrid {
    pub values: Array2<f64>,
    pub dimension: PhysicalDimension,
    pub unit: UnitSpec,
}

impl ResultGrid {
    /// Grid in the base unit of `dimension`.
    pub fn in_base_unit(values: Array2<f64>, dimension: PhysicalDimension) -> Self {
        Self {
            values,
            dimension,
            unit: UnitSpec::base(dimension),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        let dim = self.values.dim();
        (dim.0, dim.1)
    }

    pub fn transposed(&self) -> Self {
        Self {
            values: self.values.t().to_owned(),
            dimension: self.dimension,
            unit: self.unit.clone(),
        }
    }

    /// Smallest and largest finite value, if any cell is finite.
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub fn non_finite_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_finite()).count()
    }

    /// Stable digest of shape and cell bits, `blake3:<hex>`.
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        let (rows, cols) = self.shape();
        hasher.update(&(rows as u64).to_le_bytes());
        hasher.update(&(cols as u64).to_le_bytes());
        hasher.update(self.unit.expr.as_bytes());
        for value in self.values.iter() {
            hasher.update(&value.to_bits().to_le_bytes());
        }
        format!("blake3:{}", hasher.finalize().to_hex())
    }
}
