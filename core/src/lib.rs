// bivarcontours-core/src/lib.rs
// Units and dimensions for the contour pipeline:
// - dimension: exponent-vector algebra over eight base quantities
// - units: process-wide unit registry and unit expression resolution
// - quantity: magnitude + unit with base-unit conversion
// - error: the error taxonomy shared by every crate

pub mod dimension;
pub mod error;
pub mod limits;
pub mod quantity;
pub mod units;

pub use dimension::{BaseQuantity, PhysicalDimension};
pub use error::ContourError;
pub use limits::Limits;
pub use quantity::Quantity;
pub use units::{is_known_unit, UnitDef, UnitRegistry, UnitSpec};
