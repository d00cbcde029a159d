// bivarcontours-numeric/src/lib.rs
// Numeric side of the contour pipeline:
// - axis: AxisSpec -> SampleSequence (base units)
// - eval: point and grid evaluation
// - validate: pre-check and post-check of the result dimension
// - scale: display-unit conversion factor
// - pipeline: the whole run, producing a ValidatedResult
// - render: payload handed to a plotting backend

pub mod axis;
pub mod eval;
pub mod grid;
pub mod pipeline;
pub mod render;
pub mod scale;
pub mod validate;

pub use axis::{AxisSpec, SampleSequence};
pub use eval::{evaluate_field, evaluate_grid, evaluate_scalar};
pub use grid::ResultGrid;
pub use pipeline::{run, ContourRequest, PlacedAxis, ValidatedResult};
pub use render::{AxisPayload, FilenameParts, JsonSink, RenderPayload, RenderSink};
pub use scale::{rescale, scale_factor};
pub use validate::{post_check, pre_check};
