// numeric/src/render.rs
// Everything a plotting backend needs, without doing any plotting.

use std::io::Write;

use ndarray::Array2;
use serde::Serialize;

use crate::axis::SampleSequence;
use crate::grid::ResultGrid;
use crate::pipeline::{ContourRequest, PlacedAxis, ValidatedResult};
use crate::scale::rescale;

/// Pieces of the figure file name; sanitizing them is up to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilenameParts {
    pub title: String,
    pub result_unit: String,
    pub x_unit: String,
    pub x_first: String,
    pub x_last: String,
    pub y_unit: String,
    pub y_first: String,
    pub y_last: String,
}

impl FilenameParts {
    pub fn stem(&self) -> String {
        format!(
            "F_{}_{}_X_{}_{}-{}_Y_{}_{}-{}",
            self.title,
            self.result_unit,
            self.x_unit,
            self.x_first,
            self.x_last,
            self.y_unit,
            self.y_first,
            self.y_last
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisPayload {
    /// `label [unit]`
    pub label: String,
    pub unit: String,
    /// Samples in `unit`.
    pub samples: Vec<f64>,
}

impl AxisPayload {
    fn from_axis(axis: &PlacedAxis) -> Self {
        let unit = axis.samples.unit.display_name().to_string();
        Self {
            label: format!("{} [{}]", axis.label, unit),
            samples: axis.samples.to_display().to_vec(),
            unit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPayload {
    pub title: String,
    /// `formula [display unit]`
    pub plot_title: String,
    pub formula: String,
    pub horizontal: AxisPayload,
    pub vertical: AxisPayload,
    pub grid: ResultGrid,
    pub display_unit: String,
    /// Grid magnitudes divided by this give display magnitudes.
    pub scale_factor: f64,
    /// Finite display-unit range of the grid, if any cell is finite.
    pub display_range: Option<(f64, f64)>,
    pub non_finite_cells: usize,
    pub grid_hash: String,
    pub filename: FilenameParts,
    pub file_stem: String,
}

impl RenderPayload {
    pub fn new(request: &ContourRequest, result: &ValidatedResult) -> Self {
        let display_unit = result.display_unit.display_name().to_string();
        let filename = FilenameParts {
            title: request.title.clone(),
            result_unit: display_unit.clone(),
            x_unit: result.horizontal.samples.unit.display_name().to_string(),
            x_first: bound(&result.horizontal.samples, true),
            x_last: bound(&result.horizontal.samples, false),
            y_unit: result.vertical.samples.unit.display_name().to_string(),
            y_first: bound(&result.vertical.samples, true),
            y_last: bound(&result.vertical.samples, false),
        };
        let factor = result.scale_factor;
        Self {
            title: request.title.clone(),
            plot_title: format!("{} [{}]", result.formula, display_unit),
            formula: result.formula.to_string(),
            horizontal: AxisPayload::from_axis(&result.horizontal),
            vertical: AxisPayload::from_axis(&result.vertical),
            display_range: result
                .grid
                .finite_range()
                .map(|(lo, hi)| (lo / factor, hi / factor)),
            non_finite_cells: result.grid.non_finite_count(),
            grid_hash: result.grid.digest(),
            grid: result.grid.clone(),
            display_unit,
            scale_factor: factor,
            file_stem: filename.stem(),
            filename,
        }
    }

    /// Grid magnitudes in the display unit.
    pub fn display_values(&self) -> Array2<f64> {
        rescale(&self.grid.values, self.scale_factor)
    }
}

fn bound(seq: &SampleSequence, first: bool) -> String {
    match seq.display_bounds() {
        Some((lo, hi)) => format!("{:.2}", if first { lo } else { hi }),
        None => String::new(),
    }
}

/// Receives finished payloads; a plotting backend or a serializer.
pub trait RenderSink {
    fn emit(&mut self, payload: &RenderPayload) -> Result<(), String>;
}

impl RenderSink for Vec<RenderPayload> {
    fn emit(&mut self, payload: &RenderPayload) -> Result<(), String> {
        self.push(payload.clone());
        Ok(())
    }
}

/// Writes each payload as one JSON document.
pub struct JsonSink<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W, pretty: bool) -> Self {
        Self { writer, pretty }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RenderSink for JsonSink<W> {
    fn emit(&mut self, payload: &RenderPayload) -> Result<(), String> {
        let result = if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, payload)
        } else {
            serde_json::to_writer(&mut self.writer, payload)
        };
        result.map_err(|e| e.to_string())?;
        writeln!(self.writer).map_err(|e| e.to_string())
    }
}
