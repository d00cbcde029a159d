use bivarcontours_core::UnitRegistry;
use bivarcontours_numeric::{run, AxisSpec, ContourRequest, RenderPayload};
use tracing::info;

use super::config::resolve_limits;
use super::error::CliError;
use super::output::emit_payload;
use crate::Cli;

pub fn build_request(cli: &Cli) -> ContourRequest {
    ContourRequest {
        title: cli.title.clone(),
        x_label: cli.x_label.clone(),
        y_label: cli.y_label.clone(),
        formula: cli.formula.clone(),
        target_unit: cli.z_dim.clone(),
        x_axis: AxisSpec {
            start: cli.x_start,
            stop: cli.x_stop,
            step_or_count: cli.x_step,
            is_count: cli.nstep_x,
            is_log: cli.x_log,
            unit: cli.x_dim.clone(),
        },
        y_axis: AxisSpec {
            start: cli.y_start,
            stop: cli.y_stop,
            step_or_count: cli.y_step,
            is_count: cli.nstep_y,
            is_log: cli.y_log,
            unit: cli.y_dim.clone(),
        },
        swap_axes: cli.swap_axes,
    }
}

pub fn run_cli(cli: &Cli) -> Result<(), CliError> {
    let limits = resolve_limits(cli)?;
    let request = build_request(cli);
    let result = run(&request, UnitRegistry::global(), &limits)?;
    let payload = RenderPayload::new(&request, &result);

    if cli.verbose {
        print_summary(&payload);
    }
    emit_payload(&payload, cli.out.as_deref(), cli.pretty)?;
    info!(stem = %payload.file_stem, "payload written");
    Ok(())
}

fn print_summary(payload: &RenderPayload) {
    let (rows, cols) = payload.grid.shape();
    eprintln!("formula: {}", payload.formula);
    eprintln!("title: {}", payload.plot_title);
    eprintln!("x axis: {} ({} samples)", payload.horizontal.label, cols);
    eprintln!("y axis: {} ({} samples)", payload.vertical.label, rows);
    eprintln!("grid unit: {}", payload.grid.unit.display_name());
    eprintln!("scale factor: {}", payload.scale_factor);
    if let Some((lo, hi)) = payload.display_range {
        eprintln!("range: {} .. {} {}", lo, hi, payload.display_unit);
    }
    if payload.non_finite_cells > 0 {
        eprintln!("non-finite cells: {}", payload.non_finite_cells);
    }
    eprintln!("file: {}", payload.file_stem);
}
