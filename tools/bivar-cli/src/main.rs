use std::path::PathBuf;

use clap::Parser;

mod cli;

/// Unit-checked z = f(x, y) over a sampled grid.
///
/// Units are expressions such as `m`, `km/h`, `kg*m/s**2`; an empty string
/// means dimensionless. The validated grid is written as JSON for a plotting
/// backend.
#[derive(Parser, Debug)]
#[command(name = "bivar-cli", version)]
#[command(about = "Unit-checked bivariate contour grids")]
#[command(allow_negative_numbers = true)]
pub struct Cli {
    /// Title of the figure, also the start of the file name
    pub title: String,
    /// Label of the x axis
    pub x_label: String,
    /// Label of the y axis
    pub y_label: String,
    /// Formula in x and y, e.g. `x*y/2` or `(x**2 + y**2)**0.5`
    pub formula: String,
    /// Unit the result must have and is displayed in
    pub z_dim: String,
    pub x_start: f64,
    pub x_stop: f64,
    /// Step, or sample count with --nstep-x
    pub x_step: f64,
    /// Unit of the x axis
    pub x_dim: String,
    pub y_start: f64,
    pub y_stop: f64,
    /// Step, or sample count with --nstep-y
    pub y_step: f64,
    /// Unit of the y axis
    pub y_dim: String,

    /// Read X_STEP as a number of samples
    #[arg(long)]
    pub nstep_x: bool,
    /// Read Y_STEP as a number of samples
    #[arg(long)]
    pub nstep_y: bool,
    /// Logarithmic x axis (needs --nstep-x)
    #[arg(long)]
    pub x_log: bool,
    /// Logarithmic y axis (needs --nstep-y)
    #[arg(long)]
    pub y_log: bool,
    /// Put y on the horizontal axis
    #[arg(long)]
    pub swap_axes: bool,
    /// Debug logging and a summary on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Write the JSON payload here instead of stdout
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
    /// Indent the JSON payload
    #[arg(long)]
    pub pretty: bool,
    /// JSON file with resource limits
    #[arg(long, value_name = "PATH")]
    pub limits: Option<PathBuf>,
    #[arg(long, value_name = "N")]
    pub max_formula_len: Option<usize>,
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,
    #[arg(long, value_name = "N")]
    pub max_nodes: Option<usize>,
    #[arg(long, value_name = "N")]
    pub max_cells: Option<usize>,
    #[arg(long, value_name = "MS")]
    pub time_budget_ms: Option<u64>,
}

fn main() {
    let cli = Cli::parse();
    let _guard = cli::logging::init_logging(cli.verbose);
    if let Err(err) = cli::plot::run_cli(&cli) {
        eprintln!("{} {}", err.code(), err);
        std::process::exit(1);
    }
}
