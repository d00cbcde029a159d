use std::fs;
use std::path::Path;

use bivarcontours_core::Limits;

use super::error::CliError;
use crate::Cli;

/// Limits from `--limits` (or defaults), then individual flag overrides.
pub fn resolve_limits(cli: &Cli) -> Result<Limits, CliError> {
    let mut limits = match &cli.limits {
        Some(path) => load_limits(path)?,
        None => Limits::default(),
    };
    if let Some(n) = cli.max_formula_len {
        limits.max_formula_len = n;
    }
    if let Some(n) = cli.max_depth {
        limits.max_depth = n;
    }
    if let Some(n) = cli.max_nodes {
        limits.max_nodes = n;
    }
    if let Some(n) = cli.max_cells {
        limits.max_cells = n;
    }
    if let Some(ms) = cli.time_budget_ms {
        limits.time_budget_ms = ms;
    }
    Ok(limits)
}

pub fn load_limits(path: &Path) -> Result<Limits, CliError> {
    let text = fs::read_to_string(path).map_err(|e| CliError::Limits {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| CliError::Limits {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(extra: &[&str]) -> Cli {
        let mut args = vec![
            "bivar-cli", "t", "a", "b", "x*y", "m**2", "0", "1", "0.5", "m", "0", "1", "0.5", "m",
        ];
        args.extend_from_slice(extra);
        Cli::parse_from(args)
    }

    #[test]
    fn defaults_without_file_or_flags() {
        assert_eq!(resolve_limits(&cli(&[])).expect("limits"), Limits::default());
    }

    #[test]
    fn flags_override_defaults() {
        let limits = resolve_limits(&cli(&["--max-cells", "12", "--time-budget-ms", "5"]))
            .expect("limits");
        assert_eq!(limits.max_cells, 12);
        assert_eq!(limits.time_budget_ms, 5);
        assert_eq!(limits.max_depth, Limits::default().max_depth);
    }

    #[test]
    fn missing_limits_file_is_reported_with_its_path() {
        let err = resolve_limits(&cli(&["--limits", "/nonexistent/limits.json"]))
            .expect_err("missing");
        assert_eq!(err.code(), "E_CLI_LIMITS");
        assert!(err.to_string().contains("/nonexistent/limits.json"));
    }

    #[test]
    fn negative_bounds_are_not_flags() {
        let parsed = Cli::parse_from([
            "bivar-cli", "t", "a", "b", "x", "m", "-5", "-1", "0.5", "m", "0", "1", "0.5", "m",
        ]);
        assert_eq!(parsed.x_start, -5.0);
        assert_eq!(parsed.x_stop, -1.0);
    }
}
