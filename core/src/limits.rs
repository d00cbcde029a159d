use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Resource ceilings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_formula_len: usize,
    pub max_depth: usize,
    pub max_nodes: usize,
    pub max_cells: usize,
    pub time_budget_ms: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_formula_len: 4096,
            max_depth: 256,
            max_nodes: 10_000,
            max_cells: 4_000_000,
            time_budget_ms: 10_000,
        }
    }
}

impl Limits {
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let limits: Limits = serde_json::from_str(r#"{"max_cells": 100}"#).expect("limits");
        assert_eq!(limits.max_cells, 100);
        assert_eq!(limits.max_depth, Limits::default().max_depth);
        assert_eq!(limits.time_budget(), Duration::from_secs(10));
    }
}
