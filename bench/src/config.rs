use std::path::Path;

use anyhow::{bail, Context};
use pathweight_core::{Selector, SolverConfig};
use serde::{Deserialize, Serialize};

pub const NODES_MIN: u64 = 2;
pub const NODES_MAX: u64 = 50_000_000;
pub const QUERIES_MIN: u32 = 1;
pub const QUERIES_MAX: u32 = 10_000;
/// `--compare` also runs the O(V²) linear-scan frontier, so it is capped.
pub const COMPARE_MAX_NODES: u64 = 20_000;

/// Benchmark settings.
///
/// Precedence, lowest first: built-in defaults, the TOML file given by
/// `--config`, then command-line flags and environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct BenchConfig {
    /// Target node count for generated graphs.
    pub nodes: u64,
    /// Shortest path queries per graph.
    pub queries: u32,
    /// Mixed into every generator's RNG seed.
    pub seed: u64,
    /// Re-run every query with the other frontier and check costs agree.
    pub compare: bool,
    pub solver: SolverConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            nodes: 100_000,
            queries: 20,
            seed: 0,
            compare: false,
            solver: SolverConfig::default(),
        }
    }
}

/// Values supplied on the command line. `None` keeps the file/default value.
#[derive(Debug, Default)]
pub struct Overrides {
    pub nodes: Option<u64>,
    pub queries: Option<u32>,
    pub seed: Option<u64>,
    pub selector: Option<Selector>,
    pub no_early_exit: bool,
    pub compare: bool,
}

impl BenchConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid benchmark config")
    }

    /// Defaults, optionally overlaid with a TOML file.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            None => Ok(Self::default()),
            Some(p) => {
                let text = std::fs::read_to_string(p)
                    .with_context(|| format!("reading config {}", p.display()))?;
                Self::from_toml(&text).with_context(|| format!("in {}", p.display()))
            }
        }
    }

    pub fn apply(&mut self, o: Overrides) {
        if let Some(n) = o.nodes {
            self.nodes = n;
        }
        if let Some(q) = o.queries {
            self.queries = q;
        }
        if let Some(s) = o.seed {
            self.seed = s;
        }
        if let Some(sel) = o.selector {
            self.solver.selector = sel;
        }
        if o.no_early_exit {
            self.solver.early_exit = false;
        }
        if o.compare {
            self.compare = true;
        }
    }

    /// Check every setting against its bounds.
    pub fn validate(&self) -> anyhow::Result<()> {
        check_range("nodes", self.nodes, NODES_MIN, NODES_MAX)?;
        check_range("queries", self.queries as u64, QUERIES_MIN as u64, QUERIES_MAX as u64)?;
        if self.compare && self.nodes > COMPARE_MAX_NODES {
            bail!(
                "compare runs the linear-scan frontier and is limited to {} nodes, got {}",
                COMPARE_MAX_NODES,
                self.nodes
            );
        }
        if self.solver.selector == Selector::LinearScan && self.nodes > COMPARE_MAX_NODES {
            tracing::warn!(
                nodes = self.nodes,
                "linear-scan frontier is O(V^2); expect very slow queries"
            );
        }
        Ok(())
    }
}

fn check_range(name: &str, value: u64, min: u64, max: u64) -> anyhow::Result<()> {
    if value < min || value > max {
        bail!("{} must be in {}..={}, got {}", name, min, max, value);
    }
    Ok(())
}
