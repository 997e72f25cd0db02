mod config;
mod generators;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use pathweight_core::{Graph, Selector, Solver, SolverConfig};
use serde::Serialize;

use config::{BenchConfig, Overrides};
use generators::{FastRng, Generator};

/// Benchmark the weighted shortest path engine on synthetic graphs.
#[derive(Parser, Debug)]
#[command(name = "pathweight-bench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Graph family to benchmark, or `demo` for the six-node reference graph
    #[arg(value_enum, default_value = "all")]
    mode: Mode,

    /// Target node count per generated graph
    #[arg(long, short, env = "PATHWEIGHT_NODES")]
    nodes: Option<u64>,

    /// Shortest path queries per graph
    #[arg(long, short)]
    queries: Option<u32>,

    /// RNG seed mixed into every generator
    #[arg(long)]
    seed: Option<u64>,

    /// Frontier implementation: indexed-heap or linear-scan
    #[arg(long, env = "PATHWEIGHT_SELECTOR")]
    selector: Option<Selector>,

    /// Keep finalizing nodes after the target is reached
    #[arg(long)]
    no_early_exit: bool,

    /// Re-run every query with the other frontier and check costs agree
    #[arg(long)]
    compare: bool,

    /// TOML file with benchmark settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Debug-level logging to stderr
    #[arg(long, short)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Reference six-node graph, A to F
    Demo,
    /// Every generator below
    All,
    /// 2D lattice with random weights
    Grid,
    /// Preferential attachment (hub-and-spoke)
    Scalefree,
    /// Erdos-Renyi uniform random edges
    Random,
    /// Two clusters joined by a thin bridge
    Barbell,
    /// Single weighted chain
    Chain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

#[derive(Debug, Serialize)]
struct QueryReport {
    start: u64,
    end: u64,
    cost: Option<f64>,
    hops: Option<usize>,
    nodes_finalized: Option<usize>,
    ms: f64,
}

#[derive(Debug, Serialize)]
struct GraphReport {
    name: &'static str,
    nodes: usize,
    edges: usize,
    memory_bytes: usize,
    generate_ms: f64,
    selector: Selector,
    early_exit: bool,
    found: usize,
    no_path: usize,
    total_ms: f64,
    /// `Some(true)` when `--compare` ran and both frontiers agreed.
    compare_ok: Option<bool>,
    queries: Vec<QueryReport>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_tracing(cli.verbose, cli.log_json) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = BenchConfig::load(cli.config.as_deref())?;
    config.apply(Overrides {
        nodes: cli.nodes,
        queries: cli.queries,
        seed: cli.seed,
        selector: cli.selector,
        no_early_exit: cli.no_early_exit,
        compare: cli.compare,
    });
    config.validate()?;
    tracing::debug!(?config, "benchmark config");

    let generators: Vec<(&'static str, Generator)> = match cli.mode {
        Mode::Demo => return run_demo(config.solver, cli.format),
        Mode::Grid => vec![("Grid lattice", generators::gen_grid as Generator)],
        Mode::Scalefree => {
            vec![("Scale-free (edge sampling)", generators::gen_scale_free as Generator)]
        }
        Mode::Random => vec![("Erdos-Renyi random", generators::gen_random as Generator)],
        Mode::Barbell => {
            vec![("Barbell (cluster-bridge-cluster)", generators::gen_barbell as Generator)]
        }
        Mode::Chain => vec![("Weighted chain", generators::gen_chain as Generator)],
        Mode::All => vec![
            ("Grid lattice", generators::gen_grid as Generator),
            ("Scale-free (edge sampling)", generators::gen_scale_free),
            ("Erdos-Renyi random", generators::gen_random),
            ("Barbell (cluster-bridge-cluster)", generators::gen_barbell),
            ("Weighted chain", generators::gen_chain),
        ],
    };

    if cli.format == OutputFormat::Human {
        println!("pathweight-bench");
        println!("================");
        println!();
    }

    let mut reports = Vec::with_capacity(generators.len());
    for (name, generator) in generators {
        let report = run_benchmark(name, generator, &config)?;
        if cli.format == OutputFormat::Human {
            print_report(&report);
        }
        if report.compare_ok == Some(false) {
            bail!("{}: indexed-heap and linear-scan frontiers disagree", name);
        }
        reports.push(report);
    }

    if cli.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    Ok(())
}

fn run_benchmark(
    name: &'static str,
    generator: Generator,
    config: &BenchConfig,
) -> anyhow::Result<GraphReport> {
    let t = Instant::now();
    let graph = generator(config.nodes, config.seed)
        .with_context(|| format!("generating {}", name))?;
    let generate_ms = t.elapsed().as_secs_f64() * 1000.0;
    tracing::debug!(
        name,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        generate_ms,
        "generated"
    );

    let solver = Solver::new(config.solver);
    let pairs = query_pairs(graph.node_count() as u64, config.queries, config.seed);

    let mut queries = Vec::with_capacity(pairs.len());
    let (mut found, mut no_path) = (0, 0);
    let total = Instant::now();

    for &(start, end) in &pairs {
        let t = Instant::now();
        let result = solver.shortest_path(&graph, &start, &end);
        let ms = t.elapsed().as_secs_f64() * 1000.0;

        let report = match result {
            Ok(sp) => {
                found += 1;
                QueryReport {
                    start,
                    end,
                    cost: Some(sp.cost),
                    hops: Some(sp.hops()),
                    nodes_finalized: Some(sp.nodes_finalized),
                    ms,
                }
            }
            Err(e) if e.is_no_path() => {
                no_path += 1;
                QueryReport { start, end, cost: None, hops: None, nodes_finalized: None, ms }
            }
            Err(e) => {
                return Err(e).with_context(|| format!("{}: query {} -> {}", name, start, end));
            }
        };
        queries.push(report);
    }
    let total_ms = total.elapsed().as_secs_f64() * 1000.0;

    let compare_ok = if config.compare {
        Some(compare_frontiers(&graph, &pairs, config.solver, &queries))
    } else {
        None
    };

    Ok(GraphReport {
        name,
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        memory_bytes: graph.memory_usage(),
        generate_ms,
        selector: config.solver.selector,
        early_exit: config.solver.early_exit,
        found,
        no_path,
        total_ms,
        compare_ok,
        queries,
    })
}

/// Deterministic query endpoints. The first pair is always 0 → last node.
fn query_pairs(node_count: u64, queries: u32, seed: u64) -> Vec<(u64, u64)> {
    let mut rng = FastRng::new(seed.wrapping_add(31337));
    let mut pairs = vec![(0, node_count - 1)];
    while pairs.len() < queries as usize {
        pairs.push((rng.next(node_count), rng.next(node_count)));
    }
    pairs.truncate(queries as usize);
    pairs
}

/// Re-run `pairs` with the other frontier and check every cost matches.
fn compare_frontiers(
    graph: &Graph<u64>,
    pairs: &[(u64, u64)],
    base: SolverConfig,
    reports: &[QueryReport],
) -> bool {
    let other = match base.selector {
        Selector::IndexedHeap => Selector::LinearScan,
        Selector::LinearScan => Selector::IndexedHeap,
    };
    let solver = Solver::new(SolverConfig { selector: other, ..base });

    pairs.iter().zip(reports).all(|(&(start, end), report)| {
        let cost = solver.shortest_path(graph, &start, &end).ok().map(|sp| sp.cost);
        if cost != report.cost {
            tracing::warn!(start, end, ?cost, expected = ?report.cost, "frontier mismatch");
            return false;
        }
        true
    })
}

fn print_report(r: &GraphReport) {
    println!("--- {} ---", r.name);
    println!(
        "Generated in {:.2}s: {} nodes, {} edges, ~{:.1}MB",
        r.generate_ms / 1000.0,
        r.nodes,
        r.edges,
        r.memory_bytes as f64 / 1_048_576.0
    );
    println!("Frontier: {} (early exit: {})", r.selector, r.early_exit);
    println!();
    println!(
        "{:>10} {:>10} {:>12} {:>6} {:>12} {:>10}",
        "start", "end", "cost", "hops", "finalized", "time"
    );
    println!("{:->10} {:->10} {:->12} {:->6} {:->12} {:->10}", "", "", "", "", "", "");

    for q in &r.queries {
        match (q.cost, q.hops, q.nodes_finalized) {
            (Some(cost), Some(hops), Some(fin)) => println!(
                "{:>10} {:>10} {:>12.2} {:>6} {:>12} {:>8.1}ms",
                q.start, q.end, cost, hops, fin, q.ms
            ),
            _ => println!(
                "{:>10} {:>10} {:>12} {:>6} {:>12} {:>8.1}ms",
                q.start, q.end, "no path", "-", "-", q.ms
            ),
        }
    }

    println!();
    println!(
        "{} found, {} no path, {:.1}ms total ({:.2}ms/query)",
        r.found,
        r.no_path,
        r.total_ms,
        r.total_ms / r.queries.len().max(1) as f64
    );
    if let Some(ok) = r.compare_ok {
        println!("Frontier cross-check: {}", if ok { "ok" } else { "MISMATCH" });
    }
    println!();
}

/// The six-node reference graph. Two minimal A → F routes cost 16; the
/// tie-break order always yields A-C-B-D-F.
fn demo_graph() -> anyhow::Result<Graph<String>> {
    let mut graph = Graph::new();
    for id in ["A", "B", "C", "D", "E", "F"] {
        graph.add_node(id.to_string());
    }
    for (u, v, w) in [
        ("A", "B", 4.0),
        ("A", "C", 2.0),
        ("B", "C", 1.0),
        ("B", "D", 5.0),
        ("C", "E", 10.0),
        ("D", "E", 2.0),
        ("D", "F", 8.0),
        ("E", "F", 6.0),
    ] {
        graph.add_edge(u.to_string(), v.to_string(), w)?;
    }
    Ok(graph)
}

fn run_demo(solver: SolverConfig, format: OutputFormat) -> anyhow::Result<()> {
    let graph = demo_graph()?;
    let sp = Solver::new(solver).shortest_path(&graph, &"A".to_string(), &"F".to_string())?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&sp)?),
        OutputFormat::Human => {
            println!("Shortest path: {}", sp.path.join(" -> "));
            println!("Cost: {}", sp.cost);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_graph_path() {
        let g = demo_graph().unwrap();
        let sp = g.shortest_path(&"A".to_string(), &"F".to_string()).unwrap();
        assert_eq!(sp.path.join("-"), "A-C-B-D-F");
        assert_eq!(sp.cost, 16.0);
    }

    #[test]
    fn test_query_pairs_deterministic() {
        let a = query_pairs(1000, 10, 5);
        assert_eq!(a, query_pairs(1000, 10, 5));
        assert_eq!(a.len(), 10);
        assert_eq!(a[0], (0, 999));
        assert!(a.iter().all(|&(s, e)| s < 1000 && e < 1000));
        assert_eq!(query_pairs(1000, 1, 5), vec![(0, 999)]);
    }

    #[test]
    fn test_run_benchmark_with_compare() {
        let config = BenchConfig {
            nodes: 400,
            queries: 8,
            compare: true,
            ..Default::default()
        };
        let report = run_benchmark("grid", generators::gen_grid, &config).unwrap();
        assert_eq!(report.queries.len(), 8);
        assert_eq!(report.found + report.no_path, 8);
        assert_eq!(report.compare_ok, Some(true));
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "pathweight-bench",
            "grid",
            "--nodes",
            "500",
            "--selector",
            "linear-scan",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.mode, Mode::Grid);
        assert_eq!(cli.nodes, Some(500));
        assert_eq!(cli.selector, Some(Selector::LinearScan));
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
