//! Netreduce - resistive network reduction
//!
//! Reads an edge list, eliminates every non-terminal node and writes the
//! equivalent network. Without terminals, writes the equivalent resistance of
//! every connected node pair.
//!
//! # Usage
//!
//! ```bash
//! netreduce circuit.edges -t 1 -t 3 -o reduced.edges
//! ```

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use clap::Parser;
use netreduce::{
    circuit::NodeId,
    error::{NetReduceError, Result},
    io::{read_edge_file, write_edge_list},
    reduce::{pairwise_resistances, reduce_with_config, ReductionConfig},
    solver::{verify_pairwise, verify_reduction, DEFAULT_VERIFY_TOLERANCE},
    Edge,
};
use tracing::{info, warn};

/// Resistive network reducer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the edge list (`-` for stdin)
    #[arg(value_name = "EDGE_FILE")]
    edge_file: PathBuf,

    /// Node that must survive reduction (repeatable). Without any, all
    /// pairwise resistances are computed.
    #[arg(short, long = "terminal", value_name = "NODE")]
    terminals: Vec<i64>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Cross-check the result against a direct nodal solve
    #[arg(long)]
    verify: bool,

    /// Relative tolerance for --verify
    #[arg(long, default_value_t = DEFAULT_VERIFY_TOLERANCE)]
    tolerance: f64,

    /// Disable parallel reduction of independent components and pairs
    #[arg(long)]
    sequential: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let args = Args::parse();

    let edges = read_edge_file(&args.edge_file)?;
    info!(elements = edges.len(), "loaded edge list");

    let config = ReductionConfig::new().with_parallel(!args.sequential);
    let terminals: Vec<NodeId> = args.terminals.iter().map(|&n| NodeId(n)).collect();

    let reduced = if terminals.is_empty() {
        pairwise_resistances(&edges, &config)?
    } else {
        reduce_with_config(&edges, &terminals, &config)?
    };

    if args.verify {
        verify(&edges, &reduced, &terminals, args.tolerance)?;
    }

    match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|e| NetReduceError::OutputError {
                message: format!("{}: {e}", path.display()),
            })?;
            write_edge_list(BufWriter::new(file), &reduced)
        }
        None => write_edge_list(io::stdout().lock(), &reduced),
    }
}

fn verify(edges: &[Edge], reduced: &[Edge], terminals: &[NodeId], tolerance: f64) -> Result<()> {
    if edges.iter().any(|e| !e.is_symmetric()) {
        warn!("skipping verification: network contains direction-dependent elements");
        return Ok(());
    }

    let discrepancies = if terminals.is_empty() {
        verify_pairwise(edges, reduced, tolerance)?
    } else {
        verify_reduction(edges, reduced, terminals, tolerance)?
    };

    if discrepancies.is_empty() {
        info!("verification passed");
        return Ok(());
    }
    for d in &discrepancies {
        warn!(%d, "verification mismatch");
    }
    Err(NetReduceError::irreducible(format!(
        "{} pair(s) disagree with the direct solve",
        discrepancies.len()
    )))
}
