//! Network reduction engine.
//!
//! Turns a list of elements into an equivalent smaller network over a chosen
//! set of terminal nodes, or into pairwise equivalent resistances.
//!
//! ## Reductions
//!
//! All reductions are exact for resistive networks:
//!
//! - **Parallel**: `1/R = 1/R1 + 1/R2`, per direction
//! - **Series**: `R = R1 + R2`, summed along the direction of traversal
//! - **Star-mesh**: a node with `k` neighbors is replaced by a mesh of
//!   `k(k-1)/2` branches, `G_ij = G_i * G_j / sum(G_m)`
//!
//! Each connected component is reduced independently. With the `parallel`
//! feature, independent components and independent node pairs are spread over
//! rayon's thread pool.

mod materialize;
mod pairwise;
mod reducers;
mod scheduler;

pub use materialize::{materialize, to_tuples};
pub use pairwise::{pair_resistance, pairwise_resistances};
pub use reducers::{parallel_merge, parallel_resistance, series_merge, star_mesh};
pub use scheduler::{ReductionState, ReductionStats, Reducer, Step};

use std::collections::BTreeSet;

use tracing::debug;

use crate::circuit::{validate_elements, Edge, EdgeTuple, Network, NodeId};
use crate::error::Result;

/// Minimum number of independent jobs before work is spread over threads.
pub const DEFAULT_MIN_JOBS_FOR_PARALLEL: usize = 4;

/// Configuration for a reduction run.
#[derive(Debug, Clone)]
pub struct ReductionConfig {
    /// Allow independent jobs to run on the rayon pool.
    pub parallel: bool,
    /// Below this many jobs, work runs sequentially.
    pub min_jobs_for_parallel: usize,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            parallel: cfg!(feature = "parallel"),
            min_jobs_for_parallel: DEFAULT_MIN_JOBS_FOR_PARALLEL,
        }
    }
}

impl ReductionConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the job count threshold for parallel execution.
    pub fn with_min_jobs_for_parallel(mut self, min: usize) -> Self {
        self.min_jobs_for_parallel = min;
        self
    }
}

/// Reduce `edges` to an equivalent network over `terminals`.
///
/// Every node not listed in `terminals` is eliminated. The result holds at
/// most one edge per terminal pair, ordered by pair. Components without any
/// terminal vanish. A terminal that no element touches is accepted and
/// yields no edges, so reducing a result again with the same terminals
/// succeeds.
pub fn reduce(edges: &[Edge], terminals: &[NodeId]) -> Result<Vec<Edge>> {
    reduce_with_config(edges, terminals, &ReductionConfig::default())
}

/// [`reduce`] with an explicit configuration.
pub fn reduce_with_config(
    edges: &[Edge],
    terminals: &[NodeId],
    config: &ReductionConfig,
) -> Result<Vec<Edge>> {
    let mut network = Network::from_edges(edges);
    for &terminal in terminals {
        if !network.contains_node(terminal) {
            debug!(node = %terminal, "terminal has no elements");
            network.add_node(terminal);
        }
    }
    let terminals: BTreeSet<NodeId> = terminals.iter().copied().collect();

    let jobs: Vec<(Network, Vec<NodeId>)> = network
        .components()
        .into_iter()
        .filter_map(|component| {
            let local: Vec<NodeId> = component.intersection(&terminals).copied().collect();
            if local.is_empty() {
                debug!(nodes = component.len(), "skipping component without terminals");
                return None;
            }
            Some((network.subnetwork(&component), local))
        })
        .collect();

    let results = run_jobs(jobs, config, |(component, local)| {
        let mut reducer = Reducer::new(component, &local)?;
        materialize(reducer.run()?)
    })?;

    let mut reduced: Vec<Edge> = results.into_iter().flatten().collect();
    reduced.sort_by_key(Edge::pair);
    Ok(reduced)
}

/// Tuple-level entry point.
///
/// Validates the input tuples, then reduces onto `terminals` when given, or
/// computes all pairwise equivalent resistances when not.
pub fn calculate(tuples: &[EdgeTuple], terminals: Option<&[i64]>) -> Result<Vec<EdgeTuple>> {
    let edges = validate_elements(tuples)?;
    let config = ReductionConfig::default();
    let reduced = match terminals {
        Some(terminals) => {
            let terminals: Vec<NodeId> = terminals.iter().map(|&n| NodeId(n)).collect();
            reduce_with_config(&edges, &terminals, &config)?
        }
        None => pairwise_resistances(&edges, &config)?,
    };
    Ok(to_tuples(&reduced))
}

/// Run independent jobs, on the rayon pool when worthwhile.
pub(crate) fn run_jobs<J, T, F>(jobs: Vec<J>, config: &ReductionConfig, job: F) -> Result<Vec<T>>
where
    J: Send,
    T: Send,
    F: Fn(J) -> Result<T> + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        if config.parallel
            && jobs.len() >= config.min_jobs_for_parallel
            && rayon::current_num_threads() > 1
        {
            use rayon::prelude::*;

            debug!(
                jobs = jobs.len(),
                threads = rayon::current_num_threads(),
                "running jobs in parallel"
            );
            return jobs.into_par_iter().map(job).collect();
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = config;

    jobs.into_iter().map(job).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn r(a: i64, b: i64, value: f64) -> Edge {
        Edge::resistor(NodeId(a), NodeId(b), value).unwrap()
    }

    #[test]
    fn test_calculate_end_to_end() {
        let out = calculate(&[(1, 2, 5.0, 5.0), (2, 3, 5.0, 5.0), (1, 3, 1.0, 1.0)], Some(&[1, 3][..])).unwrap();
        assert_eq!(out.len(), 1);
        let (from, to, fwd, rev) = out[0];
        assert_eq!((from, to), (1, 3));
        assert_relative_eq!(fwd, 1.0 / (1.0 / 10.0 + 1.0), max_relative = 1e-12);
        assert_relative_eq!(rev, 0.909090909, max_relative = 1e-8);
    }

    #[test]
    fn test_calculate_without_terminals_is_pairwise() {
        let out = calculate(&[(1, 2, 2.0, 2.0), (2, 3, 3.0, 3.0)], None).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!((out[1].0, out[1].1), (1, 3));
        assert_relative_eq!(out[1].2, 5.0);
    }

    #[test]
    fn test_calculate_rejects_bad_element() {
        assert!(calculate(&[(1, 2, -1.0, 1.0)], Some(&[1, 2][..])).is_err());
    }

    #[test]
    fn test_components_reduced_independently() {
        let edges = [r(1, 2, 1.0), r(2, 3, 1.0), r(10, 11, 4.0), r(11, 12, 4.0), r(20, 21, 1.0)];
        let terminals = [NodeId(1), NodeId(3), NodeId(10), NodeId(12)];
        let out = reduce_with_config(&edges, &terminals, &ReductionConfig::new().with_min_jobs_for_parallel(1)).unwrap();
        assert_eq!(out.len(), 2);
        assert_relative_eq!(out[0].forward, 2.0);
        assert_relative_eq!(out[1].forward, 8.0);
    }

    #[test]
    fn test_lone_terminal_survives_second_pass() {
        let edges = [r(1, 2, 1.0), r(2, 3, 1.0), r(5, 6, 1.0)];
        let terminals = [NodeId(1), NodeId(3), NodeId(5)];
        let once = reduce(&edges, &terminals).unwrap();
        assert_eq!(once.len(), 1);
        assert_eq!((once[0].from, once[0].to), (NodeId(1), NodeId(3)));

        let twice = reduce(&once, &terminals).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_terminal_without_elements() {
        let out = reduce(&[r(1, 2, 4.0)], &[NodeId(1), NodeId(2), NodeId(9)]).unwrap();
        assert_eq!(out.len(), 1);
        assert!(reduce(&[], &[NodeId(9)]).unwrap().is_empty());
    }
}
