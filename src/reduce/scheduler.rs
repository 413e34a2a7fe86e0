//! Reduction scheduler.
//!
//! The scheduler repeatedly picks the internal node of lowest degree and
//! removes it with the cheapest exact reduction that applies:
//!
//! | Degree | Step |
//! |--------|------|
//! | 0 | drop the isolated node |
//! | 1 | drop the dangling edge (it carries no current) |
//! | 2 | series merge |
//! | 3+ | star-mesh elimination |
//!
//! Parallel merges are applied eagerly by [`Network::add_edge`], so a pair of
//! nodes never holds more than one edge. Every step removes one node, which
//! bounds the run by the initial node count.

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, info};

use crate::circuit::{validate_terminals, Edge, Network, NodeId};
use crate::error::{NetReduceError, Result};

use super::reducers::{series_merge, star_mesh};

/// Whether any reduction is still possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReductionState {
    /// At least one internal node remains
    Active,
    /// Only terminal nodes remain
    Terminal,
}

/// A single reduction applied to one internal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    RemoveIsolated(NodeId),
    DropDangling(NodeId),
    Series(NodeId),
    StarMesh(NodeId),
}

impl Step {
    /// The node this step eliminates.
    pub fn node(&self) -> NodeId {
        match *self {
            Step::RemoveIsolated(n) | Step::DropDangling(n) | Step::Series(n) | Step::StarMesh(n) => n,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::RemoveIsolated(n) => write!(f, "remove isolated {n}"),
            Step::DropDangling(n) => write!(f, "drop dangling {n}"),
            Step::Series(n) => write!(f, "series merge at {n}"),
            Step::StarMesh(n) => write!(f, "star-mesh at {n}"),
        }
    }
}

/// Counters collected over one reduction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReductionStats {
    pub isolated: usize,
    pub dangling: usize,
    pub series: usize,
    pub star_mesh: usize,
    /// Largest edge count observed during the run
    pub peak_edges: usize,
}

impl ReductionStats {
    /// Total number of eliminated nodes.
    pub fn steps(&self) -> usize {
        self.isolated + self.dangling + self.series + self.star_mesh
    }
}

/// Drives a single network to its terminal state.
///
/// The reducer owns its network exclusively for the duration of the run.
#[derive(Debug)]
pub struct Reducer {
    /// The network being reduced
    network: Network,
    /// Nodes that must survive reduction
    terminals: BTreeSet<NodeId>,
    /// Step counters
    stats: ReductionStats,
}

impl Reducer {
    /// Create a reducer. Every terminal must be a node of `network`.
    pub fn new(network: Network, terminals: &[NodeId]) -> Result<Self> {
        let terminals = validate_terminals(&network, terminals)?;
        let stats = ReductionStats {
            peak_edges: network.edge_count(),
            ..ReductionStats::default()
        };
        Ok(Self {
            network,
            terminals,
            stats,
        })
    }

    pub fn is_terminal(&self, node: NodeId) -> bool {
        self.terminals.contains(&node)
    }

    pub fn state(&self) -> ReductionState {
        if self.network.nodes().any(|n| !self.is_terminal(n)) {
            ReductionState::Active
        } else {
            ReductionState::Terminal
        }
    }

    /// The step the scheduler would take next, if any.
    ///
    /// Picks the internal node with the lowest degree; ties go to the lowest
    /// node id.
    pub fn next_step(&self) -> Option<Step> {
        let (node, degree) = self
            .network
            .nodes()
            .filter(|&n| !self.is_terminal(n))
            .map(|n| (n, self.network.degree(n)))
            .min_by_key(|&(n, degree)| (degree, n))?;

        Some(match degree {
            0 => Step::RemoveIsolated(node),
            1 => Step::DropDangling(node),
            2 => Step::Series(node),
            _ => Step::StarMesh(node),
        })
    }

    /// Apply the next step. Returns `None` once the network is terminal.
    pub fn step(&mut self) -> Result<Option<Step>> {
        let Some(step) = self.next_step() else {
            return Ok(None);
        };
        debug!(%step, degree = self.network.degree(step.node()), "reducing");
        self.apply(step)?;
        self.stats.peak_edges = self.stats.peak_edges.max(self.network.edge_count());
        Ok(Some(step))
    }

    /// Reduce until only terminal nodes remain.
    pub fn run(&mut self) -> Result<&Network> {
        let initial_nodes = self.network.node_count();
        let initial_edges = self.network.edge_count();

        while self.step()?.is_some() {}

        info!(
            nodes = initial_nodes,
            edges = initial_edges,
            remaining_edges = self.network.edge_count(),
            steps = self.stats.steps(),
            star_mesh = self.stats.star_mesh,
            peak_edges = self.stats.peak_edges,
            "reduction complete"
        );
        Ok(&self.network)
    }

    fn apply(&mut self, step: Step) -> Result<()> {
        let node = step.node();
        let arms = self.detach(node)?;

        match step {
            Step::RemoveIsolated(_) => self.stats.isolated += 1,
            Step::DropDangling(_) => self.stats.dangling += 1,
            Step::Series(_) => {
                let [left, right] = arms.as_slice() else {
                    return Err(NetReduceError::irreducible(format!(
                        "series merge at {node} with {} arms",
                        arms.len()
                    )));
                };
                let merged = series_merge(left, right, node)?;
                self.network.add_edge(merged);
                self.stats.series += 1;
            }
            Step::StarMesh(_) => {
                for edge in star_mesh(node, &arms)? {
                    self.network.add_edge(edge);
                }
                self.stats.star_mesh += 1;
            }
        }
        Ok(())
    }

    /// Remove every edge at `node`, then the node itself.
    fn detach(&mut self, node: NodeId) -> Result<Vec<Edge>> {
        let arms = self.network.neighbors(node);
        for arm in &arms {
            self.network.remove_edge(node, arm.to);
        }
        self.network.remove_node(node)?;
        Ok(arms)
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn into_network(self) -> Network {
        self.network
    }

    pub fn stats(&self) -> &ReductionStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn r(a: i64, b: i64, value: f64) -> Edge {
        Edge::resistor(NodeId(a), NodeId(b), value).unwrap()
    }

    fn reducer(edges: &[Edge], terminals: &[i64]) -> Reducer {
        let terminals: Vec<NodeId> = terminals.iter().map(|&n| NodeId(n)).collect();
        Reducer::new(Network::from_edges(edges), &terminals).unwrap()
    }

    #[test]
    fn test_prefers_lowest_degree() {
        // Node 2 has degree 2, node 4 degree 1.
        let red = reducer(&[r(1, 2, 1.0), r(2, 3, 1.0), r(3, 4, 1.0)], &[1, 3]);
        assert_eq!(red.next_step(), Some(Step::DropDangling(NodeId(4))));
    }

    #[test]
    fn test_ties_break_on_node_id() {
        let red = reducer(&[r(1, 5, 1.0), r(5, 2, 1.0), r(1, 4, 1.0), r(4, 2, 1.0)], &[1, 2]);
        assert_eq!(red.next_step(), Some(Step::Series(NodeId(4))));
    }

    #[test]
    fn test_series_chain() {
        let mut red = reducer(&[r(1, 2, 3.0), r(2, 3, 4.0), r(3, 4, 5.0)], &[1, 4]);
        let net = red.run().unwrap();
        assert_eq!(net.edge_count(), 1);
        assert_relative_eq!(net.resistance(NodeId(1), NodeId(4)).unwrap(), 12.0);
        assert_eq!(red.stats().series, 2);
        assert_eq!(red.state(), ReductionState::Terminal);
    }

    #[test]
    fn test_star_mesh_for_high_degree() {
        let mut red = reducer(&[r(0, 1, 1.0), r(0, 2, 1.0), r(0, 3, 1.0)], &[1, 2, 3]);
        assert_eq!(red.next_step(), Some(Step::StarMesh(NodeId(0))));
        let net = red.run().unwrap();
        assert_eq!(net.edge_count(), 3);
        // G = 1 * 1 / 3 per branch
        assert_relative_eq!(net.resistance(NodeId(1), NodeId(2)).unwrap(), 3.0, max_relative = 1e-12);
        assert_eq!(red.stats().star_mesh, 1);
    }

    #[test]
    fn test_wheatstone_bridge() {
        // Balanced bridge: no current through the 2-3 branch.
        let edges = [
            r(1, 2, 10.0),
            r(1, 3, 20.0),
            r(2, 4, 10.0),
            r(3, 4, 20.0),
            r(2, 3, 7.0),
        ];
        let mut red = reducer(&edges, &[1, 4]);
        let net = red.run().unwrap();
        let expected = 1.0 / (1.0 / 20.0 + 1.0 / 40.0);
        assert_relative_eq!(net.resistance(NodeId(1), NodeId(4)).unwrap(), expected, max_relative = 1e-12);
        assert_relative_eq!(net.resistance(NodeId(4), NodeId(1)).unwrap(), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_symmetric_result_ignores_internal_labels() {
        // Both internal nodes have degree 3, so the id decides which goes first.
        let edges = |x: i64, y: i64| {
            [r(1, x, 2.0), r(1, y, 3.0), r(2, x, 5.0), r(2, y, 7.0), r(x, y, 11.0)]
        };
        let mut a = reducer(&edges(10, 11), &[1, 2]);
        let mut b = reducer(&edges(11, 10), &[1, 2]);
        assert_eq!(a.next_step(), Some(Step::StarMesh(NodeId(10))));
        let ra = a.run().unwrap().resistance(NodeId(1), NodeId(2)).unwrap();
        let rb = b.run().unwrap().resistance(NodeId(1), NodeId(2)).unwrap();
        assert_relative_eq!(ra, rb, max_relative = 1e-12);
    }

    #[test]
    fn test_no_terminals_clears_network() {
        let mut red = reducer(&[r(1, 2, 1.0), r(2, 3, 1.0), r(3, 1, 1.0)], &[]);
        let net = red.run().unwrap();
        assert!(net.is_empty());
        assert_eq!(red.stats().steps(), 3);
    }

    #[test]
    fn test_unknown_terminal_rejected() {
        let err = Reducer::new(Network::from_edges(&[r(1, 2, 1.0)]), &[NodeId(3)]).unwrap_err();
        assert!(matches!(err, NetReduceError::NodeNotFound { .. }));
    }

    #[test]
    fn test_terminal_network_is_untouched() {
        let diode = Edge::diode(NodeId(1), NodeId(2), 10.0, 1000.0).unwrap();
        let mut red = reducer(&[diode], &[1, 2]);
        assert_eq!(red.state(), ReductionState::Terminal);
        assert_eq!(red.step().unwrap(), None);
        assert_eq!(red.network().edge(NodeId(1), NodeId(2)), Some(&diode));
    }
}
