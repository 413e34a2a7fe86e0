//! Network graph structure.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{debug, warn};

use super::types::{Edge, NodeId, PairKey};
use crate::error::{NetReduceError, Result};
use crate::reduce::parallel_merge;

/// A mutable resistive network.
///
/// At most one edge is stored per unordered node pair: parallel elements are
/// folded on insertion. Every stored edge references two live nodes. Ordered
/// maps keep iteration, and therefore reduction order, deterministic.
#[derive(Debug, Clone, Default)]
pub struct Network {
    /// Neighbor sets for every live node
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,

    /// The single edge for each connected pair, in its first-seen orientation
    edges: BTreeMap<PairKey, Edge>,
}

impl Network {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a network from a list of elements.
    pub fn from_edges<'a>(edges: impl IntoIterator<Item = &'a Edge>) -> Self {
        let mut network = Self::new();
        for edge in edges {
            network.add_edge(*edge);
        }
        network
    }

    /// Insert an edge, folding it into any existing edge on the same pair.
    ///
    /// Self-loops carry no current between distinct nodes and are dropped.
    /// An edge that would leave its pair open in both directions is discarded
    /// and any stored edge on the pair is kept as is.
    pub fn add_edge(&mut self, edge: Edge) {
        if edge.is_self_loop() {
            debug!(node = %edge.from, "dropping self-loop");
            return;
        }

        let key = edge.pair();
        let merged = match self.edges.get(&key) {
            Some(existing) => parallel_merge(existing, &edge),
            None if edge.is_open() => Err(NetReduceError::DegenerateMerge {
                from: edge.from,
                to: edge.to,
            }),
            None => Ok(edge),
        };
        let merged = match merged {
            Ok(merged) => merged,
            Err(err) => {
                warn!(%err, "dropping degenerate edge");
                return;
            }
        };

        self.adjacency.entry(key.lo).or_default().insert(key.hi);
        self.adjacency.entry(key.hi).or_default().insert(key.lo);
        self.edges.insert(key, merged);
    }

    /// Register a node with no incident edges.
    pub fn add_node(&mut self, node: NodeId) {
        self.adjacency.entry(node).or_default();
    }

    /// Remove the edge between `a` and `b`, returning it.
    ///
    /// Both endpoints stay in the network, possibly with degree 0.
    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> Option<Edge> {
        let key = PairKey::new(a, b);
        let edge = self.edges.remove(&key)?;
        if let Some(n) = self.adjacency.get_mut(&key.lo) {
            n.remove(&key.hi);
        }
        if let Some(n) = self.adjacency.get_mut(&key.hi) {
            n.remove(&key.lo);
        }
        Some(edge)
    }

    /// Remove an isolated node.
    ///
    /// Fails with [`NetReduceError::NonEmptyNode`] if edges are still attached.
    pub fn remove_node(&mut self, node: NodeId) -> Result<()> {
        let degree = self
            .adjacency
            .get(&node)
            .map(BTreeSet::len)
            .ok_or(NetReduceError::NodeNotFound { node })?;
        if degree > 0 {
            return Err(NetReduceError::NonEmptyNode { node, degree });
        }
        self.adjacency.remove(&node);
        Ok(())
    }

    /// Number of distinct neighbors (0 for unknown nodes).
    pub fn degree(&self, node: NodeId) -> usize {
        self.adjacency.get(&node).map_or(0, BTreeSet::len)
    }

    /// Edges incident to `node`, oriented so that `from == node`, ordered by
    /// neighbor id.
    pub fn neighbors(&self, node: NodeId) -> Vec<Edge> {
        let Some(adjacent) = self.adjacency.get(&node) else {
            return Vec::new();
        };
        adjacent
            .iter()
            .filter_map(|&other| self.edges.get(&PairKey::new(node, other)))
            .filter_map(|edge| edge.oriented_from(node))
            .collect()
    }

    /// Look up the edge between two nodes, in its stored orientation.
    pub fn edge(&self, a: NodeId, b: NodeId) -> Option<&Edge> {
        self.edges.get(&PairKey::new(a, b))
    }

    /// Resistance seen by current flowing directly `from -> to`.
    pub fn resistance(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.edge(from, to).and_then(|e| e.resistance_from(from))
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.adjacency.contains_key(&node)
    }

    /// Live nodes in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.keys().copied()
    }

    /// Stored edges, ordered by node pair.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Nodes reachable from `start`, including itself.
    pub fn component_of(&self, start: NodeId) -> BTreeSet<NodeId> {
        let mut seen = BTreeSet::new();
        if !self.contains_node(start) {
            return seen;
        }
        let mut queue = VecDeque::from([start]);
        seen.insert(start);
        while let Some(node) = queue.pop_front() {
            for &next in &self.adjacency[&node] {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    /// Connected components, each sorted, ordered by their smallest node.
    pub fn components(&self) -> Vec<BTreeSet<NodeId>> {
        let mut assigned = BTreeSet::new();
        let mut components = Vec::new();
        for node in self.nodes() {
            if assigned.contains(&node) {
                continue;
            }
            let component = self.component_of(node);
            assigned.extend(component.iter().copied());
            components.push(component);
        }
        components
    }

    /// The induced subnetwork over `nodes`.
    pub fn subnetwork(&self, nodes: &BTreeSet<NodeId>) -> Network {
        let mut sub = Network::new();
        for &node in nodes {
            sub.add_node(node);
        }
        for edge in self.edges.values() {
            if nodes.contains(&edge.from) && nodes.contains(&edge.to) {
                sub.add_edge(*edge);
            }
        }
        sub
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn r(a: i64, b: i64, value: f64) -> Edge {
        Edge::resistor(NodeId(a), NodeId(b), value).unwrap()
    }

    #[test]
    fn test_add_edge_merges_parallel() {
        let mut net = Network::new();
        net.add_edge(r(1, 2, 10.0));
        net.add_edge(r(2, 1, 10.0));
        assert_eq!(net.edge_count(), 1);
        assert_eq!(net.degree(NodeId(1)), 1);
        assert_relative_eq!(net.resistance(NodeId(1), NodeId(2)).unwrap(), 5.0);
    }

    #[test]
    fn test_keeps_first_orientation() {
        let mut net = Network::new();
        net.add_edge(Edge::diode(NodeId(2), NodeId(1), 10.0, 1000.0).unwrap());
        let stored = net.edge(NodeId(1), NodeId(2)).unwrap();
        assert_eq!(stored.from, NodeId(2));
        assert_eq!(net.resistance(NodeId(2), NodeId(1)), Some(10.0));
        assert_eq!(net.resistance(NodeId(1), NodeId(2)), Some(1000.0));
    }

    #[test]
    fn test_self_loop_dropped() {
        let mut net = Network::new();
        net.add_edge(r(4, 4, 1.0));
        assert_eq!(net.edge_count(), 0);
        assert!(!net.contains_node(NodeId(4)));
    }

    #[test]
    fn test_open_edge_is_discarded() {
        let mut net = Network::new();
        net.add_edge(Edge::raw(NodeId(1), NodeId(3), f64::INFINITY, f64::INFINITY));
        assert_eq!(net.edge_count(), 0);
        assert!(!net.contains_node(NodeId(1)));

        // An open partner leaves the stored edge untouched.
        net.add_edge(r(1, 3, 4.0));
        net.add_edge(Edge::raw(NodeId(3), NodeId(1), f64::INFINITY, f64::INFINITY));
        assert_eq!(net.edge_count(), 1);
        assert_eq!(net.resistance(NodeId(1), NodeId(3)), Some(4.0));
    }

    #[test]
    fn test_one_way_open_merge_keeps_edge() {
        let mut net = Network::new();
        net.add_edge(Edge::raw(NodeId(1), NodeId(2), f64::INFINITY, 5.0));
        net.add_edge(Edge::raw(NodeId(2), NodeId(1), 5.0, f64::INFINITY));
        // 1 -> 2: open on both, 2 -> 1: 5 || 5
        assert_relative_eq!(net.resistance(NodeId(2), NodeId(1)).unwrap(), 2.5);
        assert_eq!(net.resistance(NodeId(1), NodeId(2)), Some(f64::INFINITY));
    }

    #[test]
    fn test_remove_node_requires_degree_zero() {
        let mut net = Network::from_edges(&[r(1, 2, 1.0)]);
        let err = net.remove_node(NodeId(1)).unwrap_err();
        assert!(matches!(err, NetReduceError::NonEmptyNode { degree: 1, .. }));

        net.remove_edge(NodeId(2), NodeId(1)).unwrap();
        net.remove_node(NodeId(1)).unwrap();
        assert!(!net.contains_node(NodeId(1)));
        assert!(net.contains_node(NodeId(2)));
    }

    #[test]
    fn test_neighbors_are_oriented() {
        let net = Network::from_edges(&[r(1, 2, 1.0), r(3, 1, 2.0)]);
        let around = net.neighbors(NodeId(1));
        assert_eq!(around.len(), 2);
        assert!(around.iter().all(|e| e.from == NodeId(1)));
        assert_eq!(around[0].to, NodeId(2));
        assert_eq!(around[1].to, NodeId(3));
    }

    #[test]
    fn test_components() {
        let net = Network::from_edges(&[r(1, 2, 1.0), r(2, 3, 1.0), r(7, 8, 1.0)]);
        let components = net.components();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].len(), 3);
        assert!(components[1].contains(&NodeId(8)));

        let sub = net.subnetwork(&components[1]);
        assert_eq!(sub.edge_count(), 1);
        assert_eq!(sub.node_count(), 2);
    }
}
