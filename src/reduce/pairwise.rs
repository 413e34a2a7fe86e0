//! Pairwise equivalent resistances.
//!
//! Reduces the network once per node pair with only that pair kept as
//! terminals. The surviving edge holds the equivalent resistance in both
//! directions.

use tracing::info;

use crate::circuit::{Edge, Network, NodeId};
use crate::error::Result;

use super::materialize::materialize;
use super::scheduler::Reducer;
use super::{run_jobs, ReductionConfig};

/// Equivalent resistance between `a` and `b`, oriented `a -> b`.
///
/// Returns `None` when no conducting path joins the two nodes.
pub fn pair_resistance(network: &Network, a: NodeId, b: NodeId) -> Result<Option<Edge>> {
    let mut reducer = Reducer::new(network.clone(), &[a, b])?;
    reducer.run()?;
    let reduced = materialize(reducer.network())?;
    Ok(reduced.first().and_then(|edge| edge.oriented_from(a)))
}

/// Equivalent resistance for every connected node pair.
///
/// Emits one edge `(a, b, R(a -> b), R(b -> a))` per pair with `a < b`,
/// ordered by pair. Pairs in different connected components are omitted.
pub fn pairwise_resistances(edges: &[Edge], config: &ReductionConfig) -> Result<Vec<Edge>> {
    let network = Network::from_edges(edges);
    let components: Vec<Network> = network
        .components()
        .iter()
        .filter(|c| c.len() > 1)
        .map(|c| network.subnetwork(c))
        .collect();

    let mut jobs = Vec::new();
    for (idx, component) in components.iter().enumerate() {
        let nodes: Vec<NodeId> = component.nodes().collect();
        for (i, &a) in nodes.iter().enumerate() {
            for &b in &nodes[i + 1..] {
                jobs.push((idx, a, b));
            }
        }
    }

    info!(
        nodes = network.node_count(),
        components = components.len(),
        pairs = jobs.len(),
        "computing pairwise resistances"
    );

    let results = run_jobs(jobs, config, |(idx, a, b)| {
        pair_resistance(&components[idx], a, b)
    })?;

    let mut pairs: Vec<Edge> = results.into_iter().flatten().collect();
    pairs.sort_by_key(Edge::pair);
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn r(a: i64, b: i64, value: f64) -> Edge {
        Edge::resistor(NodeId(a), NodeId(b), value).unwrap()
    }

    #[test]
    fn test_triangle() {
        let edges = [r(1, 2, 1.0), r(2, 3, 1.0), r(1, 3, 1.0)];
        let pairs = pairwise_resistances(&edges, &ReductionConfig::new()).unwrap();
        assert_eq!(pairs.len(), 3);
        for edge in &pairs {
            assert!(edge.from < edge.to);
            assert_relative_eq!(edge.forward, 2.0 / 3.0, max_relative = 1e-12);
            assert_relative_eq!(edge.reverse, 2.0 / 3.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_disconnected_pairs_omitted() {
        let edges = [r(1, 2, 1.0), r(3, 4, 2.0)];
        let pairs = pairwise_resistances(&edges, &ReductionConfig::new()).unwrap();
        let keys: Vec<_> = pairs.iter().map(|e| (e.from.0, e.to.0)).collect();
        assert_eq!(keys, vec![(1, 2), (3, 4)]);
    }

    #[test]
    fn test_pair_is_oriented_from_first_node() {
        let diode = Edge::diode(NodeId(2), NodeId(1), 10.0, 1000.0).unwrap();
        let edge = pair_resistance(&Network::from_edges(&[diode]), NodeId(1), NodeId(2))
            .unwrap()
            .unwrap();
        assert_eq!(edge.from, NodeId(1));
        assert_eq!(edge.forward, 1000.0);
        assert_eq!(edge.reverse, 10.0);
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let edges: Vec<Edge> = (0..8)
            .map(|i| r(i, i + 1, 1.0 + i as f64))
            .chain((0..6).map(|i| r(i, i + 2, 3.0)))
            .collect();
        let seq = pairwise_resistances(&edges, &ReductionConfig::new().with_parallel(false)).unwrap();
        let par = pairwise_resistances(&edges, &ReductionConfig::new().with_min_jobs_for_parallel(1)).unwrap();
        assert_eq!(seq.len(), par.len());
        for (s, p) in seq.iter().zip(&par) {
            assert_eq!(s.pair(), p.pair());
            assert_relative_eq!(s.forward, p.forward, max_relative = 1e-12);
        }
    }
}
