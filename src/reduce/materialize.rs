//! Conversion of a reduced network back into the flat edge contract.

use crate::circuit::{Edge, EdgeTuple, Network};
use crate::error::Result;

use super::reducers::check_derived;

/// Collect the network's edges, ordered by node pair.
///
/// Every emitted resistance is strictly positive and finite. An infinite
/// direction fails with [`crate::NetReduceError::ResistanceOverflow`]; NaN or
/// non-positive values fail with [`crate::NetReduceError::IrreducibleTopology`].
pub fn materialize(network: &Network) -> Result<Vec<Edge>> {
    network.edges().map(|edge| check_derived(*edge)).collect()
}

/// Convert edges into boundary tuples.
pub fn to_tuples(edges: &[Edge]) -> Vec<EdgeTuple> {
    edges.iter().map(Edge::to_tuple).collect()
}
