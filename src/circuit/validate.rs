//! Input validation.

use std::collections::BTreeSet;

use crate::error::{NetReduceError, Result};

use super::{Edge, EdgeTuple, Network, NodeId};

/// Convert boundary tuples into validated edges.
///
/// Checks:
/// - Forward and reverse resistances are strictly positive
/// - Both resistances are finite
///
/// The first offending element aborts ingestion.
pub fn validate_elements(tuples: &[EdgeTuple]) -> Result<Vec<Edge>> {
    tuples.iter().map(|&t| Edge::from_tuple(t)).collect()
}

/// Resolve the terminal set against a network.
///
/// Every terminal must be a live node of the network.
pub fn validate_terminals(network: &Network, terminals: &[NodeId]) -> Result<BTreeSet<NodeId>> {
    terminals
        .iter()
        .map(|&node| {
            if network.contains_node(node) {
                Ok(node)
            } else {
                Err(NetReduceError::NodeNotFound { node })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_elements() {
        let edges = validate_elements(&[(1, 2, 5.0, 5.0), (2, 3, 10.0, 1000.0)]).unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[1].reverse, 1000.0);
    }

    #[test]
    fn test_first_bad_element_aborts() {
        let err = validate_elements(&[(1, 2, 5.0, 5.0), (2, 3, 0.0, 1.0)]).unwrap_err();
        match err {
            NetReduceError::InvalidElement { from, to, .. } => {
                assert_eq!((from, to), (NodeId(2), NodeId(3)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_terminal() {
        let network = Network::from_edges(&validate_elements(&[(1, 2, 1.0, 1.0)]).unwrap());
        assert!(validate_terminals(&network, &[NodeId(1)]).is_ok());
        assert!(matches!(
            validate_terminals(&network, &[NodeId(9)]),
            Err(NetReduceError::NodeNotFound { node: NodeId(9) })
        ));
    }
}
