//! Cross-checking reduction results against direct nodal solves.

use std::fmt;

use crate::circuit::{Edge, NodeId};
use crate::error::{NetReduceError, Result};

use super::effective_resistance;

/// A pair whose reduced resistance disagrees with the direct solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Discrepancy {
    pub a: NodeId,
    pub b: NodeId,
    /// Equivalent resistance from the direct solve of the original network
    pub expected: f64,
    /// Equivalent resistance according to the reduction result
    pub actual: f64,
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}: expected {:.9e}, got {:.9e}",
            self.a, self.b, self.expected, self.actual
        )
    }
}

/// Relative comparison that treats two infinities as equal.
pub fn approx_equal(expected: f64, actual: f64, tolerance: f64) -> bool {
    if expected.is_infinite() || actual.is_infinite() {
        return expected == actual;
    }
    (expected - actual).abs() <= tolerance * expected.abs().max(actual.abs())
}

/// Equivalent resistance, treating a node absent from `edges` as open.
fn resistance_or_open(edges: &[Edge], a: NodeId, b: NodeId) -> Result<f64> {
    match effective_resistance(edges, a, b) {
        Err(NetReduceError::NodeNotFound { .. }) => Ok(f64::INFINITY),
        other => other,
    }
}

/// Check that a reduced network preserves every terminal-to-terminal
/// resistance of the original.
pub fn verify_reduction(
    original: &[Edge],
    reduced: &[Edge],
    terminals: &[NodeId],
    tolerance: f64,
) -> Result<Vec<Discrepancy>> {
    let mut terminals = terminals.to_vec();
    terminals.sort();
    terminals.dedup();

    let mut discrepancies = Vec::new();
    for (i, &a) in terminals.iter().enumerate() {
        for &b in &terminals[i + 1..] {
            let expected = resistance_or_open(original, a, b)?;
            let actual = resistance_or_open(reduced, a, b)?;
            if !approx_equal(expected, actual, tolerance) {
                discrepancies.push(Discrepancy { a, b, expected, actual });
            }
        }
    }
    Ok(discrepancies)
}

/// Check each pairwise resistance against a direct solve of the original.
pub fn verify_pairwise(original: &[Edge], pairs: &[Edge], tolerance: f64) -> Result<Vec<Discrepancy>> {
    let mut discrepancies = Vec::new();
    for pair in pairs {
        let expected = effective_resistance(original, pair.from, pair.to)?;
        if !approx_equal(expected, pair.forward, tolerance) {
            discrepancies.push(Discrepancy {
                a: pair.from,
                b: pair.to,
                expected,
                actual: pair.forward,
            });
        }
    }
    Ok(discrepancies)
}
