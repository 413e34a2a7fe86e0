//! Core types for network representation.

use std::fmt;

use crate::error::{NetReduceError, Result};

/// A numbered electrical node (net).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        NodeId(id)
    }
}

/// Unordered node pair. Two edges are parallel iff their keys are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    pub lo: NodeId,
    pub hi: NodeId,
}

impl PairKey {
    /// Build the key for a pair of nodes, in either order.
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.lo == self.hi
    }
}

/// The 4-tuple boundary shape: `(net_from, net_to, forward, reverse)`.
pub type EdgeTuple = (i64, i64, f64, f64);

/// A two-terminal element with direction-dependent resistance.
///
/// Current flowing `from -> to` sees `forward`; current flowing `to -> from`
/// sees `reverse`. Resistors and capacitors have `forward == reverse`.
///
/// Equality does not depend on how the element is labelled: `(1, 2, 10, 1000)`
/// and `(2, 1, 1000, 10)` are the same element.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub forward: f64,
    pub reverse: f64,
}

impl Edge {
    /// Create a validated edge.
    ///
    /// Both resistances must be strictly positive and finite.
    pub fn new(from: NodeId, to: NodeId, forward: f64, reverse: f64) -> Result<Self> {
        check_resistance(from, to, "forward", forward)?;
        check_resistance(from, to, "reverse", reverse)?;
        Ok(Self::raw(from, to, forward, reverse))
    }

    /// Create a resistor (direction-independent).
    pub fn resistor(from: NodeId, to: NodeId, resistance: f64) -> Result<Self> {
        Self::new(from, to, resistance, resistance)
    }

    /// Create a capacitor, which the DC model treats as a plain resistor.
    pub fn capacitor(from: NodeId, to: NodeId, resistance: f64) -> Result<Self> {
        Self::resistor(from, to, resistance)
    }

    /// Create a diode-like element, `from` being the anode.
    pub fn diode(from: NodeId, to: NodeId, forward: f64, reverse: f64) -> Result<Self> {
        Self::new(from, to, forward, reverse)
    }

    /// Build an edge from a boundary tuple.
    pub fn from_tuple((from, to, forward, reverse): EdgeTuple) -> Result<Self> {
        Self::new(NodeId(from), NodeId(to), forward, reverse)
    }

    /// Convert back into the boundary tuple shape.
    pub fn to_tuple(&self) -> EdgeTuple {
        (self.from.0, self.to.0, self.forward, self.reverse)
    }

    /// Unchecked constructor for values produced inside the engine, which may
    /// carry an infinite (open) direction until materialization.
    pub(crate) fn raw(from: NodeId, to: NodeId, forward: f64, reverse: f64) -> Self {
        Self {
            from,
            to,
            forward,
            reverse,
        }
    }

    /// Unordered pair identity.
    pub fn pair(&self) -> PairKey {
        PairKey::new(self.from, self.to)
    }

    /// Whether `other` connects the same pair of nodes.
    pub fn is_parallel_to(&self, other: &Edge) -> bool {
        self.pair() == other.pair()
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }

    pub fn is_symmetric(&self) -> bool {
        self.forward == self.reverse
    }

    /// Whether the element conducts in neither direction.
    pub fn is_open(&self) -> bool {
        self.forward == f64::INFINITY && self.reverse == f64::INFINITY
    }

    /// The same element with its endpoints swapped.
    pub fn reversed(&self) -> Self {
        Self::raw(self.to, self.from, self.reverse, self.forward)
    }

    /// Whether `node` is one of the endpoints.
    pub fn touches(&self, node: NodeId) -> bool {
        self.from == node || self.to == node
    }

    /// The endpoint opposite to `node`.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.from == node {
            Some(self.to)
        } else if self.to == node {
            Some(self.from)
        } else {
            None
        }
    }

    /// This element oriented so that `from == node`.
    pub fn oriented_from(&self, node: NodeId) -> Option<Self> {
        if self.from == node {
            Some(*self)
        } else if self.to == node {
            Some(self.reversed())
        } else {
            None
        }
    }

    /// This element oriented so that `to == node`.
    pub fn oriented_to(&self, node: NodeId) -> Option<Self> {
        self.oriented_from(node).map(|e| e.reversed())
    }

    /// Resistance seen by current leaving `node` through this element.
    pub fn resistance_from(&self, node: NodeId) -> Option<f64> {
        self.oriented_from(node).map(|e| e.forward)
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        let lo = self.pair().lo;
        match (self.oriented_from(lo), other.oriented_from(lo)) {
            (Some(a), Some(b)) => {
                a.to == b.to && a.forward == b.forward && a.reverse == b.reverse
            }
            _ => false,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} (fwd {:.6e}, rev {:.6e})",
            self.from, self.to, self.forward, self.reverse
        )
    }
}

fn check_resistance(from: NodeId, to: NodeId, which: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(NetReduceError::invalid_element(
            from,
            to,
            format!("{which} resistance must be finite (got {value})"),
        ));
    }
    if value <= 0.0 {
        return Err(NetReduceError::invalid_element(
            from,
            to,
            format!("{which} resistance must be positive (got {value})"),
        ));
    }
    Ok(())
}
