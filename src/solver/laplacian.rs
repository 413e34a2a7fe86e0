//! Conductance matrix assembly and solving.

use std::collections::BTreeMap;

use crate::circuit::{Edge, Network, NodeId};
use crate::error::{NetReduceError, Result};

use super::PIVOT_TOLERANCE;

/// Nodal conductance system G v = i.
#[derive(Debug)]
pub struct ConductanceMatrix {
    /// Conductance matrix G (row-major)
    pub g: Vec<f64>,
    /// Injected current vector i
    pub i: Vec<f64>,
    /// Solution vector v (node voltages)
    pub v: Vec<f64>,
    /// Matrix dimension
    pub size: usize,
    /// LU decomposition of G
    pub lu: Vec<f64>,
    /// Pivot indices for LU decomposition
    pub pivots: Vec<usize>,
}

impl ConductanceMatrix {
    /// Create a zeroed system of the given dimension.
    pub fn new(size: usize) -> Self {
        Self {
            g: vec![0.0; size * size],
            i: vec![0.0; size],
            v: vec![0.0; size],
            size,
            lu: vec![0.0; size * size],
            pivots: vec![0; size],
        }
    }

    /// Get matrix element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.g[row * self.size + col]
    }

    /// Add to matrix element at (row, col).
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.g[row * self.size + col] += value;
    }

    /// Inject current into a node. `None` is the reference node.
    pub fn inject(&mut self, node: Option<usize>, current: f64) {
        if let Some(row) = node {
            self.i[row] += current;
        }
    }

    /// Stamp a conductance between two nodes.
    /// For a conductance G between nodes n1 and n2:
    ///   G[n1,n1] += G
    ///   G[n2,n2] += G
    ///   G[n1,n2] -= G
    ///   G[n2,n1] -= G
    pub fn stamp_conductance(&mut self, n1: Option<usize>, n2: Option<usize>, g: f64) {
        if let Some(i) = n1 {
            self.add(i, i, g);
        }
        if let Some(j) = n2 {
            self.add(j, j, g);
        }
        if let (Some(i), Some(j)) = (n1, n2) {
            self.add(i, j, -g);
            self.add(j, i, -g);
        }
    }

    /// Perform LU decomposition with partial pivoting.
    pub fn factor(&mut self) -> Result<()> {
        let n = self.size;
        self.lu.copy_from_slice(&self.g);

        for (k, pivot) in self.pivots.iter_mut().enumerate() {
            *pivot = k;
        }

        for k in 0..n {
            let mut max_val = self.lu[k * n + k].abs();
            let mut max_row = k;
            for i in (k + 1)..n {
                let val = self.lu[i * n + k].abs();
                if val > max_val {
                    max_val = val;
                    max_row = i;
                }
            }

            if max_val < PIVOT_TOLERANCE {
                return Err(NetReduceError::SingularMatrix);
            }

            if max_row != k {
                self.pivots.swap(k, max_row);
                for j in 0..n {
                    self.lu.swap(k * n + j, max_row * n + j);
                }
            }

            let pivot = self.lu[k * n + k];
            for i in (k + 1)..n {
                let factor = self.lu[i * n + k] / pivot;
                self.lu[i * n + k] = factor;
                for j in (k + 1)..n {
                    self.lu[i * n + j] -= factor * self.lu[k * n + j];
                }
            }
        }

        Ok(())
    }

    /// Solve using the pre-computed LU decomposition.
    pub fn solve(&mut self) -> Result<()> {
        let n = self.size;

        for row in 0..n {
            self.v[row] = self.i[self.pivots[row]];
        }

        // Forward substitution (L * y = Pi)
        for row in 0..n {
            for col in 0..row {
                self.v[row] -= self.lu[row * n + col] * self.v[col];
            }
        }

        // Back substitution (U * v = y)
        for row in (0..n).rev() {
            for col in (row + 1)..n {
                self.v[row] -= self.lu[row * n + col] * self.v[col];
            }
            let diag = self.lu[row * n + row];
            if diag.abs() < PIVOT_TOLERANCE {
                return Err(NetReduceError::SingularMatrix);
            }
            self.v[row] /= diag;
        }

        Ok(())
    }

    /// Voltage at a matrix row; the reference node sits at 0 V.
    pub fn voltage(&self, node: Option<usize>) -> f64 {
        node.map_or(0.0, |row| self.v[row])
    }
}

/// Equivalent resistance between `a` and `b` by direct nodal analysis.
///
/// Grounds `b`, injects 1 A into `a` and reads back `V(a)`. Only the component
/// containing `a` is assembled; if `b` is not in it the pair is open and the
/// result is infinite. Direction-dependent elements are rejected.
pub fn effective_resistance(edges: &[Edge], a: NodeId, b: NodeId) -> Result<f64> {
    if let Some(e) = edges.iter().find(|e| !e.is_symmetric()) {
        return Err(NetReduceError::AsymmetricElement {
            from: e.from,
            to: e.to,
        });
    }

    let network = Network::from_edges(edges);
    for node in [a, b] {
        if !network.contains_node(node) {
            return Err(NetReduceError::NodeNotFound { node });
        }
    }
    if a == b {
        return Ok(0.0);
    }

    let component = network.component_of(a);
    if !component.contains(&b) {
        return Ok(f64::INFINITY);
    }

    // Row index per node, with `b` as the reference.
    let index: BTreeMap<NodeId, usize> = component
        .iter()
        .filter(|&&n| n != b)
        .enumerate()
        .map(|(row, &n)| (n, row))
        .collect();

    let mut matrix = ConductanceMatrix::new(index.len());
    for edge in network.edges().filter(|e| component.contains(&e.from)) {
        let n1 = index.get(&edge.from).copied();
        let n2 = index.get(&edge.to).copied();
        matrix.stamp_conductance(n1, n2, 1.0 / edge.forward);
    }

    let row_a = index.get(&a).copied();
    matrix.inject(row_a, 1.0);
    matrix.factor()?;
    matrix.solve()?;
    Ok(matrix.voltage(row_a))
}
