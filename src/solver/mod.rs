//! Direct nodal solver.
//!
//! This module provides an independent check on the reduction engine by
//! solving the network's conductance (Laplacian) system directly.
//!
//! ## Nodal Analysis
//!
//! For a purely resistive network, Kirchhoff's current law at every node
//! gives G v = i, where:
//! - G is the conductance matrix (the weighted graph Laplacian)
//! - v is the vector of node voltages
//! - i is the vector of injected currents
//!
//! G is singular until one node is chosen as the 0 V reference; its row and
//! column are dropped. Injecting 1 A at `a` with `b` as reference makes
//! `v[a]` the equivalent resistance between `a` and `b`.

mod laplacian;
mod verify;

pub use laplacian::{effective_resistance, ConductanceMatrix};
pub use verify::{approx_equal, verify_pairwise, verify_reduction, Discrepancy};

/// Pivots smaller than this are treated as zero.
pub const PIVOT_TOLERANCE: f64 = 1e-15;

/// Default relative tolerance when comparing reduction results against a
/// direct solve.
pub const DEFAULT_VERIFY_TOLERANCE: f64 = 1e-9;
