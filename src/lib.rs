//! # Netreduce
//!
//! Reduction of resistive networks with direction-dependent elements.
//!
//! This library provides:
//! - A typed edge model for resistors, capacitors (treated as resistors) and
//!   diode-like elements with distinct forward and reverse resistance
//! - A mutable network graph that folds parallel elements on insertion
//! - Series, parallel and star-mesh reductions driven to a terminal state
//! - Pairwise equivalent resistances between every connected node pair
//! - A direct nodal solver for cross-checking results
//!
//! ## Architecture
//!
//! - [`circuit`] - Edge model, network graph and input validation
//! - [`reduce`] - Elementary reducers, reduction scheduler and result materializer
//! - [`solver`] - Conductance matrix assembly, LU solving and verification
//! - [`io`] - Edge-list reading and writing (CLI only)
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! netreduce circuit.edges -t 1 -t 3 -o reduced.edges
//! netreduce circuit.edges            # all pairwise resistances
//! ```
//!
//! ### Library
//!
//! ```
//! use netreduce::{circuit::NodeId, reduce, Edge};
//!
//! let edges = [
//!     Edge::resistor(NodeId(1), NodeId(2), 5.0)?,
//!     Edge::resistor(NodeId(2), NodeId(3), 5.0)?,
//!     Edge::resistor(NodeId(1), NodeId(3), 1.0)?,
//! ];
//! let reduced = reduce(&edges, &[NodeId(1), NodeId(3)])?;
//! assert_eq!(reduced.len(), 1);
//! # Ok::<(), netreduce::NetReduceError>(())
//! ```
//!
//! ## Reduction Method
//!
//! Internal (non-terminal) nodes are eliminated lowest degree first:
//!
//! 1. Parallel elements are merged as soon as they share a node pair
//! 2. Degree-2 nodes are removed by series merging
//! 3. Higher-degree nodes are removed by the star-mesh transform
//!
//! Forward and reverse resistances are carried separately through every
//! step, so diode-like asymmetry survives reduction.

pub mod circuit;
pub mod error;
pub mod reduce;
pub mod solver;

#[cfg(feature = "cli")]
pub mod io;

// Re-export main types for convenience
pub use circuit::{Edge, Network};
pub use error::{NetReduceError, Result};
pub use reduce::{calculate, pairwise_resistances, reduce, ReductionConfig};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::{pairwise_flat, reduce_flat};
