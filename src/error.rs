//! Error types for the network reduction engine.
//!
//! This module provides a unified error type [`NetReduceError`] that covers
//! all error conditions that can occur during element ingestion, network
//! reduction, direct solving, and edge-list I/O.

use thiserror::Error;

use crate::circuit::NodeId;

/// Result type alias using [`NetReduceError`].
pub type Result<T> = std::result::Result<T, NetReduceError>;

/// Unified error type for all reduction operations.
#[derive(Error, Debug)]
pub enum NetReduceError {
    // ============ Input Validation Errors ============
    /// Element with a non-positive or non-finite resistance
    #[error("Invalid element {from}-{to}: {message}")]
    InvalidElement {
        from: NodeId,
        to: NodeId,
        message: String,
    },

    /// Terminal or queried node does not exist in the network
    #[error("Node '{node}' not found in network")]
    NodeNotFound { node: NodeId },

    // ============ Reduction Errors ============
    /// Parallel merge produced an edge that is open in both directions.
    /// Recovered locally by dropping the edge.
    #[error("Degenerate parallel merge between {from} and {to}: both directions are open")]
    DegenerateMerge { from: NodeId, to: NodeId },

    /// Attempt to remove a node that still has incident edges
    #[error("Cannot remove node '{node}': {degree} incident edge(s) remain")]
    NonEmptyNode { node: NodeId, degree: usize },

    /// An equivalent resistance exceeds the representable range
    #[error("Equivalent resistance between {from} and {to} overflows ({direction} direction)")]
    ResistanceOverflow {
        from: NodeId,
        to: NodeId,
        direction: &'static str,
    },

    /// Reduction produced a numerically inconsistent result
    #[error("Irreducible topology: {message}")]
    IrreducibleTopology { message: String },

    // ============ Direct Solver Errors ============
    /// Matrix is singular and cannot be solved
    #[error("Singular matrix - network may contain a floating node")]
    SingularMatrix,

    /// Direct nodal solve only supports direction-independent elements
    #[error("Element {from}-{to} is direction-dependent; direct solve requires symmetric elements")]
    AsymmetricElement { from: NodeId, to: NodeId },

    // ============ I/O Errors ============
    /// Malformed line in an edge list
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Error reading edge list file
    #[error("Failed to read edge list '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing reduced edges
    #[error("Output error: {message}")]
    OutputError { message: String },

    // ============ WASM Errors ============
    /// WASM-specific error
    #[cfg(feature = "wasm")]
    #[error("WASM error: {message}")]
    WasmError { message: String },
}

impl NetReduceError {
    /// Create an invalid element error
    pub fn invalid_element(from: NodeId, to: NodeId, message: impl Into<String>) -> Self {
        Self::InvalidElement {
            from,
            to,
            message: message.into(),
        }
    }

    /// Create an irreducible topology error
    pub fn irreducible(message: impl Into<String>) -> Self {
        Self::IrreducibleTopology {
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }
}
