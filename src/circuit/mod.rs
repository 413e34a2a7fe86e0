//! Network representation and validation.
//!
//! This module provides the typed edge model and the mutable [`Network`]
//! graph the reduction engine works on. Boundary tuples are validated once,
//! here, and never re-checked downstream.

mod graph;
mod types;
mod validate;

pub use graph::Network;
pub use types::*;
pub use validate::{validate_elements, validate_terminals};
