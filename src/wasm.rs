//! WASM bindings for Netreduce.
//!
//! Elements cross the boundary as flat `Float64Array`s of 4-tuples
//! `[from, to, forward, reverse, from, to, ...]`; node ids must be integral.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { reduce_flat } from 'netreduce';
//!
//! await init();
//!
//! const edges = new Float64Array([1, 2, 5, 5,  2, 3, 5, 5,  1, 3, 1, 1]);
//! const reduced = reduce_flat(edges, new Float64Array([1, 3]));
//! // Float64Array [1, 3, 0.909..., 0.909...]
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::{validate_elements, EdgeTuple};
use crate::error::{NetReduceError, Result};
use crate::reduce::calculate;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Reduce a flat edge array onto the given terminal nodes.
#[wasm_bindgen]
pub fn reduce_flat(edges: &[f64], terminals: &[f64]) -> std::result::Result<Vec<f64>, JsValue> {
    let run = || -> Result<Vec<f64>> {
        let tuples = unflatten(edges)?;
        let terminals = terminals
            .iter()
            .map(|&t| node_id(t))
            .collect::<Result<Vec<_>>>()?;
        Ok(flatten(&calculate(&tuples, Some(terminals.as_slice()))?))
    };
    run().map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Equivalent resistance of every connected node pair, as a flat edge array.
#[wasm_bindgen]
pub fn pairwise_flat(edges: &[f64]) -> std::result::Result<Vec<f64>, JsValue> {
    let run = || -> Result<Vec<f64>> {
        let tuples = unflatten(edges)?;
        Ok(flatten(&calculate(&tuples, None)?))
    };
    run().map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Check a flat edge array without reducing it.
#[wasm_bindgen]
pub fn validate_flat(edges: &[f64]) -> std::result::Result<usize, JsValue> {
    unflatten(edges)
        .and_then(|tuples| validate_elements(&tuples))
        .map(|edges| edges.len())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn node_id(value: f64) -> Result<i64> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(NetReduceError::WasmError {
            message: format!("node id {value} is not an integer"),
        });
    }
    // i64::MAX rounds up to 2^63, which is itself out of range.
    if value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(NetReduceError::WasmError {
            message: format!("node id {value} is outside the 64-bit integer range"),
        });
    }
    Ok(value as i64)
}

fn unflatten(flat: &[f64]) -> Result<Vec<EdgeTuple>> {
    if flat.len() % 4 != 0 {
        return Err(NetReduceError::WasmError {
            message: format!("edge array length {} is not a multiple of 4", flat.len()),
        });
    }
    flat.chunks_exact(4)
        .map(|c| Ok((node_id(c[0])?, node_id(c[1])?, c[2], c[3])))
        .collect()
}

fn flatten(tuples: &[EdgeTuple]) -> Vec<f64> {
    tuples
        .iter()
        .flat_map(|&(from, to, fwd, rev)| [from as f64, to as f64, fwd, rev])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_range() {
        assert_eq!(node_id(42.0).unwrap(), 42);
        assert_eq!(node_id(-7.0).unwrap(), -7);
        assert_eq!(node_id(i64::MIN as f64).unwrap(), i64::MIN);
        assert!(node_id(1.5).is_err());
        assert!(node_id(f64::NAN).is_err());
        assert!(node_id(9.3e18).is_err());
        assert!(node_id(2f64.powi(63)).is_err());
        assert!(node_id(-1e19).is_err());
    }

    #[test]
    fn test_unflatten_rejects_out_of_range_node() {
        assert!(unflatten(&[1.0, 2.0, 5.0, 5.0]).is_ok());
        assert!(unflatten(&[1.0, 1e19, 5.0, 5.0]).is_err());
        assert!(unflatten(&[1.0, 2.0, 5.0]).is_err());
    }
}
