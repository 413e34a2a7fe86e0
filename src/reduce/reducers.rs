//! Elementary reducers: parallel merge, series merge and star-mesh.
//!
//! All three work on direction-dependent elements. Every edge is first
//! re-oriented relative to the node being merged or eliminated, so the two
//! resistances of an element are never mixed up by how it was labelled on
//! input.

use crate::circuit::{Edge, NodeId};
use crate::error::{NetReduceError, Result};

/// Parallel combination of two resistances. An infinite (open) side is the
/// identity.
pub fn parallel_resistance(first: f64, second: f64) -> f64 {
    if first == f64::INFINITY {
        return second;
    }
    if second == f64::INFINITY {
        return first;
    }
    1.0 / (1.0 / first + 1.0 / second)
}

/// Fold two edges between the same node pair into one.
///
/// Each direction is combined independently. The result keeps the orientation
/// of `a`. Fails with [`NetReduceError::DegenerateMerge`] when the merged edge
/// is open in both directions.
pub fn parallel_merge(a: &Edge, b: &Edge) -> Result<Edge> {
    let b = b
        .oriented_from(a.from)
        .filter(|b| b.to == a.to)
        .ok_or_else(|| {
            NetReduceError::irreducible(format!(
                "parallel merge of edges on different pairs ({} / {})",
                a, b
            ))
        })?;

    let merged = Edge::raw(
        a.from,
        a.to,
        parallel_resistance(a.forward, b.forward),
        parallel_resistance(a.reverse, b.reverse),
    );
    if merged.is_open() {
        return Err(NetReduceError::DegenerateMerge {
            from: a.from,
            to: a.to,
        });
    }
    Ok(merged)
}

/// Collapse the chain `u - via - v` into a direct `u -> v` edge.
///
/// `left` and `right` must both touch `via`. Resistances add along the
/// direction of traversal:
///   forward = R(u -> via) + R(via -> v)
///   reverse = R(v -> via) + R(via -> u)
///
/// A sum beyond `f64::MAX` fails with [`NetReduceError::ResistanceOverflow`].
pub fn series_merge(left: &Edge, right: &Edge, via: NodeId) -> Result<Edge> {
    let into = left
        .oriented_to(via)
        .filter(|e| e.from != via)
        .ok_or_else(|| NetReduceError::irreducible(format!("{left} is not a series arm of {via}")))?;
    let out = right
        .oriented_from(via)
        .filter(|e| e.to != via)
        .ok_or_else(|| NetReduceError::irreducible(format!("{right} is not a series arm of {via}")))?;

    check_derived(Edge::raw(
        into.from,
        out.to,
        into.forward + out.forward,
        into.reverse + out.reverse,
    ))
}

/// Accept a derived edge only if both resistances are positive and finite.
///
/// Inputs are finite, so an infinite direction means a sum or quotient left
/// the `f64` range.
pub(crate) fn check_derived(edge: Edge) -> Result<Edge> {
    for (direction, value) in [("forward", edge.forward), ("reverse", edge.reverse)] {
        if value == f64::INFINITY {
            return Err(NetReduceError::ResistanceOverflow {
                from: edge.from,
                to: edge.to,
                direction,
            });
        }
        if !(value > 0.0 && value.is_finite()) {
            return Err(NetReduceError::irreducible(format!(
                "derived element {edge} has {direction} resistance {value}"
            )));
        }
    }
    Ok(edge)
}

/// Conductance of one directed mesh branch.
///
/// `g_source` is the conductance for current entering the center from the
/// source neighbor, `g_sink` for current leaving the center towards the sink
/// neighbor, and `shunt` the conductance of all remaining spokes.
fn mesh_conductance(g_source: f64, g_sink: f64, shunt: f64) -> f64 {
    // Divide before multiplying so tiny conductances do not underflow.
    g_source * (g_sink / (g_source + g_sink + shunt))
}

/// Eliminate `center` by replacing its star of `spokes` with a mesh.
///
/// For a direction-independent star this is the classical transform
/// `G_ij = G_i * G_j / sum(G_m)`. With direction-dependent spokes the mesh is
/// computed once per direction: the branch `v_i -> v_j` uses the conductance of
/// current entering the center from `v_i` and the conductance of current
/// leaving it towards `v_j`, while every other spoke contributes the mean of
/// its two conductances to the total. Two spokes therefore reproduce
/// [`series_merge`] exactly.
///
/// Spokes must lead to distinct neighbors. Fewer than two spokes yield no
/// edges. A branch beyond the `f64` range fails with
/// [`NetReduceError::ResistanceOverflow`].
pub fn star_mesh(center: NodeId, spokes: &[Edge]) -> Result<Vec<Edge>> {
    let spokes = spokes
        .iter()
        .map(|s| {
            s.oriented_from(center)
                .filter(|e| e.to != center)
                .ok_or_else(|| NetReduceError::irreducible(format!("{s} is not a spoke of {center}")))
        })
        .collect::<Result<Vec<_>>>()?;

    let k = spokes.len();
    if k < 2 {
        return Ok(Vec::new());
    }

    let g_out: Vec<f64> = spokes.iter().map(|s| 1.0 / s.forward).collect();
    let g_in: Vec<f64> = spokes.iter().map(|s| 1.0 / s.reverse).collect();
    let g_mean: Vec<f64> = g_in
        .iter()
        .zip(&g_out)
        .map(|(gi, go)| 0.5 * (gi + go))
        .collect();
    let total: f64 = g_mean.iter().sum();

    let mut mesh = Vec::with_capacity(k * (k - 1) / 2);
    for i in 0..k {
        for j in (i + 1)..k {
            let shunt = (total - g_mean[i] - g_mean[j]).max(0.0);
            let g_fwd = mesh_conductance(g_in[i], g_out[j], shunt);
            let g_rev = mesh_conductance(g_in[j], g_out[i], shunt);

            let edge = Edge::raw(spokes[i].to, spokes[j].to, 1.0 / g_fwd, 1.0 / g_rev);
            mesh.push(check_derived(edge)?);
        }
    }

    Ok(mesh)
}
