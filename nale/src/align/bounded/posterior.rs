//! Posterior decoding and the Null1/Null2 background scores (C7).

use super::structs::bound::Edgebounds;
use super::structs::sparse_matrix::DpMatrixSparse;
use crate::structs::profile::{NormalState, Profile};
use crate::structs::sequence::Sequence;

const OMEGA: f32 = 1.0 / 256.0;

/// Fills `posterior`'s M/I planes with `exp(F + B - score_fwd)` at every
/// cell the forward and backward sparse matrices both cover; D-state
/// posteriors are left at zero (the delete state never emits, so its
/// posterior never enters the composition-bias sum).
pub fn posterior_bounded(
    forward: &DpMatrixSparse,
    backward: &DpMatrixSparse,
    score_fwd: f32,
    posterior: &mut DpMatrixSparse,
) {
    let edg = forward.edg_inner().clone();
    posterior.reshape(&edg);

    for bound in edg.bounds() {
        for t in bound.lb..bound.rb {
            for state in [NormalState::Match, NormalState::Insert] {
                let f = forward.get(state, bound.id, t);
                let b = backward.get(state, bound.id, t);
                let p = (f + b - score_fwd).exp();
                posterior.set(state, bound.id, t, p);
            }
        }
    }
}

/// HMMER's single-state random sequence (null) model score, in nats, for a
/// target of length `length`.
pub fn null1_score(length: usize) -> f32 {
    let l = length.max(1) as f32;
    let p1 = l / (l + 1.0);
    l * p1.ln() + (1.0 - p1).ln()
}

/// Expected model-induced residue-composition bias over the cloud's
/// covered query positions: for each query row, accumulates the
/// posterior-weighted emission score the model would expect from an
/// average-composition background, then folds it through `log(1 + omega *
/// null2[a])` and sums over rows.
pub fn null2_score(
    posterior: &DpMatrixSparse,
    profile: &Profile,
    target: &Sequence,
    row_bounds: &Edgebounds,
) -> f32 {
    let mut null2 = [0f32; crate::structs::sequence::NUM_AMINO];

    for bound in row_bounds.bounds() {
        let q = bound.id;
        if q < 1 || q as usize > target.length {
            continue;
        }
        let residue = target.digital[(q - 1) as usize] as usize;
        if residue >= null2.len() {
            continue;
        }
        for t in bound.lb.max(1)..bound.rb.min(profile.length as i32 + 1) {
            let p_m = posterior.get(NormalState::Match, q, t);
            let p_i = posterior.get(NormalState::Insert, q, t);
            null2[residue] += p_m * profile.msc(t as usize, residue as u8).exp()
                + p_i * profile.isc(t as usize, residue as u8).exp();
        }
    }

    let mut seq_bias = 0f32;
    for bound in row_bounds.bounds() {
        let q = bound.id;
        if q < 1 || q as usize > target.length {
            continue;
        }
        let residue = target.digital[(q - 1) as usize] as usize;
        if residue >= null2.len() {
            continue;
        }
        seq_bias += (1.0 + OMEGA * null2[residue]).ln();
    }
    seq_bias
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null1_score_matches_closed_form() {
        let l = 100usize;
        let score = null1_score(l);
        let p1 = 100.0f32 / 101.0;
        let expected = 100.0 * p1.ln() + (1.0 - p1).ln();
        assert!((score - expected).abs() < 1e-5);
    }

    #[test]
    fn null1_score_is_finite_for_length_one() {
        assert!(null1_score(1).is_finite());
    }
}
