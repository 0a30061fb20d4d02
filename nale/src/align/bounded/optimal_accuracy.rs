//! Optimal-accuracy traceback: a greedy walk through the posterior matrix
//! picking, at each query row, the profile column with the highest combined
//! match/insert posterior, holding monotonic column order.
//!
//! This is the straightforward greedy walk the system calls for, not a
//! hardened maximum-expected-accuracy DP; it is not expected to cope well
//! with adversarial or highly ambiguous posterior matrices.

use super::structs::sparse_matrix::DpMatrixSparse;
use crate::structs::profile::NormalState;
use crate::structs::trace::{AlignState, Trace};

pub fn optimal_accuracy_bounded(posterior: &DpMatrixSparse, q_len: usize, t_len: usize) -> Trace {
    let mut trace = Trace::new(q_len, t_len);
    trace.push(AlignState::S, 0, 0);
    trace.push(AlignState::N, 0, 0);
    trace.push(AlignState::B, 0, 0);

    let mut last_t = 0i32;

    for q in 1..=q_len as i32 {
        let (r_b, r_e) = posterior.row_bounds(q);
        let mut best: Option<(i32, f32, AlignState)> = None;

        for bi in r_b..r_e {
            let bound = posterior.bound(bi);
            for t in bound.lb.max(last_t)..bound.rb {
                let p_m = posterior.get(NormalState::Match, q, t);
                let p_i = posterior.get(NormalState::Insert, q, t);
                let (score, state) = if p_m >= p_i {
                    (p_m, AlignState::M)
                } else {
                    (p_i, AlignState::I)
                };
                if best.map(|(_, s, _)| score > s).unwrap_or(true) {
                    best = Some((t, score, state));
                }
            }
        }

        if let Some((t, score, state)) = best {
            if score > 0.0 {
                trace.push(state, q as usize, t as usize);
                if state == AlignState::M {
                    last_t = t + 1;
                }
            }
        }
    }

    trace.push(AlignState::E, q_len, t_len);
    trace.push(AlignState::C, q_len, t_len);
    trace.push(AlignState::T, q_len, t_len);
    trace
}
