//! Antidiagonal pruned Forward/Backward cloud search (C4), anchored by a
//! Viterbi traceback's earliest/latest match cell.

use super::structs::bound::{Bound, Edgebounds, Mode};
use super::structs::cloud_matrix::CloudMatrixLinear;
use super::structs::params::CloudSearchParams;
use crate::logsum::logsum_all;
use crate::structs::profile::{NormalState, Profile, TransState};
use crate::structs::sequence::Sequence;
use crate::structs::trace::Trace;

#[inline]
fn residue_at(target: &Sequence, q: i32) -> u8 {
    target.digital[(q - 1) as usize]
}

/// `tsc(t-1, trans)`, or `-inf` when there is no node `t-1` (i.e. `t <= 0`).
#[inline]
fn prev_tsc(profile: &Profile, t: i32, trans: TransState) -> f32 {
    if t <= 0 {
        f32::NEG_INFINITY
    } else {
        profile.tsc((t - 1) as usize, trans)
    }
}

/// Narrows `[lb, rb)` to the cells on antidiagonal `d` that lie inside the
/// `Q x T` matrix, additionally intersected with the caller's current bound.
fn intersect_diag_range(d: i32, q_len: i32, t_len: i32, lb: i32, rb: i32) -> (i32, i32) {
    let k_min = lb.max(1).max(d - t_len);
    let k_max = (rb - 1).min(q_len).min(d - 1).max(k_min - 1);
    (k_min, k_max)
}

fn prune(
    diag_scores: &[f32],
    k_min: i32,
    total_max: &mut f32,
    params: &CloudSearchParams,
) -> Option<(i32, i32)> {
    let diag_max = diag_scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    *total_max = total_max.max(diag_max);
    let limit = *total_max - params.alpha;

    let mut new_lb = None;
    let mut new_rb = k_min;
    for (i, &score) in diag_scores.iter().enumerate() {
        if score >= limit {
            if new_lb.is_none() {
                new_lb = Some(k_min + i as i32);
            }
            new_rb = k_min + i as i32 + 1;
        }
    }
    new_lb.map(|lb| (lb, new_rb))
}

/// Forward cloud search from the earliest match cell of `trace` out to the
/// `(Q, T)` corner, pruning antidiagonals whose best score trails the
/// running maximum by more than `alpha` nats once `beta` antidiagonals have
/// passed. Returns a diag-mode [`Edgebounds`]; collapses (returns whatever
/// was found so far) if no cell on an antidiagonal clears the threshold.
pub fn cloud_search_forward(
    target: &Sequence,
    profile: &Profile,
    trace: &Trace,
    cloud_mx: &mut CloudMatrixLinear,
    params: CloudSearchParams,
) -> Edgebounds {
    let q_len = target.length as i32;
    let t_len = profile.length as i32;
    cloud_mx.reuse(q_len as usize, t_len as usize);

    let mut out = Edgebounds::new(Mode::Diag, q_len as usize, t_len as usize);

    let Some((q_s, t_s)) = trace.first_match() else {
        return out;
    };
    let q_s = (q_s as i32).clamp(1, q_len);
    let t_s = (t_s as i32).clamp(1, t_len);

    let mut lb = q_s;
    let mut rb = q_s + 1;
    let mut total_max = f32::NEG_INFINITY;
    let mut d_cnt = 0usize;

    for d in (q_s + t_s)..=(q_len + t_len) {
        let (k_min, k_max) = intersect_diag_range(d, q_len, t_len, lb, rb);
        if k_min > k_max {
            break;
        }

        let mut diag_scores = Vec::with_capacity((k_max - k_min + 1) as usize);
        for k in k_min..=k_max {
            let (q, t) = (k, d - k);
            let residue = residue_at(target, q);

            let m = profile.msc(t as usize, residue)
                + logsum_all(&[
                    cloud_mx.get(NormalState::Match, d - 2, k - 1)
                        + prev_tsc(profile, t, TransState::M2M),
                    cloud_mx.get(NormalState::Insert, d - 2, k - 1)
                        + prev_tsc(profile, t, TransState::I2M),
                    cloud_mx.get(NormalState::Delete, d - 2, k - 1)
                        + prev_tsc(profile, t, TransState::D2M),
                    profile.tsc(t as usize, TransState::B2M),
                ]);

            let ins = profile.isc(t as usize, residue)
                + logsum_all(&[
                    cloud_mx.get(NormalState::Match, d - 1, k - 1)
                        + profile.tsc(t as usize, TransState::M2I),
                    cloud_mx.get(NormalState::Insert, d - 1, k - 1)
                        + profile.tsc(t as usize, TransState::I2I),
                ]);

            let del = logsum_all(&[
                cloud_mx.get(NormalState::Match, d - 1, k) + prev_tsc(profile, t, TransState::M2D),
                cloud_mx.get(NormalState::Delete, d - 1, k) + prev_tsc(profile, t, TransState::D2D),
            ]);

            cloud_mx.set(NormalState::Match, d, k, m);
            cloud_mx.set(NormalState::Insert, d, k, ins);
            cloud_mx.set(NormalState::Delete, d, k, del);
            diag_scores.push(m.max(ins).max(del));
        }

        out.push(Bound::new(d, k_min, k_max + 1));
        d_cnt += 1;

        if !params.run_full && d_cnt > params.beta {
            match prune(&diag_scores, k_min, &mut total_max, &params) {
                Some((new_lb, new_rb)) => {
                    lb = new_lb;
                    rb = new_rb + 1;
                }
                None => break,
            }
        } else {
            lb = k_min;
            rb = k_max + 2;
        }
        if let Some(gamma) = params.gamma {
            rb = rb.min(lb + gamma);
        }

        if d >= 2 {
            cloud_mx.clear_row(d - 2);
        }
    }

    out.sort();
    out.index();
    out
}

/// Backward cloud search from the latest match cell of `trace` down to
/// antidiagonal 0, mirroring the forward recurrence's neighbor offsets.
pub fn cloud_search_backward(
    target: &Sequence,
    profile: &Profile,
    trace: &Trace,
    cloud_mx: &mut CloudMatrixLinear,
    params: CloudSearchParams,
) -> Edgebounds {
    let q_len = target.length as i32;
    let t_len = profile.length as i32;
    cloud_mx.reuse(q_len as usize, t_len as usize);

    let mut out = Edgebounds::new(Mode::Diag, q_len as usize, t_len as usize);

    let Some((q_e, t_e)) = trace.last_match() else {
        return out;
    };
    let q_e = (q_e as i32).clamp(1, q_len);
    let t_e = (t_e as i32).clamp(1, t_len);

    let mut lb = q_e;
    let mut rb = q_e + 1;
    let mut total_max = f32::NEG_INFINITY;
    let mut d_cnt = 0usize;

    for d in (0..=(q_e + t_e)).rev() {
        let k_min = lb.max(0).max(d - t_len);
        let k_max = (rb - 1).min(q_len).min(d);
        if k_min > k_max {
            break;
        }

        let mut diag_scores = Vec::with_capacity((k_max - k_min + 1) as usize);
        for k in k_min..=k_max {
            let (q, t) = (k, d - k);

            if t < 0 || t > t_len {
                diag_scores.push(f32::NEG_INFINITY);
                continue;
            }

            let (m, ins, del) = if q < q_len && t < t_len {
                let next_residue = residue_at(target, q + 1);
                let m_pred = cloud_mx.get(NormalState::Match, d + 2, k + 1);
                let i_pred = cloud_mx.get(NormalState::Insert, d + 1, k + 1);
                let d_pred = cloud_mx.get(NormalState::Delete, d + 1, k);

                let m = logsum_all(&[
                    profile.tsc(t as usize, TransState::M2M)
                        + profile.msc((t + 1) as usize, next_residue)
                        + m_pred,
                    profile.tsc(t as usize, TransState::M2I)
                        + profile.isc(t as usize, next_residue)
                        + i_pred,
                    profile.tsc(t as usize, TransState::M2D) + d_pred,
                ]);
                let ins = logsum_all(&[
                    profile.tsc(t as usize, TransState::I2M)
                        + profile.msc((t + 1) as usize, next_residue)
                        + m_pred,
                    profile.tsc(t as usize, TransState::I2I)
                        + profile.isc(t as usize, next_residue)
                        + i_pred,
                ]);
                let del = logsum_all(&[
                    profile.tsc(t as usize, TransState::D2M)
                        + profile.msc((t + 1) as usize, next_residue)
                        + m_pred,
                    profile.tsc(t as usize, TransState::D2D) + d_pred,
                ]);
                (m, ins, del)
            } else if t == t_len {
                (0.0, f32::NEG_INFINITY, 0.0)
            } else {
                (f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY)
            };

            cloud_mx.set(NormalState::Match, d, k, m);
            cloud_mx.set(NormalState::Insert, d, k, ins);
            cloud_mx.set(NormalState::Delete, d, k, del);
            diag_scores.push(m.max(ins).max(del));
        }

        out.push(Bound::new(d, k_min, k_max + 1));
        d_cnt += 1;

        if !params.run_full && d_cnt > params.beta {
            match prune(&diag_scores, k_min, &mut total_max, &params) {
                Some((new_lb, new_rb)) => {
                    lb = new_lb.max(0);
                    rb = new_rb + 1;
                }
                None => break,
            }
        } else {
            lb = (k_min - 1).max(0);
            rb = k_max + 1;
        }
        if let Some(gamma) = params.gamma {
            lb = lb.max(rb - gamma);
        }

        if d + 2 <= q_len + t_len {
            cloud_mx.clear_row(d + 2);
        }
    }

    out.sort();
    out.index();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::hmm::{HmmFile, NUM_TRANS_STATES};
    use crate::structs::profile::Profile;
    use crate::structs::sequence::NUM_AMINO;
    use crate::structs::trace::{AlignState, Trace};

    fn flat_profile(length: usize) -> Profile {
        let hmm = HmmFile {
            name: "t".into(),
            accession: "T".into(),
            length,
            is_local: true,
            match_scores: vec![[-1.0; NUM_AMINO]; length + 1],
            insert_scores: vec![[-2.0; NUM_AMINO]; length + 1],
            trans_scores: vec![[-0.5; NUM_TRANS_STATES]; length + 1],
            compo: [0.05; NUM_AMINO],
            consensus_sequence: vec![0u8; length + 1],
            tau: -5.0,
            lambda: 0.7,
        };
        let mut profile = Profile::new(&hmm);
        profile.configure_for_target_length(length);
        profile
    }

    fn anchor_trace(q: usize, t: usize) -> Trace {
        let mut trace = Trace::new(q, t);
        trace.push(AlignState::M, q, t);
        trace
    }

    #[test]
    fn forward_cloud_covers_the_anchor_cell() {
        crate::logsum::logsum_init();
        let profile = flat_profile(5);
        let target = Sequence::from_utf8(b"ACDEF").unwrap();
        let trace = anchor_trace(3, 3);
        let mut cloud_mx = CloudMatrixLinear::new(5, 5);

        let edg = cloud_search_forward(
            &target,
            &profile,
            &trace,
            &mut cloud_mx,
            CloudSearchParams::full(),
        );
        assert!(!edg.is_empty());
        assert!(edg.search(3, 3).is_some());
    }

    #[test]
    fn backward_cloud_covers_the_anchor_cell() {
        crate::logsum::logsum_init();
        let profile = flat_profile(5);
        let target = Sequence::from_utf8(b"ACDEF").unwrap();
        let trace = anchor_trace(3, 3);
        let mut cloud_mx = CloudMatrixLinear::new(5, 5);

        let edg = cloud_search_backward(
            &target,
            &profile,
            &trace,
            &mut cloud_mx,
            CloudSearchParams::full(),
        );
        assert!(!edg.is_empty());
        assert!(edg.search(3, 3).is_some());
    }

    #[test]
    fn collapsing_cloud_terminates_without_panicking() {
        crate::logsum::logsum_init();
        let profile = flat_profile(5);
        let target = Sequence::from_utf8(b"ACDEF").unwrap();
        let trace = anchor_trace(1, 1);
        let mut cloud_mx = CloudMatrixLinear::new(5, 5);

        let params = CloudSearchParams::new(0.01, 0, None);
        let _ = cloud_search_forward(&target, &profile, &trace, &mut cloud_mx, params);
    }
}
