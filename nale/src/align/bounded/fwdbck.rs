//! Bounded Forward, Backward, and Viterbi (C6): the shared row-sweep
//! skeleton of §4.6, executed only over a sparse support's covered cells.

use super::structs::sparse_matrix::DpMatrixSparse;
use super::structs::special_matrix::SpecialMatrix;
use crate::logsum::{logsum, logsum_all};
use crate::structs::profile::{NormalState, Profile, SpecialState, SpecialTrans, TransState};
use crate::structs::sequence::Sequence;

#[inline]
fn residue_at(target: &Sequence, q: i32) -> u8 {
    target.digital[(q - 1) as usize]
}

#[inline]
fn prev_tsc(profile: &Profile, t: i32, trans: TransState) -> f32 {
    if t <= 0 {
        f32::NEG_INFINITY
    } else {
        profile.tsc((t - 1) as usize, trans)
    }
}

/// Fills `sparse`'s M/I/D planes and `special`'s XMX row with the bounded
/// Forward recurrence, returning the final nat score `XMX[C,Q] + C->move`.
pub fn forward_bounded(
    target: &Sequence,
    profile: &Profile,
    sparse: &mut DpMatrixSparse,
    special: &mut SpecialMatrix,
) -> f32 {
    let q_len = target.length as i32;
    let t_len = profile.length as i32;

    special.set(SpecialState::N, 0, 0.0);
    special.set(SpecialState::B, 0, profile.xsc(SpecialState::N, SpecialTrans::Move));
    special.set(SpecialState::E, 0, f32::NEG_INFINITY);
    special.set(SpecialState::C, 0, f32::NEG_INFINITY);
    special.set(SpecialState::J, 0, f32::NEG_INFINITY);

    for q in 1..=q_len {
        let (r_b, r_e) = sparse.row_bounds(q);
        let residue = residue_at(target, q);
        let b_prev = special.get(SpecialState::B, q - 1);
        let mut e_score = f32::NEG_INFINITY;

        for bi in r_b..r_e {
            let bound = sparse.bound(bi);
            let (prv, cur, _nxt) = sparse.offsets(bi);

            let lo = bound.lb.max(1);
            let hi = (bound.rb - 1).min(t_len);
            for t in lo..=hi {
                let rel = t - bound.lb;

                let m = profile.msc(t as usize, residue)
                    + logsum_all(&[
                        sparse.get_at(prv, rel - 1, NormalState::Match)
                            + prev_tsc(profile, t, TransState::M2M),
                        sparse.get_at(prv, rel - 1, NormalState::Insert)
                            + prev_tsc(profile, t, TransState::I2M),
                        sparse.get_at(prv, rel - 1, NormalState::Delete)
                            + prev_tsc(profile, t, TransState::D2M),
                        b_prev + profile.tsc(t as usize, TransState::B2M),
                    ]);

                let ins = profile.isc(t as usize, residue)
                    + logsum_all(&[
                        sparse.get_at(prv, rel, NormalState::Match)
                            + profile.tsc(t as usize, TransState::M2I),
                        sparse.get_at(prv, rel, NormalState::Insert)
                            + profile.tsc(t as usize, TransState::I2I),
                    ]);

                let del = logsum_all(&[
                    sparse.get_at(cur, rel - 1, NormalState::Match)
                        + prev_tsc(profile, t, TransState::M2D),
                    sparse.get_at(cur, rel - 1, NormalState::Delete)
                        + prev_tsc(profile, t, TransState::D2D),
                ]);

                sparse.set_at(cur, rel, NormalState::Match, m);
                sparse.set_at(cur, rel, NormalState::Insert, ins);
                sparse.set_at(cur, rel, NormalState::Delete, del);

                e_score = logsum_all(&[e_score, m, del]);
            }
        }

        special.set(SpecialState::E, q, e_score);

        let j = logsum(
            special.get(SpecialState::J, q - 1) + profile.xsc(SpecialState::J, SpecialTrans::Loop),
            e_score + profile.xsc(SpecialState::E, SpecialTrans::Loop),
        );
        let c = logsum(
            special.get(SpecialState::C, q - 1) + profile.xsc(SpecialState::C, SpecialTrans::Loop),
            e_score + profile.xsc(SpecialState::E, SpecialTrans::Move),
        );
        let n = special.get(SpecialState::N, q - 1) + profile.xsc(SpecialState::N, SpecialTrans::Loop);
        let b = logsum(
            n + profile.xsc(SpecialState::N, SpecialTrans::Move),
            j + profile.xsc(SpecialState::J, SpecialTrans::Move),
        );

        special.set(SpecialState::J, q, j);
        special.set(SpecialState::C, q, c);
        special.set(SpecialState::N, q, n);
        special.set(SpecialState::B, q, b);
    }

    special.get(SpecialState::C, q_len) + profile.xsc(SpecialState::C, SpecialTrans::Move)
}

/// The Backward analogue: sweeps rows from `Q` down to `0`, with the
/// recurrence's neighbor offsets mirrored to `(q+1, t+1)`, `(q+1, t)`,
/// `(q, t+1)`.
pub fn backward_bounded(
    target: &Sequence,
    profile: &Profile,
    sparse: &mut DpMatrixSparse,
    special: &mut SpecialMatrix,
) -> f32 {
    let q_len = target.length as i32;
    let t_len = profile.length as i32;

    special.set(SpecialState::C, q_len, profile.xsc(SpecialState::C, SpecialTrans::Move));
    special.set(SpecialState::E, q_len, special.get(SpecialState::C, q_len) + profile.xsc(SpecialState::E, SpecialTrans::Move));
    special.set(SpecialState::J, q_len, f32::NEG_INFINITY);
    special.set(SpecialState::B, q_len, f32::NEG_INFINITY);
    special.set(SpecialState::N, q_len, f32::NEG_INFINITY);

    {
        let (r_b, r_e) = sparse.row_bounds(q_len);
        let e_score = special.get(SpecialState::E, q_len);
        for bi in r_b..r_e {
            let bound = sparse.bound(bi);
            let (_prv, cur, _nxt) = sparse.offsets(bi);
            for t in bound.lb.max(0)..bound.rb {
                let rel = t - bound.lb;
                sparse.set_at(cur, rel, NormalState::Match, e_score);
                sparse.set_at(cur, rel, NormalState::Delete, e_score);
                sparse.set_at(cur, rel, NormalState::Insert, f32::NEG_INFINITY);
            }
        }
    }

    for q in (0..q_len).rev() {
        let (r_b, r_e) = sparse.row_bounds(q);
        let (r_b_next, r_e_next) = sparse.row_bounds(q + 1);
        let next_residue = residue_at(target, q + 1);

        let mut b_score = f32::NEG_INFINITY;
        for bi in r_b_next..r_e_next {
            let bound = sparse.bound(bi);
            let (_prv, cur, _nxt) = sparse.offsets(bi);
            let lo = bound.lb.max(1);
            let hi = (bound.rb - 1).min(t_len);
            for t in lo..=hi {
                let rel = t - bound.lb;
                let m_next = sparse.get_at(cur, rel, NormalState::Match);
                b_score = logsum(
                    b_score,
                    m_next + profile.tsc(t as usize, TransState::B2M) + profile.msc(t as usize, next_residue),
                );
            }
        }

        for bi in r_b..r_e {
            let bound = sparse.bound(bi);
            let (_prv, cur, nxt) = sparse.offsets(bi);

            let lo = bound.lb.max(1);
            let hi = (bound.rb - 1).min(t_len);
            for t in lo..=hi {
                let rel = t - bound.lb;

                let (m, ins, del) = if q < q_len && t < t_len {
                    let m_pred = sparse.get_at(nxt, rel + 1, NormalState::Match);
                    let i_pred = sparse.get_at(nxt, rel + 1, NormalState::Insert);
                    let d_pred = sparse.get_at(cur, rel + 1, NormalState::Delete);

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
                } else {
                    (
                        special.get(SpecialState::E, q) + profile.xsc(SpecialState::E, SpecialTrans::Loop),
                        f32::NEG_INFINITY,
                        special.get(SpecialState::E, q) + profile.xsc(SpecialState::E, SpecialTrans::Loop),
                    )
                };

                sparse.set_at(cur, rel, NormalState::Match, m);
                sparse.set_at(cur, rel, NormalState::Insert, ins);
                sparse.set_at(cur, rel, NormalState::Delete, del);
            }
        }

        let j = special.get(SpecialState::J, q + 1) + profile.xsc(SpecialState::J, SpecialTrans::Loop);
        let e_score = logsum(
            j + profile.xsc(SpecialState::E, SpecialTrans::Loop),
            special.get(SpecialState::C, q_len.min(q + 1)) + profile.xsc(SpecialState::E, SpecialTrans::Move),
        );
        let n = logsum(
            special.get(SpecialState::N, q + 1) + profile.xsc(SpecialState::N, SpecialTrans::Loop),
            b_score + profile.xsc(SpecialState::N, SpecialTrans::Move),
        );

        special.set(SpecialState::B, q, b_score);
        special.set(SpecialState::J, q, j);
        special.set(SpecialState::E, q, e_score);
        special.set(SpecialState::N, q, n);
        special.set(SpecialState::C, q, f32::NEG_INFINITY);
    }

    special.get(SpecialState::N, 0)
}

/// The Viterbi analogue of [`forward_bounded`]: substitutes `max` for
/// `logsum` and records no back-pointers. Used only to validate full-cloud
/// parity against the dense reference implementation in tests; the real
/// anchor pass is the dense quad-space Viterbi in
/// [`crate::align::quad::viterbi`].
pub fn viterbi_bounded(
    target: &Sequence,
    profile: &Profile,
    sparse: &mut DpMatrixSparse,
    special: &mut SpecialMatrix,
) -> f32 {
    let q_len = target.length as i32;

    special.set(SpecialState::N, 0, 0.0);
    special.set(SpecialState::B, 0, profile.xsc(SpecialState::N, SpecialTrans::Move));
    special.set(SpecialState::E, 0, f32::NEG_INFINITY);
    special.set(SpecialState::C, 0, f32::NEG_INFINITY);
    special.set(SpecialState::J, 0, f32::NEG_INFINITY);

    for q in 1..=q_len {
        let (r_b, r_e) = sparse.row_bounds(q);
        let residue = residue_at(target, q);
        let b_prev = special.get(SpecialState::B, q - 1);
        let mut e_score = f32::NEG_INFINITY;

        for bi in r_b..r_e {
            let bound = sparse.bound(bi);
            let (prv, cur, _nxt) = sparse.offsets(bi);
            let lo = bound.lb.max(1);
            let hi = (bound.rb - 1).min(profile.length as i32);

            for t in lo..=hi {
                let rel = t - bound.lb;

                let m = profile.msc(t as usize, residue)
                    + [
                        sparse.get_at(prv, rel - 1, NormalState::Match)
                            + prev_tsc(profile, t, TransState::M2M),
                        sparse.get_at(prv, rel - 1, NormalState::Insert)
                            + prev_tsc(profile, t, TransState::I2M),
                        sparse.get_at(prv, rel - 1, NormalState::Delete)
                            + prev_tsc(profile, t, TransState::D2M),
                        b_prev + profile.tsc(t as usize, TransState::B2M),
                    ]
                    .into_iter()
                    .fold(f32::NEG_INFINITY, f32::max);

                let ins = profile.isc(t as usize, residue)
                    + [
                        sparse.get_at(prv, rel, NormalState::Match)
                            + profile.tsc(t as usize, TransState::M2I),
                        sparse.get_at(prv, rel, NormalState::Insert)
                            + profile.tsc(t as usize, TransState::I2I),
                    ]
                    .into_iter()
                    .fold(f32::NEG_INFINITY, f32::max);

                let del = [
                    sparse.get_at(cur, rel - 1, NormalState::Match)
                        + prev_tsc(profile, t, TransState::M2D),
                    sparse.get_at(cur, rel - 1, NormalState::Delete)
                        + prev_tsc(profile, t, TransState::D2D),
                ]
                .into_iter()
                .fold(f32::NEG_INFINITY, f32::max);

                sparse.set_at(cur, rel, NormalState::Match, m);
                sparse.set_at(cur, rel, NormalState::Insert, ins);
                sparse.set_at(cur, rel, NormalState::Delete, del);

                e_score = e_score.max(m).max(del);
            }
        }

        special.set(SpecialState::E, q, e_score);
        let j = (special.get(SpecialState::J, q - 1) + profile.xsc(SpecialState::J, SpecialTrans::Loop))
            .max(e_score + profile.xsc(SpecialState::E, SpecialTrans::Loop));
        let c = (special.get(SpecialState::C, q - 1) + profile.xsc(SpecialState::C, SpecialTrans::Loop))
            .max(e_score + profile.xsc(SpecialState::E, SpecialTrans::Move));
        let n = special.get(SpecialState::N, q - 1) + profile.xsc(SpecialState::N, SpecialTrans::Loop);
        let b = (n + profile.xsc(SpecialState::N, SpecialTrans::Move))
            .max(j + profile.xsc(SpecialState::J, SpecialTrans::Move));

        special.set(SpecialState::J, q, j);
        special.set(SpecialState::C, q, c);
        special.set(SpecialState::N, q, n);
        special.set(SpecialState::B, q, b);
    }

    special.get(SpecialState::C, q_len) + profile.xsc(SpecialState::C, SpecialTrans::Move)
}
