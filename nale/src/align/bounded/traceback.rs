//! Viterbi traceback (§4.6): walks backward from the `T` state, at each step
//! picking whichever predecessor's score-plus-transition reproduces the
//! current cell's score within tolerance. No back-pointers are stored
//! during the fill; consistency is checked against the already-filled
//! matrix instead.

use super::structs::sparse_matrix::DpMatrixSparse;
use super::structs::special_matrix::SpecialMatrix;
use crate::error::NaleError;
use crate::structs::profile::{NormalState, Profile, SpecialState, SpecialTrans, TransState};
use crate::structs::sequence::Sequence;
use crate::structs::trace::{AlignState, Trace};

const TOLERANCE: f32 = 1e-5;

#[inline]
fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < TOLERANCE
}

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

/// Reconstructs the Viterbi traceback from a sparse matrix and special-state
/// array already filled by [`super::fwdbck::viterbi_bounded`].
pub fn traceback_bounded(
    target: &Sequence,
    profile: &Profile,
    sparse: &DpMatrixSparse,
    special: &SpecialMatrix,
) -> anyhow::Result<Trace> {
    let q_len = target.length as i32;
    let t_len = profile.length as i32;
    let mut trace = Trace::new(target.length, profile.length);

    trace.push(AlignState::T, q_len as usize, t_len as usize);
    trace.push(AlignState::C, q_len as usize, t_len as usize);

    let mut q = q_len;
    let mut state = AlignState::C;

    loop {
        match state {
            AlignState::C => {
                let cur = special.get(SpecialState::C, q);
                if q > 0
                    && close(
                        cur,
                        special.get(SpecialState::C, q - 1) + profile.xsc(SpecialState::C, SpecialTrans::Loop),
                    )
                {
                    q -= 1;
                    trace.push(AlignState::C, q as usize, 0);
                } else if close(
                    cur,
                    special.get(SpecialState::E, q) + profile.xsc(SpecialState::E, SpecialTrans::Move),
                ) {
                    state = AlignState::E;
                    trace.push(AlignState::E, q as usize, 0);
                } else {
                    return Err(NaleError::MatrixInconsistent {
                        q: q as usize,
                        t: 0,
                    }
                    .into());
                }
            }
            AlignState::E => {
                let e = special.get(SpecialState::E, q);
                let (r_b, r_e) = sparse.row_bounds(q);
                let mut found = None;
                'search: for bi in r_b..r_e {
                    let bound = sparse.bound(bi);
                    for t in bound.lb..bound.rb {
                        if close(e, sparse.get(NormalState::Match, q, t)) {
                            found = Some((t, AlignState::M));
                            break 'search;
                        }
                        if close(e, sparse.get(NormalState::Delete, q, t)) {
                            found = Some((t, AlignState::D));
                            break 'search;
                        }
                    }
                }
                match found {
                    Some((t, entry_state)) => {
                        trace.push(entry_state, q as usize, t as usize);
                        state = entry_state;
                        // loop continues with the same (q, t) target resolved below
                        return continue_from_normal(
                            target, profile, sparse, special, &mut trace, q, t, entry_state,
                        );
                    }
                    None => {
                        return Err(NaleError::MatrixInconsistent {
                            q: q as usize,
                            t: 0,
                        }
                        .into())
                    }
                }
            }
            _ => unreachable!("C and E are the only states visited before entering the normal walk"),
        }

        if q == 0 {
            break;
        }
    }

    trace.push(AlignState::N, 0, 0);
    trace.push(AlignState::S, 0, 0);
    trace.reverse();
    Ok(trace)
}

/// Continues the traceback once it has entered the M/I/D grid at `(q, t)`,
/// walking predecessors until it returns to the `B` state, then resumes the
/// special-state walk (N, S) to finish.
fn continue_from_normal(
    target: &Sequence,
    profile: &Profile,
    sparse: &DpMatrixSparse,
    special: &SpecialMatrix,
    trace: &mut Trace,
    mut q: i32,
    mut t: i32,
    mut state: AlignState,
) -> anyhow::Result<Trace> {
    loop {
        match state {
            AlignState::M => {
                let cur = sparse.get(NormalState::Match, q, t);
                let residue = residue_at(target, q);
                let msc = profile.msc(t as usize, residue);
                let b_prev = special.get(SpecialState::B, q - 1);

                if close(cur, msc + b_prev + profile.tsc(t as usize, TransState::B2M)) {
                    trace.push(AlignState::B, (q - 1) as usize, 0);
                    q -= 1;
                    state = AlignState::N;
                    break;
                } else if close(
                    cur,
                    msc + sparse.get(NormalState::Match, q - 1, t - 1)
                        + prev_tsc(profile, t, TransState::M2M),
                ) {
                    q -= 1;
                    t -= 1;
                    trace.push(AlignState::M, q as usize, t as usize);
                } else if close(
                    cur,
                    msc + sparse.get(NormalState::Insert, q - 1, t - 1)
                        + prev_tsc(profile, t, TransState::I2M),
                ) {
                    q -= 1;
                    t -= 1;
                    trace.push(AlignState::I, q as usize, t as usize);
                    state = AlignState::I;
                } else if close(
                    cur,
                    msc + sparse.get(NormalState::Delete, q - 1, t - 1)
                        + prev_tsc(profile, t, TransState::D2M),
                ) {
                    q -= 1;
                    t -= 1;
                    trace.push(AlignState::D, q as usize, t as usize);
                    state = AlignState::D;
                } else {
                    return Err(NaleError::MatrixInconsistent {
                        q: q as usize,
                        t: t as usize,
                    }
                    .into());
                }
            }
            AlignState::I => {
                let cur = sparse.get(NormalState::Insert, q, t);
                let residue = residue_at(target, q);
                let isc = profile.isc(t as usize, residue);

                if close(
                    cur,
                    isc + sparse.get(NormalState::Match, q - 1, t) + profile.tsc(t as usize, TransState::M2I),
                ) {
                    q -= 1;
                    trace.push(AlignState::M, q as usize, t as usize);
                    state = AlignState::M;
                } else if close(
                    cur,
                    isc + sparse.get(NormalState::Insert, q - 1, t) + profile.tsc(t as usize, TransState::I2I),
                ) {
                    q -= 1;
                    trace.push(AlignState::I, q as usize, t as usize);
                } else {
                    return Err(NaleError::MatrixInconsistent {
                        q: q as usize,
                        t: t as usize,
                    }
                    .into());
                }
            }
            AlignState::D => {
                let cur = sparse.get(NormalState::Delete, q, t);

                if close(
                    cur,
                    sparse.get(NormalState::Match, q, t - 1) + prev_tsc(profile, t, TransState::M2D),
                ) {
                    t -= 1;
                    trace.push(AlignState::M, q as usize, t as usize);
                    state = AlignState::M;
                } else if close(
                    cur,
                    sparse.get(NormalState::Delete, q, t - 1) + prev_tsc(profile, t, TransState::D2D),
                ) {
                    t -= 1;
                    trace.push(AlignState::D, q as usize, t as usize);
                } else {
                    return Err(NaleError::MatrixInconsistent {
                        q: q as usize,
                        t: t as usize,
                    }
                    .into());
                }
            }
            _ => break,
        }
    }

    // `q` now sits on the row the B state occupies; walk the N prefix back
    // to row 0 inclusive, one step per residue N consumed.
    while q > 0 {
        trace.push(AlignState::N, q as usize, 0);
        q -= 1;
    }
    trace.push(AlignState::N, 0, 0);
    trace.push(AlignState::S, 0, 0);
    trace.reverse();
    Ok(trace.clone())
}
