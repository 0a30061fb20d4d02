//! Quad-space Viterbi anchor pass (C8): a small dense three-state Viterbi
//! run once per (query, target) pair purely to recover an anchor M-state
//! pair for cloud search. The matrix is small enough that explicit
//! back-pointers, recorded at fill time, are simpler than the sparse
//! Viterbi's reconstruct-by-consistency-check traceback.

use crate::align::bounded::Seed;
use crate::structs::dp_matrix::DpMatrixFlat;
use crate::structs::profile::{NormalState, Profile, SpecialState, SpecialTrans, TransState};
use crate::structs::sequence::Sequence;
use crate::structs::trace::{AlignState, Trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ptr {
    None,
    B,
    M,
    I,
    D,
}

#[inline]
fn prev_tsc(profile: &Profile, t: usize, trans: TransState) -> f32 {
    if t == 0 {
        f32::NEG_INFINITY
    } else {
        profile.tsc(t - 1, trans)
    }
}

#[inline]
fn best(cands: [(f32, Ptr); 2]) -> (f32, Ptr) {
    if cands[0].0 >= cands[1].0 {
        cands[0]
    } else {
        cands[1]
    }
}

/// The query/profile sub-rectangle the anchor pass runs over, in 1-indexed
/// inclusive coordinates. Widened one residue past the seed's own window so
/// the local alignment has room to settle before the seed's boundary.
struct Window {
    q_lo: usize,
    q_hi: usize,
    t_lo: usize,
    t_hi: usize,
}

impl Window {
    fn full(q_len: usize, t_len: usize) -> Window {
        Window {
            q_lo: 1,
            q_hi: q_len.max(1),
            t_lo: 1,
            t_hi: t_len.max(1),
        }
    }

    fn from_seed(seed: &Seed, q_len: usize, t_len: usize) -> Window {
        Window {
            q_lo: seed.target_start.saturating_sub(1).max(1),
            q_hi: (seed.target_end + 1).min(q_len.max(1)),
            t_lo: seed.profile_start.saturating_sub(1).max(1),
            t_hi: (seed.profile_end + 1).min(t_len.max(1)),
        }
    }
}

/// Per-row special-state traceback: which cell fed `E`, and whether this
/// row's `C` came from `E` (ending a domain here) or from `C`'s own
/// self-loop. The traceback below follows only the `C -> E -> ... -> B ->
/// N` chain: it does not reconstruct a `J`-mediated multi-domain path, matching
/// this system's single-domain scoring. An optimal Viterbi path that loops
/// through `J` would make this anchor's earliest match slightly too late,
/// which only costs cloud search some search width, not correctness.
#[derive(Debug, Clone, Copy)]
struct RowPtr {
    e_t: usize,
    e_state: NormalState,
    c_from_e: bool,
}

/// Runs the dense Viterbi anchor pass, optionally restricted to `seed`'s
/// window, and returns the traceback. Only [`Trace::first_match`] and
/// [`Trace::last_match`] are meaningful to callers; the score itself is
/// discarded.
pub fn quad_viterbi(target: &Sequence, profile: &Profile, seed: Option<&Seed>) -> Trace {
    let q_len = target.length;
    let t_len = profile.length;
    let window = match seed {
        Some(s) => Window::from_seed(s, q_len, t_len),
        None => Window::full(q_len, t_len),
    };

    let wq = if window.q_hi >= window.q_lo { window.q_hi - window.q_lo + 1 } else { 0 };
    let wt = if window.t_hi >= window.t_lo { window.t_hi - window.t_lo + 1 } else { 0 };

    let mut trace = Trace::new(q_len, t_len);
    if wq == 0 || wt == 0 {
        return trace;
    }

    let mut mx = DpMatrixFlat::new(wq, wt);
    let mut ptr = vec![[Ptr::None; 3]; (wq + 1) * (wt + 1)];
    let mut rows = vec![
        RowPtr {
            e_t: 0,
            e_state: NormalState::Match,
            c_from_e: false,
        };
        wq + 1
    ];

    let cell = |q: usize, t: usize| q * (wt + 1) + t;

    mx.set_special(SpecialState::N, 0, 0.0);
    mx.set_special(SpecialState::B, 0, profile.xsc(SpecialState::N, SpecialTrans::Move));
    mx.set_special(SpecialState::E, 0, f32::NEG_INFINITY);
    mx.set_special(SpecialState::C, 0, f32::NEG_INFINITY);
    mx.set_special(SpecialState::J, 0, f32::NEG_INFINITY);

    for wi in 1..=wq {
        let q = window.q_lo + wi - 1;
        let residue = target.digital[q - 1];
        let b_prev = mx.get_special(SpecialState::B, wi - 1);

        let mut e_score = f32::NEG_INFINITY;
        let mut e_t = 0usize;
        let mut e_state = NormalState::Match;

        for wj in 1..=wt {
            let t = window.t_lo + wj - 1;

            let cands_m = [
                (
                    mx.get(NormalState::Match, wi - 1, wj - 1) + prev_tsc(profile, t, TransState::M2M),
                    Ptr::M,
                ),
                (
                    mx.get(NormalState::Insert, wi - 1, wj - 1) + prev_tsc(profile, t, TransState::I2M),
                    Ptr::I,
                ),
            ];
            let (m_src_a, m_ptr_a) = best(cands_m);
            let cands_m2 = [
                (
                    mx.get(NormalState::Delete, wi - 1, wj - 1) + prev_tsc(profile, t, TransState::D2M),
                    Ptr::D,
                ),
                (b_prev + profile.tsc(t, TransState::B2M), Ptr::B),
            ];
            let (m_src_b, m_ptr_b) = best(cands_m2);
            let (m_src, m_ptr) = if m_src_a >= m_src_b {
                (m_src_a, m_ptr_a)
            } else {
                (m_src_b, m_ptr_b)
            };
            let m = profile.msc(t, residue) + m_src;

            let cands_i = [
                (
                    mx.get(NormalState::Match, wi - 1, wj) + profile.tsc(t, TransState::M2I),
                    Ptr::M,
                ),
                (
                    mx.get(NormalState::Insert, wi - 1, wj) + profile.tsc(t, TransState::I2I),
                    Ptr::I,
                ),
            ];
            let (i_src, i_ptr) = best(cands_i);
            let ins = profile.isc(t, residue) + i_src;

            let cands_d = [
                (
                    mx.get(NormalState::Match, wi, wj - 1) + prev_tsc(profile, t, TransState::M2D),
                    Ptr::M,
                ),
                (
                    mx.get(NormalState::Delete, wi, wj - 1) + prev_tsc(profile, t, TransState::D2D),
                    Ptr::D,
                ),
            ];
            let (del, d_ptr) = best(cands_d);

            mx.set(NormalState::Match, wi, wj, m);
            mx.set(NormalState::Insert, wi, wj, ins);
            mx.set(NormalState::Delete, wi, wj, del);
            ptr[cell(wi, wj)] = [m_ptr, i_ptr, d_ptr];

            if m > e_score {
                e_score = m;
                e_t = wj;
                e_state = NormalState::Match;
            }
            if del > e_score {
                e_score = del;
                e_t = wj;
                e_state = NormalState::Delete;
            }
        }

        let j = (mx.get_special(SpecialState::J, wi - 1) + profile.xsc(SpecialState::J, SpecialTrans::Loop))
            .max(e_score + profile.xsc(SpecialState::E, SpecialTrans::Loop));

        let c_loop = mx.get_special(SpecialState::C, wi - 1) + profile.xsc(SpecialState::C, SpecialTrans::Loop);
        let c_move = e_score + profile.xsc(SpecialState::E, SpecialTrans::Move);
        let (c, c_from_e) = if c_move > c_loop { (c_move, true) } else { (c_loop, false) };

        let n = mx.get_special(SpecialState::N, wi - 1) + profile.xsc(SpecialState::N, SpecialTrans::Loop);
        let b = (n + profile.xsc(SpecialState::N, SpecialTrans::Move))
            .max(j + profile.xsc(SpecialState::J, SpecialTrans::Move));

        mx.set_special(SpecialState::E, wi, e_score);
        mx.set_special(SpecialState::J, wi, j);
        mx.set_special(SpecialState::C, wi, c);
        mx.set_special(SpecialState::N, wi, n);
        mx.set_special(SpecialState::B, wi, b);

        rows[wi] = RowPtr {
            e_t,
            e_state,
            c_from_e,
        };
    }

    // Traceback, building steps in end-to-start order and flipping at the end.
    let to_global_q = |wi: usize| window.q_lo + wi - 1;
    let to_global_t = |wj: usize| window.t_lo + wj - 1;

    trace.push(AlignState::T, q_len, t_len);
    trace.push(AlignState::C, q_len, t_len);

    let mut wi = wq;
    loop {
        if wi == 0 {
            break;
        }
        let row = rows[wi];
        if row.c_from_e {
            trace.push(AlignState::E, to_global_q(wi), 0);
            let mut wj = row.e_t;
            let mut state = row.e_state;
            loop {
                match state {
                    NormalState::Match => {
                        trace.push(AlignState::M, to_global_q(wi), to_global_t(wj));
                        match ptr[cell(wi, wj)][0] {
                            Ptr::B => {
                                trace.push(AlignState::B, to_global_q(wi - 1), 0);
                                wi -= 1;
                                break;
                            }
                            Ptr::M => {
                                wi -= 1;
                                wj -= 1;
                                state = NormalState::Match;
                            }
                            Ptr::I => {
                                wi -= 1;
                                wj -= 1;
                                state = NormalState::Insert;
                            }
                            Ptr::D => {
                                wi -= 1;
                                wj -= 1;
                                state = NormalState::Delete;
                            }
                            Ptr::None => break,
                        }
                    }
                    NormalState::Insert => {
                        trace.push(AlignState::I, to_global_q(wi), to_global_t(wj));
                        match ptr[cell(wi, wj)][1] {
                            Ptr::M => {
                                wi -= 1;
                                state = NormalState::Match;
                            }
                            Ptr::I => {
                                wi -= 1;
                                state = NormalState::Insert;
                            }
                            _ => break,
                        }
                    }
                    NormalState::Delete => {
                        trace.push(AlignState::D, to_global_q(wi), to_global_t(wj));
                        match ptr[cell(wi, wj)][2] {
                            Ptr::M => {
                                wj -= 1;
                                state = NormalState::Match;
                            }
                            Ptr::D => {
                                wj -= 1;
                                state = NormalState::Delete;
                            }
                            _ => break,
                        }
                    }
                }
            }
            // Resume the N-state walk back to row 0, then fall through below.
            while wi > 0 {
                trace.push(AlignState::N, to_global_q(wi), 0);
                wi -= 1;
            }
            break;
        } else {
            wi -= 1;
            trace.push(AlignState::C, to_global_q(wi), 0);
        }
    }

    trace.push(AlignState::N, 0, 0);
    trace.push(AlignState::S, 0, 0);
    trace.reverse();
    trace
}
