//! Shared fixtures for the integration tests: a small discriminative profile
//! builder, an independent dense reference Forward, and the glue that wires
//! the anchor/cloud-search/merge/bounded-DP stages into one pipeline call.

use nale::align::bounded::{
    cloud_search_backward, cloud_search_forward, forward_bounded, backward_bounded,
    CloudBoundGroup, CloudMatrixLinear, CloudSearchParams, DpMatrixSparse, Edgebounds,
    RowBounds, SpecialMatrix,
};
use nale::align::quad::quad_viterbi;
use nale::logsum::{logsum, logsum_all, logsum_init};
use nale::structs::dp_matrix::DpMatrixFlat;
use nale::structs::hmm::{HmmFile, NUM_TRANS_STATES};
use nale::structs::profile::{NormalState, Profile, SpecialState, SpecialTrans, TransState};
use nale::structs::sequence::{Sequence, NUM_AMINO};

const MATCH_HIT: f32 = 2.0;
const MATCH_MISS: f32 = -2.0;
const INSERT_SC: f32 = -3.0;
const M2M: f32 = -0.1;
const M2X: f32 = -3.0;
const LOOPY: f32 = -0.5;

/// Builds a profile of length `consensus.len()` whose match emission favors
/// `consensus[k-1]` at node `k` and penalizes every other residue, with
/// generous (non-`-inf`) transition scores so full-matrix Forward/Backward
/// runs never collapse to `-inf` on this fixture.
pub fn build_profile(consensus: &[u8]) -> Profile {
    logsum_init();
    let length = consensus.len();
    let mut match_scores = vec![[MATCH_MISS; NUM_AMINO]; length + 1];
    let mut consensus_sequence = vec![0u8; length + 1];
    for (k, &residue) in consensus.iter().enumerate() {
        let digit = nale::structs::sequence::digitize_residue(residue) as usize;
        if digit < NUM_AMINO {
            match_scores[k + 1][digit] = MATCH_HIT;
        }
        consensus_sequence[k + 1] = residue;
    }

    let trans_row = {
        let mut row = [LOOPY; NUM_TRANS_STATES];
        row[TransState::M2M as usize] = M2M;
        row[TransState::M2I as usize] = M2X;
        row[TransState::M2D as usize] = M2X;
        row
    };

    let hmm = HmmFile {
        name: "fixture".into(),
        accession: "FIX01".into(),
        length,
        is_local: true,
        match_scores,
        insert_scores: vec![[INSERT_SC; NUM_AMINO]; length + 1],
        trans_scores: vec![trans_row; length + 1],
        compo: [0.05; NUM_AMINO],
        consensus_sequence,
        tau: -5.0,
        lambda: 0.7,
    };
    let mut profile = Profile::new(&hmm);
    profile.configure_for_target_length(length);
    profile
}

pub fn seq(residues: &[u8]) -> Sequence {
    Sequence::from_utf8(residues).unwrap()
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

/// A plain dense Forward, independent of [`DpMatrixSparse`]'s offset
/// machinery: every `(q, t)` cell is visited directly, with no sparsity and
/// no bound bookkeeping. Used as the ground truth full-cloud parity is
/// checked against.
pub fn dense_reference_forward(target: &Sequence, profile: &Profile) -> f32 {
    let q_len = target.length as i32;
    let t_len = profile.length as i32;
    let mut mx = DpMatrixFlat::new(q_len as usize, t_len as usize);

    mx.set_special(SpecialState::N, 0, 0.0);
    mx.set_special(SpecialState::B, 0, profile.xsc(SpecialState::N, SpecialTrans::Move));
    mx.set_special(SpecialState::E, 0, f32::NEG_INFINITY);
    mx.set_special(SpecialState::C, 0, f32::NEG_INFINITY);
    mx.set_special(SpecialState::J, 0, f32::NEG_INFINITY);

    for q in 1..=q_len {
        let residue = residue_at(target, q);
        let b_prev = mx.get_special(SpecialState::B, (q - 1) as usize);
        let mut e_score = f32::NEG_INFINITY;

        for t in 1..=t_len {
            let m = profile.msc(t as usize, residue)
                + logsum_all(&[
                    mx.get(NormalState::Match, (q - 1) as usize, (t - 1) as usize)
                        + prev_tsc(profile, t, TransState::M2M),
                    mx.get(NormalState::Insert, (q - 1) as usize, (t - 1) as usize)
                        + prev_tsc(profile, t, TransState::I2M),
                    mx.get(NormalState::Delete, (q - 1) as usize, (t - 1) as usize)
                        + prev_tsc(profile, t, TransState::D2M),
                    b_prev + profile.tsc(t as usize, TransState::B2M),
                ]);

            let ins = profile.isc(t as usize, residue)
                + logsum_all(&[
                    mx.get(NormalState::Match, (q - 1) as usize, t as usize)
                        + profile.tsc(t as usize, TransState::M2I),
                    mx.get(NormalState::Insert, (q - 1) as usize, t as usize)
                        + profile.tsc(t as usize, TransState::I2I),
                ]);

            let del = logsum_all(&[
                mx.get(NormalState::Match, q as usize, (t - 1) as usize)
                    + prev_tsc(profile, t, TransState::M2D),
                mx.get(NormalState::Delete, q as usize, (t - 1) as usize)
                    + prev_tsc(profile, t, TransState::D2D),
            ]);

            mx.set(NormalState::Match, q as usize, t as usize, m);
            mx.set(NormalState::Insert, q as usize, t as usize, ins);
            mx.set(NormalState::Delete, q as usize, t as usize, del);

            e_score = logsum_all(&[e_score, m, del]);
        }

        mx.set_special(SpecialState::E, q as usize, e_score);
        let j = logsum(
            mx.get_special(SpecialState::J, (q - 1) as usize) + profile.xsc(SpecialState::J, SpecialTrans::Loop),
            e_score + profile.xsc(SpecialState::E, SpecialTrans::Loop),
        );
        let c = logsum(
            mx.get_special(SpecialState::C, (q - 1) as usize) + profile.xsc(SpecialState::C, SpecialTrans::Loop),
            e_score + profile.xsc(SpecialState::E, SpecialTrans::Move),
        );
        let n = mx.get_special(SpecialState::N, (q - 1) as usize) + profile.xsc(SpecialState::N, SpecialTrans::Loop);
        let b = logsum(
            n + profile.xsc(SpecialState::N, SpecialTrans::Move),
            j + profile.xsc(SpecialState::J, SpecialTrans::Move),
        );

        mx.set_special(SpecialState::J, q as usize, j);
        mx.set_special(SpecialState::C, q as usize, c);
        mx.set_special(SpecialState::N, q as usize, n);
        mx.set_special(SpecialState::B, q as usize, b);
    }

    mx.get_special(SpecialState::C, q_len as usize) + profile.xsc(SpecialState::C, SpecialTrans::Move)
}

pub struct PipelineResult {
    pub forward_score: f32,
    pub backward_score: f32,
    pub row_mode: Edgebounds,
}

/// Runs the full C4-C6 pipeline: quad-space Viterbi anchor, forward/backward
/// antidiagonal cloud search, union + reorient into row-mode bounds, shape a
/// sparse matrix from them, and sweep bounded Forward and Backward over it.
pub fn run_pipeline(target: &Sequence, profile: &Profile, params: CloudSearchParams) -> PipelineResult {
    let anchor = quad_viterbi(target, profile, None);

    let mut cloud_mx = CloudMatrixLinear::new(target.length, profile.length);
    let fwd_diag = cloud_search_forward(target, profile, &anchor, &mut cloud_mx, params);
    let bck_diag = cloud_search_backward(target, profile, &anchor, &mut cloud_mx, params);

    let mut fwd_group = CloudBoundGroup::from_diag(fwd_diag);
    let bck_group = CloudBoundGroup::from_diag(bck_diag);
    fwd_group.join_bounds(&bck_group);
    fwd_group.trim_wings();

    let row_bounds = RowBounds::new(&fwd_group);
    assert!(row_bounds.valid(), "merged row-mode bounds must be valid");

    let mut sparse_fwd = DpMatrixSparse::shape_like_edgebounds(row_bounds.edgebounds());
    let mut special_fwd = SpecialMatrix::new(target.length);
    let forward_score = forward_bounded(target, profile, &mut sparse_fwd, &mut special_fwd);

    let mut sparse_bck = DpMatrixSparse::shape_like_edgebounds(row_bounds.edgebounds());
    let mut special_bck = SpecialMatrix::new(target.length);
    let backward_score = backward_bounded(target, profile, &mut sparse_bck, &mut special_bck);

    PipelineResult {
        forward_score,
        backward_score,
        row_mode: row_bounds.edgebounds().clone(),
    }
}
