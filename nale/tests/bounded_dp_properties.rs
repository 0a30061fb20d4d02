//! Cross-module properties of the cloud-search / sparse-matrix / bounded-DP
//! pipeline that don't fit naturally as a single module's unit tests.

mod common;

use common::{build_profile, dense_reference_forward, run_pipeline, seq};

use nale::align::bounded::structs::{Bound, CloudSearchParams, Edgebounds, EdgeboundRows, Mode};
use nale::align::bounded::{cloud_search_backward, cloud_search_forward, forward_bounded, CloudMatrixLinear, DpMatrixSparse, SpecialMatrix};
use nale::align::quad::quad_viterbi;
use nale::logsum::logsum_init;

#[test]
fn full_cloud_forward_matches_independent_dense_reference() {
    let profile = build_profile(b"ACDEF");
    let target = seq(b"ACDEF");

    let cover = Edgebounds::cover_matrix(target.length, profile.length);
    let mut sparse = DpMatrixSparse::shape_like_edgebounds(&cover);
    let mut special = SpecialMatrix::new(target.length);
    let bounded_score = forward_bounded(&target, &profile, &mut sparse, &mut special);

    let reference_score = dense_reference_forward(&target, &profile);

    assert!(
        (bounded_score - reference_score).abs() < 1e-4,
        "bounded={bounded_score} reference={reference_score}"
    );
}

#[test]
fn forward_and_backward_scores_agree_on_the_same_support() {
    let profile = build_profile(b"ACDEF");
    let target = seq(b"ACDEF");

    let result = run_pipeline(&target, &profile, CloudSearchParams::full());
    assert!(
        (result.forward_score - result.backward_score).abs() < 1e-4,
        "forward={} backward={}",
        result.forward_score,
        result.backward_score
    );
}

#[test]
fn anchor_at_top_left_corner_produces_a_finite_bounded_score() {
    let profile = build_profile(b"ACDEF");
    let target = seq(b"ACDEF");
    logsum_init();

    let mut cloud_mx = CloudMatrixLinear::new(target.length, profile.length);
    let mut anchor = nale::structs::trace::Trace::new(target.length, profile.length);
    anchor.push(nale::structs::trace::AlignState::M, 1, 1);

    let params = CloudSearchParams::default_tuned();
    let fwd = cloud_search_forward(&target, &profile, &anchor, &mut cloud_mx, params);
    let bck = cloud_search_backward(&target, &profile, &anchor, &mut cloud_mx, params);
    assert!(!fwd.is_empty());
    assert!(!bck.is_empty());
}

#[test]
fn anchor_at_bottom_right_corner_produces_a_finite_bounded_score() {
    let profile = build_profile(b"ACDEF");
    let target = seq(b"ACDEF");
    logsum_init();

    let mut cloud_mx = CloudMatrixLinear::new(target.length, profile.length);
    let mut anchor = nale::structs::trace::Trace::new(target.length, profile.length);
    anchor.push(
        nale::structs::trace::AlignState::M,
        target.length,
        profile.length,
    );

    let params = CloudSearchParams::default_tuned();
    let fwd = cloud_search_forward(&target, &profile, &anchor, &mut cloud_mx, params);
    let bck = cloud_search_backward(&target, &profile, &anchor, &mut cloud_mx, params);
    assert!(!fwd.is_empty());
    assert!(!bck.is_empty());

    let result = run_pipeline(&target, &profile, params);
    assert!(result.forward_score.is_finite());
}

#[test]
fn quad_viterbi_anchor_pass_does_not_panic_on_either_corner() {
    let profile = build_profile(b"ACDEF");
    let target = seq(b"ACDEF");

    let trace = quad_viterbi(&target, &profile, None);
    assert!(trace.first_match().is_some());
    assert!(trace.last_match().is_some());
}

/// Union of two disjoint antidiagonal bounds, reoriented to row-mode, must
/// preserve the gap between them: the merged row-mode collection has
/// separated row ranges with an empty row between the two components,
/// exactly as a query with two disjoint match regions would produce.
#[test]
fn disjoint_diag_components_survive_union_and_reorient_as_two_row_groups() {
    let q_len = 10;
    let t_len = 10;

    let mut left = Edgebounds::new(Mode::Diag, q_len, t_len);
    left.push(Bound::new(3, 1, 3)); // (1,2),(2,1)
    left.push(Bound::new(4, 1, 3)); // (1,3),(2,2)
    left.sort();
    left.merge();
    left.index();

    let mut right = Edgebounds::new(Mode::Diag, q_len, t_len);
    right.push(Bound::new(15, 7, 9)); // (7,8),(8,7)
    right.push(Bound::new(16, 7, 9)); // (7,9),(8,8)
    right.sort();
    right.merge();
    right.index();

    let mut rows = EdgeboundRows::new(q_len, t_len);
    for b in left.bounds() {
        rows.integrate_diag_fwd(b.id, b.lb, b.rb);
    }
    for b in right.bounds() {
        rows.integrate_diag_fwd(b.id, b.lb, b.rb);
    }
    let mut row_mode = Edgebounds::new(Mode::Row, q_len, t_len);
    rows.convert(&mut row_mode);

    let covered_rows: Vec<i32> = row_mode.bounds().iter().map(|b| b.id).collect();
    assert!(covered_rows.contains(&1));
    assert!(covered_rows.contains(&2));
    assert!(covered_rows.contains(&7));
    assert!(covered_rows.contains(&8));
    // rows strictly between the two components carry no bound at all
    for q in 3..=6 {
        assert_eq!(row_mode.bounds_for_id(q).len(), 0, "row {q} should be empty");
    }
}
