//! End-to-end fixture scenarios over a small `T=5` profile: the cloud-search
//! + merge + bounded-DP pipeline run against a handful of query shapes whose
//! expected behavior is known ahead of time from the recurrence itself.

mod common;

use common::{build_profile, dense_reference_forward, run_pipeline, seq};

use nale::align::bounded::{null1_score, CloudSearchParams};
use nale::structs::alignment::{Alignment, ScoreParams};

#[test]
fn exact_match_query_cloud_matches_dense_reference() {
    let profile = build_profile(b"ACDEF");
    let target = seq(b"ACDEF");

    let result = run_pipeline(&target, &profile, CloudSearchParams::default_tuned());
    let reference = dense_reference_forward(&target, &profile);

    assert!(
        (result.forward_score - reference).abs() < 1e-3,
        "pipeline={} reference={}",
        result.forward_score,
        reference
    );

    // the diagonal band around q==t must be covered
    for q in 1..=5 {
        assert!(result.row_mode.search(q, q).is_some(), "row {q} missing its diagonal cell");
    }
}

#[test]
fn two_residue_insertion_query_grows_the_cloud_but_still_matches_reference() {
    let profile = build_profile(b"ACDEF");
    let target = seq(b"ACYYDEF"); // insertion of "YY" between consensus C and D

    let result = run_pipeline(&target, &profile, CloudSearchParams::default_tuned());
    let reference = dense_reference_forward(&target, &profile);

    assert!(
        (result.forward_score - reference).abs() < 1e-3,
        "pipeline={} reference={}",
        result.forward_score,
        reference
    );
    assert!(result.row_mode.num_cells() > 0);
}

#[test]
fn unrelated_query_scores_a_large_evalue() {
    let profile = build_profile(b"ACDEF");
    let target = seq(b"WWWWW"); // none of these residues appear in the consensus

    let result = run_pipeline(&target, &profile, CloudSearchParams::default_tuned());

    let mut score_params = ScoreParams::new(1000);
    score_params.forward_score_nats = result.forward_score;
    score_params.null_score_nats = null1_score(target.length);
    // bias correction omitted: the forward/null gap for a fully mismatching
    // query is wide enough (several nats) that null2's sub-nat correction
    // can't flip the evalue threshold this test checks.
    score_params.bias_correction_score_nats = 0.0;

    let trace = nale::structs::trace::Trace::new(target.length, profile.length);
    let alignment = Alignment::from_trace(&trace, &profile, &target, score_params);

    assert!(
        alignment.evalue > 10.0,
        "expected a large evalue for an unrelated query, got {}",
        alignment.evalue
    );
}

#[test]
fn length_one_query_produces_a_single_row_cloud() {
    let profile = build_profile(b"ACDEF");
    let target = seq(b"A");

    let result = run_pipeline(&target, &profile, CloudSearchParams::default_tuned());
    assert!(result.forward_score.is_finite());

    for bound in result.row_mode.bounds() {
        assert!(bound.id == 0 || bound.id == 1, "unexpected row {}", bound.id);
    }
}

#[test]
fn no_pruning_equals_the_dense_reference_forward() {
    let profile = build_profile(b"ACDEF");
    let target = seq(b"ACDEF");

    let result = run_pipeline(&target, &profile, CloudSearchParams::full());
    let reference = dense_reference_forward(&target, &profile);

    assert!(
        (result.forward_score - reference).abs() < 1e-4,
        "pipeline={} reference={}",
        result.forward_score,
        reference
    );
}
