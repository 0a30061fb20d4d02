use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::sync::Mutex;

use crate::args::Args;
use crate::extension_traits::PathBufExt;
use crate::pipeline::seed::SeedMap;

use nale::align::bounded::structs::{
    CloudBoundGroup, CloudMatrixLinear, CloudSearchParams, DpMatrixSparse, Edgebounds, Mode,
    RowBounds, Seed, SpecialMatrix,
};
use nale::align::bounded::{
    backward_bounded, cloud_search_backward, cloud_search_forward, forward_bounded, null1_score,
    null2_score, optimal_accuracy_bounded, posterior_bounded,
};
use nale::align::quad::quad_viterbi;
use nale::output::output_tabular::{write_alignment, write_header};
use nale::structs::alignment::ScoreParams;
use nale::structs::{Alignment, Profile, Sequence};

use rayon::prelude::*;
use thread_local::ThreadLocal;

/// Each rayon task owns one profile and its seed list; the bounded DP scratch
/// structs are thread-local `RefCell`s, resized per pair via `reuse`/`reshape`
/// rather than rebuilt. Results are appended to a single `Mutex`-guarded file.
pub fn align_threaded(
    args: &Args,
    mut profiles: Vec<Profile>,
    seed_map: SeedMap,
) -> anyhow::Result<()> {
    let targets = Sequence::amino_from_fasta(&args.paths.target)?;
    let num_targets = targets.len();

    let mut results_file = BufWriter::new(args.paths.results.open(true)?);
    write_header(&mut results_file)?;
    let results_writer: Mutex<BufWriter<File>> = Mutex::new(results_file);

    let mut target_map: HashMap<String, Sequence> = HashMap::new();
    for target in targets {
        target_map.insert(target.name.clone(), target);
    }

    let mut profile_seeds_pairs: Vec<(&mut Profile, &Vec<Seed>)> = vec![];
    for profile in profiles.iter_mut() {
        match seed_map.get(&profile.name) {
            Some(seeds) => profile_seeds_pairs.push((profile, seeds)),
            None => continue,
        }
    }

    let cloud_params = if args.run_full {
        CloudSearchParams::full()
    } else {
        CloudSearchParams::new(args.alpha, args.beta, args.gamma)
    };

    let tl_cloud_matrix: ThreadLocal<RefCell<CloudMatrixLinear>> = ThreadLocal::new();
    let tl_forward_bounds: ThreadLocal<RefCell<CloudBoundGroup>> = ThreadLocal::new();
    let tl_forward_matrix: ThreadLocal<RefCell<DpMatrixSparse>> = ThreadLocal::new();
    let tl_backward_matrix: ThreadLocal<RefCell<DpMatrixSparse>> = ThreadLocal::new();
    let tl_posterior_matrix: ThreadLocal<RefCell<DpMatrixSparse>> = ThreadLocal::new();
    let tl_forward_special: ThreadLocal<RefCell<SpecialMatrix>> = ThreadLocal::new();
    let tl_backward_special: ThreadLocal<RefCell<SpecialMatrix>> = ThreadLocal::new();

    profile_seeds_pairs
        .into_par_iter()
        .try_for_each(|(profile, seeds)| -> anyhow::Result<()> {
            for seed in seeds {
                let target = target_map
                    .get(&seed.target_name)
                    .expect("seed references a target not present in the target fasta");
                profile.configure_for_target_length(target.length);

                let anchor = quad_viterbi(target, profile, Some(seed));
                if anchor.first_match().is_none() {
                    continue;
                }

                let mut cloud_matrix = tl_cloud_matrix
                    .get_or(|| RefCell::new(CloudMatrixLinear::new(0, 0)))
                    .borrow_mut();
                cloud_matrix.reuse(target.length, profile.length);

                let forward_edg =
                    cloud_search_forward(target, profile, &anchor, &mut cloud_matrix, cloud_params);
                let backward_edg =
                    cloud_search_backward(target, profile, &anchor, &mut cloud_matrix, cloud_params);
                drop(cloud_matrix);

                let mut forward_bounds = tl_forward_bounds
                    .get_or(|| RefCell::new(CloudBoundGroup::new(0, 0)))
                    .borrow_mut();

                *forward_bounds = CloudBoundGroup::from_diag(forward_edg);
                forward_bounds.join_bounds(&CloudBoundGroup::from_diag(backward_edg));

                if !forward_bounds.valid() {
                    continue;
                }

                forward_bounds.trim_wings();

                let row_bounds = RowBounds::new(&forward_bounds);
                drop(forward_bounds);

                if !row_bounds.valid() {
                    continue;
                }

                let mut forward_matrix = tl_forward_matrix
                    .get_or(|| {
                        RefCell::new(DpMatrixSparse::shape_like_edgebounds(&Edgebounds::new(
                            Mode::Row,
                            0,
                            0,
                        )))
                    })
                    .borrow_mut();
                let mut backward_matrix = tl_backward_matrix
                    .get_or(|| {
                        RefCell::new(DpMatrixSparse::shape_like_edgebounds(&Edgebounds::new(
                            Mode::Row,
                            0,
                            0,
                        )))
                    })
                    .borrow_mut();
                let mut posterior_matrix = tl_posterior_matrix
                    .get_or(|| {
                        RefCell::new(DpMatrixSparse::shape_like_edgebounds(&Edgebounds::new(
                            Mode::Row,
                            0,
                            0,
                        )))
                    })
                    .borrow_mut();

                forward_matrix.reshape(row_bounds.edgebounds());
                backward_matrix.reshape(row_bounds.edgebounds());

                let mut forward_special = tl_forward_special
                    .get_or(|| RefCell::new(SpecialMatrix::new(0)))
                    .borrow_mut();
                let mut backward_special = tl_backward_special
                    .get_or(|| RefCell::new(SpecialMatrix::new(0)))
                    .borrow_mut();
                forward_special.reuse(target.length);
                backward_special.reuse(target.length);

                let mut score_params = ScoreParams::new(num_targets);

                score_params.forward_score_nats =
                    forward_bounded(target, profile, &mut forward_matrix, &mut forward_special);
                backward_bounded(target, profile, &mut backward_matrix, &mut backward_special);

                posterior_bounded(
                    &forward_matrix,
                    &backward_matrix,
                    score_params.forward_score_nats,
                    &mut posterior_matrix,
                );

                score_params.null_score_nats = null1_score(target.length);
                if args.compo_bias {
                    score_params.bias_correction_score_nats =
                        null2_score(&posterior_matrix, profile, target, row_bounds.edgebounds());
                }

                let trace =
                    optimal_accuracy_bounded(&posterior_matrix, target.length, profile.length);

                let alignment = Alignment::from_trace(&trace, profile, target, score_params);

                let mut writer = results_writer.lock().unwrap();
                write_alignment(&mut *writer, &alignment, args.evalue_cutoff)?;
            }
            Ok(())
        })?;

    Ok(())
}
