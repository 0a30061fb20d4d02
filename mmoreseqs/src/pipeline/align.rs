use std::fs::File;
use std::io::Read;

use anyhow::Context;

use nale::structs::hmm::parse_hmms_from_p7hmm_file;
use nale::structs::Profile;

use super::threaded_align::align_threaded;
use super::SeedMap;
use crate::args::Args;

/// Runs bounded alignment over every (profile, seed) pair and writes the
/// surviving alignments to `args.paths.results`. `profiles`/`seed_map` are
/// threaded through in memory when `search` has already produced them;
/// otherwise they are loaded from `args.query_hmm()` and `args.paths.seeds`.
pub fn align(
    args: &Args,
    profiles: Option<Vec<Profile>>,
    seed_map: Option<SeedMap>,
) -> anyhow::Result<()> {
    let profiles = match profiles {
        Some(profiles) => profiles,
        None => {
            let hmms = parse_hmms_from_p7hmm_file(
                args.query_hmm()
                    .to_str()
                    .context("query HMM path is not valid UTF-8")?,
            )?;
            hmms.iter().map(Profile::new).collect()
        }
    };

    let seed_map = match seed_map {
        Some(seed_map) => seed_map,
        None => {
            let mut seeds_string = String::new();
            File::open(&args.paths.seeds)
                .context(format!(
                    "failed to open alignment seeds file: {}",
                    &args.paths.seeds.to_string_lossy(),
                ))?
                .read_to_string(&mut seeds_string)
                .context(format!(
                    "failed to read alignment seeds file: {}",
                    &args.paths.seeds.to_string_lossy(),
                ))?;
            serde_json::from_str(&seeds_string).context(format!(
                "failed to parse alignment seeds file: {}",
                &args.paths.seeds.to_string_lossy(),
            ))?
        }
    };

    align_threaded(args, profiles, seed_map)
}
