use crate::args::Args;
use crate::extension_traits::PathBufExt;
use crate::pipeline::{align, prep, seed};

/// Runs the full `prep` -> `seed` -> `align` chain over a single query/target pair.
pub fn search(args: &Args) -> anyhow::Result<()> {
    // fail fast if the results path can't be created, before doing any work
    args.paths.results.open(true)?;

    prep(args)?;
    let (profiles, seed_map) = seed(args)?;
    align(args, Some(profiles), Some(seed_map))?;

    Ok(())
}
