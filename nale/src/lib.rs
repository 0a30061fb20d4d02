//! Bounded profile-HMM Forward/Backward alignment engine.
//!
//! `nale` implements the pruned-cloud alignment core: a Viterbi anchor pass,
//! an antidiagonal cloud search, the merge/reorient step that turns two
//! clouds into a sparse row-wise support, and the bounded Forward, Backward,
//! posterior, and traceback recurrences that run over that support.

pub mod align;
pub mod error;
pub mod logsum;
pub mod output;
pub mod pvalue;
pub mod structs;

pub use error::NaleError;
