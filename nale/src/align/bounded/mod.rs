//! The pruned-cloud alignment core (C1-C7): cloud search, merge/reorient
//! into a sparse support, and the bounded Forward/Backward/Viterbi sweep,
//! posterior decoding, and traceback that run over it.

pub mod structs;

mod cloud_search;
mod fwdbck;
mod optimal_accuracy;
mod posterior;
mod traceback;

pub use cloud_search::{cloud_search_backward, cloud_search_forward};
pub use fwdbck::{backward_bounded, forward_bounded, viterbi_bounded};
pub use optimal_accuracy::optimal_accuracy_bounded;
pub use posterior::{null1_score, null2_score, posterior_bounded};
pub use structs::{
    Bound, CloudBoundGroup, CloudMatrixLinear, CloudSearchParams, DpMatrixSparse, EdgeboundRows,
    Edgebounds, Mode, RowBounds, Seed, SpecialMatrix, MAX_BOUNDS_PER_ROW,
};
pub use traceback::traceback_bounded;
