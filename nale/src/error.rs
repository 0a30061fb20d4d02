use thiserror::Error;

/// Errors produced by the alignment core.
///
/// All of these are fatal to the current (query, target) pair; only
/// `AllocFailure` is meant to be fatal to the process.
#[derive(Error, Debug)]
pub enum NaleError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("matrix inconsistent: no predecessor state matched at ({q}, {t})")]
    MatrixInconsistent { q: usize, t: usize },

    #[error("cloud collapsed before reaching the far corner of the matrix")]
    CloudCollapsed,

    #[error("failed to allocate scratch buffer of size {size}")]
    AllocFailure { size: usize },

    #[error("failed to parse HMM profile: {0}")]
    ProfileParse(String),

    #[error("failed to parse FASTA sequence: {0}")]
    SequenceParse(String),
}
