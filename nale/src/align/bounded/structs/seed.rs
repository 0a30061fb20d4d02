/// A rough alignment window supplied by the MMseqs2 prefilter+align step,
/// used to narrow the quad-space Viterbi anchor search to a seeded window
/// rather than the full Q x T grid.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Seed {
    pub target_name: String,
    pub target_start: usize,
    pub target_end: usize,
    pub profile_start: usize,
    pub profile_end: usize,
}
