/// The states a traceback step can land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignState {
    S,
    N,
    B,
    M,
    I,
    D,
    E,
    J,
    C,
    T,
}

/// One step of a traceback: the state occupied, and the `(q, t)` cell it
/// corresponds to (special states reuse the query row `q` with `t = 0`).
#[derive(Debug, Clone, Copy)]
pub struct TraceStep {
    pub state: AlignState,
    pub q: usize,
    pub t: usize,
}

/// An ordered traceback through the DP matrix, plus the per-domain
/// begin/end match-state indices (domain finding is simplified to a single
/// domain spanning the whole cloud, so there is at most one entry here).
#[derive(Debug, Clone, Default)]
pub struct Trace {
    pub steps: Vec<TraceStep>,
    pub begin_indices: Vec<usize>,
    pub end_indices: Vec<usize>,
}

impl Trace {
    /// Preallocates a traceback buffer sized for a target of length
    /// `target_length` against a profile of length `profile_length`.
    pub fn new(target_length: usize, profile_length: usize) -> Trace {
        Trace {
            steps: Vec::with_capacity(target_length + profile_length),
            begin_indices: Vec::new(),
            end_indices: Vec::new(),
        }
    }

    pub fn push(&mut self, state: AlignState, q: usize, t: usize) {
        self.steps.push(TraceStep { state, q, t });
    }

    /// Earliest `(q, t)` occupying a match state, used to anchor cloud
    /// search's forward pass.
    pub fn first_match(&self) -> Option<(usize, usize)> {
        self.steps
            .iter()
            .find(|s| s.state == AlignState::M)
            .map(|s| (s.q, s.t))
    }

    /// Latest `(q, t)` occupying a match state, used to anchor cloud
    /// search's backward pass.
    pub fn last_match(&self) -> Option<(usize, usize)> {
        self.steps
            .iter()
            .rev()
            .find(|s| s.state == AlignState::M)
            .map(|s| (s.q, s.t))
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Reverses step order; traceback walks are built end-to-start and must
    /// be flipped once before use as a left-to-right alignment.
    pub fn reverse(&mut self) {
        self.steps.reverse();
    }
}
