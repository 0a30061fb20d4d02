/// Cloud search's pruning configuration (§6).
#[derive(Debug, Clone, Copy)]
pub struct CloudSearchParams {
    /// Log-score drop tolerated below the best score seen so far.
    pub alpha: f32,
    /// Antidiagonals exempt from pruning at the start of the search.
    pub beta: usize,
    /// Optional hard cap on cloud width.
    pub gamma: Option<i32>,
    /// Bypasses pruning entirely; the cloud covers the whole matrix. Used
    /// only for full-cloud-parity testing.
    pub run_full: bool,
}

impl CloudSearchParams {
    pub fn new(alpha: f32, beta: usize, gamma: Option<i32>) -> CloudSearchParams {
        CloudSearchParams {
            alpha,
            beta,
            gamma,
            run_full: false,
        }
    }

    pub fn default_tuned() -> CloudSearchParams {
        CloudSearchParams::new(20.0, 5, None)
    }

    pub fn full() -> CloudSearchParams {
        CloudSearchParams {
            alpha: f32::INFINITY,
            beta: 0,
            gamma: None,
            run_full: true,
        }
    }
}
