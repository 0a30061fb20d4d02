//! P-value / E-value conversion from a bit score, given a profile's
//! length-calibrated exponential-tail parameters (`tau`, `lambda`).
//!
//! This mirrors Easel's `esl_exp_logsurv`: the exponential tail's log survival
//! function, clamped to `0` (i.e. P = 1) below the tail's offset `tau`.

/// `log(P(X > x))` for `X` exponential with offset `tau` and decay `lambda`.
pub fn exp_logsurv(x: f32, tau: f32, lambda: f32) -> f32 {
    if x < tau {
        0.0
    } else {
        -lambda * (x - tau)
    }
}

/// Converts a bit score to a P-value using the profile's calibration.
pub fn pvalue(bit_score: f32, tau: f32, lambda: f32) -> f64 {
    exp_logsurv(bit_score, tau, lambda).exp() as f64
}

/// E-value for a database search over `num_targets` sequences.
pub fn evalue(pvalue: f64, num_targets: usize) -> f64 {
    pvalue * num_targets as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_tau_is_certain() {
        assert_eq!(exp_logsurv(1.0, 10.0, 0.5), 0.0);
        assert_eq!(pvalue(1.0, 10.0, 0.5), 1.0);
    }

    #[test]
    fn decays_above_tau() {
        let p_near = pvalue(10.5, 10.0, 0.7);
        let p_far = pvalue(20.0, 10.0, 0.7);
        assert!(p_far < p_near);
        assert!(p_far > 0.0);
    }

    #[test]
    fn evalue_scales_with_database_size() {
        let p = pvalue(15.0, 10.0, 0.7);
        assert!((evalue(p, 2000) - p * 2000.0).abs() < 1e-12);
    }
}
