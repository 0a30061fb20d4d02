//! Process-wide logsum lookup table.
//!
//! `logsum(a, b)` computes `a + log(1 + exp(b - a))` for `a >= b`, approximated
//! by a 16000-entry table indexed on `floor(LOGSUM_SCALE * (a - b))`, exactly
//! as the original source's `calc_Logsum` does. The table must be initialized
//! once, before any DP call, via [`logsum_init`].

use std::sync::OnceLock;

const LOGSUM_TBL_SIZE: usize = 16_000;
const LOGSUM_SCALE: f32 = 1000.0;

static LOGSUM_TABLE: OnceLock<Vec<f32>> = OnceLock::new();

/// Initializes the process-wide logsum table. Idempotent: later calls are
/// no-ops. Must be called before the first `logsum()` call.
pub fn logsum_init() {
    LOGSUM_TABLE.get_or_init(|| {
        (0..LOGSUM_TBL_SIZE)
            .map(|i| {
                let x = i as f32 / LOGSUM_SCALE;
                (1.0 + (-x).exp()).ln()
            })
            .collect()
    });
}

/// `a ⊕ b = a + log(1 + exp(b - a))`. Treats `-inf` as the additive identity:
/// `-inf ⊕ x = x`.
#[inline]
pub fn logsum(a: f32, b: f32) -> f32 {
    if a == f32::NEG_INFINITY {
        return b;
    }
    if b == f32::NEG_INFINITY {
        return a;
    }

    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    let diff = hi - lo;

    let table = LOGSUM_TABLE
        .get()
        .expect("logsum_init() must be called before logsum()");

    if diff >= (LOGSUM_TBL_SIZE as f32 - 1.0) / LOGSUM_SCALE {
        return hi;
    }

    let idx = (diff * LOGSUM_SCALE) as usize;
    hi + table[idx]
}

/// Variadic helper for the common three- and four-term logsum chains in the
/// recurrences (`logsum(logsum(a, b), logsum(c, d))`, etc.).
#[inline]
pub fn logsum_all(values: &[f32]) -> f32 {
    values
        .iter()
        .copied()
        .fold(f32::NEG_INFINITY, |acc, v| logsum(acc, v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_with_neg_infinity() {
        logsum_init();
        assert_eq!(logsum(f32::NEG_INFINITY, 3.0), 3.0);
        assert_eq!(logsum(3.0, f32::NEG_INFINITY), 3.0);
        assert_eq!(
            logsum(f32::NEG_INFINITY, f32::NEG_INFINITY),
            f32::NEG_INFINITY
        );
    }

    #[test]
    fn approximates_exact_logsum() {
        logsum_init();
        let a = -2.0f32;
        let b = -3.5f32;
        let exact = a.max(b) + (1.0 + (-((a - b).abs())).exp()).ln();
        assert!((logsum(a, b) - exact).abs() < 1e-3);
    }

    #[test]
    fn large_gap_returns_larger_term() {
        logsum_init();
        assert_eq!(logsum(10.0, -100.0), 10.0);
    }
}
