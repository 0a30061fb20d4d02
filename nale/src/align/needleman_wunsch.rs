//! Simple global alignment (C9, ambient): match/mismatch/gap scoring, no
//! affine gap penalty. Used once per profile by the driver to map MMseqs2's
//! profile-consensus coordinates onto HMMER profile-node coordinates, since
//! the two tools independently compute slightly different consensus columns
//! for the same underlying alignment.

const MATCH_SCORE: i32 = 1;
const MISMATCH_SCORE: i32 = -1;
const GAP_SCORE: i32 = -1;

/// One step of a global-alignment traceback. `Diagonal` consumes one residue
/// from each sequence, `Up` consumes one residue from `a` only (a gap in
/// `b`), `Left` consumes one residue from `b` only (a gap in `a`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleTraceStep {
    Diagonal,
    Up,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ptr {
    Diagonal,
    Up,
    Left,
}

/// Global (Needleman-Wunsch) alignment of `a` against `b`, returning the
/// traceback in left-to-right order.
pub fn needleman_wunsch(a: &[u8], b: &[u8]) -> Vec<SimpleTraceStep> {
    let n = a.len();
    let m = b.len();
    let cols = m + 1;

    let mut score = vec![0i32; (n + 1) * cols];
    let mut ptr = vec![Ptr::Diagonal; (n + 1) * cols];
    let idx = |i: usize, j: usize| i * cols + j;

    for i in 1..=n {
        score[idx(i, 0)] = i as i32 * GAP_SCORE;
        ptr[idx(i, 0)] = Ptr::Up;
    }
    for j in 1..=m {
        score[idx(0, j)] = j as i32 * GAP_SCORE;
        ptr[idx(0, j)] = Ptr::Left;
    }

    for i in 1..=n {
        for j in 1..=m {
            let sub = if a[i - 1] == b[j - 1] {
                MATCH_SCORE
            } else {
                MISMATCH_SCORE
            };
            let diag = score[idx(i - 1, j - 1)] + sub;
            let up = score[idx(i - 1, j)] + GAP_SCORE;
            let left = score[idx(i, j - 1)] + GAP_SCORE;

            let (best, from) = if diag >= up && diag >= left {
                (diag, Ptr::Diagonal)
            } else if up >= left {
                (up, Ptr::Up)
            } else {
                (left, Ptr::Left)
            };

            score[idx(i, j)] = best;
            ptr[idx(i, j)] = from;
        }
    }

    let mut steps = Vec::with_capacity(n + m);
    let mut i = n;
    let mut j = m;
    while i > 0 || j > 0 {
        match ptr[idx(i, j)] {
            Ptr::Diagonal => {
                steps.push(SimpleTraceStep::Diagonal);
                i -= 1;
                j -= 1;
            }
            Ptr::Up => {
                steps.push(SimpleTraceStep::Up);
                i -= 1;
            }
            Ptr::Left => {
                steps.push(SimpleTraceStep::Left);
                j -= 1;
            }
        }
    }
    steps.reverse();
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_sequences_align_diagonally() {
        let steps = needleman_wunsch(b"ACDEF", b"ACDEF");
        assert_eq!(steps.len(), 5);
        assert!(steps.iter().all(|s| *s == SimpleTraceStep::Diagonal));
    }

    #[test]
    fn insertion_in_b_produces_a_left_step() {
        let steps = needleman_wunsch(b"ACEF", b"ACDEF");
        assert_eq!(steps.len(), 5);
        let lefts = steps.iter().filter(|s| **s == SimpleTraceStep::Left).count();
        assert_eq!(lefts, 1);
    }

    #[test]
    fn totally_different_sequences_still_produce_a_full_length_trace() {
        let steps = needleman_wunsch(b"AAAA", b"WWWW");
        let consumed_a: usize = steps
            .iter()
            .filter(|s| **s != SimpleTraceStep::Left)
            .count();
        let consumed_b: usize = steps
            .iter()
            .filter(|s| **s != SimpleTraceStep::Up)
            .count();
        assert_eq!(consumed_a, 4);
        assert_eq!(consumed_b, 4);
    }
}
