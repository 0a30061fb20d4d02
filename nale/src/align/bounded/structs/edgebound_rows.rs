//! Bounded-fanout per-row builder used while walking antidiagonals during
//! cloud search (C2). Keeps memory bounded by widening the rightmost bound
//! of a row rather than dropping cells once a row is full.

use super::bound::{Bound, Edgebounds, Mode};

/// Small, generous fixed capacity; the source excerpt did not surface the
/// exact constant (recorded as a resolved design decision in DESIGN.md).
pub const MAX_BOUNDS_PER_ROW: usize = 10;

#[derive(Debug, Clone, Default)]
struct Row {
    bounds: Vec<Bound>,
}

/// Per-row bound accumulator, one [`Row`] per query position `0..=q_len`.
#[derive(Debug, Clone)]
pub struct EdgeboundRows {
    q_len: usize,
    t_len: usize,
    rows: Vec<Row>,
}

impl EdgeboundRows {
    pub fn new(q_len: usize, t_len: usize) -> EdgeboundRows {
        EdgeboundRows {
            q_len,
            t_len,
            rows: vec![Row::default(); q_len + 1],
        }
    }

    pub fn reuse(&mut self, q_len: usize, t_len: usize) {
        self.q_len = q_len;
        self.t_len = t_len;
        self.rows.clear();
        self.rows.resize(q_len + 1, Row::default());
    }

    fn push_cell(&mut self, q: i32, t: i32, grow_left: bool) {
        if q < 0 || q as usize > self.q_len {
            return;
        }
        let row = &mut self.rows[q as usize];

        if let Some(last) = row.bounds.last_mut() {
            if !grow_left && t <= last.rb {
                last.rb = last.rb.max(t + 1);
                return;
            }
            if grow_left && t >= last.lb - 1 {
                last.lb = last.lb.min(t);
                return;
            }
        }

        if row.bounds.len() >= MAX_BOUNDS_PER_ROW {
            // overflow: bridge into the rightmost bound instead of dropping
            let last = row.bounds.last_mut().expect("capacity is > 0");
            last.rb = last.rb.max(t + 1);
            last.lb = last.lb.min(t);
            return;
        }

        row.bounds.push(Bound::new(q, t, t + 1));
    }

    /// Integrates one forward-pass antidiagonal bound `{d, k_lb, k_rb}` into
    /// its constituent `(q, t) = (k, d-k)` cells, extending rows left-to-right.
    pub fn integrate_diag_fwd(&mut self, d: i32, k_lb: i32, k_rb: i32) {
        for k in k_lb..k_rb {
            let (q, t) = (k, d - k);
            self.push_cell(q, t, false);
        }
    }

    /// Symmetric integration for the backward pass, extending rows
    /// right-to-left.
    pub fn integrate_diag_bck(&mut self, d: i32, k_lb: i32, k_rb: i32) {
        for k in (k_lb..k_rb).rev() {
            let (q, t) = (k, d - k);
            self.push_cell(q, t, true);
        }
    }

    /// Empties the builder into a row-mode [`Edgebounds`].
    pub fn convert(&mut self, dest: &mut Edgebounds) {
        *dest = Edgebounds::new(Mode::Row, self.q_len, self.t_len);
        for row in &self.rows {
            for &bound in &row.bounds {
                dest.push(bound);
            }
        }
        dest.sort();
        dest.merge();
        dest.index();
        for row in &mut self.rows {
            row.bounds.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrates_contiguous_diagonal_cells_into_one_bound() {
        let mut rows = EdgeboundRows::new(5, 5);
        rows.integrate_diag_fwd(4, 0, 5);
        let mut edg = Edgebounds::new(Mode::Row, 5, 5);
        rows.convert(&mut edg);
        assert!(!edg.is_empty());
        for bound in edg.bounds() {
            assert_eq!(bound.len(), 1);
        }
    }

    #[test]
    fn overflow_bridges_instead_of_dropping() {
        let mut rows = EdgeboundRows::new(1, 100);
        for t in (0..100).step_by(2) {
            rows.push_cell(0, t, false);
        }
        assert!(rows.rows[0].bounds.len() <= MAX_BOUNDS_PER_ROW);
        let covered: i32 = rows.rows[0].bounds.iter().map(|b| b.len()).sum();
        assert!(covered >= 50);
    }
}
