//! The union-and-reorient step (C5): fuses a forward and a backward
//! antidiagonal cloud into a single row-indexed sparse support.

use super::bound::{Bound, Edgebounds, Mode};
use super::edgebound_rows::EdgeboundRows;

/// Holds a cloud's bounds across the union → reorient → trim pipeline.
/// Starts out wrapping one direction's raw antidiagonal output; after
/// [`Self::join_bounds`] it holds the merged, row-oriented support.
#[derive(Debug, Clone)]
pub struct CloudBoundGroup {
    edg: Edgebounds,
}

impl CloudBoundGroup {
    pub fn new(q_len: usize, t_len: usize) -> CloudBoundGroup {
        CloudBoundGroup {
            edg: Edgebounds::new(Mode::Diag, q_len, t_len),
        }
    }

    pub fn reuse(&mut self, q_len: usize, t_len: usize) {
        self.edg = Edgebounds::new(Mode::Diag, q_len, t_len);
    }

    /// Wraps a diag-mode cloud-search result directly, for chaining into
    /// `join_bounds`.
    pub fn from_diag(edg: Edgebounds) -> CloudBoundGroup {
        CloudBoundGroup { edg }
    }

    pub fn edgebounds(&self) -> &Edgebounds {
        &self.edg
    }

    pub fn is_empty(&self) -> bool {
        self.edg.is_empty()
    }

    /// Unions this cloud's antidiagonal bounds with `other`'s, then
    /// reorients the union into row-mode bounds, replacing this group's
    /// contents. Mirrors §4.5: union by sort+merge across both diag lists,
    /// then a per-row scan (via [`EdgeboundRows`]) accumulating maximal row
    /// bounds.
    pub fn join_bounds(&mut self, other: &CloudBoundGroup) {
        debug_assert!(self.edg.mode() == Mode::Diag && other.edg.mode() == Mode::Diag);

        let q_len = self.edg.q_len;
        let t_len = self.edg.t_len;

        let mut union = Edgebounds::new(Mode::Diag, q_len, t_len);
        for b in self.edg.bounds() {
            union.push(*b);
        }
        for b in other.edg.bounds() {
            union.push(*b);
        }
        union.sort();
        union.merge();
        union.index();

        let mut rows = EdgeboundRows::new(q_len, t_len);
        for b in union.bounds() {
            rows.integrate_diag_fwd(b.id, b.lb, b.rb);
        }

        let mut row_mode = Edgebounds::new(Mode::Row, q_len, t_len);
        rows.convert(&mut row_mode);
        self.edg = row_mode;
    }

    /// Clips row bounds whose `[lb, rb)` range falls fully or partially
    /// outside `[0, T+1]`, an artifact of antidiagonals that clip the
    /// matrix corners, and drops any row left empty.
    pub fn trim_wings(&mut self) {
        debug_assert!(self.edg.mode() == Mode::Row);
        let t_len = self.edg.t_len as i32;

        let mut trimmed = Edgebounds::new(Mode::Row, self.edg.q_len, self.edg.t_len);
        for b in self.edg.bounds() {
            let lb = b.lb.max(0);
            let rb = b.rb.min(t_len + 1);
            if lb < rb {
                trimmed.push(Bound::new(b.id, lb, rb));
            }
        }
        trimmed.sort();
        trimmed.merge();
        trimmed.index();
        self.edg = trimmed;
    }
}

/// The finalized row-mode support a [`super::sparse_matrix::DpMatrixSparse`]
/// is shaped from.
#[derive(Debug, Clone)]
pub struct RowBounds {
    edg: Edgebounds,
}

impl RowBounds {
    pub fn new(group: &CloudBoundGroup) -> RowBounds {
        debug_assert!(group.edg.mode() == Mode::Row);
        RowBounds {
            edg: group.edg.clone(),
        }
    }

    pub fn edgebounds(&self) -> &Edgebounds {
        &self.edg
    }

    /// Every bound must be non-empty and within the profile's column range.
    pub fn valid(&self) -> bool {
        let t_len = self.edg.t_len as i32;
        !self.edg.is_empty()
            && self
                .edg
                .bounds()
                .iter()
                .all(|b| b.lb >= 0 && b.rb <= t_len + 1 && b.lb < b.rb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_bounds_unions_and_reorients() {
        let mut fwd = CloudBoundGroup::from_diag({
            let mut e = Edgebounds::new(Mode::Diag, 4, 4);
            e.push(Bound::new(2, 1, 2)); // (q=1,t=1)
            e.push(Bound::new(3, 1, 3)); // (q=1,t=2),(q=2,t=1)
            e.sort();
            e.merge();
            e.index();
            e
        });
        let bck = CloudBoundGroup::from_diag({
            let mut e = Edgebounds::new(Mode::Diag, 4, 4);
            e.push(Bound::new(3, 2, 3)); // (q=2,t=1)
            e.sort();
            e.merge();
            e.index();
            e
        });

        fwd.join_bounds(&bck);
        assert!(!fwd.is_empty());
        assert_eq!(fwd.edgebounds().mode(), Mode::Row);
    }

    #[test]
    fn trim_wings_clips_out_of_range_bounds() {
        let mut group = CloudBoundGroup::new(3, 3);
        group.edg = {
            let mut e = Edgebounds::new(Mode::Row, 3, 3);
            e.push(Bound::new(1, -2, 2));
            e.push(Bound::new(2, 3, 10));
            e.sort();
            e.merge();
            e.index();
            e
        };
        group.trim_wings();
        for b in group.edgebounds().bounds() {
            assert!(b.lb >= 0 && b.rb <= 4);
        }
    }
}
