//! Sparse 3-plane (Match/Insert/Delete) DP matrix (C3): cells exist only
//! where an outer edgebound covers them, addressed through precomputed
//! offsets so the bounded recurrences never need a bounds check.

use super::bound::{Bound, Edgebounds, Mode};
use crate::structs::dp_matrix::DpMatrixFlat;
use crate::structs::profile::NormalState;

const NONE_OFFSET: usize = usize::MAX;

#[derive(Debug, Clone)]
pub struct DpMatrixSparse {
    edg_inner: Edgebounds,
    edg_outer: Edgebounds,
    data: Vec<f32>,
    imap_prv: Vec<usize>,
    imap_cur: Vec<usize>,
    imap_nxt: Vec<usize>,
    omap_cur: Vec<usize>,
}

fn build_outer(inner: &Edgebounds) -> Edgebounds {
    let mut outer = Edgebounds::new(Mode::Row, inner.q_len, inner.t_len);
    for b in inner.bounds() {
        for delta in -1..=1 {
            outer.push(Bound::new(b.id + delta, b.lb - 1, b.rb + 1));
        }
    }
    outer.sort();
    outer.merge();
    outer.index();
    outer
}

fn cell_offset(outer: &Edgebounds, omap_cur: &[usize], id: i32, lb: i32) -> usize {
    match outer.search(id, lb) {
        Some(bound_idx) => {
            let bound = outer.bounds()[bound_idx];
            omap_cur[bound_idx] + (lb - bound.lb) as usize
        }
        None => NONE_OFFSET,
    }
}

impl DpMatrixSparse {
    /// Derives `edg_outer` from `edg_inner` by padding each bound one cell on
    /// either side and one row above/below, then allocates and zero/−∞-fills
    /// the packed `data` array and computes the `imap`/`omap` offset tables.
    pub fn shape_like_edgebounds(edg_inner: &Edgebounds) -> DpMatrixSparse {
        let mut mx = DpMatrixSparse {
            edg_inner: edg_inner.clone(),
            edg_outer: Edgebounds::new(Mode::Row, edg_inner.q_len, edg_inner.t_len),
            data: Vec::new(),
            imap_prv: Vec::new(),
            imap_cur: Vec::new(),
            imap_nxt: Vec::new(),
            omap_cur: Vec::new(),
        };
        mx.reshape(edg_inner);
        mx
    }

    /// Rebuilds this matrix's shape in place for a new `edg_inner`, reusing
    /// the backing allocations across (query, target) pairs.
    pub fn reshape(&mut self, edg_inner: &Edgebounds) {
        self.edg_inner = edg_inner.clone();
        self.edg_outer = build_outer(edg_inner);

        self.omap_cur.clear();
        let mut cum = 0usize;
        for b in self.edg_outer.bounds() {
            self.omap_cur.push(cum);
            cum += b.len() as usize;
        }

        self.data.clear();
        self.data.resize(cum * 3, f32::NEG_INFINITY);

        let n = self.edg_inner.bounds().len();
        self.imap_prv.clear();
        self.imap_cur.clear();
        self.imap_nxt.clear();
        self.imap_prv.resize(n, NONE_OFFSET);
        self.imap_cur.resize(n, NONE_OFFSET);
        self.imap_nxt.resize(n, NONE_OFFSET);

        for (i, b) in self.edg_inner.bounds().iter().enumerate() {
            self.imap_prv[i] = cell_offset(&self.edg_outer, &self.omap_cur, b.id - 1, b.lb);
            self.imap_cur[i] = cell_offset(&self.edg_outer, &self.omap_cur, b.id, b.lb);
            self.imap_nxt[i] = cell_offset(&self.edg_outer, &self.omap_cur, b.id + 1, b.lb);
        }
    }

    pub fn edg_inner(&self) -> &Edgebounds {
        &self.edg_inner
    }

    pub fn edg_outer(&self) -> &Edgebounds {
        &self.edg_outer
    }

    /// Every inner bound must have resolved prv/cur/nxt offsets into the
    /// outer data block; a `NONE_OFFSET` here means the outer padding failed
    /// to cover an active cell, which would be a construction bug.
    pub fn valid(&self) -> bool {
        !self.edg_inner.is_empty()
            && self
                .imap_cur
                .iter()
                .all(|&off| off != NONE_OFFSET)
    }

    /// Index range into `edg_inner.bounds()` for row `q`.
    pub fn row_bounds(&self, q: i32) -> (usize, usize) {
        self.edg_inner.range_for_id(q)
    }

    pub fn bound(&self, bi: usize) -> Bound {
        self.edg_inner.bounds()[bi]
    }

    #[inline]
    pub fn offsets(&self, bi: usize) -> (usize, usize, usize) {
        (self.imap_prv[bi], self.imap_cur[bi], self.imap_nxt[bi])
    }

    /// O(1) stencil read: `offset` is one of `imap_{prv,cur,nxt}[bi]`,
    /// `t_rel` is the column offset from that row's outer bound's `lb`.
    #[inline]
    pub fn get_at(&self, offset: usize, t_rel: i32, state: NormalState) -> f32 {
        if offset == NONE_OFFSET || t_rel < 0 {
            return f32::NEG_INFINITY;
        }
        let cell = offset + t_rel as usize;
        self.data[cell * 3 + state as usize]
    }

    #[inline]
    pub fn set_at(&mut self, offset: usize, t_rel: i32, state: NormalState, value: f32) {
        if offset == NONE_OFFSET || t_rel < 0 {
            return;
        }
        let cell = offset + t_rel as usize;
        self.data[cell * 3 + state as usize] = value;
    }

    /// Generic, search-based accessor used by tests and by
    /// [`Self::embed_into_dense`]; the hot DP loop uses the offset-based
    /// accessors above instead.
    pub fn get(&self, state: NormalState, q: i32, t: i32) -> f32 {
        match self.edg_inner.search(q, t) {
            Some(bi) => {
                let bound = self.edg_inner.bounds()[bi];
                self.get_at(self.imap_cur[bi], t - bound.lb, state)
            }
            None => f32::NEG_INFINITY,
        }
    }

    pub fn set(&mut self, state: NormalState, q: i32, t: i32, value: f32) {
        if let Some(bi) = self.edg_inner.search(q, t) {
            let bound = self.edg_inner.bounds()[bi];
            let offset = self.imap_cur[bi];
            self.set_at(offset, t - bound.lb, state, value);
        }
    }

    /// Copies the sparse data into a dense matrix, for debugging and
    /// reference-implementation comparison in tests.
    pub fn embed_into_dense(&self) -> DpMatrixFlat {
        let mut dense = DpMatrixFlat::new(self.edg_inner.q_len, self.edg_inner.t_len);
        for b in self.edg_inner.bounds() {
            for t in b.lb..b.rb {
                for state in [NormalState::Match, NormalState::Insert, NormalState::Delete] {
                    let value = self.get(state, b.id, t);
                    if b.id >= 0 && t >= 0 {
                        dense.set(state, b.id as usize, t as usize, value);
                    }
                }
            }
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_inner() -> Edgebounds {
        let mut edg = Edgebounds::new(Mode::Row, 3, 3);
        edg.push(Bound::new(0, 0, 2));
        edg.push(Bound::new(1, 0, 3));
        edg.push(Bound::new(2, 1, 3));
        edg.push(Bound::new(3, 2, 3));
        edg.sort();
        edg.merge();
        edg.index();
        edg
    }

    #[test]
    fn shape_is_valid_and_round_trips() {
        let inner = small_inner();
        let mut mx = DpMatrixSparse::shape_like_edgebounds(&inner);
        assert!(mx.valid());

        mx.set(NormalState::Match, 1, 2, -4.25);
        assert_eq!(mx.get(NormalState::Match, 1, 2), -4.25);
        assert_eq!(mx.get(NormalState::Insert, 1, 2), f32::NEG_INFINITY);
    }

    #[test]
    fn offset_accessors_agree_with_search_based_accessors() {
        let inner = small_inner();
        let mut mx = DpMatrixSparse::shape_like_edgebounds(&inner);
        let (beg, end) = mx.row_bounds(1);
        assert_eq!(end - beg, 1);
        let bi = beg;
        let bound = mx.bound(bi);
        let (_, cur, _) = mx.offsets(bi);
        mx.set_at(cur, 1, NormalState::Delete, -9.0);
        assert_eq!(mx.get(NormalState::Delete, bound.id, bound.lb + 1), -9.0);
    }

    #[test]
    fn prv_offset_reads_back_what_was_written_as_cur() {
        let inner = small_inner();
        let mut mx = DpMatrixSparse::shape_like_edgebounds(&inner);

        let (beg0, _) = mx.row_bounds(0);
        let (_, cur0, _) = mx.offsets(beg0);
        mx.set_at(cur0, 0, NormalState::Match, 7.0);

        let (beg1, _) = mx.row_bounds(1);
        let (prv1, _, _) = mx.offsets(beg1);
        assert_eq!(mx.get_at(prv1, 0, NormalState::Match), 7.0);
    }

    #[test]
    fn embed_into_dense_matches_sparse_values() {
        let inner = small_inner();
        let mut mx = DpMatrixSparse::shape_like_edgebounds(&inner);
        mx.set(NormalState::Insert, 2, 1, -2.0);
        let dense = mx.embed_into_dense();
        assert_eq!(dense.get(NormalState::Insert, 2, 1), -2.0);
    }
}
