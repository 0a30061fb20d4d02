use crate::structs::profile::NormalState;

/// Three-row linear-space scratch used during cloud search: only the current
/// antidiagonal and the two preceding it are ever live, so each plane is
/// stored as `3 * width` floats indexed by `d mod 3`, rather than a full
/// `(Q+T+1)`-antidiagonal matrix.
#[derive(Debug, Clone)]
pub struct CloudMatrixLinear {
    width: usize,
    match_mx: Vec<f32>,
    insert_mx: Vec<f32>,
    delete_mx: Vec<f32>,
}

impl CloudMatrixLinear {
    pub fn new(q_len: usize, t_len: usize) -> CloudMatrixLinear {
        let width = q_len + t_len + 2;
        CloudMatrixLinear {
            width,
            match_mx: vec![f32::NEG_INFINITY; 3 * width],
            insert_mx: vec![f32::NEG_INFINITY; 3 * width],
            delete_mx: vec![f32::NEG_INFINITY; 3 * width],
        }
    }

    pub fn reuse(&mut self, q_len: usize, t_len: usize) {
        let width = q_len + t_len + 2;
        self.width = width;
        for mx in [&mut self.match_mx, &mut self.insert_mx, &mut self.delete_mx] {
            mx.clear();
            mx.resize(3 * width, f32::NEG_INFINITY);
        }
    }

    #[inline]
    fn idx(&self, d: i32, k: i32) -> usize {
        let row = (d.rem_euclid(3)) as usize;
        row * self.width + k as usize
    }

    #[inline]
    pub fn get(&self, state: NormalState, d: i32, k: i32) -> f32 {
        if k < 0 || k as usize >= self.width {
            return f32::NEG_INFINITY;
        }
        let i = self.idx(d, k);
        match state {
            NormalState::Match => self.match_mx[i],
            NormalState::Insert => self.insert_mx[i],
            NormalState::Delete => self.delete_mx[i],
        }
    }

    #[inline]
    pub fn set(&mut self, state: NormalState, d: i32, k: i32, value: f32) {
        if k < 0 || k as usize >= self.width {
            return;
        }
        let i = self.idx(d, k);
        match state {
            NormalState::Match => self.match_mx[i] = value,
            NormalState::Insert => self.insert_mx[i] = value,
            NormalState::Delete => self.delete_mx[i] = value,
        }
    }

    /// Scrubs the antidiagonal two behind `d` back to `-inf` after use, so
    /// the linear-space buffer never leaks stale scores into a future cycle.
    pub fn clear_row(&mut self, d: i32) {
        let row = (d.rem_euclid(3)) as usize;
        let range = row * self.width..(row + 1) * self.width;
        self.match_mx[range.clone()].fill(f32::NEG_INFINITY);
        self.insert_mx[range.clone()].fill(f32::NEG_INFINITY);
        self.delete_mx[range].fill(f32::NEG_INFINITY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips_within_a_cycle() {
        let mut mx = CloudMatrixLinear::new(4, 4);
        mx.set(NormalState::Match, 3, 2, -1.5);
        assert_eq!(mx.get(NormalState::Match, 3, 2), -1.5);
    }

    #[test]
    fn clear_row_resets_only_that_antidiagonal() {
        let mut mx = CloudMatrixLinear::new(4, 4);
        mx.set(NormalState::Match, 3, 2, -1.5);
        mx.set(NormalState::Match, 4, 2, -2.5);
        mx.clear_row(3);
        assert_eq!(mx.get(NormalState::Match, 3, 2), f32::NEG_INFINITY);
        assert_eq!(mx.get(NormalState::Match, 4, 2), -2.5);
    }
}
