/// Number of linear slots a triangular pair matrix over `n` positions needs.
pub const fn triangular_len(n: usize) -> usize {
    ((n + 1) * (n + 2)) / 2
}

/// Column-major triangular index map for pair matrices.
///
/// Maps an ordered pair `(i, j)` with `1 <= i <= j <= n` to the linear offset
/// `idx[j] + i`, the addressing the folding engine uses for its free-energy
/// matrices. The soft-constraint pair storage uses the identical map so both
/// sides agree on offsets without translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JIndex {
    n: usize,
    idx: Vec<usize>,
}

impl JIndex {
    pub fn new(n: usize) -> Self {
        let idx = (0..=n).map(|j| (j * j.saturating_sub(1)) / 2).collect();
        Self { n, idx }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Linear offset of the pair `(i, j)`; requires `1 <= i <= j <= n`.
    #[inline]
    pub fn pair(&self, i: usize, j: usize) -> usize {
        debug_assert!(1 <= i && i <= j && j <= self.n);
        self.idx[j] + i
    }
}

/// Row-major triangular index map for pair matrices.
///
/// Maps `(i, j)` with `1 <= i <= j <= n` to `idx[i] - j`. The folding engine
/// addresses its partition-function matrices this way, so Boltzmann-weighted
/// pair storage follows suit while the free-energy side keeps the column-major
/// [`JIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IIndex {
    n: usize,
    idx: Vec<usize>,
}

impl IIndex {
    pub fn new(n: usize) -> Self {
        let idx = (0..=n)
            .map(|i| {
                if i == 0 {
                    0
                } else {
                    ((n + 1 - i) * (n - i)) / 2 + n + 1
                }
            })
            .collect();
        Self { n, idx }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Linear offset of the pair `(i, j)`; requires `1 <= i <= j <= n`.
    #[inline]
    pub fn pair(&self, i: usize, j: usize) -> usize {
        debug_assert!(1 <= i && i <= j && j <= self.n);
        self.idx[i] - j
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangular_len_counts_all_slots() {
        assert_eq!(triangular_len(0), 1);
        assert_eq!(triangular_len(1), 3);
        assert_eq!(triangular_len(10), 66);
    }

    #[test]
    fn jindex_offsets_are_distinct_and_in_bounds() {
        let n = 12;
        let jindx = JIndex::new(n);
        let mut seen = std::collections::HashSet::new();
        for i in 1..n {
            for j in (i + 1)..=n {
                let offset = jindx.pair(i, j);
                assert!(offset < triangular_len(n));
                assert!(seen.insert(offset), "duplicate offset for ({i}, {j})");
            }
        }
    }

    #[test]
    fn iindex_offsets_are_distinct_and_in_bounds() {
        let n = 12;
        let iindx = IIndex::new(n);
        let mut seen = std::collections::HashSet::new();
        for i in 1..n {
            for j in (i + 1)..=n {
                let offset = iindx.pair(i, j);
                assert!(offset < triangular_len(n));
                assert!(seen.insert(offset), "duplicate offset for ({i}, {j})");
            }
        }
    }

    #[test]
    fn jindex_is_column_major() {
        let jindx = JIndex::new(8);
        // Adjacent rows of one column map to adjacent slots.
        assert_eq!(jindx.pair(2, 5) - jindx.pair(1, 5), 1);
    }

    #[test]
    fn iindex_is_row_major() {
        let iindx = IIndex::new(8);
        // Adjacent columns of one row map to adjacent slots.
        assert_eq!(iindx.pair(2, 5) - iindx.pair(2, 6), 1);
    }
}
