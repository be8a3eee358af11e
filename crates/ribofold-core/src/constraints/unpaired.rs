use crate::core::energy::Energy;

/// Dense cumulative table of unpaired-position adjustments.
///
/// `get(i, k)` is the total adjustment of the k-length subsequence starting at
/// position i (1-indexed), so the folding recurrences read any unpaired-region
/// contribution in O(1). Row `i` spans `k = 0..=n-i+1` and `get(i, 0)` is
/// always zero: the empty subsequence contributes nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeTable {
    n: usize,
    rows: Vec<Vec<Energy>>,
}

impl CumulativeTable {
    pub fn new(n: usize) -> Self {
        let rows = (0..=n).map(|i| vec![Energy::ZERO; n - i + 2]).collect();
        Self { n, rows }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Rebuilds the whole table from per-nucleotide adjustments.
    ///
    /// `per_nt` is 1-indexed with `n + 1` slots; slot 0 is ignored.
    pub fn rebuild(&mut self, per_nt: &[Energy]) {
        debug_assert_eq!(per_nt.len(), self.n + 1);
        for i in 1..=self.n {
            self.rows[i][0] = Energy::ZERO;
            for k in 1..=(self.n - i + 1) {
                self.rows[i][k] = self.rows[i][k - 1] + per_nt[i + k - 1];
            }
        }
    }

    /// Adds `delta` to every entry whose subsequence covers position `i`.
    ///
    /// Rolling update: for each start `j <= i` the single-nucleotide entry at
    /// the covered offset takes the increment, then the prefix relation is
    /// re-run forward from there. The result is identical to a full rebuild
    /// with the same per-nucleotide values.
    pub fn add_at(&mut self, i: usize, delta: Energy) {
        debug_assert!(1 <= i && i <= self.n);
        for j in 1..=i {
            let u_start = i - j + 1;
            let u_max = self.n - j + 1;
            self.rows[j][u_start] += delta;
            for u in (u_start + 1)..=u_max {
                self.rows[j][u] = self.rows[j][u - 1] + self.rows[j + u - 1][1];
            }
        }
    }

    /// Cumulative adjustment of the k-length subsequence starting at `i`;
    /// zero for anything outside the table.
    pub fn get(&self, i: usize, k: usize) -> Energy {
        self.rows
            .get(i)
            .and_then(|row| row.get(k))
            .copied()
            .unwrap_or(Energy::ZERO)
    }
}

/// Windowed unpaired-position storage.
///
/// Keeps the raw per-nucleotide adjustments for the whole sequence and
/// materializes the cumulative sums only for the window anchored at the
/// engine's current position. The local rows are recomputed on every anchor
/// advance and never persisted across slides.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowUnpaired {
    n: usize,
    per_position: Vec<Energy>,
    local: Vec<Vec<Energy>>,
    exp_local: Vec<Vec<f64>>,
}

impl WindowUnpaired {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            per_position: vec![Energy::ZERO; n + 2],
            local: vec![Vec::new(); n + 2],
            exp_local: vec![Vec::new(); n + 2],
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn add(&mut self, i: usize, delta: Energy) {
        debug_assert!(1 <= i && i <= self.n);
        self.per_position[i] += delta;
    }

    pub fn per_position(&self, i: usize) -> Energy {
        self.per_position
            .get(i)
            .copied()
            .unwrap_or(Energy::ZERO)
    }

    /// Materializes the cumulative row for the window anchored at `i`,
    /// bounded by the window size and the remaining sequence length.
    pub fn prepare(&mut self, i: usize, window_size: usize) {
        debug_assert!(1 <= i && i <= self.n);
        let maxdist = window_size.min(self.n - i + 1);
        let mut row = vec![Energy::ZERO; maxdist + 1];
        for k in 1..=maxdist {
            row[k] = row[k - 1] + self.per_position[i + k - 1];
        }
        self.local[i] = row;
    }

    /// Derives Boltzmann weights for the materialized row at anchor `i`.
    pub fn prepare_exp(&mut self, i: usize, kt: f64) {
        debug_assert!(1 <= i && i <= self.n);
        let mut row: Vec<f64> = self.local[i].iter().map(|e| e.boltzmann(kt)).collect();
        if let Some(first) = row.first_mut() {
            *first = 1.0;
        }
        self.exp_local[i] = row;
    }

    pub fn energy(&self, i: usize, k: usize) -> Energy {
        self.local
            .get(i)
            .and_then(|row| row.get(k))
            .copied()
            .unwrap_or(Energy::ZERO)
    }

    pub fn weight(&self, i: usize, k: usize) -> f64 {
        self.exp_local
            .get(i)
            .and_then(|row| row.get(k))
            .copied()
            .unwrap_or(1.0)
    }
}
