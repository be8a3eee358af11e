use crate::core::energy::Energy;
use crate::core::index::{JIndex, triangular_len};

/// Dense triangular matrix of base-pair adjustments.
///
/// Entries are addressed through the column-major [`JIndex`] the folding
/// engine uses for its own free-energy matrices. Pairs without an entry read
/// as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairMatrix {
    jindx: JIndex,
    data: Vec<Energy>,
}

impl PairMatrix {
    pub fn new(n: usize) -> Self {
        Self {
            jindx: JIndex::new(n),
            data: vec![Energy::ZERO; triangular_len(n)],
        }
    }

    pub fn n(&self) -> usize {
        self.jindx.n()
    }

    pub fn set(&mut self, i: usize, j: usize, energy: Energy) {
        let offset = self.jindx.pair(i, j);
        self.data[offset] = energy;
    }

    pub fn add(&mut self, i: usize, j: usize, delta: Energy) {
        let offset = self.jindx.pair(i, j);
        self.data[offset] += delta;
    }

    pub fn get(&self, i: usize, j: usize) -> Energy {
        self.data[self.jindx.pair(i, j)]
    }
}

/// An inclusive range `[start, end]` of partner positions sharing one
/// adjustment for a fixed anchor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BpInterval {
    pub start: usize,
    pub end: usize,
    pub energy: Energy,
}

impl BpInterval {
    #[inline]
    pub fn contains(&self, j: usize) -> bool {
        self.start <= j && j <= self.end
    }
}

/// Windowed base-pair storage.
///
/// Per anchor position, a list of [`BpInterval`]s kept sorted by
/// non-decreasing `start`. Overlapping and duplicate intervals are stored as
/// separate entries; their energies are summed at query time. The engine
/// reads from a materialized local row, recomputed on every window slide.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowPaired {
    n: usize,
    lists: Vec<Vec<BpInterval>>,
    local: Vec<Vec<Energy>>,
    exp_local: Vec<Vec<f64>>,
}

impl WindowPaired {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            lists: vec![Vec::new(); n + 2],
            local: vec![Vec::new(); n + 2],
            exp_local: vec![Vec::new(); n + 2],
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Inserts `[start, end]` with `energy` into the list for anchor `i`,
    /// before the first entry whose start exceeds the new start. Existing
    /// equal or overlapping intervals are left alone; duplicates coexist.
    pub fn store(&mut self, i: usize, start: usize, end: usize, energy: Energy) {
        debug_assert!(1 <= i && i <= self.n);
        debug_assert!(start <= end);
        let list = &mut self.lists[i];
        let slot = list
            .iter()
            .position(|iv| iv.start > start)
            .unwrap_or(list.len());
        list.insert(slot, BpInterval { start, end, energy });
    }

    /// Sum of every interval at anchor `i` that contains partner `j`.
    ///
    /// The sort order gives an early exit: once an interval starts beyond
    /// `j`, no later interval can contain it. Intervals ending before `j` are
    /// skipped without terminating the scan.
    pub fn query(&self, i: usize, j: usize) -> Energy {
        let mut total = Energy::ZERO;
        for interval in &self.lists[i] {
            if interval.start > j {
                break;
            }
            if interval.end < j {
                continue;
            }
            total += interval.energy;
        }
        total
    }

    pub fn intervals(&self, i: usize) -> &[BpInterval] {
        &self.lists[i]
    }

    /// Materializes pair adjustments for the window anchored at `i`.
    ///
    /// Offsets run from one past the minimum loop size up to the window size,
    /// stopping at the sequence end. The previous row for `i` is discarded;
    /// nothing survives a slide.
    pub fn prepare(&mut self, i: usize, window_size: usize, min_loop_size: usize) {
        debug_assert!(1 <= i && i <= self.n);
        let mut row = vec![Energy::ZERO; window_size];
        for k in (min_loop_size + 1)..window_size {
            let j = i + k;
            if j > self.n {
                break;
            }
            row[k] = self.query(i, j);
        }
        self.local[i] = row;
    }

    /// Derives Boltzmann weights for the materialized row at anchor `i`.
    pub fn prepare_exp(&mut self, i: usize, kt: f64) {
        debug_assert!(1 <= i && i <= self.n);
        self.exp_local[i] = self.local[i].iter().map(|e| e.boltzmann(kt)).collect();
    }

    /// Materialized adjustment for the pair `(i, i + k)`; zero when the
    /// offset lies outside the prepared row.
    pub fn energy_local(&self, i: usize, k: usize) -> Energy {
        self.local
            .get(i)
            .and_then(|row| row.get(k))
            .copied()
            .unwrap_or(Energy::ZERO)
    }

    pub fn weight_local(&self, i: usize, k: usize) -> f64 {
        self.exp_local
            .get(i)
            .and_then(|row| row.get(k))
            .copied()
            .unwrap_or(1.0)
    }
}
