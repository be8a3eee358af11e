use crate::core::index::{IIndex, triangular_len};
use crate::core::params::PfParams;

use super::paired::PairMatrix;
use super::unpaired::CumulativeTable;

/// Boltzmann-weighted mirror of the dense [`CumulativeTable`].
///
/// `get(i, 0)` is always 1.0: the empty subsequence has unit weight.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpCumulative {
    rows: Vec<Vec<f64>>,
}

impl ExpCumulative {
    pub fn get(&self, i: usize, k: usize) -> f64 {
        self.rows
            .get(i)
            .and_then(|row| row.get(k))
            .copied()
            .unwrap_or(1.0)
    }
}

/// Boltzmann-weighted mirror of the dense [`PairMatrix`].
///
/// The weight table is addressed row-major through [`IIndex`], matching the
/// engine's partition-function matrices, while the free-energy side stays
/// column-major. Derivation translates between the two addressings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpPairMatrix {
    iindx: IIndex,
    weights: Vec<f64>,
}

impl ExpPairMatrix {
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.weights[self.iindx.pair(i, j)]
    }
}

/// Recomputes unpaired Boltzmann weights from a cumulative free-energy table.
///
/// Pure element-wise transform; running it twice on unchanged input yields
/// bit-identical weights.
pub(crate) fn derive_unpaired(table: &CumulativeTable, params: &PfParams) -> ExpCumulative {
    let n = table.n();
    let mut rows = Vec::with_capacity(n + 2);
    rows.push(vec![1.0; n + 2]);
    for i in 1..=n {
        let mut row = vec![1.0; n - i + 2];
        for (k, slot) in row.iter_mut().enumerate().skip(1) {
            *slot = table.get(i, k).boltzmann(params.kt);
        }
        rows.push(row);
    }
    ExpCumulative { rows }
}

/// Recomputes pair Boltzmann weights from a triangular free-energy matrix.
pub(crate) fn derive_pairs(matrix: &PairMatrix, params: &PfParams) -> ExpPairMatrix {
    let n = matrix.n();
    let iindx = IIndex::new(n);
    let mut weights = vec![0.0; triangular_len(n)];
    for i in 1..n {
        for j in (i + 1)..=n {
            weights[iindx.pair(i, j)] = matrix.get(i, j).boltzmann(params.kt);
        }
    }
    ExpPairMatrix { iindx, weights }
}
