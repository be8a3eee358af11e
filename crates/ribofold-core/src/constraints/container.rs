use tracing::{debug, warn};

use crate::core::energy::Energy;
use crate::core::params::{ModelParams, PfParams};

use super::boltzmann::{ExpCumulative, ExpPairMatrix, derive_pairs, derive_unpaired};
use super::error::ConstraintError;
use super::hooks::{BacktrackHook, Disposer, EnergyHook, ExpEnergyHook, Hooks};
use super::paired::{PairMatrix, WindowPaired};
use super::unpaired::{CumulativeTable, WindowUnpaired};

/// Physical layout of a constraint container, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    /// Whole-sequence storage: eager prefix sums and a full triangular pair
    /// matrix, O(1) lookups everywhere.
    Dense,
    /// Sliding-window storage: sparse interval lists materialized into a
    /// bounded local neighborhood per anchor.
    Windowed,
}

/// Option flags steering the public mutation entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    /// Re-derive Boltzmann weights after the mutation (partition-function
    /// mode).
    pub partition_function: bool,
    /// Select windowed storage when a container is created lazily.
    pub window: bool,
}

impl Options {
    pub const DEFAULT: Options = Options {
        partition_function: false,
        window: false,
    };
    pub const PF: Options = Options {
        partition_function: true,
        window: false,
    };
    pub const WINDOW: Options = Options {
        partition_function: false,
        window: true,
    };

    pub fn with_partition_function(mut self) -> Self {
        self.partition_function = true;
        self
    }

    pub fn with_window(mut self) -> Self {
        self.window = true;
        self
    }
}

/// Dense storage: every sub-table is lazily allocated on first use and fully
/// populated once allocated.
#[derive(Debug)]
struct DenseStore {
    n: usize,
    unpaired: Option<CumulativeTable>,
    exp_unpaired: Option<ExpCumulative>,
    pairs: Option<PairMatrix>,
    exp_pairs: Option<ExpPairMatrix>,
}

impl DenseStore {
    fn new(n: usize) -> Self {
        Self {
            n,
            unpaired: None,
            exp_unpaired: None,
            pairs: None,
            exp_pairs: None,
        }
    }

    fn is_empty(&self) -> bool {
        self.unpaired.is_none()
            && self.exp_unpaired.is_none()
            && self.pairs.is_none()
            && self.exp_pairs.is_none()
    }
}

#[derive(Debug)]
struct WindowStore {
    unpaired: WindowUnpaired,
    pairs: WindowPaired,
}

impl WindowStore {
    fn new(n: usize) -> Self {
        Self {
            unpaired: WindowUnpaired::new(n),
            pairs: WindowPaired::new(n),
        }
    }

    fn is_empty(&self) -> bool {
        let n = self.unpaired.n();
        (1..=n).all(|i| {
            self.unpaired.per_position(i) == Energy::ZERO && self.pairs.intervals(i).is_empty()
        })
    }
}

#[derive(Debug)]
enum Storage {
    Dense(DenseStore),
    Windowed(WindowStore),
}

/// Soft constraints for one sequence: user-supplied additive energy
/// adjustments that bias the fold without forbidding anything.
///
/// Exactly one storage variant is active for the lifetime of the container;
/// switching variants releases the old storage completely first. All
/// positions are 1-indexed and validated against the sequence length:
/// out-of-range mutations are logged and skipped, never applied partially.
///
/// Mutations leave previously derived Boltzmann weights stale on purpose.
/// Derivation costs O(n²) and is paid only when the caller asks for it,
/// either through [`Options::partition_function`] on a mutation or through
/// the explicit `derive_*_weights` calls.
#[derive(Debug)]
pub struct SoftConstraints {
    n: usize,
    storage: Storage,
    stack: Option<Vec<Energy>>,
    pf: Option<PfParams>,
    hooks: Hooks,
}

impl SoftConstraints {
    /// Creates a container with dense whole-sequence storage.
    pub fn dense(n: usize) -> Self {
        Self {
            n,
            storage: Storage::Dense(DenseStore::new(n)),
            stack: None,
            pf: None,
            hooks: Hooks::new(),
        }
    }

    /// Creates a container with sliding-window storage.
    pub fn windowed(n: usize) -> Self {
        Self {
            n,
            storage: Storage::Windowed(WindowStore::new(n)),
            stack: None,
            pf: None,
            hooks: Hooks::new(),
        }
    }

    /// Lazily creates the container a fold context owns, picking the variant
    /// from the option flags of the first mutation request.
    pub fn get_or_init(slot: &mut Option<SoftConstraints>, n: usize, options: Options) -> &mut Self {
        slot.get_or_insert_with(|| {
            if options.window {
                Self::windowed(n)
            } else {
                Self::dense(n)
            }
        })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn kind(&self) -> VariantKind {
        match self.storage {
            Storage::Dense(_) => VariantKind::Dense,
            Storage::Windowed(_) => VariantKind::Windowed,
        }
    }

    /// True while no constraint has been stored and no table allocated.
    pub fn is_empty(&self) -> bool {
        let storage_empty = match &self.storage {
            Storage::Dense(store) => store.is_empty(),
            Storage::Windowed(store) => store.is_empty(),
        };
        storage_empty && self.stack.is_none()
    }

    /// Drops every stored constraint, returning the container to the empty
    /// state of its current variant. Hooks and user data stay registered;
    /// they belong to the container, not to one set of constraints.
    pub fn remove(&mut self) {
        self.storage = match self.storage {
            Storage::Dense(_) => Storage::Dense(DenseStore::new(self.n)),
            Storage::Windowed(_) => Storage::Windowed(WindowStore::new(self.n)),
        };
        self.stack = None;
    }

    /// Releases the current storage completely and installs empty dense
    /// storage.
    pub fn reset_dense(&mut self) {
        self.storage = Storage::Dense(DenseStore::new(self.n));
        self.stack = None;
    }

    /// Releases the current storage completely and installs empty windowed
    /// storage.
    pub fn reset_windowed(&mut self) {
        self.storage = Storage::Windowed(WindowStore::new(self.n));
        self.stack = None;
    }

    /// Supplies the partition-function parameters used by every weight
    /// derivation.
    pub fn set_pf_params(&mut self, params: PfParams) {
        self.pf = Some(params);
    }

    fn position_in_range(&self, operation: &'static str, i: usize) -> bool {
        if i < 1 || i > self.n {
            warn!(
                "{operation}: nucleotide position {i} out of range (sequence length: {n})",
                n = self.n
            );
            return false;
        }
        true
    }

    fn pair_in_range(&self, operation: &'static str, i: usize, j: usize) -> bool {
        if i < 1 || j <= i || j > self.n {
            warn!(
                "{operation}: base pair ({i}, {j}) out of range (sequence length: {n})",
                n = self.n
            );
            return false;
        }
        true
    }

    /// Bulk-replaces the per-nucleotide adjustments and rebuilds the full
    /// cumulative table. Dense storage only; `values[p - 1]` is the
    /// adjustment of position `p` in kcal/mol.
    pub fn set_unpaired(&mut self, values: &[f64], options: Options) -> Result<(), ConstraintError> {
        if values.len() != self.n {
            return Err(ConstraintError::LengthMismatch {
                expected: self.n,
                actual: values.len(),
            });
        }
        let store = self.dense_store_mut("set_unpaired")?;

        let mut per_nt = vec![Energy::ZERO; store.n + 1];
        for (p, value) in values.iter().enumerate() {
            per_nt[p + 1] = Energy::from_kcal(*value);
        }

        let table = store
            .unpaired
            .get_or_insert_with(|| CumulativeTable::new(store.n));
        table.rebuild(&per_nt);

        if options.partition_function {
            self.derive_unpaired_weights();
        }
        Ok(())
    }

    /// Adds `kcal` to the unpaired adjustment of position `i`.
    ///
    /// Dense storage folds the increment into every cumulative entry covering
    /// `i`; windowed storage updates the raw per-position value, and the
    /// local cumulative rows pick it up on the next [`prepare`](Self::prepare).
    pub fn add_unpaired(&mut self, i: usize, kcal: f64, options: Options) {
        if !self.position_in_range("add_unpaired", i) {
            return;
        }
        let delta = Energy::from_kcal(kcal);
        match &mut self.storage {
            Storage::Dense(store) => {
                let n = store.n;
                store
                    .unpaired
                    .get_or_insert_with(|| CumulativeTable::new(n))
                    .add_at(i, delta);
            }
            Storage::Windowed(store) => store.unpaired.add(i, delta),
        }
        if options.partition_function && matches!(self.storage, Storage::Dense(_)) {
            self.derive_unpaired_weights();
        }
    }

    /// Cumulative unpaired adjustment of the k-length subsequence starting at
    /// `i`. Windowed storage answers from the row materialized by the last
    /// [`prepare`](Self::prepare) for anchor `i`.
    pub fn unpaired_energy(&self, i: usize, k: usize) -> Energy {
        match &self.storage {
            Storage::Dense(store) => store
                .unpaired
                .as_ref()
                .map(|table| table.get(i, k))
                .unwrap_or(Energy::ZERO),
            Storage::Windowed(store) => store.unpaired.energy(i, k),
        }
    }

    /// Boltzmann weight of the k-length subsequence starting at `i`; 1.0
    /// wherever no weight has been derived.
    pub fn unpaired_weight(&self, i: usize, k: usize) -> f64 {
        match &self.storage {
            Storage::Dense(store) => store
                .exp_unpaired
                .as_ref()
                .map(|table| table.get(i, k))
                .unwrap_or(1.0),
            Storage::Windowed(store) => store.unpaired.weight(i, k),
        }
    }

    /// Bulk-replaces the pair adjustments from a full matrix. Dense storage
    /// only; `matrix` is 1-indexed with `n + 1` rows of `n + 1` columns and
    /// only entries with `i < j` are read.
    pub fn set_pairs(&mut self, matrix: &[Vec<f64>], options: Options) -> Result<(), ConstraintError> {
        if matrix.len() != self.n + 1 || matrix.iter().any(|row| row.len() != self.n + 1) {
            return Err(ConstraintError::LengthMismatch {
                expected: self.n + 1,
                actual: matrix.len(),
            });
        }
        let store = self.dense_store_mut("set_pairs")?;

        let mut pairs = PairMatrix::new(store.n);
        for i in 1..store.n {
            for j in (i + 1)..=store.n {
                pairs.set(i, j, Energy::from_kcal(matrix[i][j]));
            }
        }
        store.pairs = Some(pairs);

        if options.partition_function {
            self.derive_pair_weights();
        }
        Ok(())
    }

    /// Adds `kcal` to the adjustment of the pair `(i, j)`.
    ///
    /// Dense storage updates the triangular matrix in place; windowed storage
    /// records the single-partner interval `[j, j]` at anchor `i`, to be
    /// materialized on the next [`prepare`](Self::prepare).
    pub fn add_pair(&mut self, i: usize, j: usize, kcal: f64, options: Options) {
        if !self.pair_in_range("add_pair", i, j) {
            return;
        }
        let delta = Energy::from_kcal(kcal);
        match &mut self.storage {
            Storage::Dense(store) => {
                let n = store.n;
                store
                    .pairs
                    .get_or_insert_with(|| PairMatrix::new(n))
                    .add(i, j, delta);
            }
            Storage::Windowed(store) => store.pairs.store(i, j, j, delta),
        }
        if options.partition_function && matches!(self.storage, Storage::Dense(_)) {
            self.derive_pair_weights();
        }
    }

    /// Adjustment of the pair `(i, j)`; zero for pairs without an entry.
    /// Windowed storage answers from the row materialized for anchor `i`.
    pub fn pair_energy(&self, i: usize, j: usize) -> Energy {
        if i < 1 || j <= i || j > self.n {
            return Energy::ZERO;
        }
        match &self.storage {
            Storage::Dense(store) => store
                .pairs
                .as_ref()
                .map(|pairs| pairs.get(i, j))
                .unwrap_or(Energy::ZERO),
            Storage::Windowed(store) => store.pairs.energy_local(i, j - i),
        }
    }

    /// Boltzmann weight of the pair `(i, j)`; 1.0 wherever no weight has
    /// been derived.
    pub fn pair_weight(&self, i: usize, j: usize) -> f64 {
        if i < 1 || j <= i || j > self.n {
            return 1.0;
        }
        match &self.storage {
            Storage::Dense(store) => store
                .exp_pairs
                .as_ref()
                .map(|pairs| pairs.get(i, j))
                .unwrap_or(1.0),
            Storage::Windowed(store) => store.pairs.weight_local(i, j - i),
        }
    }

    /// Bulk-replaces the per-position stacking adjustments; works for both
    /// storage variants.
    pub fn set_stack(&mut self, values: &[f64]) -> Result<(), ConstraintError> {
        if values.len() != self.n {
            return Err(ConstraintError::LengthMismatch {
                expected: self.n,
                actual: values.len(),
            });
        }
        let mut stack = vec![Energy::ZERO; self.n + 1];
        for (p, value) in values.iter().enumerate() {
            stack[p + 1] = Energy::from_kcal(*value);
        }
        self.stack = Some(stack);
        Ok(())
    }

    /// Adds `kcal` to the stacking adjustment of position `i`; allocates the
    /// stack table on first use.
    pub fn add_stack(&mut self, i: usize, kcal: f64) {
        if !self.position_in_range("add_stack", i) {
            return;
        }
        let stack = self
            .stack
            .get_or_insert_with(|| vec![Energy::ZERO; self.n + 1]);
        stack[i] += Energy::from_kcal(kcal);
    }

    /// Stacking adjustment of position `i`; zero without an entry.
    pub fn stack_energy(&self, i: usize) -> Energy {
        self.stack
            .as_ref()
            .and_then(|stack| stack.get(i))
            .copied()
            .unwrap_or(Energy::ZERO)
    }

    /// Recomputes the local unpaired and pair rows for the window anchored at
    /// `i`. Must be called on every anchor advance; nothing materialized for
    /// one anchor survives a slide.
    ///
    /// With [`Options::partition_function`] set, the Boltzmann rows for the
    /// anchor are derived in the same pass. On dense storage this is a no-op:
    /// dense tables are complete from the moment they are built.
    pub fn prepare(&mut self, i: usize, model: &ModelParams, options: Options) {
        if !self.position_in_range("prepare", i) {
            return;
        }
        let kt = self.pf.map(|pf| pf.kt);
        match &mut self.storage {
            Storage::Dense(_) => {
                debug!("prepare: dense storage needs no per-anchor materialization");
            }
            Storage::Windowed(store) => {
                store.unpaired.prepare(i, model.window_size);
                store
                    .pairs
                    .prepare(i, model.window_size, model.min_loop_size);

                if options.partition_function {
                    match kt {
                        Some(kt) => {
                            store.unpaired.prepare_exp(i, kt);
                            store.pairs.prepare_exp(i, kt);
                        }
                        None => warn!(
                            "prepare: partition-function weights requested but no parameters set"
                        ),
                    }
                }
            }
        }
    }

    /// Explicitly re-derives the dense unpaired Boltzmann weights from the
    /// current free energies. A no-op when no unpaired table exists or no
    /// partition-function parameters were supplied.
    pub fn derive_unpaired_weights(&mut self) {
        let Some(params) = self.pf else {
            warn!("derive_unpaired_weights: no partition-function parameters set");
            return;
        };
        if let Storage::Dense(store) = &mut self.storage {
            if let Some(table) = &store.unpaired {
                store.exp_unpaired = Some(derive_unpaired(table, &params));
            }
        }
    }

    /// Explicitly re-derives the dense pair Boltzmann weights from the
    /// current free energies. A no-op when no pair matrix exists or no
    /// partition-function parameters were supplied.
    pub fn derive_pair_weights(&mut self) {
        let Some(params) = self.pf else {
            warn!("derive_pair_weights: no partition-function parameters set");
            return;
        };
        if let Storage::Dense(store) = &mut self.storage {
            if let Some(pairs) = &store.pairs {
                store.exp_pairs = Some(derive_pairs(pairs, &params));
            }
        }
    }

    pub fn set_energy_hook(&mut self, hook: EnergyHook) {
        self.hooks.set_energy(hook);
    }

    pub fn set_exp_energy_hook(&mut self, hook: ExpEnergyHook) {
        self.hooks.set_exp_energy(hook);
    }

    pub fn set_backtrack_hook(&mut self, hook: BacktrackHook) {
        self.hooks.set_backtrack(hook);
    }

    pub fn set_user_data(&mut self, data: Box<dyn std::any::Any>, disposer: Option<Disposer>) {
        self.hooks.set_user_data(data, disposer);
    }

    /// The registered extension points, for the folding engine to invoke.
    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    fn dense_store_mut(
        &mut self,
        operation: &'static str,
    ) -> Result<&mut DenseStore, ConstraintError> {
        match &mut self.storage {
            Storage::Dense(store) => Ok(store),
            Storage::Windowed(_) => Err(ConstraintError::VariantMismatch {
                operation,
                required: VariantKind::Dense,
                active: VariantKind::Windowed,
            }),
        }
    }
}

/// Soft constraints for a comparative (aligned multi-sequence) fold: one
/// dense container per sequence.
///
/// Windowed storage is undefined for comparative folds; requesting it is a
/// no-op that allocates nothing.
#[derive(Debug)]
pub struct ComparativeConstraints {
    members: Vec<SoftConstraints>,
}

impl ComparativeConstraints {
    pub fn dense(n_seqs: usize, n: usize) -> Self {
        Self {
            members: (0..n_seqs).map(|_| SoftConstraints::dense(n)).collect(),
        }
    }

    /// Windowed storage is unsupported for comparative folds; nothing is
    /// allocated and the members keep their dense storage.
    pub fn init_windowed(&mut self) {
        debug!("init_windowed: windowed storage is undefined for comparative folds; ignoring");
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member(&self, s: usize) -> Option<&SoftConstraints> {
        self.members.get(s)
    }

    pub fn member_mut(&mut self, s: usize) -> Option<&mut SoftConstraints> {
        self.members.get_mut(s)
    }

    pub fn members(&self) -> &[SoftConstraints] {
        &self.members
    }

    /// Drops every member's stored constraints.
    pub fn remove_all(&mut self) {
        for member in &mut self.members {
            member.remove();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::params::PfParamsBuilder;
    use std::cell::Cell;
    use std::rc::Rc;

    fn pf() -> PfParams {
        PfParamsBuilder::new().temperature(37.0).build().unwrap()
    }

    fn window_model(window_size: usize, min_loop_size: usize) -> ModelParams {
        ModelParams {
            window_size,
            min_loop_size,
            ..ModelParams::default()
        }
    }

    #[test]
    fn get_or_init_selects_variant_from_options() {
        let mut slot = None;
        let sc = SoftConstraints::get_or_init(&mut slot, 20, Options::WINDOW);
        assert_eq!(sc.kind(), VariantKind::Windowed);

        // A second request reuses the existing container.
        let sc = SoftConstraints::get_or_init(&mut slot, 20, Options::DEFAULT);
        assert_eq!(sc.kind(), VariantKind::Windowed);

        let mut slot = None;
        let sc = SoftConstraints::get_or_init(&mut slot, 20, Options::DEFAULT);
        assert_eq!(sc.kind(), VariantKind::Dense);
    }

    #[test]
    fn out_of_range_mutations_are_skipped_without_allocation() {
        let mut sc = SoftConstraints::dense(10);
        sc.add_unpaired(0, 1.0, Options::DEFAULT);
        sc.add_unpaired(11, 1.0, Options::DEFAULT);
        sc.add_pair(0, 5, 1.0, Options::DEFAULT);
        sc.add_pair(3, 11, 1.0, Options::DEFAULT);
        sc.add_pair(7, 3, 1.0, Options::DEFAULT);
        sc.add_stack(11, 1.0);
        assert!(sc.is_empty());

        let mut sc = SoftConstraints::windowed(10);
        sc.add_unpaired(0, 1.0, Options::DEFAULT);
        sc.add_pair(5, 12, 1.0, Options::DEFAULT);
        assert!(sc.is_empty());
    }

    #[test]
    fn set_unpaired_builds_prefix_sums() {
        let mut sc = SoftConstraints::dense(4);
        sc.set_unpaired(&[0.1, -0.2, 0.0, 0.4], Options::DEFAULT)
            .unwrap();

        assert_eq!(sc.unpaired_energy(1, 0), Energy::ZERO);
        assert_eq!(sc.unpaired_energy(1, 1), Energy::from_raw(10));
        assert_eq!(sc.unpaired_energy(1, 2), Energy::from_raw(-10));
        assert_eq!(sc.unpaired_energy(1, 4), Energy::from_raw(30));
        assert_eq!(sc.unpaired_energy(2, 3), Energy::from_raw(20));
    }

    #[test]
    fn set_unpaired_rejects_wrong_length() {
        let mut sc = SoftConstraints::dense(4);
        let err = sc.set_unpaired(&[0.1, 0.2], Options::DEFAULT).unwrap_err();
        assert_eq!(
            err,
            ConstraintError::LengthMismatch {
                expected: 4,
                actual: 2
            }
        );
    }

    #[test]
    fn bulk_operations_require_dense_storage() {
        let mut sc = SoftConstraints::windowed(4);
        let err = sc
            .set_unpaired(&[0.0; 4], Options::DEFAULT)
            .unwrap_err();
        assert_eq!(
            err,
            ConstraintError::VariantMismatch {
                operation: "set_unpaired",
                required: VariantKind::Dense,
                active: VariantKind::Windowed,
            }
        );

        let matrix = vec![vec![0.0; 5]; 5];
        let err = sc.set_pairs(&matrix, Options::DEFAULT).unwrap_err();
        assert_eq!(
            err,
            ConstraintError::VariantMismatch {
                operation: "set_pairs",
                required: VariantKind::Dense,
                active: VariantKind::Windowed,
            }
        );
    }

    #[test]
    fn dense_add_unpaired_reflects_in_covering_windows() {
        let mut sc = SoftConstraints::dense(10);
        sc.add_unpaired(3, 0.2, Options::DEFAULT);
        sc.add_unpaired(3, 0.3, Options::DEFAULT);

        assert_eq!(sc.unpaired_energy(1, 5), Energy::from_raw(50));
        assert_eq!(sc.unpaired_energy(3, 1), Energy::from_raw(50));
        assert_eq!(sc.unpaired_energy(4, 7), Energy::ZERO);
    }

    #[test]
    fn set_pairs_round_trips_fixed_point() {
        let n = 5;
        let mut matrix = vec![vec![0.0; n + 1]; n + 1];
        matrix[1][4] = -1.25;
        matrix[2][5] = 0.333;

        let mut sc = SoftConstraints::dense(n);
        sc.set_pairs(&matrix, Options::DEFAULT).unwrap();

        for i in 1..n {
            for j in (i + 1)..=n {
                assert_eq!(sc.pair_energy(i, j), Energy::from_kcal(matrix[i][j]));
            }
        }
    }

    #[test]
    fn dense_add_pair_is_additive() {
        let mut split = SoftConstraints::dense(10);
        split.add_pair(2, 8, 0.3, Options::DEFAULT);
        split.add_pair(2, 8, 0.5, Options::DEFAULT);

        let mut single = SoftConstraints::dense(10);
        single.add_pair(2, 8, 0.8, Options::DEFAULT);

        assert_eq!(split.pair_energy(2, 8), single.pair_energy(2, 8));
    }

    #[test]
    fn pair_energy_is_zero_for_missing_entries() {
        let sc = SoftConstraints::dense(10);
        assert_eq!(sc.pair_energy(2, 8), Energy::ZERO);

        let mut sc = SoftConstraints::dense(10);
        sc.add_pair(2, 8, 0.5, Options::DEFAULT);
        assert_eq!(sc.pair_energy(3, 9), Energy::ZERO);
    }

    #[test]
    fn windowed_pair_constraint_materializes_at_expected_offset() {
        // Sequence length 10, window size 5, minimum loop size 2.
        let mut sc = SoftConstraints::windowed(10);
        sc.add_pair(1, 5, 0.5, Options::WINDOW);
        sc.prepare(1, &window_model(5, 2), Options::WINDOW);

        assert_eq!(sc.pair_energy(1, 5), Energy::from_raw(50));
        for j in [2, 3, 4] {
            assert_eq!(sc.pair_energy(1, j), Energy::ZERO, "partner {j}");
        }
    }

    #[test]
    fn windowed_disjoint_pairs_stay_independent() {
        let mut sc = SoftConstraints::windowed(20);
        sc.add_pair(1, 5, 0.5, Options::WINDOW);
        sc.add_pair(1, 8, -0.2, Options::WINDOW);
        sc.prepare(1, &window_model(10, 2), Options::WINDOW);

        assert_eq!(sc.pair_energy(1, 5), Energy::from_raw(50));
        assert_eq!(sc.pair_energy(1, 8), Energy::from_raw(-20));
    }

    #[test]
    fn windowed_unpaired_cumulates_within_window() {
        let mut sc = SoftConstraints::windowed(10);
        sc.add_unpaired(2, 0.1, Options::WINDOW);
        sc.add_unpaired(3, 0.1, Options::WINDOW);
        sc.prepare(2, &window_model(5, 2), Options::WINDOW);

        assert_eq!(sc.unpaired_energy(2, 0), Energy::ZERO);
        assert_eq!(sc.unpaired_energy(2, 1), Energy::from_raw(10));
        assert_eq!(sc.unpaired_energy(2, 2), Energy::from_raw(20));
        assert_eq!(sc.unpaired_energy(2, 5), Energy::from_raw(20));
    }

    #[test]
    fn stack_constraints_work_on_both_variants() {
        let mut dense = SoftConstraints::dense(6);
        dense.set_stack(&[0.0, 0.1, 0.0, 0.0, 0.0, -0.3]).unwrap();
        dense.add_stack(2, 0.1);
        assert_eq!(dense.stack_energy(2), Energy::from_raw(20));
        assert_eq!(dense.stack_energy(6), Energy::from_raw(-30));
        assert_eq!(dense.stack_energy(3), Energy::ZERO);

        let mut windowed = SoftConstraints::windowed(6);
        windowed.add_stack(4, -0.5);
        assert_eq!(windowed.stack_energy(4), Energy::from_raw(-50));
    }

    #[test]
    fn pf_option_derives_weights_on_mutation() {
        let mut sc = SoftConstraints::dense(6);
        sc.set_pf_params(pf());
        sc.add_unpaired(2, 1.0, Options::PF);

        let weight = sc.unpaired_weight(2, 1);
        assert!(weight < 1.0);
        assert_eq!(weight, Energy::from_kcal(1.0).boltzmann(pf().kt));
        assert_eq!(sc.unpaired_weight(4, 2), 1.0);
    }

    #[test]
    fn weights_go_stale_until_explicitly_rederived() {
        let mut sc = SoftConstraints::dense(6);
        sc.set_pf_params(pf());
        sc.add_pair(1, 6, 1.0, Options::PF);
        let stale = sc.pair_weight(1, 6);

        // Mutation without the PF flag leaves the old weights in place.
        sc.add_pair(1, 6, 1.0, Options::DEFAULT);
        assert_eq!(sc.pair_weight(1, 6), stale);

        sc.derive_pair_weights();
        assert_eq!(sc.pair_weight(1, 6), Energy::from_kcal(2.0).boltzmann(pf().kt));
    }

    #[test]
    fn derivation_without_free_energies_is_a_noop() {
        let mut sc = SoftConstraints::dense(6);
        sc.set_pf_params(pf());
        sc.derive_unpaired_weights();
        sc.derive_pair_weights();

        assert!(sc.is_empty());
        assert_eq!(sc.unpaired_weight(1, 1), 1.0);
        assert_eq!(sc.pair_weight(1, 4), 1.0);
    }

    #[test]
    fn windowed_prepare_with_pf_derives_local_weights() {
        let mut sc = SoftConstraints::windowed(10);
        sc.set_pf_params(pf());
        sc.add_pair(1, 5, 0.5, Options::WINDOW);
        sc.prepare(1, &window_model(5, 2), Options::WINDOW.with_partition_function());

        assert_eq!(sc.pair_weight(1, 5), Energy::from_raw(50).boltzmann(pf().kt));
        assert_eq!(sc.pair_weight(1, 4), 1.0);
    }

    #[test]
    fn remove_returns_container_to_empty_state() {
        let mut sc = SoftConstraints::dense(8);
        sc.add_unpaired(3, 0.5, Options::DEFAULT);
        sc.add_pair(2, 7, -0.5, Options::DEFAULT);
        sc.add_stack(5, 0.1);
        assert!(!sc.is_empty());

        sc.remove();
        assert!(sc.is_empty());
        assert_eq!(sc.kind(), VariantKind::Dense);
        assert_eq!(sc.unpaired_energy(3, 1), Energy::ZERO);
        assert_eq!(sc.pair_energy(2, 7), Energy::ZERO);
    }

    #[test]
    fn reset_switches_the_storage_variant() {
        let mut sc = SoftConstraints::dense(8);
        sc.add_unpaired(3, 0.5, Options::DEFAULT);

        sc.reset_windowed();
        assert_eq!(sc.kind(), VariantKind::Windowed);
        assert!(sc.is_empty());

        sc.reset_dense();
        assert_eq!(sc.kind(), VariantKind::Dense);
        assert!(sc.is_empty());
    }

    #[test]
    fn user_disposer_runs_once_when_container_drops() {
        let calls = Rc::new(Cell::new(0));
        let observed = calls.clone();

        let mut sc = SoftConstraints::dense(5);
        sc.set_user_data(
            Box::new(7u8),
            Some(Box::new(move |_| observed.set(observed.get() + 1))),
        );
        sc.remove(); // removing constraints must not finalize the context
        assert_eq!(calls.get(), 0);

        drop(sc);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn comparative_set_holds_one_dense_member_per_sequence() {
        let mut set = ComparativeConstraints::dense(3, 12);
        assert_eq!(set.len(), 3);
        for member in set.members() {
            assert_eq!(member.kind(), VariantKind::Dense);
        }

        set.member_mut(1)
            .unwrap()
            .add_pair(2, 9, 0.4, Options::DEFAULT);
        assert_eq!(
            set.member(1).unwrap().pair_energy(2, 9),
            Energy::from_raw(40)
        );
        assert_eq!(set.member(0).unwrap().pair_energy(2, 9), Energy::ZERO);
    }

    #[test]
    fn comparative_windowed_request_is_a_noop() {
        let mut set = ComparativeConstraints::dense(2, 12);
        set.init_windowed();

        for member in set.members() {
            assert_eq!(member.kind(), VariantKind::Dense);
            assert!(member.is_empty());
        }
    }

    #[test]
    fn comparative_remove_all_clears_members() {
        let mut set = ComparativeConstraints::dense(2, 12);
        set.member_mut(0)
            .unwrap()
            .add_unpaired(4, 0.2, Options::DEFAULT);
        set.remove_all();
        assert!(set.member(0).unwrap().is_empty());
    }
}
