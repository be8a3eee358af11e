use std::any::Any;
use std::fmt;

use crate::core::energy::Energy;

/// The structural decomposition step a scoring hook is asked to evaluate.
///
/// Mirrors the decomposition cases of the folding engine's dynamic-programming
/// recurrences; the hook receives the outer delimiters `(i, j)` and the inner
/// delimiters `(k, l)` of the step together with one of these tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decomposition {
    /// Pair (i, j) closes a hairpin loop.
    Hairpin,
    /// Pair (i, j) closes an interior loop with inner pair (k, l).
    InteriorLoop,
    /// Pair (i, j) closes a multibranch loop.
    MultibranchLoop,
    /// A helix contributing to a multibranch loop.
    MultibranchStem,
    /// Decomposition of the exterior (unfolded) segment.
    ExteriorLoop,
    /// A helix contributing to the exterior segment.
    ExteriorStem,
    /// A stretch of unpaired nucleotides.
    UnpairedStretch,
}

/// A base pair proposed by a backtrack hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasePair {
    pub i: usize,
    pub j: usize,
}

/// Free-energy scoring callback, queried by the folding engine per structural
/// decision.
pub type EnergyHook = Box<dyn Fn(usize, usize, usize, usize, Decomposition) -> Energy>;

/// Boltzmann-weighted counterpart of [`EnergyHook`], queried in
/// partition-function mode.
pub type ExpEnergyHook = Box<dyn Fn(usize, usize, usize, usize, Decomposition) -> f64>;

/// Backtrack-time callback, invoked while the engine reconstructs an optimal
/// or sampled structure.
pub type BacktrackHook = Box<dyn Fn(usize, usize, usize, usize, Decomposition) -> Vec<BasePair>>;

/// Finalizer for the opaque user context, invoked exactly once at container
/// teardown.
pub type Disposer = Box<dyn FnOnce(Box<dyn Any>)>;

/// User-registered extension points of a constraint container.
///
/// This subsystem only stores the hooks and hands them to the folding engine;
/// it never invokes them itself. Each registration point overwrites any
/// previous registration.
#[derive(Default)]
pub struct Hooks {
    energy: Option<EnergyHook>,
    exp_energy: Option<ExpEnergyHook>,
    backtrack: Option<BacktrackHook>,
    data: Option<Box<dyn Any>>,
    disposer: Option<Disposer>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_energy(&mut self, hook: EnergyHook) {
        self.energy = Some(hook);
    }

    pub fn set_exp_energy(&mut self, hook: ExpEnergyHook) {
        self.exp_energy = Some(hook);
    }

    pub fn set_backtrack(&mut self, hook: BacktrackHook) {
        self.backtrack = Some(hook);
    }

    /// Attaches an opaque context object with an optional finalizer.
    ///
    /// A previously attached context is finalized immediately, so the
    /// exactly-once guarantee holds across re-registration.
    pub fn set_user_data(&mut self, data: Box<dyn Any>, disposer: Option<Disposer>) {
        self.dispose();
        self.data = Some(data);
        self.disposer = disposer;
    }

    pub fn energy(&self) -> Option<&EnergyHook> {
        self.energy.as_ref()
    }

    pub fn exp_energy(&self) -> Option<&ExpEnergyHook> {
        self.exp_energy.as_ref()
    }

    pub fn backtrack(&self) -> Option<&BacktrackHook> {
        self.backtrack.as_ref()
    }

    pub fn user_data(&self) -> Option<&dyn Any> {
        self.data.as_deref()
    }

    pub fn user_data_mut(&mut self) -> Option<&mut dyn Any> {
        self.data.as_deref_mut()
    }

    // Both the disposer and the data are taken before the call, so a second
    // invocation finds nothing to finalize.
    fn dispose(&mut self) {
        let disposer = self.disposer.take();
        let data = self.data.take();
        if let (Some(disposer), Some(data)) = (disposer, data) {
            disposer(data);
        }
    }
}

impl Drop for Hooks {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("energy", &self.energy.is_some())
            .field("exp_energy", &self.exp_energy.is_some())
            .field("backtrack", &self.backtrack.is_some())
            .field("data", &self.data.is_some())
            .finish()
    }
}
