//! # Soft-Constraint Module
//!
//! Storage and derivation of user-supplied soft constraints: additive energy
//! adjustments on unpaired positions, base pairs, and stacked pairs that bias
//! the folding engine's decisions without forbidding any structure.
//!
//! ## Overview
//!
//! The module is organized around the two access patterns the folding engines
//! impose:
//!
//! - **Container** ([`container`]) - The [`SoftConstraints`](container::SoftConstraints)
//!   object owning exactly one of the two storage variants, plus the
//!   comparative-fold wrapper
//! - **Unpaired Storage** ([`unpaired`]) - Prefix-sum tables giving O(1)
//!   range sums over unpaired stretches, dense or window-local
//! - **Pair Storage** ([`paired`]) - The dense triangular pair matrix and the
//!   sparse per-position interval lists of the windowed variant
//! - **Boltzmann Derivation** ([`boltzmann`]) - Explicitly triggered
//!   recomputation of partition-function weights from stored free energies
//! - **Extension Hooks** ([`hooks`]) - User-registered scoring callbacks and
//!   the opaque user context, stored here and invoked only by the engine
//! - **Errors** ([`error`]) - The caller-facing error taxonomy
//!
//! Mutation never derives weights implicitly; staleness after a mutation is a
//! documented caller contract (re-derive before reading weights).

pub mod boltzmann;
pub mod container;
pub mod error;
pub mod hooks;
pub mod paired;
pub mod unpaired;

pub use container::{ComparativeConstraints, Options, SoftConstraints, VariantKind};
pub use error::ConstraintError;
