//! # Ribofold Core Library
//!
//! A library for nucleic-acid secondary-structure prediction that lets callers
//! bias the folding energy model with "soft constraints": additive per-position
//! and per-base-pair free-energy adjustments that favor or penalize particular
//! folds without forbidding them.
//!
//! ## Architectural Philosophy
//!
//! The library is split into two layers with a strict dependency direction:
//!
//! - **[`core`]: The Foundation.** Unit conventions for fixed-point free
//!   energies and their Boltzmann-weighted counterparts, thermodynamic model
//!   parameters, and the triangular addressing schemes shared with the folding
//!   engine's dynamic-programming matrices.
//!
//! - **[`constraints`]: The Soft-Constraint Subsystem.** The stateful
//!   container holding constraint energies in one of two physical layouts: a
//!   dense layout with eagerly precomputed prefix sums and a full triangular
//!   pair matrix for whole-sequence folding, and a windowed layout with sparse
//!   per-position interval lists that are materialized into a bounded local
//!   neighborhood as the folding window slides along the sequence. The
//!   subsystem also derives partition-function weights from the stored free
//!   energies and carries the user-registered scoring hooks the folding engine
//!   may invoke.
//!
//! The dynamic-programming recurrences themselves live in the folding engine,
//! which consumes the energies stored here as additive terms; this crate never
//! folds anything on its own.

pub mod constraints;
pub mod core;
