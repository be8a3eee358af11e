//! # Core Module
//!
//! Fundamental conventions shared between the soft-constraint subsystem and
//! the folding engine.
//!
//! ## Overview
//!
//! - **Energy Units** ([`energy`]) - Fixed-point free energies and their
//!   conversion to Boltzmann weights
//! - **Model Parameters** ([`params`]) - Temperature, thermal energy, and
//!   sliding-window settings
//! - **Matrix Addressing** ([`index`]) - Triangular index maps for pair
//!   matrices, identical to the addressing used by the engine's
//!   dynamic-programming matrices

pub mod energy;
pub mod index;
pub mod params;
