// Sonify Testdata - Simulated metric source
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Sonify Testdata
//!
//! Simulated metric readings for running Sonify without a cluster.
//!
//! - **Profiles**: uniform, exponential, integer and state distributions
//! - **Seeding**: reproducible runs with a fixed seed
//! - **Failure injection**: a configurable fraction of samples fail
//! - **Overrides**: per-metric profiles from a YAML file
//!
//! ## Quick Start
//!
//! ```rust
//! use sonify::Registry;
//! use sonify_testdata::SimulatedSampler;
//!
//! let registry = Registry::cluster_defaults().unwrap();
//! let sampler = SimulatedSampler::new().with_seed(42);
//! # let _ = (registry, sampler);
//! ```

pub mod profile;
pub mod simulator;

pub use profile::{load_profiles, Draw, MetricProfile, ProfileSet};
pub use simulator::{in_domain, SimulatedSampler};
