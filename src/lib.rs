//! A lattice-based stochastic chemistry simulator.
//!
//! Atoms occupy cells of a toroidal grid and, every iteration, attempt one random move and (if
//! enabled) one probabilistic reaction with a neighbor. Both sweeps use a claim/commit protocol
//! so a single-threaded, row-major scan resolves collisions deterministically, without a global
//! lock or a second visitation order. See [`Engine`] for the entry point.

pub mod atom;
pub mod config;
pub mod diagnostics;
pub mod dsfmt;
pub mod element;
mod engine;
pub mod error;
pub mod loader;
pub mod reaction;
pub mod world;

pub use atom::AtomView;
pub use config::EngineConfig;
pub use element::Element;
pub use engine::{CensusRow, Engine};
pub use error::{ConfigError, EngineError, LoadError};
