//! Error kinds reported at initialization time.
//!
//! Once [`crate::Engine::iterate`] has been entered, no recoverable errors are defined: the only
//! terminal conditions are reaching `max_iters` and an internal invariant violation, which aborts
//! via `debug_assert!` rather than propagating. I/O failures in the diagnostics layer are
//! reported through `eyre::Result` instead, since they are not fatal to the simulation.

use thiserror::Error;

/// Failures while interpreting CLI/engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown option: {0}")]
    UnknownOption(String),
    #[error("malformed number for option {option}: {value}")]
    MalformedNumber { option: String, value: String },
    #[error("world dimensions must be positive, got {width}x{height}")]
    InvalidWorldSize { width: i64, height: i64 },
}

/// Failures while parsing the chemistry grammar of §4.7.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("line {line}: unknown species {name:?}")]
    UnknownSpecies { line: usize, name: String },
    #[error("line {line}: malformed {record} record: {detail}")]
    MalformedRecord {
        line: usize,
        record: &'static str,
        detail: String,
    },
    #[error("line {line}: reaction already has both product alternatives")]
    DuplicateReaction { line: usize },
    #[error("line {line}: only one `init` record is permitted")]
    DuplicateInit { line: usize },
    #[error("element {name:?} declared more than once")]
    DuplicateElement { name: String },
}

/// Top-level error returned from [`crate::Engine::new`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("failed to read chemistry file {path:?}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
