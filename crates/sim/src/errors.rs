use std::path::PathBuf;
use thiserror::Error;

/// Problems detected while loading or validating a configuration.
///
/// Every variant is raised before the first cycle runs; a simulation is
/// never constructed from a configuration that fails validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The mutation-advantage table had no header line at all.
    #[error("mutation-advantage table is missing its header (expected `gene,kind,size,advantage`)")]
    MissingHeader,

    /// The first non-comment line was not the expected header.
    #[error("unexpected mutation-advantage table header `{found}` (expected `gene,kind,size,advantage`)")]
    InvalidHeader { found: String },

    /// A data row could not be parsed.
    #[error("malformed mutation-advantage table row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// A parameter value was out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A builder was finalised without a required value.
    #[error("missing required parameter: {0}")]
    MissingRequired(&'static str),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Lookups against the genome arena that named an index it never handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArenaError {
    #[error("genome index {0} has not been allocated")]
    UnknownGenome(usize),
}

/// A cycle barrier was poisoned because one participant failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BarrierError {
    #[error("cycle barrier poisoned by a failed participant")]
    Poisoned,
}

/// Errors surfaced by the simulation coordinator.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Arena(#[from] ArenaError),

    /// A shard worker failed or panicked while advancing a cycle. The whole
    /// run is aborted; no later cycle is attempted.
    #[error("shard {shard} failed during cycle {cycle}: {reason}")]
    WorkerFailed {
        shard: usize,
        cycle: i64,
        reason: String,
    },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    /// `step` was called on a run that already hit a fatal error.
    #[error("simulation was aborted by an earlier failure")]
    Aborted,
}
