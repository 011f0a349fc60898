use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// Rejected configuration, detected before the allocation loop starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("corpus must hold at least one entry")]
    EmptyCorpus,

    #[error("pressure threshold must be positive")]
    ZeroThreshold,

    #[error("batch size must be positive")]
    ZeroBatchSize,

    #[error("batch bound must be positive")]
    ZeroBatchBound,

    #[error("corpus footprint of {footprint} bytes exceeds the sanity bound of {bound} bytes")]
    OversizedCorpus { footprint: usize, bound: usize },

    #[error("corpus footprint of {footprint} bytes cannot fit the heap budget of {budget} bytes")]
    CorpusExceedsBudget { footprint: usize, budget: usize },
}

/// An allocation request the heap refused.
///
/// This is the expected terminal condition of a run, not a bug: the whole
/// experiment exists to reach it. Produced by [`crate::Heap`] operations and
/// intercepted exactly once at the engine boundary.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
#[error("heap exhausted")]
pub struct Exhausted;

impl From<TryReserveError> for Exhausted {
    fn from(_: TryReserveError) -> Exhausted {
        Exhausted
    }
}

/// Everything a run can terminate with besides a report.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("configuration rejected: {0}")]
    Config(#[from] ConfigError),

    /// Exhaustion re-raised after the terminal line was written. Only the
    /// propagating policy produces this; the swallowing policy folds the
    /// same event into an `Ok` report.
    #[error("heap exhausted after {total_seen} values")]
    Exhausted { total_seen: u64 },

    #[error("progress stream failed: {0}")]
    Io(#[from] io::Error),
}
