//! A capacity harness that floods the heap with string values until the
//! allocator refuses another request, then reports the high-water count of
//! live values.
//!
//! A run copies entries from a fixed [`Corpus`] into fresh heap values and
//! retains every one of them, batch after batch, so the live footprint only
//! ever grows. Interning can fold content-equal values onto one canonical
//! instance, a [`PressureValve`] can add short-lived churn at a byte
//! threshold, and the run ends when the [`Heap`] reports [`Exhausted`]. The
//! result that matters is the `TotalSeen` line on the output stream; the
//! returned [`RunReport`] repeats it with some context. Elapsed time is
//! incidental and no throughput claim is made.
//!
//! A bounded run against the process allocator:
//!
//! ```rust
//! use floodmark::{Engine, ProcessHeap, RunConfig};
//!
//! let mut config = RunConfig::strict(16, 8);
//! config.batch_size = 10;
//! config.max_batches = 3;
//!
//! let engine = Engine::new(config, ProcessHeap::new(None), Vec::new()).unwrap();
//! let report = engine.run().unwrap();
//!
//! assert_eq!(report.total_seen, 30);
//! assert!(!report.exhausted);
//! ```
//!
//! The same loop driven into a budget ceiling, with the strict profile
//! re-raising the exhaustion after the terminal line:
//!
//! ```rust
//! use floodmark::{Engine, ProcessHeap, RunConfig, RunError};
//!
//! let mut config = RunConfig::strict(16, 8);
//! config.heap_budget = Some(64 * 1024);
//!
//! let heap = ProcessHeap::new(config.heap_budget);
//! let engine = Engine::new(config, heap, Vec::new()).unwrap();
//!
//! assert!(matches!(engine.run(), Err(RunError::Exhausted { .. })));
//! ```

mod config;
mod corpus;
mod engine;
mod error;
mod heap;
mod intern;
pub mod progress;
mod sink;
mod valve;

pub use config::{
    ExhaustionPolicy, RunConfig, DEFAULT_BATCH_BOUND, DEFAULT_BATCH_SIZE,
    DEFAULT_PRESSURE_THRESHOLD, DEFAULT_WARMUP, MAX_CORPUS_FOOTPRINT,
};
pub use corpus::Corpus;
pub use engine::{Engine, RunReport};
pub use error::{ConfigError, Exhausted, RunError};
pub use heap::{Heap, ProcessHeap};
pub use intern::InternTable;
pub use valve::{PressureValve, CHURN_ALLOCATIONS, CHURN_BUFFER_LEN};

use std::io;

/// Runs one experiment against the process heap, with the line protocol on
/// stdout. The single entry point the outer harness calls.
pub fn run(config: RunConfig) -> Result<RunReport, RunError> {
    let heap = ProcessHeap::new(config.heap_budget);
    let engine = Engine::new(config, heap, io::stdout().lock())?;

    engine.run()
}

#[cfg(test)]
mod test;
