use std::time::Duration;

use crate::error::ConfigError;

/// Values produced per batch before the batch is appended to the live set.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Outer batch bound. Large enough that runs terminate through exhaustion,
/// not through the bound.
pub const DEFAULT_BATCH_BOUND: usize = 1_000_000;

/// Cumulative produced bytes between pressure-valve pulses.
pub const DEFAULT_PRESSURE_THRESHOLD: usize = 1 << 20;

/// Startup delay before measurement begins, applied only when interning is
/// off. Gives the host time to settle into a steady state.
pub const DEFAULT_WARMUP: Duration = Duration::from_secs(75);

/// Sanity bound on the corpus footprint. A corpus that alone approaches the
/// sizes under study would make the run measure corpus setup, not retention.
pub const MAX_CORPUS_FOOTPRINT: usize = 1 << 30;

/// What to do with the exhaustion event once the terminal line is written.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExhaustionPolicy {
    /// Treat exhaustion as the successful end of the experiment and fold it
    /// into the returned report. The terminal line carries a timestamp.
    Swallow,
    /// Re-raise exhaustion as an error after reporting. The terminal line
    /// carries the count only.
    Propagate,
}

/// This structure contains the parameters governing one run. Constructed
/// once before setup, read-only thereafter.
#[derive(Copy, Clone, Debug)]
pub struct RunConfig {
    /// Nominal length of each corpus entry. Entries come out one byte short
    /// of this (see [`crate::Corpus`]); zero means empty entries.
    pub string_length: usize,
    /// Number of distinct entries in the corpus. Must be at least 1.
    pub string_count: usize,
    /// Fold content-equal values onto one canonical instance through the
    /// interning table. Also bypasses pressure-threshold tracking, since
    /// interning masks the pressure on purpose.
    pub dedup: bool,
    /// Run the churn stage of the pressure valve at each threshold crossing.
    pub churn_gc: bool,
    /// Run the reclaim stage of the pressure valve at each threshold
    /// crossing. Best effort; a no-op where the host offers nothing.
    pub system_gc: bool,
    /// Cumulative produced bytes after which the valve is pulsed and the
    /// counter reset. Tracked only while `dedup` is off.
    pub gc_freq: usize,
    /// Values per batch. Progress is evaluated at batch boundaries.
    pub batch_size: usize,
    /// Outer bound on batches. Effectively unbounded at the default.
    pub max_batches: usize,
    /// One-time delay before the loop starts, honored only when `dedup` is
    /// off. Zero skips the delay.
    pub warmup: Duration,
    /// Live-byte ceiling for the heap model. `None` rides the process
    /// allocator until it genuinely refuses.
    pub heap_budget: Option<usize>,
    /// What happens at the exhaustion boundary.
    pub exhaustion: ExhaustionPolicy,
}

// The two constructors are the two driver profiles this harness ships.
// They differ exactly where the original pair of drivers differed: warmup,
// valve stages, and what happens once exhaustion is intercepted. Every
// field stays public, so a profile is a starting point, not a straitjacket.
impl RunConfig {
    /// The full soak profile: warmup before measurement, churn stage armed,
    /// exhaustion swallowed into the report.
    pub fn soak(string_length: usize, string_count: usize) -> Self {
        RunConfig {
            string_length,
            string_count,
            dedup: false,
            churn_gc: true,
            system_gc: false,
            gc_freq: DEFAULT_PRESSURE_THRESHOLD,
            batch_size: DEFAULT_BATCH_SIZE,
            max_batches: DEFAULT_BATCH_BOUND,
            warmup: DEFAULT_WARMUP,
            heap_budget: None,
            exhaustion: ExhaustionPolicy::Swallow,
        }
    }

    /// The bare profile: no warmup, valve stages off, exhaustion re-raised
    /// after the terminal line.
    pub fn strict(string_length: usize, string_count: usize) -> Self {
        RunConfig {
            string_length,
            string_count,
            dedup: false,
            churn_gc: false,
            system_gc: false,
            gc_freq: DEFAULT_PRESSURE_THRESHOLD,
            batch_size: DEFAULT_BATCH_SIZE,
            max_batches: DEFAULT_BATCH_BOUND,
            warmup: Duration::ZERO,
            heap_budget: None,
            exhaustion: ExhaustionPolicy::Propagate,
        }
    }

    /// Fails fast on parameter combinations that would make the run
    /// meaningless, before any allocation happens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.string_count == 0 {
            return Err(ConfigError::EmptyCorpus);
        }
        if self.gc_freq == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.max_batches == 0 {
            return Err(ConfigError::ZeroBatchBound);
        }

        let footprint = self.corpus_footprint();
        if footprint > MAX_CORPUS_FOOTPRINT {
            return Err(ConfigError::OversizedCorpus {
                footprint,
                bound: MAX_CORPUS_FOOTPRINT,
            });
        }
        if let Some(budget) = self.heap_budget {
            if footprint > budget {
                return Err(ConfigError::CorpusExceedsBudget { footprint, budget });
            }
        }

        Ok(())
    }

    /// Actual byte length of every produced value: one short of nominal.
    pub fn entry_len(&self) -> usize {
        self.string_length.saturating_sub(1)
    }

    /// Estimated bytes the corpus itself will hold live for the whole run.
    pub fn corpus_footprint(&self) -> usize {
        self.entry_len().saturating_mul(self.string_count)
    }
}
