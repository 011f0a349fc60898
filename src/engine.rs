use std::io::Write;
use std::mem;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::{ExhaustionPolicy, RunConfig};
use crate::corpus::Corpus;
use crate::error::{ConfigError, Exhausted, RunError};
use crate::heap::Heap;
use crate::intern::InternTable;
use crate::progress;
use crate::sink::consume;
use crate::valve::PressureValve;

/// Everything a finished run has to say for itself.
///
/// The number under study is `total_seen`; the rest is context. The same
/// count is what the terminal `TotalSeen` line carried.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Values produced before the run ended.
    pub total_seen: u64,
    /// Whether the run ended through exhaustion or by the batch bound.
    pub exhausted: bool,
    /// Distinct contents the interning table held; zero when interning was
    /// off.
    pub distinct_interned: usize,
    /// Pressure-valve pulses that ran to completion.
    pub valve_pulses: u64,
    /// Bytes the heap still accounted live when the run ended.
    pub live_bytes: usize,
    /// Wall time spent in the loop. Incidental; no throughput claim.
    pub elapsed: Duration,
}

/// Mutable state of one run, owned by the engine for the run's duration.
struct RunState {
    seen: u64,
    accumulated: usize,
    live: Vec<Vec<Arc<str>>>,
}

impl RunState {
    fn new() -> Self {
        RunState {
            seen: 0,
            accumulated: 0,
            live: Vec::new(),
        }
    }
}

/// The driver loop: copies corpus entries into fresh values, retains every
/// one of them, and keeps going until the heap refuses or the batch bound
/// runs out.
pub struct Engine<H: Heap, W: Write> {
    heap: H,
    corpus: Corpus,
    interner: InternTable,
    valve: PressureValve,
    out: W,
    state: RunState,

    // config vars
    dedup: bool,
    gc_freq: usize,
    batch_size: usize,
    max_batches: usize,
    warmup: Duration,
    policy: ExhaustionPolicy,
}

impl<H: Heap, W: Write> Engine<H, W> {
    /// Validates `config`, generates the corpus, and wires the run up
    /// against `heap` and `out`. Nothing is produced yet.
    pub fn new(config: RunConfig, heap: H, out: W) -> Result<Self, ConfigError> {
        let corpus = Corpus::generate(&config)?;

        debug!(
            string_length = config.string_length,
            string_count = config.string_count,
            entry_len = corpus.entry_len(),
            dedup = config.dedup,
            churn_gc = config.churn_gc,
            system_gc = config.system_gc,
            gc_freq = config.gc_freq,
            "engine ready"
        );

        Ok(Engine {
            heap,
            corpus,
            interner: InternTable::new(),
            valve: PressureValve::new(config.churn_gc, config.system_gc),
            out,
            state: RunState::new(),
            dedup: config.dedup,
            gc_freq: config.gc_freq,
            batch_size: config.batch_size,
            max_batches: config.max_batches,
            warmup: config.warmup,
            policy: config.exhaustion,
        })
    }

    /// Runs the experiment to its end: exhaustion, the batch bound, or a
    /// failed write to the output stream.
    pub fn run(mut self) -> Result<RunReport, RunError> {
        if !self.dedup && !self.warmup.is_zero() {
            info!(
                secs = self.warmup.as_secs(),
                "letting the host settle before measurement"
            );
            thread::sleep(self.warmup);
        }

        let started = Instant::now();
        let mut exhausted = false;

        for _ in 0..self.max_batches {
            match self.produce_batch() {
                Ok(batch) => {
                    self.state.live.push(batch);

                    if progress::due(self.state.seen) {
                        progress::current(&mut self.out, self.state.seen)?;
                    }
                }
                Err(Exhausted) => {
                    exhausted = true;
                    break;
                }
            }
        }

        let elapsed = started.elapsed();

        if !exhausted {
            debug!(
                seen = self.state.seen,
                "batch bound reached without exhaustion"
            );
            return Ok(self.finish(false, elapsed));
        }

        // Let go of the ballast first; after a genuine refusal there may not
        // be room for even one more line of output.
        drop(mem::take(&mut self.state.live));

        let total_seen = self.state.seen;
        info!(total_seen, "allocation refused, run complete");
        progress::total(
            &mut self.out,
            total_seen,
            self.policy == ExhaustionPolicy::Swallow,
        )?;

        match self.policy {
            ExhaustionPolicy::Swallow => Ok(self.finish(true, elapsed)),
            ExhaustionPolicy::Propagate => Err(RunError::Exhausted { total_seen }),
        }
    }

    /// Produces one batch. A refusal partway through drops the partial
    /// batch, but every value produced before it stays counted.
    fn produce_batch(&mut self) -> Result<Vec<Arc<str>>, Exhausted> {
        let mut batch = Vec::with_capacity(self.batch_size);

        for _ in 0..self.batch_size {
            let value = self.produce()?;

            self.heap.try_retain()?;
            batch.push(value);
        }

        Ok(batch)
    }

    fn produce(&mut self) -> Result<Arc<str>, Exhausted> {
        let content = self.corpus.entry(self.state.seen);
        let fresh = consume(self.heap.try_copy(content)?);

        let value = if self.dedup {
            let canonical = self.interner.intern(Arc::clone(&fresh));
            if !Arc::ptr_eq(&canonical, &fresh) {
                self.heap.release(fresh.len());
            }
            canonical
        } else {
            // Threshold tracking only runs uninterned: folding copies away
            // masks the pressure on purpose, so there is nothing to vent.
            self.state.accumulated += fresh.len();
            if self.state.accumulated >= self.gc_freq {
                self.valve.pulse(&mut self.heap)?;
                self.state.accumulated = 0;
            }
            fresh
        };

        self.state.seen += 1;
        Ok(value)
    }

    fn finish(self, exhausted: bool, elapsed: Duration) -> RunReport {
        RunReport {
            total_seen: self.state.seen,
            exhausted,
            distinct_interned: self.interner.len(),
            valve_pulses: self.valve.pulses(),
            live_bytes: self.heap.live_bytes(),
            elapsed,
        }
    }
}
