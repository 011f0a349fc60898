use crate::{
    progress, ConfigError, Corpus, Exhausted, ExhaustionPolicy, Heap, InternTable, PressureValve,
    ProcessHeap, RunConfig, CHURN_ALLOCATIONS, CHURN_BUFFER_LEN, DEFAULT_WARMUP,
};
use rand::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn corpus_has_exact_count_and_shortened_length() {
    for (length, count) in [(5, 1), (16, 64), (256, 7), (2048, 3)] {
        let corpus = Corpus::generate(&RunConfig::strict(length, count)).unwrap();

        assert_eq!(corpus.len(), count);
        assert_eq!(corpus.entry_len(), length - 1);

        for produced in 0..count as u64 {
            assert_eq!(corpus.entry(produced).len(), length - 1);
        }
    }
}

#[test]
fn corpus_entries_derive_from_their_index() {
    let corpus = Corpus::generate(&RunConfig::strict(16, 13)).unwrap();

    assert_eq!(corpus.entry(0), "000000000000000");
    assert_eq!(corpus.entry(1), "000100010001000");
    assert_eq!(corpus.entry(12), "001200120012001");
}

#[test]
fn corpus_tokens_widen_past_four_digits() {
    let corpus = Corpus::generate(&RunConfig::strict(16, 10_001)).unwrap();

    assert_eq!(corpus.entry(10_000), "100001000010000");
}

#[test]
fn corpus_entries_are_pairwise_distinct() {
    let corpus = Corpus::generate(&RunConfig::strict(16, 1000)).unwrap();

    let mut contents = HashSet::new();
    for produced in 0..1000 {
        contents.insert(corpus.entry(produced).to_owned());
    }

    assert_eq!(contents.len(), 1000);
}

#[test]
fn zero_length_corpus_entries_are_empty() {
    let corpus = Corpus::generate(&RunConfig::strict(0, 10)).unwrap();

    assert_eq!(corpus.entry_len(), 0);
    for produced in 0..10 {
        assert_eq!(corpus.entry(produced), "");
    }
}

#[test]
fn nominal_length_one_cuts_to_empty() {
    // entries run one byte short of nominal, so nominal 1 is empty as well
    let corpus = Corpus::generate(&RunConfig::strict(1, 3)).unwrap();

    assert_eq!(corpus.entry_len(), 0);
    assert_eq!(corpus.entry(0), "");
}

#[test]
fn corpus_lookup_cycles_past_the_pool_end() {
    let corpus = Corpus::generate(&RunConfig::strict(8, 3)).unwrap();

    assert_eq!(corpus.entry(0), corpus.entry(3));
    assert_eq!(corpus.entry(1), corpus.entry(7));
    assert_eq!(corpus.entry(2), corpus.entry(3002));
}

#[test]
fn corpus_generation_rejects_an_empty_pool() {
    assert_eq!(
        Corpus::generate(&RunConfig::strict(16, 0)).err(),
        Some(ConfigError::EmptyCorpus)
    );
}

#[test]
fn corpus_invariants_hold_for_arbitrary_configs() {
    let mut rng = rand::thread_rng();

    for _ in 0..50 {
        let length = rng.gen_range(5..64);
        let count = rng.gen_range(1..200);
        let corpus = Corpus::generate(&RunConfig::strict(length, count)).unwrap();

        assert_eq!(corpus.len(), count);

        let mut contents = HashSet::new();
        for produced in 0..count as u64 {
            let entry = corpus.entry(produced);
            assert_eq!(entry.len(), length - 1);
            contents.insert(entry.to_owned());
        }

        assert_eq!(contents.len(), count);
    }
}

#[test]
fn profiles_differ_where_the_driver_variants_did() {
    let soak = RunConfig::soak(16, 1024);
    let strict = RunConfig::strict(16, 1024);

    assert!(soak.churn_gc);
    assert_eq!(soak.warmup, DEFAULT_WARMUP);
    assert_eq!(soak.exhaustion, ExhaustionPolicy::Swallow);

    assert!(!strict.churn_gc);
    assert_eq!(strict.warmup, Duration::ZERO);
    assert_eq!(strict.exhaustion, ExhaustionPolicy::Propagate);

    assert_eq!(soak.gc_freq, strict.gc_freq);
    assert_eq!(soak.batch_size, strict.batch_size);
    assert_eq!(soak.max_batches, strict.max_batches);
}

#[test]
fn validation_fails_fast_on_degenerate_parameters() {
    assert_eq!(
        RunConfig::strict(16, 0).validate(),
        Err(ConfigError::EmptyCorpus)
    );

    let mut config = RunConfig::strict(16, 1);
    config.gc_freq = 0;
    assert_eq!(config.validate(), Err(ConfigError::ZeroThreshold));

    let mut config = RunConfig::strict(16, 1);
    config.batch_size = 0;
    assert_eq!(config.validate(), Err(ConfigError::ZeroBatchSize));

    let mut config = RunConfig::strict(16, 1);
    config.max_batches = 0;
    assert_eq!(config.validate(), Err(ConfigError::ZeroBatchBound));
}

#[test]
fn validation_bounds_the_corpus_footprint() {
    let oversized = RunConfig::strict((1 << 21) + 1, 1024);
    assert!(matches!(
        oversized.validate(),
        Err(ConfigError::OversizedCorpus { .. })
    ));

    let mut over_budget = RunConfig::strict(1024, 64);
    over_budget.heap_budget = Some(1024);
    assert!(matches!(
        over_budget.validate(),
        Err(ConfigError::CorpusExceedsBudget { .. })
    ));
}

#[test]
fn intern_returns_the_first_instance_seen() {
    let table = InternTable::new();

    let first: Arc<str> = Arc::from("0001000100010001");
    let second: Arc<str> = Arc::from("0001000100010001");
    assert!(!Arc::ptr_eq(&first, &second));

    let canonical = table.intern(Arc::clone(&first));
    assert!(Arc::ptr_eq(&canonical, &first));

    let folded = table.intern(second);
    assert!(Arc::ptr_eq(&folded, &first));
    assert_eq!(table.len(), 1);
}

#[test]
fn intern_keeps_distinct_contents_apart() {
    let table = InternTable::new();

    let a = table.intern(Arc::from("0000"));
    let b = table.intern(Arc::from("0001"));

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(table.len(), 2);
}

#[test]
fn intern_count_tracks_distinct_contents_only() {
    let table = InternTable::new();
    assert!(table.is_empty());

    for n in 0..400usize {
        table.intern(Arc::from(format!("{:04}", n % 10)));
    }

    assert_eq!(table.len(), 10);
}

#[test]
fn intern_survives_random_repetition() {
    let mut rng = rand::thread_rng();
    let table = InternTable::new();
    let distinct = rng.gen_range(1..40usize);

    for n in 0..distinct {
        table.intern(Arc::from(format!("content-{n}")));
    }

    for _ in 0..500 {
        let n = rng.gen_range(0..distinct);
        let canonical = table.intern(Arc::from(format!("content-{n}")));
        assert_eq!(&*canonical, format!("content-{n}").as_str());
    }

    assert_eq!(table.len(), distinct);
}

#[test]
fn copies_are_fresh_allocations() {
    let mut heap = ProcessHeap::new(None);

    let a = heap.try_copy("0005000500050005").unwrap();
    let b = heap.try_copy("0005000500050005").unwrap();

    assert_eq!(a, b);
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(heap.live_bytes(), 32);
}

#[test]
fn budget_is_charged_by_copies_and_slots() {
    let slot = ProcessHeap::SLOT_BYTES;
    let mut heap = ProcessHeap::new(Some(4 * (7 + slot) + 7));

    for _ in 0..4 {
        heap.try_copy("0123456").unwrap();
        heap.try_retain().unwrap();
    }

    // a fifth copy still fits, its slot does not
    heap.try_copy("0123456").unwrap();
    assert_eq!(heap.try_retain(), Err(Exhausted));
    assert_eq!(heap.live_bytes(), 4 * (7 + slot) + 7);
}

#[test]
fn release_gives_back_folded_content() {
    let mut heap = ProcessHeap::new(Some(64));

    let value = heap.try_copy("00010001").unwrap();
    assert_eq!(heap.live_bytes(), 8);

    heap.release(value.len());
    assert_eq!(heap.live_bytes(), 0);
}

#[test]
fn scratch_must_fit_headroom_but_is_never_counted() {
    let mut heap = ProcessHeap::new(Some(100));

    let buf = heap.try_scratch(100).unwrap();
    assert_eq!(buf.len(), 100);
    assert!(buf.iter().all(|byte| *byte == 0));
    assert_eq!(heap.live_bytes(), 0);

    assert_eq!(heap.try_scratch(101), Err(Exhausted));

    let content = "0".repeat(60);
    heap.try_copy(&content).unwrap();
    assert_eq!(heap.try_scratch(41), Err(Exhausted));
    assert!(heap.try_scratch(40).is_ok());
}

#[test]
fn reclaim_hint_is_harmless() {
    let mut heap = ProcessHeap::new(None);

    heap.try_copy("0000").unwrap();
    heap.reclaim();

    assert_eq!(heap.live_bytes(), 4);
}

struct LedgerHeap {
    scratch_sizes: Vec<usize>,
    scratch_ceiling: usize,
    reclaims: usize,
}

impl LedgerHeap {
    fn new(scratch_ceiling: usize) -> Self {
        LedgerHeap {
            scratch_sizes: Vec::new(),
            scratch_ceiling,
            reclaims: 0,
        }
    }
}

impl Heap for LedgerHeap {
    fn try_copy(&mut self, content: &str) -> Result<Arc<str>, Exhausted> {
        Ok(Arc::from(content))
    }

    fn try_scratch(&mut self, len: usize) -> Result<Vec<u8>, Exhausted> {
        if self.scratch_sizes.len() == self.scratch_ceiling {
            return Err(Exhausted);
        }
        self.scratch_sizes.push(len);
        Ok(vec![0; len])
    }

    fn try_retain(&mut self) -> Result<(), Exhausted> {
        Ok(())
    }

    fn release(&mut self, _bytes: usize) {}

    fn live_bytes(&self) -> usize {
        0
    }

    fn reclaim(&mut self) {
        self.reclaims += 1;
    }
}

#[test]
fn churn_stage_allocates_the_fixed_burst() {
    let mut heap = LedgerHeap::new(usize::MAX);
    let mut valve = PressureValve::new(true, false);

    valve.pulse(&mut heap).unwrap();

    assert_eq!(heap.scratch_sizes.len(), CHURN_ALLOCATIONS);
    assert!(heap.scratch_sizes.iter().all(|len| *len == CHURN_BUFFER_LEN));
    assert_eq!(heap.reclaims, 0);
    assert_eq!(valve.pulses(), 1);
}

#[test]
fn disarmed_valve_still_counts_the_crossing() {
    let mut heap = LedgerHeap::new(usize::MAX);
    let mut valve = PressureValve::new(false, false);

    valve.pulse(&mut heap).unwrap();

    assert!(heap.scratch_sizes.is_empty());
    assert_eq!(heap.reclaims, 0);
    assert_eq!(valve.pulses(), 1);
}

#[test]
fn reclaim_stage_forwards_the_hint() {
    let mut heap = LedgerHeap::new(usize::MAX);
    let mut valve = PressureValve::new(false, true);

    valve.pulse(&mut heap).unwrap();
    valve.pulse(&mut heap).unwrap();

    assert_eq!(heap.reclaims, 2);
    assert_eq!(valve.pulses(), 2);
}

#[test]
fn churn_exhaustion_is_not_a_completed_pulse() {
    let mut heap = LedgerHeap::new(100);
    let mut valve = PressureValve::new(true, false);

    assert_eq!(valve.pulse(&mut heap), Err(Exhausted));
    assert_eq!(valve.pulses(), 0);
    assert_eq!(heap.scratch_sizes.len(), 100);
}

#[test]
fn progress_cadence_is_dense_then_sparse() {
    assert!(progress::due(100));
    assert!(progress::due(200));
    assert!(progress::due(5000));
    assert!(progress::due(9900));
    assert!(progress::due(10_000));
    assert!(progress::due(15_000));
    assert!(progress::due(100_000));

    assert!(!progress::due(150));
    assert!(!progress::due(9999));
    assert!(!progress::due(9950));
    assert!(!progress::due(10_100));
    assert!(!progress::due(10_500));
    assert!(!progress::due(14_999));
}

#[test]
fn progress_line_carries_count_and_time() {
    let mut out = Vec::new();
    progress::current(&mut out, 300).unwrap();

    let line = String::from_utf8(out).unwrap();
    assert!(line.starts_with("CurrentSeen=300, Time="));
    assert!(line.ends_with('\n'));
}

#[test]
fn terminal_line_is_stamped_or_bare_by_policy() {
    let mut out = Vec::new();
    progress::total(&mut out, 42, true).unwrap();
    let stamped = String::from_utf8(out).unwrap();
    assert!(stamped.starts_with("TotalSeen=42, Time="));

    let mut out = Vec::new();
    progress::total(&mut out, 42, false).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "TotalSeen=42\n");
}
