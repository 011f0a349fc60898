//! CLI entrypoint for the floodmark capacity harness.
//!
//! Maps one parameter set onto a [`RunConfig`], runs it once, and exits.
//! Parameter sweeps and per-configuration forking belong to whatever invokes
//! this binary; stdout carries nothing but the measurement lines, with
//! diagnostics on stderr.

use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgAction, Parser};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use floodmark::{
    RunConfig, RunError, DEFAULT_BATCH_BOUND, DEFAULT_BATCH_SIZE, DEFAULT_PRESSURE_THRESHOLD,
};

/// Measures how many live string values the process can hold at once.
#[derive(Debug, Parser)]
#[command(name = "floodmark")]
#[command(about = "Floods the heap with strings and reports the live count at exhaustion")]
struct Cli {
    /// Nominal length of each corpus entry; produced values run one byte
    /// short of this.
    #[arg(long, default_value_t = 16)]
    string_length: usize,

    /// Number of distinct corpus entries.
    #[arg(long, default_value_t = 1024)]
    string_count: usize,

    /// Fold content-equal values onto one canonical instance.
    #[arg(long, action = ArgAction::Set, default_value_t = false)]
    dedup: bool,

    /// Run the churn stage at each pressure-threshold crossing. Defaults to
    /// the profile's setting.
    #[arg(long)]
    churn_gc: Option<bool>,

    /// Ask the host to hand back free memory at each crossing. Defaults to
    /// the profile's setting.
    #[arg(long)]
    system_gc: Option<bool>,

    /// Cumulative produced bytes between pressure-valve pulses.
    #[arg(long, default_value_t = DEFAULT_PRESSURE_THRESHOLD)]
    gc_freq: usize,

    /// Live-byte ceiling for the heap model; unbounded when omitted.
    #[arg(long)]
    heap_budget: Option<usize>,

    /// Values per batch.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Outer bound on batches.
    #[arg(long, default_value_t = DEFAULT_BATCH_BOUND)]
    max_batches: usize,

    /// Startup delay in seconds, honored only while dedup is off. Defaults
    /// to the profile's setting.
    #[arg(long)]
    warmup_secs: Option<u64>,

    /// Use the strict profile: no warmup, valve stages off, exhaustion
    /// re-raised after the terminal line.
    #[arg(long)]
    strict: bool,

    /// Log filter directives (tracing EnvFilter syntax), written to stderr.
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn into_config(self) -> RunConfig {
        let mut config = if self.strict {
            RunConfig::strict(self.string_length, self.string_count)
        } else {
            RunConfig::soak(self.string_length, self.string_count)
        };

        config.dedup = self.dedup;
        config.gc_freq = self.gc_freq;
        config.batch_size = self.batch_size;
        config.max_batches = self.max_batches;
        config.heap_budget = self.heap_budget;

        if let Some(churn) = self.churn_gc {
            config.churn_gc = churn;
        }
        if let Some(reclaim) = self.system_gc {
            config.system_gc = reclaim;
        }
        if let Some(secs) = self.warmup_secs {
            config.warmup = Duration::from_secs(secs);
        }

        config
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    match floodmark::run(cli.into_config()) {
        Ok(report) => {
            info!(
                total_seen = report.total_seen,
                exhausted = report.exhausted,
                distinct_interned = report.distinct_interned,
                valve_pulses = report.valve_pulses,
                live_bytes = report.live_bytes,
                elapsed_secs = report.elapsed.as_secs(),
                "run complete"
            );
            ExitCode::SUCCESS
        }
        Err(RunError::Config(err)) => {
            error!("configuration rejected: {err}");
            ExitCode::from(2)
        }
        Err(err) => {
            error!("{err}");
            ExitCode::from(1)
        }
    }
}
