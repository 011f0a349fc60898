//! The line protocol a run speaks on its output stream.
//!
//! Two line forms exist: `CurrentSeen=<n>, Time=<ts>` while the run is in
//! flight and `TotalSeen=<n>[, Time=<ts>]` exactly once at exhaustion. The
//! stream carries nothing else; diagnostics go through `tracing` instead so
//! downstream scrapers can trust every line.

use std::io::{self, Write};

use chrono::{Local, SecondsFormat};

/// True when the cadence calls for a progress line at this count: every 100
/// values while under 10 000, every 5 000 from there on. Evaluated at batch
/// boundaries only, so coarse batch sizes skip points.
pub fn due(seen: u64) -> bool {
    if seen < 10_000 {
        seen % 100 == 0
    } else {
        seen % 5_000 == 0
    }
}

/// Emits one `CurrentSeen` progress line.
pub fn current<W: Write>(out: &mut W, seen: u64) -> io::Result<()> {
    writeln!(out, "CurrentSeen={}, Time={}", seen, timestamp())?;
    out.flush()
}

/// Emits the one terminal `TotalSeen` line, timestamped or bare depending on
/// the exhaustion policy in force.
pub fn total<W: Write>(out: &mut W, seen: u64, stamped: bool) -> io::Result<()> {
    if stamped {
        writeln!(out, "TotalSeen={}, Time={}", seen, timestamp())?;
    } else {
        writeln!(out, "TotalSeen={seen}")?;
    }
    out.flush()
}

fn timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}
