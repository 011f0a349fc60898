use tracing::trace;

use crate::error::Exhausted;
use crate::heap::Heap;
use crate::sink::consume;

/// Transient buffers allocated per churn stage.
pub const CHURN_ALLOCATIONS: usize = 8192;

/// Size in bytes of each transient churn buffer.
pub const CHURN_BUFFER_LEN: usize = 1024;

/// Generates short-lived allocation churn next to the main stream.
///
/// The churn stage allocates a burst of fixed-size buffers and drops each
/// one immediately, standing in for young-generation noise; the reclaim
/// stage asks the heap to hand free memory back to the host. Either stage
/// can be disarmed. Churn running the heap dry is a valid measurement
/// outcome and flows through the same [`Exhausted`] channel as the main
/// stream.
pub struct PressureValve {
    churn: bool,
    reclaim: bool,
    pulses: u64,
}

impl PressureValve {
    pub fn new(churn: bool, reclaim: bool) -> Self {
        PressureValve {
            churn,
            reclaim,
            pulses: 0,
        }
    }

    /// Runs the armed stages once. Called by the engine each time the
    /// cumulative produced-byte counter crosses the pressure threshold.
    pub fn pulse<H: Heap>(&mut self, heap: &mut H) -> Result<(), Exhausted> {
        if self.churn {
            for _ in 0..CHURN_ALLOCATIONS {
                // Escape each buffer before dropping it, or the allocation
                // could be elided outright.
                consume(heap.try_scratch(CHURN_BUFFER_LEN)?);
            }
        }

        if self.reclaim {
            heap.reclaim();
        }

        self.pulses += 1;
        trace!(pulses = self.pulses, "pressure valve pulsed");

        Ok(())
    }

    /// Completed pulses so far.
    pub fn pulses(&self) -> u64 {
        self.pulses
    }
}
