use std::mem::size_of;
use std::sync::Arc;

use crate::error::Exhausted;

/// Where every allocation of a run comes from.
///
/// The engine drives produced values, live-set slots, and churn buffers
/// through this seam, so the same loop can run against the process allocator
/// or a bounded stand-in that exhausts on cue.
pub trait Heap {
    /// Copy `content` into a freshly allocated value.
    fn try_copy(&mut self, content: &str) -> Result<Arc<str>, Exhausted>;

    /// Allocate a zeroed transient buffer. It must fit the current headroom
    /// but is never counted live; the caller drops it right away.
    fn try_scratch(&mut self, len: usize) -> Result<Vec<u8>, Exhausted>;

    /// Charge one retained live-set slot.
    fn try_retain(&mut self) -> Result<(), Exhausted>;

    /// Give back `bytes` of charged content after a fresh copy was folded
    /// onto a canonical instance.
    fn release(&mut self, bytes: usize);

    /// Bytes currently charged live.
    fn live_bytes(&self) -> usize;

    /// Best-effort request to hand free memory back to the host. A hint:
    /// the host may do nothing with it.
    fn reclaim(&mut self);
}

impl<H: Heap + ?Sized> Heap for &mut H {
    fn try_copy(&mut self, content: &str) -> Result<Arc<str>, Exhausted> {
        (**self).try_copy(content)
    }

    fn try_scratch(&mut self, len: usize) -> Result<Vec<u8>, Exhausted> {
        (**self).try_scratch(len)
    }

    fn try_retain(&mut self) -> Result<(), Exhausted> {
        (**self).try_retain()
    }

    fn release(&mut self, bytes: usize) {
        (**self).release(bytes)
    }

    fn live_bytes(&self) -> usize {
        (**self).live_bytes()
    }

    fn reclaim(&mut self) {
        (**self).reclaim()
    }
}

/// The process allocator, with an optional live-byte budget layered on top.
///
/// Content bytes are charged per fresh copy and released when interning
/// folds the copy away. Every retained live-set slot is charged
/// [`ProcessHeap::SLOT_BYTES`], so interned runs still march toward the
/// budget through live-set growth alone. Without a budget the heap rides the
/// allocator until it genuinely refuses a reservation.
pub struct ProcessHeap {
    budget: Option<usize>,
    live: usize,
}

impl ProcessHeap {
    /// Bytes charged for each slot the live set retains.
    pub const SLOT_BYTES: usize = size_of::<Arc<str>>();

    pub fn new(budget: Option<usize>) -> Self {
        ProcessHeap { budget, live: 0 }
    }

    fn fit(&self, bytes: usize) -> Result<(), Exhausted> {
        match self.budget {
            Some(budget) if self.live.saturating_add(bytes) > budget => Err(Exhausted),
            _ => Ok(()),
        }
    }
}

impl Heap for ProcessHeap {
    fn try_copy(&mut self, content: &str) -> Result<Arc<str>, Exhausted> {
        self.fit(content.len())?;

        let mut copy = String::new();
        copy.try_reserve_exact(content.len())?;
        copy.push_str(content);

        self.live += content.len();
        Ok(Arc::from(copy))
    }

    fn try_scratch(&mut self, len: usize) -> Result<Vec<u8>, Exhausted> {
        self.fit(len)?;

        let mut buf = Vec::new();
        buf.try_reserve_exact(len)?;
        buf.resize(len, 0);

        Ok(buf)
    }

    fn try_retain(&mut self) -> Result<(), Exhausted> {
        self.fit(Self::SLOT_BYTES)?;
        self.live += Self::SLOT_BYTES;

        Ok(())
    }

    fn release(&mut self, bytes: usize) {
        self.live = self.live.saturating_sub(bytes);
    }

    fn live_bytes(&self) -> usize {
        self.live
    }

    fn reclaim(&mut self) {
        #[cfg(all(target_os = "linux", target_env = "gnu"))]
        unsafe {
            libc::malloc_trim(0);
        }
    }
}
