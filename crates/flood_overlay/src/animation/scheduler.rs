//! Tick scheduling.
//!
//! The animation loop never calls back into itself. It asks a [`Scheduler`]
//! for a tick and gets a handle; the host later reports which handle fired.
//! Cancelling a handle guarantees it is never reported.

/// Identifies one scheduled tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(pub u64);

pub trait Scheduler: Send + Sync + 'static {
    /// Request a tick on the next host frame.
    fn schedule_tick(&mut self) -> TickHandle;
    fn cancel(&mut self, handle: TickHandle);
}

/// Per-frame scheduler: at most one tick is pending, and it fires on the next
/// call to [`FrameScheduler::take_due`]. Requests made while one is pending
/// coalesce into it.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_id: u64,
    pending: Option<TickHandle>,
}

impl FrameScheduler {
    /// Called once per host frame.
    pub fn take_due(&mut self) -> Option<TickHandle> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Scheduler for FrameScheduler {
    fn schedule_tick(&mut self) -> TickHandle {
        if let Some(handle) = self.pending {
            return handle;
        }
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        self.pending = Some(handle);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}
