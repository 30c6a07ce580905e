use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::navigation::Direction;
use crate::timers::TimerId;

/// Inputs serialized through the session on the main thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Key { direction: Direction, pressed: bool },
    TimerFired(TimerId),
    RescanRequested,
}

/// User events delivered to the viewer's event loop from other threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerEvent {
    RescanRequested,
    Cancelled,
}

/// Single-slot "folder changed" flag shared by the watcher and the main thread.
///
/// `post` only wakes the receiver on the idle -> pending transition, so bursts
/// collapse into one pending rescan. A post that lands while a rescan is
/// running re-arms the flag and wakes again.
pub struct RescanSignal {
    pending: AtomicBool,
    wake: Box<dyn Fn() + Send + Sync>,
}

impl RescanSignal {
    pub fn new(wake: impl Fn() + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            pending: AtomicBool::new(false),
            wake: Box::new(wake),
        })
    }

    /// Mark a rescan as pending. Returns `true` if this call woke the receiver.
    pub fn post(&self) -> bool {
        if self.pending.swap(true, Ordering::AcqRel) {
            return false;
        }
        (self.wake)();
        true
    }

    /// Clear the flag, returning whether a rescan was pending.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

impl fmt::Debug for RescanSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RescanSignal")
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}
