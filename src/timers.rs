//! Periodic main-thread timers expressed as deadlines for the event loop.

use std::time::{Duration, Instant};

/// Stand-in deadline for intervals too long to represent as an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Host timer identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum TimerId {
    AutoAdvance = 1,
    KeyRepeat = 2,
}

impl TimerId {
    const ALL: [Self; 2] = [Self::AutoAdvance, Self::KeyRepeat];
}

#[derive(Debug, Clone, Copy)]
struct Periodic {
    interval: Duration,
    deadline: Instant,
}

/// At most one periodic deadline per [`TimerId`].
#[derive(Debug, Default)]
pub struct Timers {
    auto_advance: Option<Periodic>,
    key_repeat: Option<Periodic>,
}

impl Timers {
    fn slot(&self, id: TimerId) -> &Option<Periodic> {
        match id {
            TimerId::AutoAdvance => &self.auto_advance,
            TimerId::KeyRepeat => &self.key_repeat,
        }
    }

    fn slot_mut(&mut self, id: TimerId) -> &mut Option<Periodic> {
        match id {
            TimerId::AutoAdvance => &mut self.auto_advance,
            TimerId::KeyRepeat => &mut self.key_repeat,
        }
    }

    /// Start (or restart) `id` so it first fires `interval` after `now`.
    pub fn arm(&mut self, id: TimerId, interval: Duration, now: Instant) {
        *self.slot_mut(id) = Some(Periodic {
            interval,
            deadline: deadline_after(now, interval),
        });
    }

    pub fn cancel(&mut self, id: TimerId) {
        *self.slot_mut(id) = None;
    }

    #[must_use]
    pub fn is_armed(&self, id: TimerId) -> bool {
        self.slot(id).is_some()
    }

    /// Earliest pending deadline, if any timer is armed.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        TimerId::ALL
            .iter()
            .filter_map(|id| self.slot(*id).map(|t| t.deadline))
            .min()
    }

    /// Ids whose deadline has passed, in id order. Each is re-armed one
    /// interval after `now`, so a stalled loop fires a timer once.
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerId> {
        let mut due = Vec::new();
        for id in TimerId::ALL {
            if let Some(timer) = self.slot_mut(id)
                && timer.deadline <= now
            {
                timer.deadline = deadline_after(now, timer.interval);
                due.push(id);
            }
        }
        due
    }
}

/// `now + interval`, saturated so oversized intervals never panic.
fn deadline_after(now: Instant, interval: Duration) -> Instant {
    now.checked_add(interval)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}
