//! Playback cursor over the image set, with wraparound stepping and held-key intent.

/// Manual navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// What the user is currently holding down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationIntent {
    #[default]
    Idle,
    Advancing(Direction),
}

/// Required change to the key-repeat timer after a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatTimer {
    /// (Re)start the repeat timer from now.
    Restart,
    /// Cancel the repeat timer.
    Stop,
    /// Leave the repeat timer as it is.
    Keep,
}

/// Result of [`Navigator::on_manual_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOutcome {
    /// The cursor was stepped and the frame must be redrawn.
    pub moved: bool,
    pub repeat: RepeatTimer,
}

/// Cursor into an image set of `len` entries.
///
/// Every operation is total: with an empty set the cursor stays at 0 and
/// steps are no-ops.
#[derive(Debug, Clone)]
pub struct Navigator {
    cursor: usize,
    len: usize,
    intent: NavigationIntent,
}

impl Navigator {
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self {
            cursor: 0,
            len,
            intent: NavigationIntent::Idle,
        }
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub const fn intent(&self) -> NavigationIntent {
        self.intent
    }

    /// Advance with wraparound. Returns `false` when the set is empty.
    pub fn step_forward(&mut self) -> bool {
        self.step(Direction::Forward)
    }

    /// Go back with wraparound. Returns `false` when the set is empty.
    pub fn step_backward(&mut self) -> bool {
        self.step(Direction::Backward)
    }

    pub fn step(&mut self, direction: Direction) -> bool {
        if self.len == 0 {
            return false;
        }
        self.cursor = match direction {
            Direction::Forward => (self.cursor + 1) % self.len,
            Direction::Backward => (self.cursor + self.len - 1) % self.len,
        };
        true
    }

    pub fn on_auto_advance_tick(&mut self) -> bool {
        self.step_forward()
    }

    /// One held-key step in the active direction; nothing when idle.
    pub fn on_repeat_tick(&mut self) -> bool {
        match self.intent {
            NavigationIntent::Advancing(direction) => self.step(direction),
            NavigationIntent::Idle => false,
        }
    }

    /// Press steps immediately and (re)starts repeating in `direction`, even
    /// when the other direction is still held. Release only stops repeating
    /// when it matches the active direction.
    pub fn on_manual_key(&mut self, direction: Direction, pressed: bool) -> KeyOutcome {
        if pressed {
            self.intent = NavigationIntent::Advancing(direction);
            return KeyOutcome {
                moved: self.step(direction),
                repeat: RepeatTimer::Restart,
            };
        }
        if self.intent == NavigationIntent::Advancing(direction) {
            self.intent = NavigationIntent::Idle;
            return KeyOutcome {
                moved: false,
                repeat: RepeatTimer::Stop,
            };
        }
        KeyOutcome {
            moved: false,
            repeat: RepeatTimer::Keep,
        }
    }

    /// Re-clamp after the image set was rebuilt with `new_len` entries.
    pub fn on_rescan_completed(&mut self, new_len: usize) {
        self.len = new_len;
        if new_len == 0 {
            self.cursor = 0;
        } else if self.cursor >= new_len {
            self.cursor = new_len - 1;
        }
    }
}
