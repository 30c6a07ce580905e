//! Owned playback state for one slideshow run.
//!
//! The viewer holds the only [`Session`] and feeds it every input on the main
//! thread; the watcher never touches it directly.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::Configuration;
use crate::events::SessionEvent;
use crate::navigation::{NavigationIntent, Navigator, RepeatTimer};
use crate::scan::{self, ScanOptions};
use crate::timers::{TimerId, Timers};

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub slide_interval: Duration,
    pub key_repeat_interval: Duration,
    pub scan: ScanOptions,
}

impl From<&Configuration> for SessionSettings {
    fn from(cfg: &Configuration) -> Self {
        Self {
            slide_interval: cfg.slide_interval(),
            key_repeat_interval: cfg.key_repeat_interval,
            scan: ScanOptions {
                max_files: cfg.max_files,
                ..ScanOptions::default()
            },
        }
    }
}

#[derive(Debug)]
pub struct Session {
    root: PathBuf,
    settings: SessionSettings,
    images: Vec<PathBuf>,
    nav: Navigator,
    timers: Timers,
}

impl Session {
    /// Start a session over an already scanned image set; auto-advance is armed at `now`.
    pub fn new(
        root: PathBuf,
        images: Vec<PathBuf>,
        settings: SessionSettings,
        now: Instant,
    ) -> Self {
        let mut timers = Timers::default();
        timers.arm(TimerId::AutoAdvance, settings.slide_interval, now);
        Self {
            root,
            nav: Navigator::new(images.len()),
            images,
            settings,
            timers,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    #[must_use]
    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Image under the cursor, `None` when the set is empty.
    #[must_use]
    pub fn current(&self) -> Option<&Path> {
        self.images.get(self.nav.cursor()).map(PathBuf::as_path)
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Apply one input. Returns `true` when the frame must be redrawn.
    pub fn handle(&mut self, event: SessionEvent, now: Instant) -> bool {
        match event {
            SessionEvent::Key { direction, pressed } => {
                let outcome = self.nav.on_manual_key(direction, pressed);
                match outcome.repeat {
                    RepeatTimer::Restart => self.timers.arm(
                        TimerId::KeyRepeat,
                        self.settings.key_repeat_interval,
                        now,
                    ),
                    RepeatTimer::Stop => self.timers.cancel(TimerId::KeyRepeat),
                    RepeatTimer::Keep => {}
                }
                debug!(?direction, pressed, cursor = self.nav.cursor(), "manual key");
                outcome.moved
            }
            SessionEvent::TimerFired(TimerId::AutoAdvance) => self.nav.on_auto_advance_tick(),
            SessionEvent::TimerFired(TimerId::KeyRepeat) => {
                if self.nav.intent() == NavigationIntent::Idle {
                    self.timers.cancel(TimerId::KeyRepeat);
                    return false;
                }
                self.nav.on_repeat_tick()
            }
            SessionEvent::RescanRequested => {
                self.rescan();
                true
            }
        }
    }

    /// Dispatch every timer due at `now`. Returns `true` if any moved the cursor.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        let mut redraw = false;
        for id in self.timers.take_due(now) {
            redraw |= self.handle(SessionEvent::TimerFired(id), now);
        }
        redraw
    }

    /// Rebuild the image set from disk and repair the cursor.
    pub fn rescan(&mut self) {
        let before = self.images.len();
        self.images = scan::scan(&self.root, &self.settings.scan);
        self.nav.on_rescan_completed(self.images.len());
        info!(
            root = %self.root.display(),
            before,
            after = self.images.len(),
            cursor = self.nav.cursor(),
            "rescanned image folder"
        );
    }
}
