//! # Time and Debouncing
//!
//! The engine never sleeps or spawns timers. Deferred work (outline
//! re-projection, text-input history, auto-save) is scheduled against a
//! [`Clock`] and fired by the host calling `tick()`.
//!
//! - [`SystemClock`] for native hosts
//! - [`HostClock`] for wasm and tests: the host sets the time explicitly

use std::cell::Cell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since an arbitrary, monotonic-enough epoch
pub trait Clock {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Clock advanced by its owner. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct HostClock {
    now: Rc<Cell<u64>>,
}

impl HostClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for HostClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Trailing-edge debouncer: each `schedule` pushes the deadline out
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay_ms: u64,
    deadline: Option<u64>,
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: u64) {
        self.deadline = Some(now + self.delay_ms);
    }

    /// True once when the deadline has passed
    pub fn poll(&mut self, now: u64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop the pending deadline, reporting whether one existed
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }
}
