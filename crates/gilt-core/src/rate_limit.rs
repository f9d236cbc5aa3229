//! Fixed-window request rate limiting.
//!
//! In-memory and per-process: one counter per key, reset when its
//! window elapses. Keying (user id vs client IP) is decided by the
//! service middleware, not here.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A fixed-window counter keyed by an opaque string.
#[derive(Debug)]
pub struct FixedWindow {
    max: u32,
    window: Duration,
    slots: Mutex<HashMap<String, WindowSlot>>,
}

#[derive(Debug, Clone, Copy)]
struct WindowSlot {
    started_at: Instant,
    count: u32,
}

impl FixedWindow {
    /// A limiter allowing `max` requests per `window` per key.
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Record one request for `key`. Returns `false` when the key is over
    /// its limit for the current window.
    pub fn try_acquire(&self, key: &str) -> bool {
        self.try_acquire_at(key, Instant::now())
    }

    fn try_acquire_at(&self, key: &str, now: Instant) -> bool {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let slot = slots.entry(key.to_owned()).or_insert(WindowSlot {
            started_at: now,
            count: 0,
        });
        if now.duration_since(slot.started_at) >= self.window {
            slot.started_at = now;
            slot.count = 0;
        }
        if slot.count >= self.max {
            return false;
        }
        slot.count += 1;
        true
    }
}
