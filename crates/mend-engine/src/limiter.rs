//! Sliding-window budget for external model calls.
//!
//! A fixed ring of timestamps: slots older than the window are freed on
//! each attempt, and a free slot is claimed round-robin. Non-blocking by
//! design; a denied attempt means "skip this strategy", never "wait".

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct SlotRing {
    slots: Vec<Option<Instant>>,
    next: usize,
}

pub struct RateLimiter {
    window: Duration,
    ring: Mutex<SlotRing>,
}

impl RateLimiter {
    /// At most `max_calls` acquisitions per sliding `window`.
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            window,
            ring: Mutex::new(SlotRing {
                slots: vec![None; max_calls.max(1)],
                next: 0,
            }),
        }
    }

    /// Claim a slot if one is free, under a single critical section.
    pub fn try_acquire(&self) -> bool {
        let mut ring = self.ring.lock().unwrap();
        let now = Instant::now();

        for slot in ring.slots.iter_mut() {
            if let Some(stamp) = slot {
                if now.duration_since(*stamp) >= self.window {
                    *slot = None;
                }
            }
        }

        let len = ring.slots.len();
        for offset in 0..len {
            let idx = (ring.next + offset) % len;
            if ring.slots[idx].is_none() {
                ring.slots[idx] = Some(now);
                ring.next = (idx + 1) % len;
                return true;
            }
        }
        false
    }

    pub fn capacity(&self) -> usize {
        self.ring.lock().unwrap().slots.len()
    }
}
