use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of the millisecond timestamp embedded in storage keys.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Wall clock that never hands out the same value twice.
///
/// Two uploads landing in the same millisecond get consecutive values, so
/// sequential calls always observe a strictly increasing timestamp.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicI64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    fn advance(&self, wall: i64) -> i64 {
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let next = wall.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        self.advance(Utc::now().timestamp_millis())
    }
}

/// Clock pinned to a fixed value. Used to make keys predictable.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}
