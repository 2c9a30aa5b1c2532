//! Wall-clock time and client-side id generation.

use std::sync::atomic::{AtomicI64, Ordering};

use justdo_engine::{local_task_id, TaskId, Timestamp};

/// Source of the current time in milliseconds since epoch.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> Timestamp;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> Timestamp {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: Timestamp) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

/// Generate a client-side task id: creation time plus a random suffix.
pub fn new_task_id(now: Timestamp) -> TaskId {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    local_task_id(now, &suffix[..10])
}
