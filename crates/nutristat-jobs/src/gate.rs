//! Counting admission gate.
//!
//! The count equals the number of queued entries no worker has claimed yet.
//! Each release wakes at most one blocked worker.

use parking_lot::{Condvar, Mutex};

/// Counting wakeup signal shared by the submitters and the workers.
#[derive(Debug, Default)]
pub struct AdmissionGate {
    permits: Mutex<usize>,
    available: Condvar,
}

impl AdmissionGate {
    /// Creates a gate with no permits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one permit and wakes one waiting worker.
    pub fn release(&self) {
        self.release_many(1);
    }

    /// Adds `n` permits and wakes up to `n` waiting workers.
    pub fn release_many(&self, n: usize) {
        if n == 0 {
            return;
        }
        let mut permits = self.permits.lock();
        *permits += n;
        drop(permits);

        for _ in 0..n {
            self.available.notify_one();
        }
    }

    /// Blocks until a permit is available, then takes it.
    pub fn admit(&self) {
        let mut permits = self.permits.lock();
        while *permits == 0 {
            self.available.wait(&mut permits);
        }
        *permits -= 1;
    }

    /// Waits up to `timeout` for a permit. Returns false if none arrived.
    #[cfg(test)]
    pub(crate) fn admit_timeout(&self, timeout: std::time::Duration) -> bool {
        let mut permits = self.permits.lock();
        while *permits == 0 {
            if self.available.wait_for(&mut permits, timeout).timed_out() {
                if *permits == 0 {
                    return false;
                }
                break;
            }
        }
        *permits -= 1;
        true
    }

    /// Number of permits not yet taken.
    pub fn available(&self) -> usize {
        *self.permits.lock()
    }
}
