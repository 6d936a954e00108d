// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::traits::Scheduler;

/// Scheduler wake signal backed by a condition variable.
///
/// Every `wake()` bumps a generation counter so a waiter that read the
/// counter before checking its condition never misses a wakeup.
#[derive(Debug, Default)]
pub struct WakeSignal {
    generation: Mutex<u64>,
    cond: Condvar,
}

impl WakeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        *self.generation.lock()
    }

    /// Blocks until the generation moves past `seen` or `timeout` passes.
    /// Returns true if a wakeup happened.
    pub fn wait_past(&self, seen: u64, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut generation = self.generation.lock();
        while *generation == seen {
            if self.cond.wait_until(&mut generation, deadline).timed_out() {
                return *generation != seen;
            }
        }
        true
    }
}

impl Scheduler for WakeSignal {
    fn wake(&self) {
        *self.generation.lock() += 1;
        self.cond.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_wake_before_wait_is_not_lost() {
        let signal = WakeSignal::new();
        let seen = signal.generation();
        signal.wake();
        assert!(signal.wait_past(seen, Duration::from_millis(1)));
    }

    #[test]
    fn test_wait_times_out_without_wake() {
        let signal = WakeSignal::new();
        assert!(!signal.wait_past(signal.generation(), Duration::from_millis(10)));
    }

    #[test]
    fn test_wake_from_other_thread() {
        let signal = Arc::new(WakeSignal::new());
        let seen = signal.generation();
        let remote = Arc::clone(&signal);
        let waker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.wake();
        });
        assert!(signal.wait_past(seen, Duration::from_secs(5)));
        waker.join().unwrap();
    }
}
