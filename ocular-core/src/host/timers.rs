//! TimerManager - host-side timers driven by the main loop
//!
//! Timers never fire on their own; the host calls [`TimerManager::fire_due`]
//! once per tick. Callbacks run with no lock held so they may schedule or
//! cancel timers, including their own.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use ocular_api::{TimerCallback, TimerHandle};

use crate::events::invoke_isolated;

struct Timer {
    handle: TimerHandle,
    interval: Duration,
    callback: TimerCallback,
    repeat: bool,
    next_fire: Instant,
}

/// Scheduled timers, ids starting at 1
pub struct TimerManager {
    timers: Mutex<Vec<Timer>>,
    next_id: AtomicU64,
}

impl TimerManager {
    pub fn new() -> Self {
        Self {
            timers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn timers(&self) -> MutexGuard<'_, Vec<Timer>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Schedule `callback` to fire `ms` milliseconds from now
    pub fn add(&self, ms: u32, callback: TimerCallback, repeat: bool) -> TimerHandle {
        self.add_at(Instant::now(), ms, callback, repeat)
    }

    /// Schedule `callback` to fire `ms` milliseconds after `now`
    pub fn add_at(
        &self,
        now: Instant,
        ms: u32,
        callback: TimerCallback,
        repeat: bool,
    ) -> TimerHandle {
        let handle = TimerHandle::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let interval = Duration::from_millis(u64::from(ms));
        self.timers().push(Timer {
            handle,
            interval,
            callback,
            repeat,
            next_fire: now + interval,
        });
        handle
    }

    /// Cancel a live timer. Returns `false` for unknown or finished timers.
    pub fn cancel(&self, handle: TimerHandle) -> bool {
        let mut timers = self.timers();
        let before = timers.len();
        timers.retain(|t| t.handle != handle);
        timers.len() != before
    }

    /// Fire every timer due at `now`. Returns how many fired.
    ///
    /// Repeating timers are re-armed relative to `now`; one-shot timers are
    /// dropped. A timer cancelled by an earlier callback in the same batch
    /// does not fire.
    pub fn fire_due(&self, now: Instant) -> usize {
        let due: Vec<TimerHandle> = self
            .timers()
            .iter()
            .filter(|t| now >= t.next_fire)
            .map(|t| t.handle)
            .collect();

        let mut fired = 0;
        for handle in due {
            let callback = {
                let mut timers = self.timers();
                let Some(index) = timers.iter().position(|t| t.handle == handle) else {
                    continue;
                };
                let callback = timers[index].callback.clone();
                if timers[index].repeat {
                    let interval = timers[index].interval;
                    timers[index].next_fire = now + interval;
                } else {
                    timers.remove(index);
                }
                callback
            };

            fired += 1;
            let result = invoke_isolated(|| {
                callback(handle);
                Ok(())
            });
            if let Err(detail) = result {
                tracing::error!(timer = %handle, %detail, "Timer callback panicked");
            }
        }
        fired
    }

    /// Number of live timers
    pub fn pending(&self) -> usize {
        self.timers().len()
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, TimerCallback) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        let callback: TimerCallback = Arc::new(move |_: TimerHandle| {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        (count, callback)
    }

    #[test]
    fn test_ids_start_at_one() {
        let timers = TimerManager::new();
        let (_, cb) = counter();
        assert_eq!(timers.add(10, cb.clone(), false), TimerHandle::new(1));
        assert_eq!(timers.add(10, cb, false), TimerHandle::new(2));
    }

    #[test]
    fn test_one_shot_fires_once_when_due() {
        let timers = TimerManager::new();
        let start = Instant::now();
        let (count, cb) = counter();
        timers.add_at(start, 100, cb, false);

        assert_eq!(timers.fire_due(start + Duration::from_millis(50)), 0);
        assert_eq!(timers.fire_due(start + Duration::from_millis(100)), 1);
        assert_eq!(timers.fire_due(start + Duration::from_millis(500)), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_repeating_timer_rearms_from_fire_time() {
        let timers = TimerManager::new();
        let start = Instant::now();
        let (count, cb) = counter();
        timers.add_at(start, 100, cb, true);

        timers.fire_due(start + Duration::from_millis(150));
        // Next deadline is 250ms, not 200ms
        assert_eq!(timers.fire_due(start + Duration::from_millis(200)), 0);
        assert_eq!(timers.fire_due(start + Duration::from_millis(250)), 1);
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(timers.pending(), 1);
    }

    #[test]
    fn test_cancel_only_live_timers() {
        let timers = TimerManager::new();
        let (_, cb) = counter();
        let handle = timers.add(10, cb, true);

        assert!(timers.cancel(handle));
        assert!(!timers.cancel(handle));
        assert!(!timers.cancel(TimerHandle::new(99)));
    }

    #[test]
    fn test_callback_can_cancel_later_timer_in_batch() {
        let timers = Arc::new(TimerManager::new());
        let start = Instant::now();
        let (count, cb) = counter();

        let victim = TimerHandle::new(2);
        let inner = timers.clone();
        timers.add_at(
            start,
            10,
            Arc::new(move |_: TimerHandle| {
                inner.cancel(victim);
            }),
            false,
        );
        assert_eq!(timers.add_at(start, 10, cb, false), victim);

        assert_eq!(timers.fire_due(start + Duration::from_millis(10)), 1);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
