//! Timer system for Thumbgrid.
//!
//! Provides repeating timers for cooperative, single-threaded event loops. The owner polls [`TimerManager::process_expired`] from its
//! loop and dispatches the returned IDs; [`TimerManager::time_until_next`]
//! tells the loop how long it may sleep.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use slotmap::{SlotMap, new_key_type};

use crate::error::{CoreError, CoreResult};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

#[derive(Debug)]
struct TimerData {
    next_fire: Instant,
    interval: Duration,
}

/// An entry in the timer queue (min-heap by fire time).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other.fire_time.cmp(&self.fire_time)
    }
}

/// Manages a set of timers.
///
/// Stopped timers leave stale queue entries behind; they are skipped lazily
/// when they reach the front of the queue.
#[derive(Debug, Default)]
pub struct TimerManager {
    timers: SlotMap<TimerId, TimerData>,
    queue: BinaryHeap<TimerQueueEntry>,
}

impl TimerManager {
    /// Create a new timer manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a repeating timer that fires at the specified interval.
    ///
    /// The first fire occurs after `interval` duration.
    pub fn start_repeating(&mut self, interval: Duration) -> TimerId {
        let next_fire = Instant::now() + interval;
        let id = self.timers.insert(TimerData {
            next_fire,
            interval,
        });
        self.queue.push(TimerQueueEntry {
            id,
            fire_time: next_fire,
        });
        tracing::trace!(target: targets::TIMER, ?id, ?interval, "timer started");
        id
    }

    /// Stop and remove a timer.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTimerId`] if the timer was not found.
    pub fn stop(&mut self, id: TimerId) -> CoreResult<()> {
        if self.timers.remove(id).is_some() {
            tracing::trace!(target: targets::TIMER, ?id, "timer stopped");
            Ok(())
        } else {
            Err(CoreError::InvalidTimerId)
        }
    }

    /// Check if a timer is currently active.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Get the duration until the next timer fires, if any.
    ///
    /// Returns `None` if there are no active timers.
    pub fn time_until_next(&mut self) -> Option<Duration> {
        self.discard_stale();
        self.queue
            .peek()
            .map(|entry| entry.fire_time.saturating_duration_since(Instant::now()))
    }

    /// Process all timers that should fire now.
    ///
    /// Returns the IDs of the timers that fired, in fire-time order.
    pub fn process_expired(&mut self) -> Vec<TimerId> {
        self.process_expired_at(Instant::now())
    }

    fn process_expired_at(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired = Vec::new();

        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_time > now {
                break;
            }
            self.queue.pop();

            let Some(timer) = self.timers.get_mut(entry.id) else {
                continue;
            };
            // A restarted timer can leave an older entry behind.
            if timer.next_fire != entry.fire_time {
                continue;
            }

            tracing::trace!(target: targets::TIMER, id = ?entry.id, "timer fired");
            fired.push(entry.id);

            timer.next_fire = now + timer.interval;
            self.queue.push(TimerQueueEntry {
                id: entry.id,
                fire_time: timer.next_fire,
            });
        }

        fired
    }

    fn discard_stale(&mut self) {
        while let Some(entry) = self.queue.peek() {
            match self.timers.get(entry.id) {
                Some(timer) if timer.next_fire == entry.fire_time => break,
                _ => {
                    self.queue.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeating_reschedules() {
        let mut timers = TimerManager::new();
        let id = timers.start_repeating(Duration::from_millis(10));

        let t1 = Instant::now() + Duration::from_millis(20);
        assert_eq!(timers.process_expired_at(t1), vec![id]);
        assert!(timers.is_active(id));
        assert!(timers.process_expired_at(t1).is_empty());
        assert_eq!(
            timers.process_expired_at(t1 + Duration::from_millis(10)),
            vec![id]
        );
    }

    #[test]
    fn test_stop_timer() {
        let mut timers = TimerManager::new();
        let id = timers.start_repeating(Duration::ZERO);
        assert!(timers.is_active(id));

        assert!(timers.stop(id).is_ok());
        assert_eq!(timers.stop(id), Err(CoreError::InvalidTimerId));
        assert!(!timers.is_active(id));
        assert!(timers.time_until_next().is_none());
        assert!(
            timers
                .process_expired_at(Instant::now() + Duration::from_secs(1))
                .is_empty()
        );
    }

    #[test]
    fn test_time_until_next() {
        let mut timers = TimerManager::new();
        assert!(timers.time_until_next().is_none());

        timers.start_repeating(Duration::from_secs(60));
        let wait = timers.time_until_next().unwrap();
        assert!(wait <= Duration::from_secs(60));
        assert!(wait > Duration::from_secs(59));
    }
}
