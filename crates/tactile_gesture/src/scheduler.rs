//! Cooperative timer scheduler
//!
//! Timers live on a virtual uptime clock owned by the dispatcher. Nothing runs
//! on another thread: the dispatcher advances the clock and hands each due
//! timer back to the filter that scheduled it, one at a time, in deadline
//! order. A cancelled timer is removed from the table and can never fire.

use std::time::Duration;

use slotmap::{new_key_type, SlotMap};

use crate::filter::FilterId;

new_key_type! {
    /// Handle to a scheduled timer
    pub struct TimerId;
}

struct TimerEntry {
    owner: FilterId,
    deadline: Duration,
    /// Insertion order, breaks ties between equal deadlines
    seq: u64,
}

/// Single-threaded timer table on a virtual clock
pub struct TimerScheduler {
    timers: SlotMap<TimerId, TimerEntry>,
    now: Duration,
    next_seq: u64,
}

impl Default for TimerScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerScheduler {
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            now: Duration::ZERO,
            next_seq: 0,
        }
    }

    /// Current clock value
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of timers still waiting to fire
    pub fn pending_count(&self) -> usize {
        self.timers.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Schedule a timer `delay` after the current clock value
    pub fn schedule(&mut self, owner: FilterId, delay: Duration) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let deadline = self.now + delay;
        let id = self.timers.insert(TimerEntry {
            owner,
            deadline,
            seq,
        });
        tracing::trace!(?id, ?deadline, "timer scheduled");
        id
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(id).is_some()
    }

    /// Cancel every timer belonging to a filter
    pub fn cancel_owned_by(&mut self, owner: FilterId) {
        self.timers.retain(|_, entry| entry.owner != owner);
    }

    /// Remove and return the earliest timer due at or before `until`.
    ///
    /// The clock moves to that timer's deadline so callbacks observe the time
    /// they were scheduled for.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, FilterId)> {
        let (id, deadline) = self
            .timers
            .iter()
            .filter(|(_, entry)| entry.deadline <= until)
            .min_by_key(|(_, entry)| (entry.deadline, entry.seq))
            .map(|(id, entry)| (id, entry.deadline))?;

        let entry = self.timers.remove(id)?;
        self.now = self.now.max(deadline);
        Some((id, entry.owner))
    }

    /// Move the clock forward. Earlier values are ignored.
    pub fn advance_clock(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> FilterId {
        let mut ids: SlotMap<FilterId, ()> = SlotMap::with_key();
        ids.insert(())
    }

    #[test]
    fn test_timers_pop_in_deadline_order() {
        let mut scheduler = TimerScheduler::new();
        let owner = owner();
        let late = scheduler.schedule(owner, Duration::from_millis(300));
        let early = scheduler.schedule(owner, Duration::from_millis(100));

        let until = Duration::from_millis(500);
        assert_eq!(scheduler.pop_due(until), Some((early, owner)));
        assert_eq!(scheduler.now(), Duration::from_millis(100));
        assert_eq!(scheduler.pop_due(until), Some((late, owner)));
        assert_eq!(scheduler.pop_due(until), None);
    }

    #[test]
    fn test_equal_deadlines_keep_insertion_order() {
        let mut scheduler = TimerScheduler::new();
        let owner = owner();
        let first = scheduler.schedule(owner, Duration::from_millis(10));
        let second = scheduler.schedule(owner, Duration::from_millis(10));

        let until = Duration::from_millis(10);
        assert_eq!(scheduler.pop_due(until).map(|(id, _)| id), Some(first));
        assert_eq!(scheduler.pop_due(until).map(|(id, _)| id), Some(second));
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut scheduler = TimerScheduler::new();
        let owner = owner();
        let id = scheduler.schedule(owner, Duration::from_millis(10));

        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert_eq!(scheduler.pop_due(Duration::from_secs(1)), None);
    }

    #[test]
    fn test_not_yet_due() {
        let mut scheduler = TimerScheduler::new();
        let id = scheduler.schedule(owner(), Duration::from_millis(500));

        assert_eq!(scheduler.pop_due(Duration::from_millis(499)), None);
        assert!(scheduler.is_pending(id));
    }

    #[test]
    fn test_clock_never_goes_backwards() {
        let mut scheduler = TimerScheduler::new();
        scheduler.advance_clock(Duration::from_millis(50));
        scheduler.advance_clock(Duration::from_millis(20));
        assert_eq!(scheduler.now(), Duration::from_millis(50));

        // Delays are relative to the advanced clock
        scheduler.schedule(owner(), Duration::from_millis(10));
        assert_eq!(scheduler.pop_due(Duration::from_millis(59)), None);
        assert!(scheduler.pop_due(Duration::from_millis(60)).is_some());
    }
}
