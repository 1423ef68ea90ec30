//! Multi-pass dispatch of pointer batches to gesture filters
//!
//! Bridges the platform's pointer samples to the registered filters.
//!
//! # Architecture
//!
//! ```text
//! PointerSample[] (one frame)
//!     ↓
//! PointerTracker (previous/current pairing)
//!     ↓
//! for pass in Initial, Main, Final:
//!     for filter in registration order:
//!         changes = filter.on_pointer_input(changes, pass, size)
//!         deliver queued custom events to the other filters
//!     ↓
//! consumed changes returned to the host
//! ```
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use std::time::Duration;
//! use tactile_gesture::prelude::*;
//!
//! let taps = Rc::new(RefCell::new(Vec::new()));
//! let taps_clone = Rc::clone(&taps);
//!
//! let mut dispatcher = GestureDispatcher::new(IntSize::new(100, 100));
//! dispatcher.add_filter(Box::new(TapFilter::new().on_tap(move |pos| {
//!     taps_clone.borrow_mut().push(pos);
//! })));
//!
//! dispatcher.on_samples(&[PointerSample::down(0, 13.0, 17.0, Duration::ZERO)]);
//! dispatcher.on_samples(&[PointerSample::up(0, 13.0, 17.0, Duration::from_millis(20))]);
//!
//! assert_eq!(*taps.borrow(), vec![Offset::new(13.0, 17.0)]);
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use slotmap::SlotMap;
use tactile_input::{
    CustomEvent, GestureError, IntSize, PointerEventPass, PointerInputChange, PointerSample,
    PointerTracker, Result,
};

use crate::filter::{FilterContext, FilterId, PointerInputFilter};
use crate::scheduler::TimerScheduler;

/// Tolerance when checking that consumption only grows
const MONOTONIC_EPSILON: f32 = 1e-3;

/// Owns the filters of one pointer-input region and replays batches through them
pub struct GestureDispatcher {
    filters: SlotMap<FilterId, Box<dyn PointerInputFilter>>,
    /// Invocation order within a pass
    order: Vec<FilterId>,
    tracker: PointerTracker,
    scheduler: TimerScheduler,
    size: IntSize,
}

impl GestureDispatcher {
    /// Create a dispatcher for a container of the given size
    pub fn new(size: IntSize) -> Self {
        Self {
            filters: SlotMap::with_key(),
            order: Vec::new(),
            tracker: PointerTracker::new(),
            scheduler: TimerScheduler::new(),
            size,
        }
    }

    /// Register a filter. Filters run in registration order within each pass.
    pub fn add_filter(&mut self, filter: Box<dyn PointerInputFilter>) -> FilterId {
        tracing::trace!(filter = filter.name(), "filter added");
        let id = self.filters.insert(filter);
        self.order.push(id);
        id
    }

    /// Cancel and unregister a filter, dropping its pending timers
    pub fn remove_filter(&mut self, id: FilterId) -> Result<()> {
        if !self.filters.contains_key(id) {
            return Err(unknown_filter(id));
        }
        self.invoke(id, |filter, ctx| filter.on_cancel(ctx));
        self.filters.remove(id);
        self.order.retain(|other| *other != id);
        self.scheduler.cancel_owned_by(id);
        Ok(())
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Current container size
    pub fn size(&self) -> IntSize {
        self.size
    }

    /// Update the container size used for subsequent batches
    pub fn set_size(&mut self, size: IntSize) {
        self.size = size;
    }

    /// Current clock value
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Number of timers waiting to fire
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending_count()
    }

    /// Enable or disable one filter
    pub fn set_enabled(&mut self, id: FilterId, enabled: bool) -> Result<()> {
        self.invoke(id, |filter, ctx| filter.set_enabled(enabled, ctx))
            .ok_or_else(|| unknown_filter(id))
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Process one frame of raw samples.
    ///
    /// Timers due before the frame fire first, then the batch assembled from
    /// the samples is dispatched. Returns the consumed batch.
    pub fn on_samples(&mut self, samples: &[PointerSample]) -> Vec<PointerInputChange> {
        if let Some(time) = samples.iter().map(|s| s.time).max() {
            self.advance_time(time);
        }
        let changes = self.tracker.batch(samples);
        if changes.is_empty() {
            return changes;
        }
        self.dispatch(changes)
    }

    /// Replay an already assembled batch through every filter and pass.
    ///
    /// Each filter sees the output of the filter before it, and the last
    /// filter of one pass feeds the first filter of the next.
    pub fn dispatch(&mut self, mut changes: Vec<PointerInputChange>) -> Vec<PointerInputChange> {
        let order = self.order.clone();
        for pass in PointerEventPass::ALL {
            for &id in &order {
                let size = self.size;
                let input = changes.clone();
                let Some((name, output)) = self.invoke(id, |filter, ctx| {
                    let output = filter.on_pointer_input(input, pass, size, ctx);
                    (filter.name(), output)
                }) else {
                    continue;
                };
                changes = reconcile(name, &changes, output);
            }
        }
        changes
    }

    /// Deliver an externally produced custom event to every filter
    pub fn dispatch_custom_event(&mut self, event: CustomEvent) {
        self.flush(None, vec![event]);
    }

    /// Advance the clock, firing every timer that comes due on the way
    pub fn advance_time(&mut self, now: Duration) {
        while let Some((timer, owner)) = self.scheduler.pop_due(now) {
            if self
                .invoke(owner, |filter, ctx| filter.on_timer(timer, ctx))
                .is_none()
            {
                tracing::trace!(?timer, "discarding timer of removed filter");
            }
        }
        self.scheduler.advance_clock(now);
    }

    /// Abandon the pointer stream: every filter resets, tracked pointers are forgotten
    pub fn cancel(&mut self) {
        tracing::debug!("cancelling all gesture filters");
        for id in self.order.clone() {
            self.invoke(id, |filter, ctx| filter.on_cancel(ctx));
        }
        self.tracker.clear();
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    /// Call into one filter with a fresh context, then deliver what it sent
    fn invoke<R>(
        &mut self,
        id: FilterId,
        f: impl FnOnce(&mut dyn PointerInputFilter, &mut FilterContext<'_>) -> R,
    ) -> Option<R> {
        let mut outbox = Vec::new();
        let result = {
            let filter = self.filters.get_mut(id)?;
            let mut ctx = FilterContext::new(id, &mut self.scheduler, &mut outbox);
            f(filter.as_mut(), &mut ctx)
        };
        if !outbox.is_empty() {
            self.flush(Some(id), outbox);
        }
        Some(result)
    }

    /// Deliver custom events breadth-first; a filter never receives its own events
    fn flush(&mut self, sender: Option<FilterId>, events: Vec<CustomEvent>) {
        let mut queue: VecDeque<(Option<FilterId>, CustomEvent)> =
            events.into_iter().map(|event| (sender, event)).collect();

        while let Some((from, event)) = queue.pop_front() {
            tracing::trace!(?event, "delivering custom event");
            for &id in &self.order {
                if Some(id) == from {
                    continue;
                }
                let Some(filter) = self.filters.get_mut(id) else {
                    continue;
                };
                let mut outbox = Vec::new();
                let mut ctx = FilterContext::new(id, &mut self.scheduler, &mut outbox);
                filter.on_custom_event(&event, &mut ctx);
                queue.extend(outbox.into_iter().map(|event| (Some(id), event)));
            }
        }
    }
}

fn unknown_filter(id: FilterId) -> GestureError {
    GestureError::UnknownFilter(format!("{id:?}"))
}

/// Enforce the filter contract on one filter's output.
///
/// Dropped or reordered pointers invalidate the whole output, which is
/// discarded. Consumption that shrinks or overshoots the raw delta asserts in
/// debug builds and is clamped in release builds.
fn reconcile(
    name: &'static str,
    before: &[PointerInputChange],
    after: Vec<PointerInputChange>,
) -> Vec<PointerInputChange> {
    let same_pointers = after.len() == before.len()
        && before.iter().zip(&after).all(|(b, a)| b.id == a.id);
    if !same_pointers {
        tracing::error!(
            filter = name,
            expected = before.len(),
            got = after.len(),
            "filter dropped or reordered pointers; output discarded"
        );
        debug_assert!(same_pointers, "{name} dropped or reordered pointers");
        return before.to_vec();
    }

    before
        .iter()
        .zip(after)
        .map(|(b, a)| {
            let raw = b.position_change_ignore_consumed();
            let x = monotonic_axis(b.consumed.position_change.x, a.consumed.position_change.x, raw.x);
            let y = monotonic_axis(b.consumed.position_change.y, a.consumed.position_change.y, raw.y);
            let violated = (b.consumed.down_change && !a.consumed.down_change)
                || x != a.consumed.position_change.x
                || y != a.consumed.position_change.y
                || a.current != b.current
                || a.previous != b.previous;
            if violated {
                tracing::warn!(
                    filter = name,
                    pointer = %b.id,
                    "filter broke consumption rules; clamping"
                );
                debug_assert!(!violated, "{name} broke consumption rules for {}", b.id);
            }

            let mut merged = *b;
            merged.consumed.down_change = b.consumed.down_change || a.consumed.down_change;
            merged.consumed.position_change = tactile_input::Offset::new(x, y);
            merged
        })
        .collect()
}

/// Keep one axis of consumption between what was already claimed and the raw delta
fn monotonic_axis(before: f32, after: f32, raw: f32) -> f32 {
    let (low, high) = if raw >= 0.0 { (before, raw) } else { (raw, before) };
    if after < low - MONOTONIC_EPSILON || after > high + MONOTONIC_EPSILON {
        after.clamp(low.min(high), high.max(low))
    } else {
        after
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{down, ClosureFilter, EventLog};
    use tactile_input::{DelayUpEvent, DelayUpMessage, PointerId};

    #[test]
    fn test_every_filter_sees_every_pass_in_order() {
        let log = EventLog::new();
        let mut dispatcher = GestureDispatcher::new(IntSize::new(10, 10));
        for name in ["a", "b"] {
            let log = log.clone();
            dispatcher.add_filter(Box::new(ClosureFilter::new(move |changes, pass| {
                log.push(format!("{name}:{pass:?}"));
                changes
            })));
        }

        dispatcher.dispatch(vec![down(0, 0, 1.0, 1.0)]);

        assert_eq!(
            log.take(),
            vec![
                "a:Initial", "b:Initial", "a:Main", "b:Main", "a:Final", "b:Final"
            ]
        );
    }

    #[test]
    fn test_consumption_feeds_later_filters() {
        let seen = EventLog::new();
        let mut dispatcher = GestureDispatcher::new(IntSize::new(10, 10));
        dispatcher.add_filter(Box::new(ClosureFilter::new(|changes, pass| {
            if pass == PointerEventPass::Main {
                changes.into_iter().map(|c| c.consume_down_change()).collect()
            } else {
                changes
            }
        })));
        let seen_clone = seen.clone();
        dispatcher.add_filter(Box::new(ClosureFilter::new(move |changes, pass| {
            seen_clone.push(format!("{pass:?}:{}", changes[0].changed_to_down()));
            changes
        })));

        let out = dispatcher.dispatch(vec![down(0, 0, 1.0, 1.0)]);

        assert_eq!(seen.take(), vec!["Initial:true", "Main:false", "Final:false"]);
        assert!(out[0].consumed.down_change);
    }

    #[test]
    fn test_external_custom_events_reach_every_filter() {
        let received = EventLog::new();
        let mut dispatcher = GestureDispatcher::new(IntSize::new(10, 10));

        let r = received.clone();
        dispatcher.add_filter(Box::new(
            ClosureFilter::new(|changes, _| changes).with_events(move |event| {
                r.push(format!("sender:{event:?}"));
            }),
        ));
        let r = received.clone();
        dispatcher.add_filter(Box::new(
            ClosureFilter::new(|changes, _| changes).with_events(move |event| {
                r.push(format!("sibling:{event:?}"));
            }),
        ));

        dispatcher.dispatch_custom_event(CustomEvent::LongPressFired);
        assert_eq!(
            received.take(),
            vec!["sender:LongPressFired", "sibling:LongPressFired"]
        );

        let event = CustomEvent::DelayUp(DelayUpEvent::new(
            DelayUpMessage::DelayUp,
            [PointerId(0)],
        ));
        dispatcher.dispatch_custom_event(event);
        assert_eq!(received.take().len(), 2);
    }

    /// Sends `LongPressFired` during the main pass and records what it receives
    struct Announcer {
        received: EventLog<CustomEvent>,
    }

    impl PointerInputFilter for Announcer {
        fn on_pointer_input(
            &mut self,
            changes: Vec<PointerInputChange>,
            pass: PointerEventPass,
            _size: IntSize,
            ctx: &mut FilterContext<'_>,
        ) -> Vec<PointerInputChange> {
            if pass == PointerEventPass::Main {
                ctx.dispatch_custom_event(CustomEvent::LongPressFired);
            }
            changes
        }

        fn on_custom_event(&mut self, event: &CustomEvent, _ctx: &mut FilterContext<'_>) {
            self.received.push(event.clone());
        }

        fn on_cancel(&mut self, _ctx: &mut FilterContext<'_>) {}

        fn set_enabled(&mut self, _enabled: bool, _ctx: &mut FilterContext<'_>) {}

        fn name(&self) -> &'static str {
            "announcer"
        }
    }

    #[test]
    fn test_sender_never_receives_its_own_event() {
        let own = EventLog::new();
        let sibling = EventLog::new();
        let order = EventLog::new();
        let mut dispatcher = GestureDispatcher::new(IntSize::new(10, 10));

        dispatcher.add_filter(Box::new(Announcer {
            received: own.clone(),
        }));
        let (s, o) = (sibling.clone(), order.clone());
        dispatcher.add_filter(Box::new(
            ClosureFilter::new(move |changes, pass| {
                if pass == PointerEventPass::Main {
                    o.push("sibling main");
                }
                changes
            })
            .with_events(move |event| s.push(event.clone())),
        ));
        let o = order.clone();
        dispatcher.add_filter(Box::new(ClosureFilter::new(|c, _| c).with_events(move |_| {
            o.push("event delivered");
        })));

        dispatcher.dispatch(vec![down(0, 0, 1.0, 1.0)]);

        assert!(own.is_empty());
        assert_eq!(sibling.take(), vec![CustomEvent::LongPressFired]);
        // Delivered as soon as the sender returns, before the next filter runs
        assert_eq!(order.take(), vec!["event delivered", "sibling main"]);
    }

    #[test]
    fn test_unknown_filter_is_an_error() {
        let mut dispatcher = GestureDispatcher::new(IntSize::new(10, 10));
        let id = dispatcher.add_filter(Box::new(ClosureFilter::new(|changes, _| changes)));
        assert!(dispatcher.remove_filter(id).is_ok());
        assert!(matches!(
            dispatcher.set_enabled(id, false),
            Err(GestureError::UnknownFilter(_))
        ));
        assert!(dispatcher.remove_filter(id).is_err());
        assert_eq!(dispatcher.filter_count(), 0);
    }

    #[test]
    fn test_monotonic_axis_clamps() {
        assert_eq!(monotonic_axis(1.0, 0.0, 5.0), 1.0);
        assert_eq!(monotonic_axis(1.0, 7.0, 5.0), 5.0);
        assert_eq!(monotonic_axis(-1.0, -3.0, -5.0), -3.0);
        assert_eq!(monotonic_axis(-1.0, 2.0, -5.0), -1.0);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_reconcile_restores_dropped_pointers_in_release() {
        let before = vec![down(0, 0, 1.0, 1.0), down(1, 0, 2.0, 2.0)];
        let after = vec![before[0]];
        assert_eq!(reconcile("test", &before, after), before);
    }

    #[test]
    fn test_size_updates_apply_to_next_batch() {
        let sizes = EventLog::new();
        let mut dispatcher = GestureDispatcher::new(IntSize::new(10, 10));
        let s = sizes.clone();
        dispatcher.add_filter(Box::new(ClosureFilter::with_size(move |changes, pass, size| {
            if pass == PointerEventPass::Main {
                s.push(format!("{}x{}", size.width, size.height));
            }
            changes
        })));

        dispatcher.dispatch(vec![down(0, 0, 1.0, 1.0)]);
        dispatcher.set_size(IntSize::new(4, 3));
        dispatcher.dispatch(vec![down(1, 0, 1.0, 1.0)]);

        assert_eq!(sizes.take(), vec!["10x10", "4x3"]);
        assert_eq!(dispatcher.size(), IntSize::new(4, 3));
    }
}
