//! The filter contract
//!
//! Every gesture recognizer implements [`PointerInputFilter`]. The dispatcher
//! calls it once per pass for each batch, and hands it a [`FilterContext`]
//! for the only side effects a filter may have: sending custom events to its
//! siblings and scheduling timers.

use std::time::Duration;

use slotmap::new_key_type;
use tactile_input::{CustomEvent, IntSize, PointerEventPass, PointerInputChange};

use crate::scheduler::{TimerId, TimerScheduler};

new_key_type! {
    /// Handle to a filter registered with a dispatcher
    pub struct FilterId;
}

/// Callback receiving a pointer position
pub type PositionCallback = Box<dyn FnMut(tactile_input::Offset)>;

/// Callback with no arguments
pub type Callback = Box<dyn FnMut()>;

/// Scale callback: receives the proposed factor, returns the factor it used
pub type ScaleCallback = Box<dyn FnMut(f32) -> f32>;

/// Predicate polled before a gesture may start
pub type Predicate = Box<dyn FnMut() -> bool>;

/// Side-effect capabilities handed to a filter for one call
pub struct FilterContext<'a> {
    owner: FilterId,
    scheduler: &'a mut TimerScheduler,
    outbox: &'a mut Vec<CustomEvent>,
}

impl<'a> FilterContext<'a> {
    pub(crate) fn new(
        owner: FilterId,
        scheduler: &'a mut TimerScheduler,
        outbox: &'a mut Vec<CustomEvent>,
    ) -> Self {
        Self {
            owner,
            scheduler,
            outbox,
        }
    }

    /// The filter this context belongs to
    pub fn filter_id(&self) -> FilterId {
        self.owner
    }

    /// Current dispatcher clock
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Send an event to every other filter.
    ///
    /// Delivery happens as soon as the current call returns, before the
    /// dispatcher invokes the next filter.
    pub fn dispatch_custom_event(&mut self, event: CustomEvent) {
        self.outbox.push(event);
    }

    /// Ask for [`PointerInputFilter::on_timer`] to be called after `delay`
    pub fn schedule_timer(&mut self, delay: Duration) -> TimerId {
        self.scheduler.schedule(self.owner, delay)
    }

    /// Cancel a timer scheduled earlier. Returns false if it is no longer pending.
    pub fn cancel_timer(&mut self, id: TimerId) -> bool {
        self.scheduler.cancel(id)
    }
}

/// A gesture recognizer driven by the multi-pass dispatcher
///
/// `on_pointer_input` must return the same pointers in the same order, and
/// may only add consumption, never remove it.
pub trait PointerInputFilter {
    /// Inspect one pass of a batch and return it, possibly with more consumed
    fn on_pointer_input(
        &mut self,
        changes: Vec<PointerInputChange>,
        pass: PointerEventPass,
        size: IntSize,
        ctx: &mut FilterContext<'_>,
    ) -> Vec<PointerInputChange>;

    /// A sibling sent a custom event
    fn on_custom_event(&mut self, _event: &CustomEvent, _ctx: &mut FilterContext<'_>) {}

    /// A timer scheduled by this filter came due
    fn on_timer(&mut self, _timer: TimerId, _ctx: &mut FilterContext<'_>) {}

    /// The pointer stream was abandoned; return to the initial state.
    ///
    /// Must be idempotent.
    fn on_cancel(&mut self, ctx: &mut FilterContext<'_>);

    /// Enable or disable recognition. Disabling cancels any gesture in flight.
    fn set_enabled(&mut self, enabled: bool, ctx: &mut FilterContext<'_>);

    /// Short name used in log output
    fn name(&self) -> &'static str;
}
