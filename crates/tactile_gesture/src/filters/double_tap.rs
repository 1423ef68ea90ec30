//! Double-tap recognition
//!
//! The first up of a potential double tap is held back from sibling tap
//! filters with the delay-up protocol. It is released when the timeout
//! passes without a second down, and claimed when one arrives.

use std::time::Duration;

use tactile_input::{GestureConfig, IntSize, Offset, PointerEventPass, PointerInputChange};

use crate::bounds::all_pointers_in_bounds;
use crate::delay_up::DelayUpDispatcher;
use crate::filter::{FilterContext, PointerInputFilter, PositionCallback};
use crate::scheduler::TimerId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DoubleTapState {
    Idle,
    Down,
    /// First up delayed, waiting for the second down
    Up(TimerId),
    SecondDown,
}

pub struct DoubleTapFilter {
    on_double_tap: PositionCallback,
    timeout: Duration,
    enabled: bool,
    state: DoubleTapState,
    delay_up: DelayUpDispatcher,
}

impl Default for DoubleTapFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl DoubleTapFilter {
    pub fn new() -> Self {
        Self::from_config(&GestureConfig::standard())
    }

    pub fn from_config(config: &GestureConfig) -> Self {
        Self {
            on_double_tap: Box::new(|_| {}),
            timeout: config.double_tap_timeout(),
            enabled: true,
            state: DoubleTapState::Idle,
            delay_up: DelayUpDispatcher::new(),
        }
    }

    /// Called with the position of the second up
    pub fn on_double_tap<F>(mut self, callback: F) -> Self
    where
        F: FnMut(Offset) + 'static,
    {
        self.on_double_tap = Box::new(callback);
        self
    }

    /// Longest gap between the first up and the second down
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Return to idle, letting any held up proceed as a single tap
    fn release(&mut self, ctx: &mut FilterContext<'_>) {
        if let DoubleTapState::Up(timer) = self.state {
            ctx.cancel_timer(timer);
        }
        self.delay_up.dispatch_delayed_up(false, ctx);
        self.state = DoubleTapState::Idle;
    }

    fn on_initial(
        &mut self,
        changes: Vec<PointerInputChange>,
        ctx: &mut FilterContext<'_>,
    ) -> Vec<PointerInputChange> {
        match self.state {
            DoubleTapState::Down if changes.iter().all(|c| c.changed_to_up()) => {
                self.delay_up.delay_up(&changes, ctx);
                let timer = ctx.schedule_timer(self.timeout);
                tracing::trace!(?timer, "waiting for second tap");
                self.state = DoubleTapState::Up(timer);
                changes
            }
            DoubleTapState::Up(timer) if changes.iter().all(|c| c.changed_to_down()) => {
                ctx.cancel_timer(timer);
                self.delay_up.dispatch_delayed_up(true, ctx);
                self.state = DoubleTapState::SecondDown;
                changes
            }
            DoubleTapState::SecondDown if changes.iter().all(|c| c.changed_to_up()) => {
                let position = changes[0].current.position;
                self.state = DoubleTapState::Idle;
                tracing::debug!(?position, "double tap");
                (self.on_double_tap)(position);
                changes.into_iter().map(|c| c.consume_down_change()).collect()
            }
            _ => changes,
        }
    }
}

impl PointerInputFilter for DoubleTapFilter {
    fn on_pointer_input(
        &mut self,
        changes: Vec<PointerInputChange>,
        pass: PointerEventPass,
        size: IntSize,
        ctx: &mut FilterContext<'_>,
    ) -> Vec<PointerInputChange> {
        if changes.is_empty() {
            return changes;
        }

        match pass {
            PointerEventPass::Initial => self.on_initial(changes, ctx),
            PointerEventPass::Main => {
                match self.state {
                    DoubleTapState::Idle => {
                        if self.enabled
                            && changes.iter().all(|c| c.changed_to_down())
                            && all_pointers_in_bounds(&changes, size)
                        {
                            self.state = DoubleTapState::Down;
                        }
                    }
                    DoubleTapState::Down | DoubleTapState::SecondDown => {
                        if !all_pointers_in_bounds(&changes, size)
                            || changes.iter().all(|c| c.changed_to_up_ignore_consumed())
                        {
                            tracing::trace!("double tap abandoned");
                            self.release(ctx);
                        }
                    }
                    DoubleTapState::Up(_) => {}
                }
                changes
            }
            PointerEventPass::Final => {
                let tracking = matches!(self.state, DoubleTapState::Down | DoubleTapState::SecondDown);
                if tracking && changes.iter().any(|c| c.any_position_change_consumed()) {
                    tracing::trace!("double tap abandoned: movement consumed");
                    self.release(ctx);
                }
                changes
            }
        }
    }

    fn on_timer(&mut self, timer: TimerId, ctx: &mut FilterContext<'_>) {
        if self.state != DoubleTapState::Up(timer) {
            tracing::trace!(?timer, "discarding stale double tap timer");
            return;
        }
        tracing::trace!("double tap timed out");
        self.state = DoubleTapState::Idle;
        self.delay_up.dispatch_delayed_up(false, ctx);
    }

    fn on_cancel(&mut self, ctx: &mut FilterContext<'_>) {
        self.release(ctx);
    }

    fn set_enabled(&mut self, enabled: bool, ctx: &mut FilterContext<'_>) {
        self.enabled = enabled;
        if !enabled {
            self.release(ctx);
        }
    }

    fn name(&self) -> &'static str {
        "double_tap"
    }
}
