//! Long-press recognition

use std::time::Duration;

use smallvec::SmallVec;
use tactile_input::{
    CustomEvent, GestureConfig, IntSize, Offset, PointerEventPass, PointerId, PointerInputChange,
};

use crate::bounds::any_pointers_in_bounds;
use crate::filter::{FilterContext, PointerInputFilter, PositionCallback};
use crate::scheduler::TimerId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LongPressState {
    Idle,
    /// Waiting for the timer
    Primed(TimerId),
    Fired,
}

/// Fires when pointers stay down, in bounds and unclaimed for the timeout.
///
/// Once fired it claims the up that ends the gesture and tells its siblings
/// with [`CustomEvent::LongPressFired`].
pub struct LongPressFilter {
    on_long_press: PositionCallback,
    timeout: Duration,
    enabled: bool,
    state: LongPressState,
    /// Pressed pointers in the order they went down, with their latest position
    pointers: SmallVec<[(PointerId, Offset); 4]>,
}

impl Default for LongPressFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl LongPressFilter {
    pub fn new() -> Self {
        Self::from_config(&GestureConfig::standard())
    }

    pub fn from_config(config: &GestureConfig) -> Self {
        Self {
            on_long_press: Box::new(|_| {}),
            timeout: config.long_press_timeout(),
            enabled: true,
            state: LongPressState::Idle,
            pointers: SmallVec::new(),
        }
    }

    pub fn on_long_press<F>(mut self, callback: F) -> Self
    where
        F: FnMut(Offset) + 'static,
    {
        self.on_long_press = Box::new(callback);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_fired(&self) -> bool {
        self.state == LongPressState::Fired
    }

    fn reset(&mut self, ctx: &mut FilterContext<'_>) {
        if let LongPressState::Primed(timer) = self.state {
            ctx.cancel_timer(timer);
            tracing::trace!(?timer, "long press timer cancelled");
        }
        self.state = LongPressState::Idle;
        self.pointers.clear();
    }

    fn track(&mut self, changes: &[PointerInputChange]) {
        for change in changes {
            let slot = self.pointers.iter_mut().find(|(id, _)| *id == change.id);
            match (change.current.pressed, slot) {
                (true, Some(slot)) => slot.1 = change.current.position,
                (true, None) => self.pointers.push((change.id, change.current.position)),
                (false, _) => self.pointers.retain(|(id, _)| *id != change.id),
            }
        }
    }
}

impl PointerInputFilter for LongPressFilter {
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
            PointerEventPass::Initial => {
                if self.state != LongPressState::Fired {
                    return changes;
                }
                changes
                    .into_iter()
                    .map(|c| if c.changed_to_up() { c.consume_down_change() } else { c })
                    .collect()
            }
            PointerEventPass::Main => {
                if changes.iter().all(|c| c.changed_to_down()) {
                    self.reset(ctx);
                    if self.enabled {
                        self.track(&changes);
                        let timer = ctx.schedule_timer(self.timeout);
                        tracing::trace!(?timer, timeout = ?self.timeout, "long press armed");
                        self.state = LongPressState::Primed(timer);
                    }
                } else if self.state != LongPressState::Idle {
                    self.track(&changes);
                    if changes.iter().all(|c| c.changed_to_up_ignore_consumed()) {
                        self.reset(ctx);
                    } else if !any_pointers_in_bounds(&changes, size) {
                        tracing::trace!("long press abandoned: pointers left bounds");
                        self.reset(ctx);
                    }
                }
                changes
            }
            PointerEventPass::Final => {
                if matches!(self.state, LongPressState::Primed(_))
                    && changes.iter().any(|c| c.any_position_change_consumed())
                {
                    tracing::trace!("long press abandoned: movement consumed");
                    self.reset(ctx);
                }
                changes
            }
        }
    }

    fn on_custom_event(&mut self, event: &CustomEvent, ctx: &mut FilterContext<'_>) {
        if matches!(event, CustomEvent::LongPressFired)
            && matches!(self.state, LongPressState::Primed(_))
        {
            tracing::trace!("sibling long press fired");
            self.reset(ctx);
        }
    }

    fn on_timer(&mut self, timer: TimerId, ctx: &mut FilterContext<'_>) {
        if self.state != LongPressState::Primed(timer) {
            tracing::trace!(?timer, "discarding stale long press timer");
            return;
        }
        let Some(&(_, position)) = self.pointers.first() else {
            self.reset(ctx);
            return;
        };

        self.state = LongPressState::Fired;
        tracing::debug!(?position, "long press");
        (self.on_long_press)(position);
        ctx.dispatch_custom_event(CustomEvent::LongPressFired);
    }

    fn on_cancel(&mut self, ctx: &mut FilterContext<'_>) {
        self.reset(ctx);
    }

    fn set_enabled(&mut self, enabled: bool, ctx: &mut FilterContext<'_>) {
        self.enabled = enabled;
        if !enabled {
            self.reset(ctx);
        }
    }

    fn name(&self) -> &'static str {
        "long_press"
    }
}
