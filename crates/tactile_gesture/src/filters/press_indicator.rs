//! Press indication: start, stop and cancel of a press

use tactile_input::{IntSize, Offset, PointerEventPass, PointerInputChange};

use crate::bounds::all_pointers_in_bounds;
use crate::filter::{Callback, FilterContext, PointerInputFilter, PositionCallback};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Idle,
    Started,
}

/// Reports presses so a widget can show pressed state.
///
/// `on_start` fires when the first pointers go down, `on_stop` when they all
/// lift, and `on_cancel` if the press is invalidated first: another filter
/// claimed movement, a pointer left the container, or the filter was
/// disabled mid-press.
pub struct PressIndicatorFilter {
    on_start: PositionCallback,
    on_stop: Callback,
    on_cancel: Callback,
    enabled: bool,
    state: State,
}

impl Default for PressIndicatorFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl PressIndicatorFilter {
    pub fn new() -> Self {
        Self {
            on_start: Box::new(|_| {}),
            on_stop: Box::new(|| {}),
            on_cancel: Box::new(|| {}),
            enabled: true,
            state: State::Idle,
        }
    }

    pub fn on_start<F>(mut self, callback: F) -> Self
    where
        F: FnMut(Offset) + 'static,
    {
        self.on_start = Box::new(callback);
        self
    }

    pub fn on_stop<F>(mut self, callback: F) -> Self
    where
        F: FnMut() + 'static,
    {
        self.on_stop = Box::new(callback);
        self
    }

    pub fn on_cancel<F>(mut self, callback: F) -> Self
    where
        F: FnMut() + 'static,
    {
        self.on_cancel = Box::new(callback);
        self
    }

    pub fn is_pressed(&self) -> bool {
        self.state == State::Started
    }

    fn cancel_press(&mut self) {
        if self.state == State::Started {
            tracing::trace!("press cancelled");
            self.state = State::Idle;
            (self.on_cancel)();
        }
    }
}

impl PointerInputFilter for PressIndicatorFilter {
    fn on_pointer_input(
        &mut self,
        changes: Vec<PointerInputChange>,
        pass: PointerEventPass,
        size: IntSize,
        _ctx: &mut FilterContext<'_>,
    ) -> Vec<PointerInputChange> {
        if changes.is_empty() {
            return changes;
        }

        match pass {
            PointerEventPass::Initial => {
                if self.state != State::Started {
                    return changes;
                }
                // Pointers joining a press belong to it
                changes
                    .into_iter()
                    .map(|c| if c.changed_to_down() { c.consume_down_change() } else { c })
                    .collect()
            }
            PointerEventPass::Main => {
                if self.state == State::Idle
                    && self.enabled
                    && changes.iter().all(|c| c.changed_to_down())
                {
                    self.state = State::Started;
                    let position = changes[0].current.position;
                    tracing::trace!(?position, "press started");
                    (self.on_start)(position);
                } else if self.state == State::Started {
                    if changes.iter().all(|c| c.changed_to_up_ignore_consumed()) {
                        tracing::trace!("press stopped");
                        self.state = State::Idle;
                        (self.on_stop)();
                    } else if !all_pointers_in_bounds(&changes, size) {
                        self.cancel_press();
                    }
                }

                if self.state != State::Started {
                    return changes;
                }
                changes
                    .into_iter()
                    .map(|c| {
                        if c.changed_to_down() || c.changed_to_up() {
                            c.consume_down_change()
                        } else {
                            c
                        }
                    })
                    .collect()
            }
            PointerEventPass::Final => {
                if self.state == State::Started
                    && changes.iter().any(|c| c.any_position_change_consumed())
                {
                    self.cancel_press();
                }
                changes
            }
        }
    }

    fn on_cancel(&mut self, _ctx: &mut FilterContext<'_>) {
        self.cancel_press();
    }

    fn set_enabled(&mut self, enabled: bool, _ctx: &mut FilterContext<'_>) {
        self.enabled = enabled;
        if !enabled {
            self.cancel_press();
        }
    }

    fn name(&self) -> &'static str {
        "press_indicator"
    }
}
