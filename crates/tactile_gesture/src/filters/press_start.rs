//! Raw press-start recognition
//!
//! Reports the moment a gesture's first pointer touches down, regardless of
//! what the pointers do afterwards.

use tactile_input::{IntSize, Offset, PointerEventPass, PointerInputChange};

use crate::filter::{FilterContext, PointerInputFilter, PositionCallback};

/// Fires once per down-to-all-up cycle with the first down's position
pub struct RawPressStartFilter {
    on_press_start: PositionCallback,
    execution_pass: PointerEventPass,
    enabled: bool,
    active: bool,
}

impl Default for RawPressStartFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl RawPressStartFilter {
    pub fn new() -> Self {
        Self {
            on_press_start: Box::new(|_| {}),
            execution_pass: PointerEventPass::Main,
            enabled: true,
            active: false,
        }
    }

    /// Called with the first down's position
    pub fn on_press_start<F>(mut self, callback: F) -> Self
    where
        F: FnMut(Offset) + 'static,
    {
        self.on_press_start = Box::new(callback);
        self
    }

    /// Pass during which downs are inspected and consumed
    pub fn with_execution_pass(mut self, pass: PointerEventPass) -> Self {
        self.execution_pass = pass;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl PointerInputFilter for RawPressStartFilter {
    fn on_pointer_input(
        &mut self,
        changes: Vec<PointerInputChange>,
        pass: PointerEventPass,
        _size: IntSize,
        _ctx: &mut FilterContext<'_>,
    ) -> Vec<PointerInputChange> {
        if pass != self.execution_pass || changes.is_empty() {
            return changes;
        }

        if !self.active && self.enabled && changes.iter().all(|c| c.changed_to_down()) {
            self.active = true;
            let position = changes[0].current.position;
            tracing::trace!(?position, "press start");
            (self.on_press_start)(position);
        } else if self.active && changes.iter().all(|c| c.changed_to_up_ignore_consumed()) {
            self.active = false;
        }

        if !self.active {
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

    fn on_cancel(&mut self, _ctx: &mut FilterContext<'_>) {
        self.active = false;
    }

    fn set_enabled(&mut self, enabled: bool, ctx: &mut FilterContext<'_>) {
        self.enabled = enabled;
        if !enabled {
            self.on_cancel(ctx);
        }
    }

    fn name(&self) -> &'static str {
        "raw_press_start"
    }
}
