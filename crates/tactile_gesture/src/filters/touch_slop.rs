//! Detects when pointers have travelled far enough to count as a drag

use tactile_input::{GestureConfig, IntSize, Offset, PointerEventPass, PointerInputChange};

use crate::filter::{Callback, FilterContext, PointerInputFilter};

/// Fires once per gesture when the accumulated average movement of the
/// pressed pointers exceeds the touch slop
pub struct TouchSlopExceededFilter {
    on_touch_slop_exceeded: Callback,
    slop: f32,
    enabled: bool,
    accumulated: Offset,
    passed: bool,
}

impl Default for TouchSlopExceededFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TouchSlopExceededFilter {
    pub fn new() -> Self {
        Self::from_config(&GestureConfig::standard())
    }

    pub fn from_config(config: &GestureConfig) -> Self {
        Self {
            on_touch_slop_exceeded: Box::new(|| {}),
            slop: config.touch_slop,
            enabled: true,
            accumulated: Offset::ZERO,
            passed: false,
        }
    }

    pub fn on_touch_slop_exceeded<F: FnMut() + 'static>(mut self, callback: F) -> Self {
        self.on_touch_slop_exceeded = Box::new(callback);
        self
    }

    pub fn with_slop(mut self, slop: f32) -> Self {
        self.slop = slop;
        self
    }

    pub fn slop(&self) -> f32 {
        self.slop
    }

    fn reset(&mut self) {
        self.accumulated = Offset::ZERO;
        self.passed = false;
    }
}

impl PointerInputFilter for TouchSlopExceededFilter {
    fn on_pointer_input(
        &mut self,
        changes: Vec<PointerInputChange>,
        pass: PointerEventPass,
        _size: IntSize,
        _ctx: &mut FilterContext<'_>,
    ) -> Vec<PointerInputChange> {
        if pass != PointerEventPass::Main || changes.is_empty() {
            return changes;
        }
        if changes.iter().all(|c| !c.current.pressed) {
            self.reset();
            return changes;
        }
        if self.passed || !self.enabled {
            return changes;
        }

        let moving: Vec<Offset> = changes
            .iter()
            .filter(|c| c.previous.pressed && c.current.pressed)
            .map(|c| c.position_change())
            .collect();
        if moving.is_empty() {
            return changes;
        }
        let sum = moving.iter().fold(Offset::ZERO, |acc, d| acc + *d);
        self.accumulated += sum / moving.len() as f32;

        if self.accumulated.distance() > self.slop {
            self.passed = true;
            tracing::debug!(accumulated = ?self.accumulated, "touch slop exceeded");
            (self.on_touch_slop_exceeded)();
        }
        changes
    }

    fn on_cancel(&mut self, _ctx: &mut FilterContext<'_>) {
        self.reset();
    }

    fn set_enabled(&mut self, enabled: bool, _ctx: &mut FilterContext<'_>) {
        self.enabled = enabled;
        if !enabled {
            self.reset();
        }
    }

    fn name(&self) -> &'static str {
        "touch_slop"
    }
}
