//! Tactile Gesture Recognition
//!
//! Composable gesture filters that share one stream of pointer batches.
//!
//! Every batch is offered to every filter three times, once per
//! [`PointerEventPass`]. Filters read the changes, update their own state
//! machine, and mark the parts of the batch they claim as consumed so that
//! later filters can back off. Cross-filter coordination goes through
//! [`CustomEvent`]s and time-based gestures use the dispatcher's virtual
//! clock.
//!
//! # Filters
//!
//! | Filter | Reports |
//! |--------|---------|
//! | [`RawPressStartFilter`] | first down of a gesture |
//! | [`PressIndicatorFilter`] | press start, release, and cancellation |
//! | [`TapFilter`] | complete down-up inside the container |
//! | [`DoubleTapFilter`] | two taps within the timeout |
//! | [`LongPressFilter`] | pointers held past the timeout |
//! | [`RawScaleFilter`] | pinch scale factor per batch |
//! | [`ScaleSlopExceededFilter`] | pinch moved past the scale slop |
//! | [`TouchSlopExceededFilter`] | pointers moved past the touch slop |
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tactile_gesture::prelude::*;
//!
//! let config = GestureConfig::standard();
//! let mut dispatcher = GestureDispatcher::new(IntSize::new(200, 200));
//! dispatcher.add_filter(Box::new(LongPressFilter::from_config(&config)));
//! dispatcher.add_filter(Box::new(TapFilter::new()));
//!
//! dispatcher.on_samples(&[PointerSample::down(0, 10.0, 10.0, Duration::ZERO)]);
//! assert_eq!(dispatcher.pending_timers(), 1);
//! ```

pub mod bounds;
mod delay_up;
mod dispatcher;
mod filter;
pub mod filters;
mod scheduler;

#[cfg(test)]
mod testing;

pub use delay_up::{DelayUpDispatcher, DelayUpOutcome, DelayedUps};
pub use dispatcher::GestureDispatcher;
pub use filter::{
    Callback, FilterContext, FilterId, PointerInputFilter, PositionCallback, Predicate,
    ScaleCallback,
};
pub use filters::{
    DoubleTapFilter, LongPressFilter, PressIndicatorFilter, RawPressStartFilter, RawScaleFilter,
    ScaleSlopExceededFilter, TapFilter, TouchSlopExceededFilter,
};
pub use scheduler::{TimerId, TimerScheduler};

// Input model
pub use tactile_input::{
    CustomEvent, DelayUpEvent, DelayUpMessage, GestureConfig, GestureError, IntSize, Offset,
    PointerEventPass, PointerId, PointerInputChange, PointerSample, Result,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dispatcher::GestureDispatcher;
    pub use crate::filter::{FilterContext, FilterId, PointerInputFilter};
    pub use crate::filters::{
        DoubleTapFilter, LongPressFilter, PressIndicatorFilter, RawPressStartFilter,
        RawScaleFilter, ScaleSlopExceededFilter, TapFilter, TouchSlopExceededFilter,
    };
    pub use crate::scheduler::TimerId;
    pub use tactile_input::prelude::*;
}
