//! Gesture recognizers

mod double_tap;
mod long_press;
mod press_indicator;
mod press_start;
mod raw_scale;
mod scale_slop;
mod tap;
mod touch_slop;

pub use double_tap::DoubleTapFilter;
pub use long_press::LongPressFilter;
pub use press_indicator::PressIndicatorFilter;
pub use press_start::RawPressStartFilter;
pub use raw_scale::RawScaleFilter;
pub use scale_slop::ScaleSlopExceededFilter;
pub use tap::TapFilter;
pub use touch_slop::TouchSlopExceededFilter;
