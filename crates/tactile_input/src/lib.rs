//! Tactile Pointer Input Model
//!
//! This crate provides the values that flow through the Tactile gesture
//! pipeline: pointer changes, the passes they are dispatched in, and the
//! messages gesture filters exchange.
//!
//! # Architecture
//!
//! ```text
//! Platform samples (id, position, time, pressed)
//!     ↓
//! PointerTracker (pairs each sample with its previous state)
//!     ↓
//! Vec<PointerInputChange> (one batch per frame)
//!     ↓
//! Gesture filters, once per PointerEventPass (Initial → Main → Final)
//! ```
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tactile_input::prelude::*;
//!
//! let mut tracker = PointerTracker::new();
//! let batch = tracker.batch(&[PointerSample::down(0, 13.0, 17.0, Duration::ZERO)]);
//!
//! assert!(batch[0].changed_to_down());
//! assert!(IntSize::new(100, 100).contains(batch[0].current.position));
//! ```

mod config;
mod custom_event;
mod error;
mod geometry;
mod pointer;
mod sample;

// Re-export all public types
pub use config::{
    GestureConfig, DEFAULT_DOUBLE_TAP_TIMEOUT_MS, DEFAULT_LONG_PRESS_TIMEOUT_MS,
    DEFAULT_SCALE_SLOP, DEFAULT_TOUCH_SLOP,
};
pub use custom_event::{CustomEvent, DelayUpEvent, DelayUpMessage, PointerIdSet};
pub use error::{GestureError, Result};
pub use geometry::{IntSize, Offset};
pub use pointer::{ConsumedData, PointerEventPass, PointerId, PointerInputChange, PointerInputData};
pub use sample::{PointerSample, PointerTracker};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::GestureConfig;
    pub use crate::custom_event::{CustomEvent, DelayUpEvent, DelayUpMessage};
    pub use crate::error::{GestureError, Result};
    pub use crate::geometry::{IntSize, Offset};
    pub use crate::pointer::{
        ConsumedData, PointerEventPass, PointerId, PointerInputChange, PointerInputData,
    };
    pub use crate::sample::{PointerSample, PointerTracker};
}
