//! Gesture thresholds and timeouts

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GestureError, Result};

/// Distance in pixels a pointer may wander before it counts as a drag
pub const DEFAULT_TOUCH_SLOP: f32 = 8.0;

/// Change in pointer spread, in pixels, before a pinch counts as a scale
pub const DEFAULT_SCALE_SLOP: f32 = 8.0;

/// How long a pointer must stay down to be a long press
pub const DEFAULT_LONG_PRESS_TIMEOUT_MS: u64 = 500;

/// How long after a tap a second tap still counts as a double tap
pub const DEFAULT_DOUBLE_TAP_TIMEOUT_MS: u64 = 300;

/// Thresholds shared by the gesture filters.
///
/// Loadable from TOML; missing keys fall back to the standard preset.
///
/// ```
/// use tactile_input::GestureConfig;
///
/// let config = GestureConfig::from_toml_str("long_press_timeout_ms = 650").unwrap();
/// assert_eq!(config.long_press_timeout_ms, 650);
/// assert_eq!(config.touch_slop, 8.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Touch slop in pixels
    pub touch_slop: f32,
    /// Scale slop in pixels
    pub scale_slop: f32,
    /// Long-press timeout in milliseconds
    pub long_press_timeout_ms: u64,
    /// Double-tap timeout in milliseconds
    pub double_tap_timeout_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl GestureConfig {
    /// Platform-typical thresholds.
    pub fn standard() -> Self {
        Self {
            touch_slop: DEFAULT_TOUCH_SLOP,
            scale_slop: DEFAULT_SCALE_SLOP,
            long_press_timeout_ms: DEFAULT_LONG_PRESS_TIMEOUT_MS,
            double_tap_timeout_ms: DEFAULT_DOUBLE_TAP_TIMEOUT_MS,
        }
    }

    /// Small round numbers for deterministic tests.
    pub fn testing() -> Self {
        Self {
            touch_slop: 1.0,
            scale_slop: 1.0,
            long_press_timeout_ms: 100,
            double_tap_timeout_ms: 100,
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: GestureConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no filter can work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.touch_slop.is_finite() && self.touch_slop >= 0.0) {
            return Err(GestureError::InvalidConfig(format!(
                "touch_slop must be a non-negative number, got {}",
                self.touch_slop
            )));
        }
        if !(self.scale_slop.is_finite() && self.scale_slop >= 0.0) {
            return Err(GestureError::InvalidConfig(format!(
                "scale_slop must be a non-negative number, got {}",
                self.scale_slop
            )));
        }
        if self.long_press_timeout_ms == 0 {
            return Err(GestureError::InvalidConfig(
                "long_press_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.double_tap_timeout_ms == 0 {
            return Err(GestureError::InvalidConfig(
                "double_tap_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn long_press_timeout(&self) -> Duration {
        Duration::from_millis(self.long_press_timeout_ms)
    }

    pub fn double_tap_timeout(&self) -> Duration {
        Duration::from_millis(self.double_tap_timeout_ms)
    }

    /// Set the touch slop.
    pub fn with_touch_slop(mut self, slop: f32) -> Self {
        self.touch_slop = slop;
        self
    }

    /// Set the scale slop.
    pub fn with_scale_slop(mut self, slop: f32) -> Self {
        self.scale_slop = slop;
        self
    }

    /// Set the long-press timeout.
    pub fn with_long_press_timeout(mut self, timeout: Duration) -> Self {
        self.long_press_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the double-tap timeout.
    pub fn with_double_tap_timeout(mut self, timeout: Duration) -> Self {
        self.double_tap_timeout_ms = timeout.as_millis() as u64;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_standard() {
        assert_eq!(GestureConfig::default(), GestureConfig::standard());
        assert_eq!(
            GestureConfig::default().long_press_timeout(),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GestureConfig::from_toml_str("touch_slop = 12.5\n").unwrap();
        assert_eq!(config.touch_slop, 12.5);
        assert_eq!(config.scale_slop, DEFAULT_SCALE_SLOP);
        assert_eq!(config.double_tap_timeout_ms, DEFAULT_DOUBLE_TAP_TIMEOUT_MS);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = GestureConfig::from_toml_str("scale_slop = -1.0").unwrap_err();
        assert!(matches!(err, GestureError::InvalidConfig(_)));

        let err = GestureConfig::from_toml_str("long_press_timeout_ms = 0").unwrap_err();
        assert!(matches!(err, GestureError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let err = GestureConfig::from_toml_str("touch_slop = \"wide\"").unwrap_err();
        assert!(matches!(err, GestureError::ConfigParse(_)));
    }

    #[test]
    fn test_builders() {
        let config = GestureConfig::testing()
            .with_long_press_timeout(Duration::from_millis(250))
            .with_touch_slop(3.0);
        assert_eq!(config.long_press_timeout_ms, 250);
        assert_eq!(config.touch_slop, 3.0);
        assert!(config.validate().is_ok());
    }
}
