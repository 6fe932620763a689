//! Loop duration estimation from measured content width.

use crate::config::MarqueeConfig;
use crate::surface::MarqueeSurface;

/// Widths read from the layout engine for one estimate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    /// Scrollable width of the (duplicated) content
    pub content_width: f64,
    /// Visible width of the container's parent
    pub viewport_width: f64,
}

impl Measurement {
    /// Read both widths from a surface.
    ///
    /// Returns `None` for a container with no layout parent.
    pub fn take<S: MarqueeSurface>(surface: &S) -> Option<Self> {
        let viewport_width = surface.viewport_width()?;
        Some(Self {
            content_width: surface.content_width(),
            viewport_width,
        })
    }
}

/// Maps content width to a loop duration at constant scroll speed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DurationEstimator {
    /// Shortest allowed loop, in seconds
    pub min_duration_secs: f64,
    /// Pixels scrolled per second
    pub base_speed: f64,
}

impl Default for DurationEstimator {
    fn default() -> Self {
        Self {
            min_duration_secs: 12.0,
            base_speed: 100.0,
        }
    }
}

impl DurationEstimator {
    /// Create an estimator from the floor and speed in `config`.
    pub fn from_config(config: &MarqueeConfig) -> Self {
        Self {
            min_duration_secs: config.min_duration_secs,
            base_speed: config.base_speed,
        }
    }

    /// Duration in seconds for `content_width` pixels of content.
    ///
    /// Never shorter than the floor; negative or non-finite widths count as
    /// zero.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use marquee_core::DurationEstimator;
    ///
    /// let estimator = DurationEstimator::default();
    /// assert_eq!(estimator.estimate(800.0), 12.0); // 8s is under the floor
    /// assert_eq!(estimator.estimate(5000.0), 50.0);
    /// ```
    pub fn estimate(&self, content_width: f64) -> f64 {
        let width = if content_width.is_finite() {
            content_width.max(0.0)
        } else {
            0.0
        };
        (width / self.base_speed).max(self.min_duration_secs)
    }

    /// CSS time value for a duration, e.g. `"12s"` or `"37.5s"`.
    pub fn css_value(duration_secs: f64) -> String {
        format!("{}s", duration_secs)
    }
}
