//! Marquee configuration: mount point, timing constants and marker classes.

use crate::error::{MarqueeError, Result};

/// Marker class names shared with the page's style sheet.
///
/// The controller only toggles these; the style sheet decides what they
/// look like.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MarqueeClasses {
    /// Starts the scroll animation
    pub animate: String,
    /// Freezes the scroll animation
    pub paused: String,
    /// Tags cloned items
    pub duplicate: String,
}

impl Default for MarqueeClasses {
    fn default() -> Self {
        Self {
            animate: "marquee-animate".to_string(),
            paused: "paused".to_string(),
            duplicate: "marquee-content-duplicate".to_string(),
        }
    }
}

/// Configuration for a [`MarqueeController`](crate::MarqueeController).
///
/// Every field has a default, so a TOML document only needs the keys it
/// wants to change.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MarqueeConfig {
    /// Identifier of the container element
    pub container_id: String,
    /// Shortest allowed loop, in seconds
    pub min_duration_secs: f64,
    /// Scroll speed in pixels per second
    pub base_speed: f64,
    /// Duration reported before the first measurement
    pub initial_duration_secs: f64,
    /// Inline style property the duration is published to
    pub duration_property: String,
    /// Media query signalling reduced motion
    pub reduced_motion_query: String,
    pub classes: MarqueeClasses,
}

impl Default for MarqueeConfig {
    fn default() -> Self {
        Self {
            container_id: "marqueeContent".to_string(),
            min_duration_secs: 12.0,
            base_speed: 100.0,
            initial_duration_secs: 20.0,
            duration_property: "animation-duration".to_string(),
            reduced_motion_query: "(prefers-reduced-motion: reduce)".to_string(),
            classes: MarqueeClasses::default(),
        }
    }
}

impl MarqueeConfig {
    /// Default configuration mounted on a different container.
    pub fn for_container(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            ..Self::default()
        }
    }

    /// Parse a TOML document into a validated `MarqueeConfig`.
    ///
    /// ## Example
    ///
    /// ```rust
    /// # #[cfg(feature = "toml")]
    /// # {
    /// use marquee_core::MarqueeConfig;
    ///
    /// let config = MarqueeConfig::from_toml_str("base_speed = 50.0").unwrap();
    /// assert_eq!(config.base_speed, 50.0);
    /// assert_eq!(config.min_duration_secs, 12.0);
    /// # }
    /// ```
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the duration arithmetic or the DOM cannot use.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_speed.is_finite() && self.base_speed > 0.0) {
            return Err(MarqueeError::InvalidConfig(format!(
                "base_speed must be positive, got {}",
                self.base_speed
            )));
        }
        if !(self.min_duration_secs.is_finite() && self.min_duration_secs >= 0.0) {
            return Err(MarqueeError::InvalidConfig(format!(
                "min_duration_secs must be non-negative, got {}",
                self.min_duration_secs
            )));
        }

        let names = [
            ("container_id", &self.container_id),
            ("duration_property", &self.duration_property),
            ("reduced_motion_query", &self.reduced_motion_query),
            ("classes.animate", &self.classes.animate),
            ("classes.paused", &self.classes.paused),
            ("classes.duplicate", &self.classes.duplicate),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(MarqueeError::InvalidConfig(format!("{} must not be empty", field)));
            }
        }
        Ok(())
    }
}
