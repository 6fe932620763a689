//! Hover pause/resume.
//!
//! The paused marker class on the container is the only playback state; the
//! style sheet reads it to freeze the animation.

use crate::error::Result;
use crate::surface::MarqueeSurface;

/// Playback state as read back from the container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlaybackState {
    Playing,
    Paused,
}

/// Toggles the paused marker class.
#[derive(Clone, Debug)]
pub struct PlaybackController {
    paused_class: String,
}

impl PlaybackController {
    /// Create a controller toggling `paused_class`.
    pub fn new(paused_class: impl Into<String>) -> Self {
        Self {
            paused_class: paused_class.into(),
        }
    }

    /// Add the paused marker. Idempotent.
    pub fn pause<S: MarqueeSurface>(&self, surface: &mut S) -> Result<()> {
        surface.add_class(&self.paused_class)
    }

    /// Remove the paused marker. Idempotent.
    pub fn resume<S: MarqueeSurface>(&self, surface: &mut S) -> Result<()> {
        surface.remove_class(&self.paused_class)
    }

    /// Read the playback state back from the container's classes.
    pub fn state<S: MarqueeSurface>(&self, surface: &S) -> PlaybackState {
        if surface.has_class(&self.paused_class) {
            PlaybackState::Paused
        } else {
            PlaybackState::Playing
        }
    }
}
