//! Reduced-motion preference tracking.

use tracing::debug;

use crate::error::Result;
use crate::surface::MarqueeSurface;

/// Whether the marquee is allowed to move.
///
/// Orthogonal to [`PlaybackState`](crate::PlaybackState): a hover pause can
/// sit on top of either state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MotionState {
    /// The animate marker is present
    Animating,
    /// Reduced motion requested; the animate marker is absent
    Static,
}

impl MotionState {
    /// Map a reduced-motion flag to a state.
    pub fn from_reduced(reduced: bool) -> Self {
        if reduced {
            MotionState::Static
        } else {
            MotionState::Animating
        }
    }
}

/// Two-state machine driven by reduced-motion preference changes.
#[derive(Clone, Debug)]
pub struct MotionPreferenceObserver {
    state: MotionState,
    animate_class: String,
}

impl MotionPreferenceObserver {
    /// Create an observer toggling `animate_class`, starting in
    /// [`MotionState::Animating`].
    pub fn new(animate_class: impl Into<String>) -> Self {
        Self {
            state: MotionState::Animating,
            animate_class: animate_class.into(),
        }
    }

    /// Last observed state.
    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Apply the preference snapshot taken at mount.
    ///
    /// Only ever removes the animate marker: the controller has already
    /// started the animation by the time this runs.
    pub fn observe_initial<S: MarqueeSurface>(
        &mut self,
        surface: &mut S,
        reduced: bool,
    ) -> Result<()> {
        self.state = MotionState::from_reduced(reduced);
        if reduced {
            debug!("reduced motion preferred, marquee stays static");
            surface.remove_class(&self.animate_class)?;
        }
        Ok(())
    }

    /// Handle a live preference change.
    pub fn on_change<S: MarqueeSurface>(
        &mut self,
        surface: &mut S,
        reduced: bool,
    ) -> Result<MotionState> {
        self.state = MotionState::from_reduced(reduced);
        match self.state {
            MotionState::Static => surface.remove_class(&self.animate_class)?,
            MotionState::Animating => surface.add_class(&self.animate_class)?,
        }
        debug!(state = ?self.state, "motion preference changed");
        Ok(self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySurface;

    fn animating_surface() -> MemorySurface {
        let mut surface = MemorySurface::default();
        surface.add_class("marquee-animate").unwrap();
        surface
    }

    #[test]
    fn test_initial_reduced_removes_animate() {
        let mut surface = animating_surface();
        let mut observer = MotionPreferenceObserver::new("marquee-animate");

        observer.observe_initial(&mut surface, true).unwrap();
        assert_eq!(observer.state(), MotionState::Static);
        assert!(!surface.has_class("marquee-animate"));
    }

    #[test]
    fn test_initial_full_motion_keeps_animate() {
        let mut surface = animating_surface();
        let mut observer = MotionPreferenceObserver::new("marquee-animate");

        observer.observe_initial(&mut surface, false).unwrap();
        assert_eq!(observer.state(), MotionState::Animating);
        assert!(surface.has_class("marquee-animate"));
    }

    #[test]
    fn test_live_transitions() {
        let mut surface = animating_surface();
        let mut observer = MotionPreferenceObserver::new("marquee-animate");
        observer.observe_initial(&mut surface, false).unwrap();

        assert_eq!(observer.on_change(&mut surface, true).unwrap(), MotionState::Static);
        assert!(!surface.has_class("marquee-animate"));

        assert_eq!(observer.on_change(&mut surface, false).unwrap(), MotionState::Animating);
        assert!(surface.has_class("marquee-animate"));
    }

    #[test]
    fn test_change_leaves_pause_alone() {
        let mut surface = animating_surface();
        surface.add_class("paused").unwrap();
        let mut observer = MotionPreferenceObserver::new("marquee-animate");

        observer.on_change(&mut surface, true).unwrap();
        observer.on_change(&mut surface, false).unwrap();
        assert!(surface.has_class("paused"));
    }
}
