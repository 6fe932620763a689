//! Marquee lifecycle: mount, event dispatch, reset and teardown.

use tracing::{debug, warn};

use crate::config::MarqueeConfig;
use crate::duplicator::ContentDuplicator;
use crate::duration::{DurationEstimator, Measurement};
use crate::error::Result;
use crate::motion::{MotionPreferenceObserver, MotionState};
use crate::playback::{PlaybackController, PlaybackState};
use crate::surface::{ListenerKind, MarqueeEvent, MarqueeHost, MarqueeSurface};

/// Outcome of [`MarqueeController::initialize`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MountStatus {
    /// The container was found and the marquee is running
    Mounted,
    /// No container with that identifier; nothing was done
    Missing,
}

/// Point-in-time view of a controller, for inspection and debugging.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MarqueeStatus {
    pub mounted: bool,
    pub container_id: Option<String>,
    pub child_count: usize,
    pub duplicate_count: usize,
    pub duration_secs: f64,
    pub playback: PlaybackState,
    /// Last observed motion preference; survives teardown
    pub motion: MotionState,
    /// Whether the animate marker is on the container
    pub animating: bool,
    pub active_listeners: usize,
    /// Incremented on every (re)initialization
    pub generation: u32,
}

/// Drives one marquee container.
///
/// Mounting runs duplication, duration estimation, animation start and
/// listener registration in that order. Listener handles are owned by the
/// controller and released on [`reset`](Self::reset), [`teardown`](Self::teardown)
/// and drop, so the number of live listeners never grows.
///
/// ## Example
///
/// ```rust
/// use marquee_core::memory::{MemoryHost, MemoryNode, MemorySurface};
/// use marquee_core::{MarqueeConfig, MarqueeController, MarqueeEvent, MountStatus, PlaybackState};
///
/// let items = (0..5).map(|i| MemoryNode::new(format!("logo-{}", i), 500.0)).collect();
/// let surface = MemorySurface::new(items, 1200.0);
/// let host = MemoryHost::new().with_container("marqueeContent", surface);
///
/// let mut marquee = MarqueeController::new(MarqueeConfig::default(), host);
/// assert_eq!(marquee.initialize("marqueeContent").unwrap(), MountStatus::Mounted);
///
/// let status = marquee.status();
/// assert_eq!(status.child_count, 10);
/// assert_eq!(status.duration_secs, 50.0); // 5000px at 100px/s
///
/// marquee.handle_event(MarqueeEvent::PointerEnter).unwrap();
/// assert_eq!(marquee.status().playback, PlaybackState::Paused);
/// ```
pub struct MarqueeController<H: MarqueeHost> {
    config: MarqueeConfig,
    host: H,
    container_id: Option<String>,
    container: Option<H::Surface>,
    /// Markup before duplication, restored by `reset`
    original: Option<<H::Surface as MarqueeSurface>::Snapshot>,
    duplicator: ContentDuplicator,
    estimator: DurationEstimator,
    playback: PlaybackController,
    motion: MotionPreferenceObserver,
    duration_secs: f64,
    subscriptions: Vec<H::Subscription>,
    generation: u32,
}

impl<H: MarqueeHost> MarqueeController<H> {
    /// Create an unmounted controller; nothing touches the host until
    /// [`initialize`](Self::initialize).
    pub fn new(config: MarqueeConfig, host: H) -> Self {
        Self {
            estimator: DurationEstimator::from_config(&config),
            playback: PlaybackController::new(config.classes.paused.clone()),
            motion: MotionPreferenceObserver::new(config.classes.animate.clone()),
            duration_secs: config.initial_duration_secs,
            config,
            host,
            container_id: None,
            container: None,
            original: None,
            duplicator: ContentDuplicator::new(),
            subscriptions: Vec::new(),
            generation: 0,
        }
    }

    /// Mount on the container identified by `container_id`.
    ///
    /// A missing container is not an error: the controller stays unmounted
    /// and returns [`MountStatus::Missing`]. Initializing the container that
    /// is already mounted is a [`reset`](Self::reset); initializing another
    /// one first restores the current container's markup and hands it back
    /// to the host.
    pub fn initialize(&mut self, container_id: &str) -> Result<MountStatus> {
        self.config.validate()?;

        if self.container.is_some() {
            if self.container_id.as_deref() == Some(container_id) {
                debug!(container_id, "marquee already mounted, resetting");
                self.reset()?;
                return Ok(MountStatus::Mounted);
            }
            self.unmount()?;
        }

        let Some(surface) = self.host.find_container(container_id) else {
            warn!(container_id, "marquee container not found, skipping");
            return Ok(MountStatus::Missing);
        };

        debug!(container_id, children = surface.child_count(), "mounting marquee");
        self.original = Some(surface.snapshot());
        self.container = Some(surface);
        self.container_id = Some(container_id.to_string());
        self.duplicator.clear();
        self.mount()?;
        Ok(MountStatus::Mounted)
    }

    /// Restore the pre-duplication markup and mount again.
    ///
    /// Listeners are only swapped once the markup is back in place, so a
    /// failed restore keeps the existing listener set. No-op on an unmounted
    /// controller.
    pub fn reset(&mut self) -> Result<()> {
        let (Some(surface), Some(original)) = (self.container.as_mut(), self.original.as_ref())
        else {
            debug!("reset on unmounted marquee ignored");
            return Ok(());
        };

        surface.remove_class(&self.config.classes.animate)?;
        surface.remove_class(&self.config.classes.paused)?;
        surface.restore(original)?;
        self.original = Some(surface.snapshot());
        self.duplicator.clear();
        release(&mut self.host, &mut self.subscriptions);

        debug!("marquee reset");
        self.mount()
    }

    /// Release every listener and clear the marker classes.
    ///
    /// Content is left as-is; a later [`reset`](Self::reset) mounts again.
    /// The motion state keeps the last observed preference.
    pub fn teardown(&mut self) -> Result<()> {
        release(&mut self.host, &mut self.subscriptions);
        if let Some(surface) = self.container.as_mut() {
            surface.remove_class(&self.config.classes.animate)?;
            surface.remove_class(&self.config.classes.paused)?;
        }
        Ok(())
    }

    /// Dispatch one host event.
    pub fn handle_event(&mut self, event: MarqueeEvent) -> Result<()> {
        let Some(surface) = self.container.as_mut() else {
            return Ok(());
        };

        match event {
            MarqueeEvent::PointerEnter => self.playback.pause(surface),
            MarqueeEvent::PointerLeave => self.playback.resume(surface),
            MarqueeEvent::Resize => self.recalculate_duration().map(|_| ()),
            MarqueeEvent::MotionPreferenceChanged { reduced } => {
                self.motion.on_change(surface, reduced).map(|_| ())
            }
        }
    }

    /// Re-measure the content and publish a new duration.
    ///
    /// Returns the published duration, or `None` when unmounted or when the
    /// container has no layout parent (the previous duration is kept).
    pub fn recalculate_duration(&mut self) -> Result<Option<f64>> {
        let Some(surface) = self.container.as_mut() else {
            return Ok(None);
        };

        let Some(measurement) = Measurement::take(surface) else {
            warn!("marquee container has no parent, duration not updated");
            return Ok(None);
        };

        let duration = self.estimator.estimate(measurement.content_width);
        surface.set_style_property(
            &self.config.duration_property,
            &DurationEstimator::css_value(duration),
        )?;
        self.duration_secs = duration;
        debug!(
            content_width = measurement.content_width,
            viewport_width = measurement.viewport_width,
            duration,
            "marquee duration updated"
        );
        Ok(Some(duration))
    }

    /// Pause playback, as a pointer entering the container would.
    pub fn pause(&mut self) -> Result<()> {
        self.handle_event(MarqueeEvent::PointerEnter)
    }

    /// Resume playback, as a pointer leaving the container would.
    pub fn resume(&mut self) -> Result<()> {
        self.handle_event(MarqueeEvent::PointerLeave)
    }

    /// Snapshot of the controller and its container.
    pub fn status(&self) -> MarqueeStatus {
        let classes = &self.config.classes;
        let (child_count, duplicate_count, playback, animating) = match &self.container {
            Some(surface) => {
                let count = surface.child_count();
                let duplicates = (0..count)
                    .filter(|&i| surface.child_has_class(i, &classes.duplicate))
                    .count();
                (
                    count,
                    duplicates,
                    self.playback.state(surface),
                    surface.has_class(&classes.animate),
                )
            }
            None => (0, 0, PlaybackState::Playing, false),
        };

        MarqueeStatus {
            mounted: self.container.is_some(),
            container_id: self.container_id.clone(),
            child_count,
            duplicate_count,
            duration_secs: self.duration_secs,
            playback,
            motion: self.motion.state(),
            animating,
            active_listeners: self.subscriptions.len(),
            generation: self.generation,
        }
    }

    /// Whether a container is currently mounted.
    pub fn is_mounted(&self) -> bool {
        self.container.is_some()
    }

    /// Last published loop duration, in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// The configuration this controller was created with.
    pub fn config(&self) -> &MarqueeConfig {
        &self.config
    }

    /// The mounted container, if any.
    pub fn container(&self) -> Option<&H::Surface> {
        self.container.as_ref()
    }

    /// Mutable access to the mounted container, e.g. to mirror layout changes.
    pub fn container_mut(&mut self) -> Option<&mut H::Surface> {
        self.container.as_mut()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Run the mount sequence. The listener set is all-or-nothing: on any
    /// failure every listener registered so far is released.
    fn mount(&mut self) -> Result<()> {
        let result = self.try_mount();
        if let Err(err) = &result {
            warn!(%err, "marquee mount failed, releasing listeners");
            release(&mut self.host, &mut self.subscriptions);
        }
        result
    }

    /// Restore the current container's markup and hand it back to the host.
    fn unmount(&mut self) -> Result<()> {
        self.teardown()?;
        if let (Some(surface), Some(original)) = (self.container.as_mut(), self.original.as_ref()) {
            surface.restore(original)?;
        }
        self.duplicator.clear();
        self.original = None;
        if let (Some(surface), Some(id)) = (self.container.take(), self.container_id.take()) {
            debug!(container_id = %id, "marquee unmounted");
            self.host.release_container(&id, surface);
        }
        Ok(())
    }

    fn try_mount(&mut self) -> Result<()> {
        self.generation += 1;

        if let Some(surface) = self.container.as_mut() {
            self.duplicator
                .duplicate(surface, &self.config.classes.duplicate)?;
        }

        // Measured after duplication: the loop covers both copies.
        self.recalculate_duration()?;

        let Some(surface) = self.container.as_mut() else {
            return Ok(());
        };
        surface.add_class(&self.config.classes.animate)?;

        for kind in ListenerKind::ALL {
            let subscription = self
                .host
                .subscribe(surface, kind, &self.config.reduced_motion_query)?;
            self.subscriptions.push(subscription);
        }

        let reduced = self
            .host
            .prefers_reduced_motion(&self.config.reduced_motion_query);
        self.motion.observe_initial(surface, reduced)?;

        debug!(generation = self.generation, "marquee mounted");
        Ok(())
    }
}

impl<H: MarqueeHost> Drop for MarqueeController<H> {
    fn drop(&mut self) {
        release(&mut self.host, &mut self.subscriptions);
    }
}

fn release<H: MarqueeHost>(host: &mut H, subscriptions: &mut Vec<H::Subscription>) {
    if subscriptions.is_empty() {
        return;
    }
    debug!(count = subscriptions.len(), "releasing marquee listeners");
    for subscription in subscriptions.drain(..) {
        host.unsubscribe(subscription);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryHost, MemoryNode, MemorySurface};
    use crate::MarqueeError;

    const ID: &str = "marqueeContent";

    fn items(n: usize, width: f64) -> Vec<MemoryNode> {
        (0..n)
            .map(|i| {
                MemoryNode::new(format!("item-{}", i), width)
                    .with_child(MemoryNode::new("img", width))
            })
            .collect()
    }

    fn controller(n: usize, width: f64, reduced: bool) -> MarqueeController<MemoryHost> {
        let host = MemoryHost::new()
            .with_container(ID, MemorySurface::new(items(n, width), 1000.0))
            .with_reduced_motion(reduced);
        let mut ctrl = MarqueeController::new(MarqueeConfig::default(), host);
        assert_eq!(ctrl.initialize(ID).unwrap(), MountStatus::Mounted);
        ctrl
    }

    fn surface(ctrl: &MarqueeController<MemoryHost>) -> &MemorySurface {
        ctrl.container().unwrap()
    }

    #[test]
    fn test_initialize_doubles_content() {
        for n in [0, 1, 3, 7] {
            let ctrl = controller(n, 100.0, false);
            let s = surface(&ctrl);
            assert_eq!(s.child_count(), 2 * n);
            for i in 0..n {
                assert!(!s.child_has_class(i, "marquee-content-duplicate"));
                assert!(s.child_has_class(n + i, "marquee-content-duplicate"));
                assert_eq!(s.children[n + i].label, s.children[i].label);
                assert_eq!(s.children[n + i].children, s.children[i].children);
            }
        }
    }

    #[test]
    fn test_initialize_publishes_duration() {
        // 4 x 100px doubled = 800px -> 8s, floored to 12s
        let ctrl = controller(4, 100.0, false);
        assert_eq!(ctrl.duration_secs(), 12.0);
        assert_eq!(surface(&ctrl).style("animation-duration"), Some("12s"));

        // 5 x 500px doubled = 5000px -> 50s
        let ctrl = controller(5, 500.0, false);
        assert_eq!(ctrl.duration_secs(), 50.0);
        assert_eq!(surface(&ctrl).style("animation-duration"), Some("50s"));
    }

    #[test]
    fn test_initialize_starts_animation_and_listeners() {
        let ctrl = controller(2, 100.0, false);
        let status = ctrl.status();
        assert!(status.animating);
        assert_eq!(status.motion, MotionState::Animating);
        assert_eq!(status.playback, PlaybackState::Playing);
        assert_eq!(status.active_listeners, 4);
        assert_eq!(ctrl.host().active_listeners(), 4);
        for kind in ListenerKind::ALL {
            assert_eq!(ctrl.host().active_of(kind), 1);
        }
    }

    #[test]
    fn test_missing_container_is_noop() {
        let mut ctrl = MarqueeController::new(MarqueeConfig::default(), MemoryHost::new());
        assert_eq!(ctrl.initialize(ID).unwrap(), MountStatus::Missing);
        assert!(!ctrl.is_mounted());
        assert_eq!(ctrl.host().active_listeners(), 0);
        assert_eq!(ctrl.duration_secs(), 20.0);

        ctrl.handle_event(MarqueeEvent::PointerEnter).unwrap();
        ctrl.handle_event(MarqueeEvent::Resize).unwrap();
        ctrl.reset().unwrap();
        assert!(!ctrl.status().mounted);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MarqueeConfig {
            base_speed: -5.0,
            ..Default::default()
        };
        let host = MemoryHost::new().with_container(ID, MemorySurface::new(items(1, 10.0), 100.0));
        let mut ctrl = MarqueeController::new(config, host);
        assert!(matches!(ctrl.initialize(ID), Err(MarqueeError::InvalidConfig(_))));
    }

    #[test]
    fn test_hover_pauses_and_resumes() {
        let mut ctrl = controller(2, 100.0, false);

        ctrl.handle_event(MarqueeEvent::PointerEnter).unwrap();
        ctrl.handle_event(MarqueeEvent::PointerEnter).unwrap();
        assert!(surface(&ctrl).has_class("paused"));

        ctrl.handle_event(MarqueeEvent::PointerLeave).unwrap();
        assert!(!surface(&ctrl).has_class("paused"));

        ctrl.handle_event(MarqueeEvent::PointerLeave).unwrap();
        assert_eq!(ctrl.status().playback, PlaybackState::Playing);
    }

    #[test]
    fn test_reduced_motion_at_mount() {
        let ctrl = controller(3, 1000.0, true);
        let status = ctrl.status();
        assert!(!status.animating);
        assert_eq!(status.motion, MotionState::Static);
        // Duplication and measurement still ran.
        assert_eq!(status.child_count, 6);
        assert_eq!(status.duration_secs, 60.0);
    }

    #[test]
    fn test_live_motion_preference() {
        let mut ctrl = controller(2, 100.0, false);

        ctrl.handle_event(MarqueeEvent::MotionPreferenceChanged { reduced: true }).unwrap();
        assert!(!surface(&ctrl).has_class("marquee-animate"));
        assert_eq!(ctrl.status().motion, MotionState::Static);

        ctrl.handle_event(MarqueeEvent::MotionPreferenceChanged { reduced: false }).unwrap();
        assert!(surface(&ctrl).has_class("marquee-animate"));
        assert_eq!(ctrl.status().motion, MotionState::Animating);
    }

    #[test]
    fn test_resize_updates_duration_only() {
        let mut ctrl = controller(4, 500.0, false);
        assert_eq!(ctrl.duration_secs(), 40.0);

        for node in &mut ctrl.container_mut().unwrap().children {
            node.width = 1000.0;
        }
        ctrl.handle_event(MarqueeEvent::Resize).unwrap();

        assert_eq!(ctrl.duration_secs(), 80.0);
        assert_eq!(surface(&ctrl).style("animation-duration"), Some("80s"));
        assert_eq!(surface(&ctrl).child_count(), 8);
    }

    #[test]
    fn test_reset_matches_fresh_initialize() {
        let mut ctrl = controller(3, 700.0, false);
        let fresh = ctrl.status();

        ctrl.handle_event(MarqueeEvent::PointerEnter).unwrap();
        ctrl.container_mut().unwrap().children.push(MemoryNode::new("injected", 50.0));
        ctrl.reset().unwrap();

        let after = ctrl.status();
        assert_eq!(after.child_count, 6);
        assert_eq!(after.duplicate_count, 3);
        assert_eq!(after.playback, PlaybackState::Playing);
        assert_eq!(after.duration_secs, fresh.duration_secs);
        assert!(after.animating);
        assert_eq!(after.generation, fresh.generation + 1);
        assert!(surface(&ctrl).children.iter().all(|c| c.label != "injected"));
    }

    #[test]
    fn test_reset_does_not_accumulate_listeners() {
        let mut ctrl = controller(2, 100.0, false);
        for _ in 0..5 {
            ctrl.reset().unwrap();
        }
        assert_eq!(ctrl.host().active_listeners(), 4);
        assert_eq!(ctrl.status().child_count, 4);
    }

    #[test]
    fn test_reset_rereads_motion_preference() {
        let mut ctrl = controller(2, 100.0, false);
        ctrl.host_mut().reduced_motion = true;
        ctrl.reset().unwrap();
        assert!(!ctrl.status().animating);
    }

    #[test]
    fn test_detached_container_keeps_duration() {
        let host = MemoryHost::new().with_container(ID, MemorySurface::detached(items(3, 1000.0)));
        let mut ctrl = MarqueeController::new(MarqueeConfig::default(), host);
        assert_eq!(ctrl.initialize(ID).unwrap(), MountStatus::Mounted);

        assert_eq!(ctrl.duration_secs(), 20.0);
        assert_eq!(surface(&ctrl).style("animation-duration"), None);
        assert_eq!(ctrl.recalculate_duration().unwrap(), None);
        assert_eq!(surface(&ctrl).child_count(), 6);
        assert!(ctrl.status().animating);
    }

    #[test]
    fn test_teardown_releases_everything() {
        let mut ctrl = controller(2, 100.0, false);
        ctrl.pause().unwrap();
        ctrl.teardown().unwrap();

        let status = ctrl.status();
        assert_eq!(ctrl.host().active_listeners(), 0);
        assert_eq!(status.active_listeners, 0);
        assert!(!status.animating);
        assert_eq!(status.playback, PlaybackState::Playing);

        ctrl.reset().unwrap();
        assert_eq!(ctrl.host().active_listeners(), 4);
        assert_eq!(ctrl.status().child_count, 4);
    }

    #[test]
    fn test_reinitialize_other_container() {
        let host = MemoryHost::new()
            .with_container("a", MemorySurface::new(items(1, 100.0), 500.0))
            .with_container("b", MemorySurface::new(items(2, 100.0), 500.0));
        let mut ctrl = MarqueeController::new(MarqueeConfig::default(), host);

        ctrl.initialize("a").unwrap();
        ctrl.initialize("b").unwrap();

        let status = ctrl.status();
        assert_eq!(status.container_id.as_deref(), Some("b"));
        assert_eq!(status.child_count, 4);
        assert_eq!(ctrl.host().active_listeners(), 4);
        assert!(ctrl.host().has_container("a"));

        // "a" went back with its original markup, so it doubles cleanly.
        ctrl.initialize("a").unwrap();
        let status = ctrl.status();
        assert_eq!(status.child_count, 2);
        assert_eq!(status.duplicate_count, 1);
        assert!(ctrl.host().has_container("b"));
    }

    #[test]
    fn test_initialize_same_container_twice() {
        let mut ctrl = controller(3, 100.0, false);
        ctrl.pause().unwrap();

        assert_eq!(ctrl.initialize(ID).unwrap(), MountStatus::Mounted);
        let status = ctrl.status();
        assert!(status.mounted);
        assert_eq!(status.child_count, 6);
        assert_eq!(status.duplicate_count, 3);
        assert_eq!(status.playback, PlaybackState::Playing);
        assert_eq!(ctrl.host().active_listeners(), 4);

        ctrl.reset().unwrap();
        assert_eq!(ctrl.status().child_count, 6);
    }

    #[test]
    fn test_failed_subscribe_releases_partial_listeners() {
        let host = MemoryHost::new()
            .with_container(ID, MemorySurface::new(items(2, 100.0), 500.0))
            .with_subscribe_limit(2);
        let mut ctrl = MarqueeController::new(MarqueeConfig::default(), host);

        assert!(matches!(ctrl.initialize(ID), Err(MarqueeError::Dom { .. })));
        assert_eq!(ctrl.host().active_listeners(), 0);
        assert_eq!(ctrl.status().active_listeners, 0);
    }

    #[test]
    fn test_failed_reset_leaves_no_partial_listeners() {
        let mut ctrl = controller(2, 100.0, false);
        ctrl.host_mut().subscribe_limit = Some(3);

        assert!(ctrl.reset().is_err());
        assert_eq!(ctrl.host().active_listeners(), 0);
        assert_eq!(ctrl.status().active_listeners, 0);

        ctrl.host_mut().subscribe_limit = None;
        ctrl.reset().unwrap();
        assert_eq!(ctrl.host().active_listeners(), 4);
        assert_eq!(ctrl.status().child_count, 4);
    }

    #[test]
    fn test_teardown_keeps_last_motion_preference() {
        let mut ctrl = controller(2, 100.0, false);
        ctrl.teardown().unwrap();

        let status = ctrl.status();
        assert!(!status.animating);
        assert_eq!(status.motion, MotionState::Animating);
    }
}
