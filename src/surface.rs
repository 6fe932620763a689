//! The seam between the controller and whatever renders the marquee.
//!
//! The controller never touches a browser directly. It reads and mutates a
//! [`MarqueeSurface`] (the mounted container) and asks a [`MarqueeHost`] for
//! containers, the motion preference and event subscriptions. The browser
//! backend lives in `web`; [`memory`](crate::memory) provides a headless one.

use crate::error::Result;

/// Events a host delivers to the controller.
///
/// See [`MarqueeController::handle_event`](crate::MarqueeController::handle_event).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarqueeEvent {
    /// Pointer entered the container
    PointerEnter,
    /// Pointer left the container
    PointerLeave,
    /// The viewport was resized
    Resize,
    /// The reduced-motion preference changed
    MotionPreferenceChanged { reduced: bool },
}

/// Kinds of listener a controller registers while mounted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    PointerEnter,
    PointerLeave,
    Resize,
    MotionPreference,
}

impl ListenerKind {
    /// Every listener a mounted controller holds, in registration order.
    pub const ALL: [ListenerKind; 4] = [
        ListenerKind::PointerEnter,
        ListenerKind::PointerLeave,
        ListenerKind::Resize,
        ListenerKind::MotionPreference,
    ];

    /// DOM event name for this listener.
    pub fn event_type(self) -> &'static str {
        match self {
            ListenerKind::PointerEnter => "mouseenter",
            ListenerKind::PointerLeave => "mouseleave",
            ListenerKind::Resize => "resize",
            ListenerKind::MotionPreference => "change",
        }
    }
}

/// The mounted container element.
///
/// Children are addressed by index in document order. Only direct children
/// are visible through this trait; cloning is always deep.
pub trait MarqueeSurface {
    /// Saved markup used to restore the container on reset.
    type Snapshot: Clone;

    /// Number of direct children.
    fn child_count(&self) -> usize;

    /// Whether the child at `index` carries `class`.
    fn child_has_class(&self, index: usize, class: &str) -> bool;

    /// Deep-clone the child at `index`, add `class` to the copy and append
    /// it after the existing children.
    fn append_tagged_clone(&mut self, index: usize, class: &str) -> Result<()>;

    /// Capture the current markup.
    fn snapshot(&self) -> Self::Snapshot;

    /// Replace the current children with a captured markup.
    fn restore(&mut self, snapshot: &Self::Snapshot) -> Result<()>;

    fn has_class(&self, class: &str) -> bool;
    fn add_class(&mut self, class: &str) -> Result<()>;
    fn remove_class(&mut self, class: &str) -> Result<()>;

    /// Set an inline style property on the container.
    fn set_style_property(&mut self, name: &str, value: &str) -> Result<()>;

    /// Total scrollable width of the content, in pixels.
    fn content_width(&self) -> f64;

    /// Visible width of the parent box, or `None` when the container has no
    /// layout parent.
    fn viewport_width(&self) -> Option<f64>;
}

/// The environment a controller is mounted in.
pub trait MarqueeHost {
    type Surface: MarqueeSurface;
    /// Owned registration handle; unsubscribing consumes it.
    type Subscription;

    /// Look up a container by identifier.
    fn find_container(&mut self, id: &str) -> Option<Self::Surface>;

    /// Whether `query` currently reports reduced motion.
    fn prefers_reduced_motion(&self, query: &str) -> bool;

    /// Register a listener that feeds `kind` events back to the controller.
    fn subscribe(
        &mut self,
        surface: &Self::Surface,
        kind: ListenerKind,
        reduced_motion_query: &str,
    ) -> Result<Self::Subscription>;

    /// Deregister a listener.
    fn unsubscribe(&mut self, subscription: Self::Subscription);

    /// Take back a container the controller no longer drives. Its markup
    /// has already been restored.
    fn release_container(&mut self, _id: &str, _surface: Self::Surface) {}
}
