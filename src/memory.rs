//! Headless in-memory backend.
//!
//! Models just enough of a container tree to run the controller without a
//! browser: node widths for measurement, class sets, inline styles and a
//! listener registry. Used by the test suite and by non-browser embedders
//! that want to preview marquee state.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{MarqueeError, Result};
use crate::surface::{ListenerKind, MarqueeHost, MarqueeSurface};

/// A content item with its rendered width.
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryNode {
    pub label: String,
    /// Rendered width in pixels
    pub width: f64,
    pub classes: Vec<String>,
    pub children: Vec<MemoryNode>,
}

impl MemoryNode {
    /// Create a leaf node `width` pixels wide.
    pub fn new(label: impl Into<String>, width: f64) -> Self {
        Self {
            label: label.into(),
            width,
            classes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add a nested child.
    pub fn with_child(mut self, child: MemoryNode) -> Self {
        self.children.push(child);
        self
    }

    /// Builder: add a class.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// An in-memory marquee container.
#[derive(Clone, Debug, Default)]
pub struct MemorySurface {
    pub children: Vec<MemoryNode>,
    pub classes: BTreeSet<String>,
    pub styles: BTreeMap<String, String>,
    /// Width of the parent box; `None` for a detached container
    pub parent_width: Option<f64>,
}

impl MemorySurface {
    /// Container inside a parent of `parent_width` pixels.
    pub fn new(children: Vec<MemoryNode>, parent_width: f64) -> Self {
        Self {
            children,
            parent_width: Some(parent_width),
            ..Default::default()
        }
    }

    /// Container with no layout parent.
    pub fn detached(children: Vec<MemoryNode>) -> Self {
        Self {
            children,
            ..Default::default()
        }
    }

    pub fn style(&self, name: &str) -> Option<&str> {
        self.styles.get(name).map(|s| s.as_str())
    }
}

impl MarqueeSurface for MemorySurface {
    type Snapshot = Vec<MemoryNode>;

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child_has_class(&self, index: usize, class: &str) -> bool {
        self.children
            .get(index)
            .map(|c| c.has_class(class))
            .unwrap_or(false)
    }

    fn append_tagged_clone(&mut self, index: usize, class: &str) -> Result<()> {
        let mut copy = self
            .children
            .get(index)
            .cloned()
            .ok_or_else(|| MarqueeError::dom("cloneNode", format!("no child at index {}", index)))?;
        if !copy.has_class(class) {
            copy.classes.push(class.to_string());
        }
        self.children.push(copy);
        Ok(())
    }

    fn snapshot(&self) -> Self::Snapshot {
        self.children.clone()
    }

    fn restore(&mut self, snapshot: &Self::Snapshot) -> Result<()> {
        self.children = snapshot.clone();
        Ok(())
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    fn add_class(&mut self, class: &str) -> Result<()> {
        self.classes.insert(class.to_string());
        Ok(())
    }

    fn remove_class(&mut self, class: &str) -> Result<()> {
        self.classes.remove(class);
        Ok(())
    }

    fn set_style_property(&mut self, name: &str, value: &str) -> Result<()> {
        self.styles.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn content_width(&self) -> f64 {
        self.children.iter().map(|c| c.width).sum()
    }

    fn viewport_width(&self) -> Option<f64> {
        self.parent_width
    }
}

/// Registration handle issued by [`MemoryHost`].
#[derive(Debug, PartialEq, Eq)]
pub struct MemorySubscription {
    pub id: u64,
    pub kind: ListenerKind,
}

/// In-memory host: a set of named containers plus a motion preference.
///
/// `find_container` hands the container over to the caller until it is
/// given back through `release_container`.
#[derive(Debug, Default)]
pub struct MemoryHost {
    containers: HashMap<String, MemorySurface>,
    /// Current reduced-motion preference
    pub reduced_motion: bool,
    /// Fail `subscribe` once this many listeners are active
    pub subscribe_limit: Option<usize>,
    active: Vec<(u64, ListenerKind)>,
    next_id: u64,
}

impl MemoryHost {
    /// Create an empty host with full motion allowed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register a container under `id`.
    pub fn with_container(mut self, id: impl Into<String>, surface: MemorySurface) -> Self {
        self.containers.insert(id.into(), surface);
        self
    }

    /// Builder: set the reduced-motion preference.
    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }

    /// Builder: cap the number of listeners that can be active at once.
    pub fn with_subscribe_limit(mut self, limit: usize) -> Self {
        self.subscribe_limit = Some(limit);
        self
    }

    /// Whether a container is registered (and not mounted) under `id`.
    pub fn has_container(&self, id: &str) -> bool {
        self.containers.contains_key(id)
    }

    /// Number of listeners currently registered.
    pub fn active_listeners(&self) -> usize {
        self.active.len()
    }

    /// Number of registered listeners of one kind.
    pub fn active_of(&self, kind: ListenerKind) -> usize {
        self.active.iter().filter(|(_, k)| *k == kind).count()
    }
}

impl MarqueeHost for MemoryHost {
    type Surface = MemorySurface;
    type Subscription = MemorySubscription;

    fn find_container(&mut self, id: &str) -> Option<MemorySurface> {
        self.containers.remove(id)
    }

    fn prefers_reduced_motion(&self, _query: &str) -> bool {
        self.reduced_motion
    }

    fn subscribe(
        &mut self,
        _surface: &MemorySurface,
        kind: ListenerKind,
        _reduced_motion_query: &str,
    ) -> Result<MemorySubscription> {
        if self.subscribe_limit.is_some_and(|limit| self.active.len() >= limit) {
            return Err(MarqueeError::dom("addEventListener", format!("{:?} refused", kind)));
        }
        self.next_id += 1;
        self.active.push((self.next_id, kind));
        Ok(MemorySubscription {
            id: self.next_id,
            kind,
        })
    }

    fn unsubscribe(&mut self, subscription: MemorySubscription) {
        self.active.retain(|(id, _)| *id != subscription.id);
    }

    fn release_container(&mut self, id: &str, surface: MemorySurface) {
        self.containers.insert(id.to_string(), surface);
    }
}
