//! Content duplication for a seamless wrap-around.

use tracing::debug;

use crate::error::Result;
use crate::surface::MarqueeSurface;

/// Clone every direct child not tagged with `duplicate_class` and append the
/// tagged copies in original order.
///
/// Returns the number of copies appended. This only filters on the tag; use
/// [`ContentDuplicator`] to avoid doubling content twice per generation.
pub fn duplicate_children<S: MarqueeSurface>(
    surface: &mut S,
    duplicate_class: &str,
) -> Result<usize> {
    let originals: Vec<usize> = (0..surface.child_count())
        .filter(|&i| !surface.child_has_class(i, duplicate_class))
        .collect();

    for &index in &originals {
        surface.append_tagged_clone(index, duplicate_class)?;
    }
    Ok(originals.len())
}

/// Duplicates a container's content at most once per content generation.
#[derive(Clone, Debug, Default)]
pub struct ContentDuplicator {
    duplicated: bool,
}

impl ContentDuplicator {
    /// Create a duplicator for a fresh content generation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the current content generation already has its copies.
    pub fn is_duplicated(&self) -> bool {
        self.duplicated
    }

    /// Append tagged copies unless this generation is already duplicated.
    ///
    /// Returns the number of copies appended (0 when skipped).
    pub fn duplicate<S: MarqueeSurface>(
        &mut self,
        surface: &mut S,
        duplicate_class: &str,
    ) -> Result<usize> {
        if self.duplicated {
            debug!("marquee content already duplicated, skipping");
            return Ok(0);
        }
        let appended = duplicate_children(surface, duplicate_class)?;
        self.duplicated = true;
        debug!(appended, "duplicated marquee content");
        Ok(appended)
    }

    /// Start a new content generation (called before restoring markup).
    pub fn clear(&mut self) {
        self.duplicated = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryNode, MemorySurface};

    const DUP: &str = "marquee-content-duplicate";

    fn surface(n: usize) -> MemorySurface {
        let items = (0..n)
            .map(|i| MemoryNode::new(format!("item-{}", i), 100.0))
            .collect();
        MemorySurface::new(items, 800.0)
    }

    #[test]
    fn test_doubles_children_in_order() {
        let mut s = surface(3);
        let appended = duplicate_children(&mut s, DUP).unwrap();

        assert_eq!(appended, 3);
        assert_eq!(s.child_count(), 6);
        for i in 0..3 {
            assert!(!s.child_has_class(i, DUP));
            assert!(s.child_has_class(i + 3, DUP));
            assert_eq!(s.children[i + 3].label, s.children[i].label);
        }
    }

    #[test]
    fn test_empty_container() {
        let mut s = surface(0);
        let mut dup = ContentDuplicator::new();
        assert_eq!(dup.duplicate(&mut s, DUP).unwrap(), 0);
        assert_eq!(s.child_count(), 0);
        assert!(dup.is_duplicated());
    }

    #[test]
    fn test_existing_duplicates_are_skipped() {
        let mut s = surface(2);
        s.children.push(MemoryNode::new("stale", 100.0).with_class(DUP));

        assert_eq!(duplicate_children(&mut s, DUP).unwrap(), 2);
        assert_eq!(s.child_count(), 5);
    }

    #[test]
    fn test_tag_filter_alone_compounds() {
        // Originals have no tag, so a second pass copies them again.
        let mut s = surface(2);
        duplicate_children(&mut s, DUP).unwrap();
        duplicate_children(&mut s, DUP).unwrap();
        assert_eq!(s.child_count(), 6);
    }

    #[test]
    fn test_generation_flag_prevents_compounding() {
        let mut s = surface(4);
        let mut dup = ContentDuplicator::new();

        assert_eq!(dup.duplicate(&mut s, DUP).unwrap(), 4);
        assert_eq!(dup.duplicate(&mut s, DUP).unwrap(), 0);
        assert_eq!(s.child_count(), 8);

        dup.clear();
        assert!(!dup.is_duplicated());
    }
}
