//! Per-pixel rotation identity cached while compositing.

use super::table::RotationRef;

/// Rotation identity of every pixel of a rendered frame.
///
/// Filled by the compositor so the scheduler can rewrite rotating pixels
/// without searching the rotation table again. `None` marks a pixel whose
/// color belongs to no rotation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RotationCache {
    entries: Vec<Option<RotationRef>>,
}

impl RotationCache {
    /// A cache for `pixel_count` pixels, every entry absent.
    pub fn new(pixel_count: usize) -> Self {
        Self { entries: vec![None; pixel_count] }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<RotationRef> {
        self.entries.get(index).copied().flatten()
    }

    /// Number of pixels that belong to a rotation.
    pub fn rotating_pixels(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn as_slice(&self) -> &[Option<RotationRef>] {
        &self.entries
    }

    pub fn as_mut_slice(&mut self) -> &mut [Option<RotationRef>] {
        &mut self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cache_is_absent() {
        let cache = RotationCache::new(4);
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.rotating_pixels(), 0);
        assert_eq!(cache.get(2), None);
        assert_eq!(cache.get(99), None);
    }

    #[test]
    fn test_rotating_pixels_counts_entries() {
        let mut cache = RotationCache::new(2);
        cache.as_mut_slice()[1] = Some(RotationRef { slot: 0, position: 3 });
        assert_eq!(cache.rotating_pixels(), 1);
        assert_eq!(cache.get(1), Some(RotationRef { slot: 0, position: 3 }));
    }
}
