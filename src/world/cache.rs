//! LRU cache for elevation snapshots
//!
//! Keyed by exact region bounds. Nothing is invalidated implicitly: after the
//! world under a region changes, call [`SnapshotCache::invalidate`] (or
//! [`SnapshotCache::invalidate_overlapping`]) before fetching again.

use std::collections::HashMap;

use crate::core::Result;
use crate::math::RegionBounds;
use crate::terrain::ElevationModel;
use super::ElevationSource;

/// LRU cache in front of an [`ElevationSource`]
pub struct SnapshotCache<S: ElevationSource> {
    source: S,
    /// Map of region bounds to snapshots
    snapshots: HashMap<RegionBounds, ElevationModel>,
    /// Access order: oldest first, newest last
    access_order: Vec<RegionBounds>,
    /// Maximum number of snapshots kept
    max_snapshots: usize,
    hits: u64,
    misses: u64,
}

impl<S: ElevationSource> SnapshotCache<S> {
    /// Create a cache holding at most `max_snapshots` regions (minimum 1)
    pub fn new(source: S, max_snapshots: usize) -> Self {
        let max_snapshots = max_snapshots.max(1);
        Self {
            source,
            snapshots: HashMap::with_capacity(max_snapshots),
            access_order: Vec::with_capacity(max_snapshots),
            max_snapshots,
            hits: 0,
            misses: 0,
        }
    }

    /// Get the snapshot for `bounds`, loading it from the source on a miss.
    ///
    /// Errors from the source are passed through and nothing is cached.
    pub fn fetch(&mut self, bounds: &RegionBounds) -> Result<&ElevationModel> {
        if self.snapshots.contains_key(bounds) {
            self.hits += 1;
            self.touch(*bounds);
        } else {
            self.misses += 1;
            let model = self.source.elevation_snapshot(bounds)?;
            if self.snapshots.len() >= self.max_snapshots {
                self.evict_lru();
            }
            self.snapshots.insert(*bounds, model);
            self.access_order.push(*bounds);
            log::debug!("Cached snapshot for {}", bounds);
        }
        // Present: either hit or just inserted
        self.snapshots.get(bounds).ok_or_else(|| crate::core::Error::RegionUnavailable {
            bounds: *bounds,
            reason: "snapshot evicted during fetch".into(),
        })
    }

    /// Drop the snapshot for exactly `bounds`. Returns true if one was cached.
    pub fn invalidate(&mut self, bounds: &RegionBounds) -> bool {
        self.access_order.retain(|b| b != bounds);
        self.snapshots.remove(bounds).is_some()
    }

    /// Drop every cached snapshot sharing at least one column with `bounds`.
    pub fn invalidate_overlapping(&mut self, bounds: &RegionBounds) -> usize {
        let stale: Vec<RegionBounds> = self
            .snapshots
            .keys()
            .filter(|b| overlaps(b, bounds))
            .copied()
            .collect();
        for b in &stale {
            self.invalidate(b);
        }
        stale.len()
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.access_order.clear();
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn contains(&self, bounds: &RegionBounds) -> bool {
        self.snapshots.contains_key(bounds)
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn touch(&mut self, bounds: RegionBounds) {
        if let Some(pos) = self.access_order.iter().position(|b| *b == bounds) {
            self.access_order.remove(pos);
        }
        self.access_order.push(bounds);
    }

    fn evict_lru(&mut self) {
        if !self.access_order.is_empty() {
            let oldest = self.access_order.remove(0);
            self.snapshots.remove(&oldest);
        }
    }
}

fn overlaps(a: &RegionBounds, b: &RegionBounds) -> bool {
    let a_end = a.origin + a.size.as_ivec2();
    let b_end = b.origin + b.size.as_ivec2();
    a.origin.x < b_end.x && a_end.x > b.origin.x &&
    a.origin.y < b_end.y && a_end.y > b.origin.y
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use crate::core::types::{IVec2, UVec2};
    use crate::core::Error;
    use crate::terrain::ElevationMap;

    /// Flat source that counts loads and refuses regions west of x = 0
    struct CountingSource {
        loads: Cell<usize>,
    }

    impl ElevationSource for CountingSource {
        fn elevation_snapshot(&self, bounds: &RegionBounds) -> Result<ElevationModel> {
            if bounds.origin.x < 0 {
                return Err(Error::RegionUnavailable { bounds: *bounds, reason: "not loaded".into() });
            }
            self.loads.set(self.loads.get() + 1);
            let map = ElevationMap::filled(bounds.width(), bounds.depth(), 64);
            ElevationModel::new(*bounds, map.clone(), map.clone(), map)
        }
    }

    fn cache(max: usize) -> SnapshotCache<CountingSource> {
        SnapshotCache::new(CountingSource { loads: Cell::new(0) }, max)
    }

    fn region(x: i32) -> RegionBounds {
        RegionBounds::new(IVec2::new(x, 0), UVec2::new(8, 8))
    }

    #[test]
    fn test_hit_does_not_reload() {
        let mut c = cache(4);
        c.fetch(&region(0)).unwrap();
        c.fetch(&region(0)).unwrap();
        assert_eq!(c.source().loads.get(), 1);
        assert_eq!(c.stats(), (1, 1));
    }

    #[test]
    fn test_lru_eviction() {
        let mut c = cache(2);
        c.fetch(&region(0)).unwrap();
        c.fetch(&region(100)).unwrap();
        c.fetch(&region(0)).unwrap(); // 0 is now most recent
        c.fetch(&region(200)).unwrap(); // evicts 100

        assert!(c.contains(&region(0)));
        assert!(!c.contains(&region(100)));
        assert!(c.contains(&region(200)));
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn test_explicit_invalidation_forces_reload() {
        let mut c = cache(4);
        c.fetch(&region(0)).unwrap();
        assert!(c.invalidate(&region(0)));
        assert!(!c.invalidate(&region(0)));
        c.fetch(&region(0)).unwrap();
        assert_eq!(c.source().loads.get(), 2);
    }

    #[test]
    fn test_invalidate_overlapping() {
        let mut c = cache(4);
        c.fetch(&region(0)).unwrap();
        c.fetch(&region(4)).unwrap();
        c.fetch(&region(100)).unwrap();

        let edited = RegionBounds::new(IVec2::new(6, 6), UVec2::new(1, 1));
        assert_eq!(c.invalidate_overlapping(&edited), 2);
        assert_eq!(c.len(), 1);
        assert!(c.contains(&region(100)));
    }

    #[test]
    fn test_source_error_not_cached() {
        let mut c = cache(4);
        let err = c.fetch(&region(-50)).unwrap_err();
        assert!(matches!(err, Error::RegionUnavailable { .. }));
        assert!(c.is_empty());
    }
}
