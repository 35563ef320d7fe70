//! Region allocator over a single linear address space.
//!
//! The address space `0..capacity` is described by an address-ordered table
//! of [`Region`]s. The table always covers the whole space without gaps or
//! overlaps. Allocation picks a free region according to a [`Placement`]
//! policy and either takes it whole or splits off the requested prefix,
//! leaving the remainder free right after it.
//!
//! Regions are never released, so the table only grows and free space is
//! only ever carved up further.
//!
//! ```text
//! before:  [0      free      1024)
//! alloc(100), alloc(200), alloc(300) with first-fit:
//! after:   [0 used 100)[100 used 300)[300 used 600)[600 free 1024)
//! ```
//!
//! # Usage Example
//!
//! ```rust
//! use allocator::region::{Placement, RegionAllocator};
//!
//! let mut memory = RegionAllocator::new(1024, 100);
//! let region = memory.allocate(100, Placement::FirstFit).unwrap();
//! assert_eq!(region.start(), 0);
//! assert_eq!(memory.free_size(), 924);
//! ```

use core::ops::Range;

use snafu::{OptionExt as _, Snafu, ensure};
use snafu_utils::Location;

/// Rule choosing which free region satisfies a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Placement {
    /// The lowest-addressed free region that is large enough.
    #[display("First Fit")]
    FirstFit,
    /// The smallest free region that is large enough, lowest address on ties.
    #[display("Best Fit")]
    BestFit,
}

/// A maximal span of the address space with uniform free/used status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    start: usize,
    size: usize,
    is_free: bool,
}

impl Region {
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.size
    }

    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    #[must_use]
    pub fn is_free(&self) -> bool {
        self.is_free
    }
}

#[derive(Debug, Snafu)]
pub enum AllocateRegionError {
    #[snafu(display("cannot allocate a zero-sized region"))]
    ZeroSize {
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("no free region of at least {size} units"))]
    InsufficientMemory {
        size: usize,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("region table is full: max_regions={max_regions}"))]
    RegionTableFull {
        max_regions: usize,
        #[snafu(implicit)]
        location: Location,
    },
}

/// Allocator partitioning `0..capacity` into address-ordered regions.
#[derive(Debug, Clone)]
pub struct RegionAllocator {
    capacity: usize,
    max_regions: usize,
    regions: Vec<Region>,
}

impl RegionAllocator {
    /// Creates an allocator with one free region spanning `0..capacity`.
    ///
    /// `max_regions` bounds the length of the region table. A split that
    /// would exceed it fails with
    /// [`RegionTableFull`](AllocateRegionError::RegionTableFull).
    ///
    /// # Panics
    ///
    /// Panics if `capacity` or `max_regions` is zero.
    #[must_use]
    pub fn new(capacity: usize, max_regions: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(max_regions > 0, "Region table must hold at least one region");
        Self {
            capacity,
            max_regions,
            regions: vec![Region {
                start: 0,
                size: capacity,
                is_free: true,
            }],
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn max_regions(&self) -> usize {
        self.max_regions
    }

    /// Returns the region table in address order.
    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Returns the region containing `address`, if it lies inside the space.
    #[must_use]
    pub fn region_at(&self, address: usize) -> Option<&Region> {
        let index = self
            .regions
            .partition_point(|region| region.end() <= address);
        self.regions
            .get(index)
            .filter(|region| region.range().contains(&address))
    }

    /// Total size of all free regions.
    #[must_use]
    pub fn free_size(&self) -> usize {
        self.free_regions().map(Region::size).sum()
    }

    /// Size of the largest free region, or zero if none is free.
    #[must_use]
    pub fn largest_free(&self) -> usize {
        self.free_regions().map(Region::size).max().unwrap_or(0)
    }

    fn free_regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter().filter(|region| region.is_free)
    }

    /// Allocates `size` units using the given placement policy.
    ///
    /// On success the returned region is used and exactly `size` units long.
    /// On failure the region table is left untouched.
    pub fn allocate(
        &mut self,
        size: usize,
        placement: Placement,
    ) -> Result<Region, AllocateRegionError> {
        ensure!(size > 0, ZeroSizeSnafu);
        let index = self
            .find(size, placement)
            .context(InsufficientMemorySnafu { size })?;
        self.take(index, size)
    }

    pub fn first_fit(&mut self, size: usize) -> Result<Region, AllocateRegionError> {
        self.allocate(size, Placement::FirstFit)
    }

    pub fn best_fit(&mut self, size: usize) -> Result<Region, AllocateRegionError> {
        self.allocate(size, Placement::BestFit)
    }

    /// Returns the index of the region `placement` selects for `size` units.
    fn find(&self, size: usize, placement: Placement) -> Option<usize> {
        let mut candidates = self
            .regions
            .iter()
            .enumerate()
            .filter(|(_, region)| region.is_free && region.size >= size);
        match placement {
            Placement::FirstFit => candidates.next(),
            // `min_by_key` keeps the first of equal minimums, i.e. the lowest address.
            Placement::BestFit => candidates.min_by_key(|(_, region)| region.size),
        }
        .map(|(index, _)| index)
    }

    /// Marks the first `size` units of the free region at `index` used,
    /// splitting off the remainder as a new free region.
    fn take(&mut self, index: usize, size: usize) -> Result<Region, AllocateRegionError> {
        let region = self.regions[index];
        assert!(region.is_free && region.size >= size);

        if region.size > size {
            ensure!(
                self.regions.len() < self.max_regions,
                RegionTableFullSnafu {
                    max_regions: self.max_regions,
                }
            );
            let remainder = Region {
                start: region.start + size,
                size: region.size - size,
                is_free: true,
            };
            self.regions.insert(index + 1, remainder);
        }

        let allocated = &mut self.regions[index];
        allocated.size = size;
        allocated.is_free = false;
        Ok(*allocated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn assert_partitioned(allocator: &RegionAllocator) {
        let mut next = 0;
        for region in allocator.regions() {
            assert_eq!(region.start(), next, "gap or overlap at {region:?}");
            assert!(region.size() > 0, "empty region {region:?}");
            next = region.end();
        }
        assert_eq!(next, allocator.capacity());
    }

    #[track_caller]
    fn assert_allocated(allocator: &RegionAllocator, region: Region, size: usize) {
        let found = allocator.region_at(region.start()).unwrap();
        assert_eq!(*found, region);
        assert!(!found.is_free());
        assert_eq!(found.size(), size);
    }

    fn layout(allocator: &RegionAllocator) -> Vec<(usize, usize, bool)> {
        allocator
            .regions()
            .iter()
            .map(|r| (r.start(), r.size(), r.is_free()))
            .collect()
    }

    #[test]
    fn test_initial_state() {
        let allocator = RegionAllocator::new(1024, 100);
        assert_eq!(layout(&allocator), [(0, 1024, true)]);
        assert_eq!(allocator.free_size(), 1024);
        assert_eq!(allocator.largest_free(), 1024);
    }

    #[test]
    fn test_first_fit_sequence() {
        let mut allocator = RegionAllocator::new(1024, 100);
        let starts: Vec<_> = [100, 200, 300]
            .into_iter()
            .map(|size| allocator.first_fit(size).unwrap().start())
            .collect();
        assert_eq!(starts, [0, 100, 300]);
        assert_eq!(
            layout(&allocator),
            [
                (0, 100, false),
                (100, 200, false),
                (300, 300, false),
                (600, 424, true)
            ]
        );
        assert_partitioned(&allocator);
    }

    #[test]
    fn test_exact_fit_consumes_region() {
        let mut allocator = RegionAllocator::new(256, 100);
        let region = allocator.first_fit(256).unwrap();
        assert_eq!(layout(&allocator), [(0, 256, false)]);
        assert_allocated(&allocator, region, 256);
        assert_eq!(allocator.free_size(), 0);
        assert_eq!(allocator.largest_free(), 0);
    }

    #[test]
    fn test_insufficient_memory_leaves_table_untouched() {
        let mut allocator = RegionAllocator::new(1024, 100);
        allocator.first_fit(1000).unwrap();
        let before = layout(&allocator);

        let err = allocator.first_fit(25).unwrap_err();
        assert!(matches!(
            err,
            AllocateRegionError::InsufficientMemory { size: 25, .. }
        ));
        let err = allocator.best_fit(25).unwrap_err();
        assert!(matches!(
            err,
            AllocateRegionError::InsufficientMemory { size: 25, .. }
        ));
        assert_eq!(layout(&allocator), before);
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let mut allocator = RegionAllocator::new(1024, 100);
        for placement in [Placement::FirstFit, Placement::BestFit] {
            let err = allocator.allocate(0, placement).unwrap_err();
            assert!(matches!(err, AllocateRegionError::ZeroSize { .. }));
        }
        assert_eq!(layout(&allocator), [(0, 1024, true)]);
    }

    /// Marks the used region starting at `start` free again by hand; the
    /// public API never frees.
    fn punch_hole(allocator: &mut RegionAllocator, start: usize) {
        let index = allocator
            .regions
            .iter()
            .position(|r| r.start() == start)
            .unwrap();
        allocator.regions[index].is_free = true;
    }

    /// Builds `[0 used 100)[100 free 300)[300 used 350)[350 free 450)[450 used 1024)`.
    fn fragmented() -> RegionAllocator {
        let mut allocator = RegionAllocator::new(1024, 100);
        for size in [100, 200, 50, 100, 574] {
            allocator.first_fit(size).unwrap();
        }
        punch_hole(&mut allocator, 100);
        punch_hole(&mut allocator, 350);
        allocator
    }

    #[test]
    fn test_first_fit_and_best_fit_diverge() {
        let mut first = fragmented();
        let mut best = fragmented();

        let a = first.first_fit(80).unwrap();
        let b = best.best_fit(80).unwrap();
        assert_eq!(a.start(), 100);
        assert_eq!(b.start(), 350);
        assert_allocated(&first, a, 80);
        assert_allocated(&best, b, 80);
        assert_partitioned(&first);
        assert_partitioned(&best);
    }

    #[test]
    fn test_best_fit_picks_smallest_qualifying_region() {
        let mut allocator = fragmented();
        let qualifying: Vec<_> = allocator
            .regions()
            .iter()
            .filter(|r| r.is_free() && r.size() >= 80)
            .map(Region::size)
            .collect();
        let region = allocator.best_fit(80).unwrap();
        let chosen = qualifying.iter().copied().min().unwrap();
        assert_eq!(chosen, 100);
        assert!(qualifying.iter().all(|&size| chosen <= size));
        assert_eq!(
            layout(&allocator),
            [
                (0, 100, false),
                (100, 200, true),
                (300, 50, false),
                (350, 80, false),
                (430, 20, true),
                (450, 574, false)
            ]
        );
        assert_allocated(&allocator, region, 80);
    }

    #[test]
    fn test_best_fit_ties_go_to_lowest_address() {
        let mut allocator = RegionAllocator::new(300, 100);
        for size in [100, 50, 100, 50] {
            allocator.first_fit(size).unwrap();
        }
        punch_hole(&mut allocator, 100);
        punch_hole(&mut allocator, 250);
        let region = allocator.best_fit(50).unwrap();
        assert_eq!(region.start(), 100);
    }

    #[test]
    fn test_best_fit_sequence_after_first_fit() {
        let mut allocator = RegionAllocator::new(1024, 100);
        for size in [100, 200, 300] {
            allocator.first_fit(size).unwrap();
        }
        assert_eq!(allocator.best_fit(150).unwrap().start(), 600);
        assert_eq!(allocator.best_fit(50).unwrap().start(), 750);
        let err = allocator.best_fit(250).unwrap_err();
        assert!(matches!(
            err,
            AllocateRegionError::InsufficientMemory { size: 250, .. }
        ));
        assert_eq!(allocator.free_size(), 224);
        assert_partitioned(&allocator);
    }

    #[test]
    fn test_region_table_full() {
        let mut allocator = RegionAllocator::new(100, 3);
        allocator.first_fit(10).unwrap();
        allocator.first_fit(10).unwrap();
        let before = layout(&allocator);

        let err = allocator.first_fit(10).unwrap_err();
        assert!(matches!(
            err,
            AllocateRegionError::RegionTableFull { max_regions: 3, .. }
        ));
        assert_eq!(layout(&allocator), before);

        // Taking the whole remainder needs no new slot.
        let region = allocator.first_fit(80).unwrap();
        assert_eq!(region.range(), 20..100);
        assert_partitioned(&allocator);
    }

    #[test]
    fn test_region_at() {
        let mut allocator = RegionAllocator::new(1024, 100);
        allocator.first_fit(100).unwrap();
        assert_eq!(allocator.region_at(0).unwrap().range(), 0..100);
        assert_eq!(allocator.region_at(99).unwrap().range(), 0..100);
        assert_eq!(allocator.region_at(100).unwrap().range(), 100..1024);
        assert!(allocator.region_at(1024).is_none());
    }

    #[test]
    fn test_partition_holds_for_mixed_sequences() {
        let mut allocator = RegionAllocator::new(4096, 100);
        let sizes = [7, 300, 1, 64, 999, 12, 512, 2048, 33, 100];
        for (i, size) in sizes.into_iter().enumerate() {
            let placement = if i % 2 == 0 {
                Placement::FirstFit
            } else {
                Placement::BestFit
            };
            if let Ok(region) = allocator.allocate(size, placement) {
                assert_allocated(&allocator, region, size);
            }
            assert_partitioned(&allocator);
        }
    }
}
