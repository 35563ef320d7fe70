//! Contiguous-run allocator over a fixed array of equal-size blocks.
//!
//! Each block is a single free/used flag. A request of `size` bytes needs
//! `ceil(size / block_size)` blocks, and those blocks must be adjacent: the
//! bitmap is scanned left to right for the first run of free blocks that is
//! long enough. Unlike [`RegionAllocator`](crate::region::RegionAllocator), a
//! request can fail while enough blocks are free in total, if no single run
//! holds them.
//!
//! Flags only ever go from free to used.
//!
//! # Usage Example
//!
//! ```rust
//! use allocator::bitmap::BlockBitmap;
//!
//! let mut disk = BlockBitmap::new(1024, 32);
//! assert_eq!(disk.block_count(), 32);
//!
//! let run = disk.allocate_contiguous_run(100).unwrap();
//! assert_eq!(run.range(), 0..4);
//! assert_eq!(disk.to_string(), format!("####{}", ".".repeat(28)));
//! ```

use core::{fmt, ops::Range};

use snafu::{OptionExt as _, Snafu, ensure};
use snafu_utils::Location;

/// A run of adjacent blocks handed out by [`BlockBitmap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockRun {
    start: usize,
    count: usize,
}

impl BlockRun {
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.count
    }
}

#[derive(Debug, Snafu)]
pub enum AllocateBlocksError {
    #[snafu(display("cannot allocate blocks for a zero-sized request"))]
    ZeroSize {
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("no run of {blocks_needed} contiguous free blocks for {size} bytes"))]
    InsufficientStorage {
        size: usize,
        blocks_needed: usize,
        #[snafu(implicit)]
        location: Location,
    },
}

/// Free/used flags for a fixed number of equal-size blocks.
#[derive(Clone, PartialEq, Eq)]
pub struct BlockBitmap {
    block_size: usize,
    free: Vec<bool>,
}

impl fmt::Debug for BlockBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockBitmap")
            .field("block_size", &self.block_size)
            .field("map", &format_args!("{self}"))
            .finish()
    }
}

/// Renders one character per block, `.` for free and `#` for used.
impl fmt::Display for BlockBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &free in &self.free {
            f.write_str(if free { "." } else { "#" })?;
        }
        Ok(())
    }
}

impl BlockBitmap {
    /// Creates a bitmap of `total_size / block_size` free blocks.
    ///
    /// A trailing partial block is not part of the bitmap.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is zero.
    #[must_use]
    pub fn new(total_size: usize, block_size: usize) -> Self {
        assert!(block_size > 0, "Block size must be greater than zero");
        Self {
            block_size,
            free: vec![true; total_size / block_size],
        }
    }

    /// Creates a bitmap from explicit flags, `true` meaning free.
    ///
    /// # Panics
    ///
    /// Panics if `block_size` is zero.
    #[must_use]
    pub fn from_free_flags(free: Vec<bool>, block_size: usize) -> Self {
        assert!(block_size > 0, "Block size must be greater than zero");
        Self { block_size, free }
    }

    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[must_use]
    pub fn block_count(&self) -> usize {
        self.free.len()
    }

    /// Returns whether block `index` is free, or `None` past the end.
    #[must_use]
    pub fn is_free(&self, index: usize) -> Option<bool> {
        self.free.get(index).copied()
    }

    #[must_use]
    pub fn free_blocks(&self) -> usize {
        self.free.iter().filter(|&&free| free).count()
    }

    /// Length of the longest run of free blocks.
    #[must_use]
    pub fn largest_free_run(&self) -> usize {
        self.free
            .split(|&free| !free)
            .map(<[bool]>::len)
            .max()
            .unwrap_or(0)
    }

    /// Number of blocks needed to hold `size` bytes.
    #[must_use]
    pub fn blocks_needed(&self, size: usize) -> usize {
        size.div_ceil(self.block_size)
    }

    /// Allocates the first run of contiguous free blocks large enough to hold
    /// `size` bytes and marks it used.
    pub fn allocate_contiguous_run(&mut self, size: usize) -> Result<BlockRun, AllocateBlocksError> {
        ensure!(size > 0, ZeroSizeSnafu);
        let blocks_needed = self.blocks_needed(size);
        let start = self
            .find_run(blocks_needed)
            .context(InsufficientStorageSnafu {
                size,
                blocks_needed,
            })?;

        let run = BlockRun {
            start,
            count: blocks_needed,
        };
        self.free[run.range()].fill(false);
        Ok(run)
    }

    fn find_run(&self, blocks_needed: usize) -> Option<usize> {
        let mut run_start = 0;
        let mut run_len = 0;
        for (index, &free) in self.free.iter().enumerate() {
            if !free {
                run_len = 0;
                continue;
            }
            if run_len == 0 {
                run_start = index;
            }
            run_len += 1;
            if run_len == blocks_needed {
                return Some(run_start);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap(map: &str) -> BlockBitmap {
        let free = map.chars().map(|c| c == '.').collect();
        BlockBitmap::from_free_flags(free, 32)
    }

    #[test]
    fn test_block_count_truncates_partial_block() {
        assert_eq!(BlockBitmap::new(1024, 32).block_count(), 32);
        assert_eq!(BlockBitmap::new(1000, 32).block_count(), 31);
        assert_eq!(BlockBitmap::new(16, 32).block_count(), 0);
    }

    #[test]
    fn test_blocks_needed_rounds_up() {
        let disk = BlockBitmap::new(1024, 32);
        assert_eq!(disk.blocks_needed(1), 1);
        assert_eq!(disk.blocks_needed(32), 1);
        assert_eq!(disk.blocks_needed(33), 2);
        assert_eq!(disk.blocks_needed(100), 4);
        assert_eq!(disk.blocks_needed(200), 7);
    }

    #[test]
    fn test_sequential_runs() {
        let mut disk = BlockBitmap::new(1024, 32);
        let a = disk.allocate_contiguous_run(100).unwrap();
        let b = disk.allocate_contiguous_run(200).unwrap();
        assert_eq!(a.range(), 0..4);
        assert_eq!(b.range(), 4..11);
        assert_eq!(disk.free_blocks(), 21);
        assert_eq!(disk.largest_free_run(), 21);
        assert_eq!(disk.is_free(10), Some(false));
        assert_eq!(disk.is_free(11), Some(true));
        assert_eq!(disk.is_free(32), None);
    }

    #[test]
    fn test_first_sufficient_run_wins() {
        let mut disk = bitmap("..#....#........");
        let run = disk.allocate_contiguous_run(3 * 32).unwrap();
        assert_eq!(run.range(), 3..6);
        assert_eq!(disk.to_string(), "..####.#........");

        let run = disk.allocate_contiguous_run(64).unwrap();
        assert_eq!(run.range(), 0..2);
    }

    #[test]
    fn test_scattered_free_blocks_are_not_enough() {
        let mut disk = bitmap(".#.#.#.#");
        assert_eq!(disk.free_blocks(), 4);
        assert_eq!(disk.largest_free_run(), 1);

        let err = disk.allocate_contiguous_run(64).unwrap_err();
        assert!(matches!(
            err,
            AllocateBlocksError::InsufficientStorage {
                size: 64,
                blocks_needed: 2,
                ..
            }
        ));
        assert_eq!(disk.to_string(), ".#.#.#.#");
    }

    #[test]
    fn test_run_at_the_end() {
        let mut disk = bitmap("#.#...");
        let run = disk.allocate_contiguous_run(96).unwrap();
        assert_eq!(run.range(), 3..6);
        assert_eq!(disk.free_blocks(), 1);
    }

    #[test]
    fn test_exhaustion() {
        let mut disk = BlockBitmap::new(128, 32);
        disk.allocate_contiguous_run(128).unwrap();
        let err = disk.allocate_contiguous_run(1).unwrap_err();
        assert!(matches!(
            err,
            AllocateBlocksError::InsufficientStorage { .. }
        ));
        assert_eq!(disk.largest_free_run(), 0);
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let mut disk = BlockBitmap::new(1024, 32);
        let err = disk.allocate_contiguous_run(0).unwrap_err();
        assert!(matches!(err, AllocateBlocksError::ZeroSize { .. }));
        assert_eq!(disk.free_blocks(), 32);
    }
}
