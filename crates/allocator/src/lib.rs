//! Placement engines for linear resources.
//!
//! Both allocators in this crate carve a fixed linear space into contiguous
//! pieces and hand them out under a placement policy. Neither supports
//! releasing what it handed out.
//!
//! # Available Allocators
//!
//! ## [`RegionAllocator`](region::RegionAllocator)
//!
//! Byte-granular allocator keeping an address-ordered table of free and used
//! regions. Best suited for:
//!
//! - Modelling main memory with variable-sized requests
//! - Comparing first-fit and best-fit placement on the same request stream
//!
//! **Performance**: O(n) allocation where n is the number of regions.
//!
//! ## [`BlockBitmap`](bitmap::BlockBitmap)
//!
//! Block-granular allocator keeping one free flag per block and handing out
//! contiguous runs. Best suited for:
//!
//! - Modelling contiguous file allocation on a disk
//! - Showing external fragmentation: a request fails if no single run is
//!   long enough, however many blocks are free in total
//!
//! **Performance**: O(n) allocation where n is the number of blocks.
//!
//! # Failure Semantics
//!
//! Every allocation either succeeds and mutates the allocator, or fails with
//! an error and leaves it exactly as it was. Zero-sized requests are always
//! rejected.
//!
//! # Thread Safety
//!
//! Allocation takes `&mut self`, so the scan for a fitting piece and the
//! update that claims it cannot interleave with another request. Sharing an
//! allocator between threads requires wrapping it in a mutex.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod bitmap;
pub mod region;
