//! A flat file directory on top of a contiguous block allocator.
//!
//! Every file occupies a single run of adjacent blocks, found with
//! [`BlockBitmap::allocate_contiguous_run`]. The directory keeps records in
//! creation order and looks them up by exact name. Files are never deleted,
//! renamed or resized, and their contents are not modelled: reading a file
//! only resolves which blocks would be read.
//!
//! ```rust
//! use allocator::bitmap::BlockBitmap;
//! use filesystem::{DirectoryLimits, FileSystem};
//!
//! let mut fs = FileSystem::new(BlockBitmap::new(1024, 32), DirectoryLimits::default());
//! fs.create_file("a", 100).unwrap();
//! fs.create_file("b", 200).unwrap();
//!
//! let a = fs.find_file("a").unwrap();
//! assert_eq!((a.start_block(), a.block_count()), (0, 4));
//! assert_eq!(fs.read_file("b").unwrap().range(), 4..11);
//! ```

use allocator::bitmap::{AllocateBlocksError, BlockBitmap, BlockRun};
use snafu::{OptionExt as _, ResultExt as _, Snafu, ensure};
use snafu_utils::Location;

pub use self::record::FileRecord;

mod record;

/// Ceilings enforced by the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryLimits {
    pub max_files: usize,
    pub max_filename_length: usize,
}

impl Default for DirectoryLimits {
    fn default() -> Self {
        Self {
            max_files: 100,
            max_filename_length: 50,
        }
    }
}

#[derive(Debug, Snafu)]
pub enum CreateFileError {
    #[snafu(display("directory is full: max_files={max_files}"))]
    DirectoryFull {
        max_files: usize,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display(
        "invalid file name {name:?}: must be 1..={max_filename_length} bytes"
    ))]
    InvalidName {
        name: String,
        max_filename_length: usize,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("failed to allocate blocks for {name:?}"))]
    Storage {
        name: String,
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        source: AllocateBlocksError,
    },
}

#[derive(Debug, Snafu)]
pub enum FindFileError {
    #[snafu(display("file not found: {name:?}"))]
    NotFound {
        name: String,
        #[snafu(implicit)]
        location: Location,
    },
}

#[derive(Debug, Clone)]
pub struct FileSystem {
    disk: BlockBitmap,
    limits: DirectoryLimits,
    files: Vec<FileRecord>,
}

impl FileSystem {
    #[must_use]
    pub fn new(disk: BlockBitmap, limits: DirectoryLimits) -> Self {
        Self {
            disk,
            limits,
            files: Vec::new(),
        }
    }

    #[must_use]
    pub fn disk(&self) -> &BlockBitmap {
        &self.disk
    }

    #[must_use]
    pub fn limits(&self) -> DirectoryLimits {
        self.limits
    }

    /// Returns the directory in creation order.
    #[must_use]
    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Creates a file of `size` bytes in the first contiguous run of free
    /// blocks large enough to hold it.
    ///
    /// Names are not required to be unique; [`find_file`](Self::find_file)
    /// resolves duplicates to the earliest file. On failure neither the
    /// directory nor the disk is modified.
    pub fn create_file(&mut self, name: &str, size: usize) -> Result<&FileRecord, CreateFileError> {
        let DirectoryLimits {
            max_files,
            max_filename_length,
        } = self.limits;
        ensure!(self.files.len() < max_files, DirectoryFullSnafu { max_files });
        ensure!(
            !name.is_empty() && name.len() <= max_filename_length,
            InvalidNameSnafu {
                name,
                max_filename_length,
            }
        );

        let run = self
            .disk
            .allocate_contiguous_run(size)
            .context(StorageSnafu { name })?;
        self.files.push(FileRecord::new(name.to_owned(), size, run));
        Ok(&self.files[self.files.len() - 1])
    }

    /// Returns the earliest-created file named exactly `name`.
    pub fn find_file(&self, name: &str) -> Result<&FileRecord, FindFileError> {
        self.files
            .iter()
            .find(|file| file.name() == name)
            .context(NotFoundSnafu { name })
    }

    /// Resolves the blocks a read of `name` would transfer.
    pub fn read_file(&self, name: &str) -> Result<BlockRun, FindFileError> {
        self.find_file(name).map(FileRecord::run)
    }
}
