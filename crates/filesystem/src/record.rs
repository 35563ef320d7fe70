use core::ops::Range;

use allocator::bitmap::BlockRun;

/// Directory entry of a file stored in one contiguous run of blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    name: String,
    size: usize,
    run: BlockRun,
}

impl FileRecord {
    pub(crate) fn new(name: String, size: usize, run: BlockRun) -> Self {
        Self { name, size, run }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logical size in bytes, as requested at creation.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn start_block(&self) -> usize {
        self.run.start()
    }

    #[must_use]
    pub fn block_count(&self) -> usize {
        self.run.count()
    }

    #[must_use]
    pub fn run(&self) -> BlockRun {
        self.run
    }

    #[must_use]
    pub fn blocks(&self) -> Range<usize> {
        self.run.range()
    }
}
