//! Simulation parameters.

use core::num::NonZeroU32;

use snafu::{Snafu, ensure};
use snafu_utils::Location;

/// Size of simulated main memory in units.
pub const DEFAULT_MEMORY_SIZE: usize = 1024;
/// Size of the simulated disk in bytes.
pub const DEFAULT_STORAGE_SIZE: usize = 1024;
/// Size of one disk block in bytes.
pub const DEFAULT_BLOCK_SIZE: usize = 32;
pub const DEFAULT_MAX_FILES: usize = 100;
pub const DEFAULT_MAX_FILENAME_LENGTH: usize = 50;
/// Length limit of the memory region table.
pub const DEFAULT_MAX_REGIONS: usize = 100;
pub const DEFAULT_MAX_TASKS: usize = 100;
/// Round-robin time slice.
pub const DEFAULT_QUANTUM: NonZeroU32 = NonZeroU32::new(2).unwrap();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub total_memory_size: usize,
    pub total_storage_size: usize,
    pub block_size: usize,
    pub max_files: usize,
    pub max_filename_length: usize,
    pub max_regions: usize,
    pub max_tasks: usize,
    pub quantum: NonZeroU32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            total_memory_size: DEFAULT_MEMORY_SIZE,
            total_storage_size: DEFAULT_STORAGE_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
            max_files: DEFAULT_MAX_FILES,
            max_filename_length: DEFAULT_MAX_FILENAME_LENGTH,
            max_regions: DEFAULT_MAX_REGIONS,
            max_tasks: DEFAULT_MAX_TASKS,
            quantum: DEFAULT_QUANTUM,
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("`{name}` must be greater than zero"))]
    Zero {
        name: &'static str,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display(
        "block size exceeds storage size: block_size={block_size}, \
         total_storage_size={total_storage_size}"
    ))]
    BlockLargerThanStorage {
        block_size: usize,
        total_storage_size: usize,
        #[snafu(implicit)]
        location: Location,
    },
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("total_memory_size", self.total_memory_size),
            ("total_storage_size", self.total_storage_size),
            ("block_size", self.block_size),
            ("max_regions", self.max_regions),
        ] {
            ensure!(value > 0, ZeroSnafu { name });
        }
        ensure!(
            self.block_size <= self.total_storage_size,
            BlockLargerThanStorageSnafu {
                block_size: self.block_size,
                total_storage_size: self.total_storage_size,
            }
        );
        Ok(())
    }

    #[must_use]
    pub fn block_count(&self) -> usize {
        self.total_storage_size / self.block_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.block_count(), 32);
    }

    #[test]
    fn test_zero_values_are_rejected() {
        let config = Config {
            block_size: 0,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Zero { name: "block_size", .. }));

        let config = Config {
            max_regions: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_block_larger_than_storage() {
        let config = Config {
            total_storage_size: 16,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::BlockLargerThanStorage { .. }));
    }

    #[test]
    fn test_zero_ceilings_are_allowed() {
        // Zero file and task ceilings are legal and make every push fail.
        let config = Config {
            max_files: 0,
            max_tasks: 0,
            ..Config::default()
        };
        config.validate().unwrap();
    }
}
