//! Line-oriented record of every decision the simulator makes.

use core::fmt;

use scheduler::TaskId;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum Event {
    #[display("{title}")]
    Section { title: String },

    #[display("Executing task {task_id} with burst time {units}")]
    Executed { task_id: TaskId, units: u32 },
    #[display("Executing task {task_id} for {units} time units")]
    Sliced { task_id: TaskId, units: u32 },

    #[display("Allocated {size} units of memory at address {address}")]
    Allocated { address: usize, size: usize },
    #[display("No sufficient memory available!")]
    InsufficientMemory,
    #[display("Memory region table is full!")]
    RegionTableFull,

    #[display("Created file {name} of size {size} at block {start_block}")]
    FileCreated {
        name: String,
        size: usize,
        start_block: usize,
    },
    #[display("No sufficient disk space available!")]
    InsufficientStorage,
    #[display("Maximum file limit reached!")]
    DirectoryFull,
    #[display("Invalid file name: {name}")]
    InvalidName { name: String },
    #[display("Reading {block_count} blocks starting from block {start_block}")]
    FileRead {
        start_block: usize,
        block_count: usize,
    },
    #[display("File not found!")]
    FileNotFound,

    #[display("Invalid request size: 0")]
    ZeroSize,

    #[display("[{start}, {end}) size {size} {}", if *is_free { "free" } else { "used" })]
    Region {
        start: usize,
        end: usize,
        size: usize,
        is_free: bool,
    },
    #[display("free {free} of {capacity}, largest free region {largest}")]
    MemorySummary {
        free: usize,
        capacity: usize,
        largest: usize,
    },
    #[display("{map}")]
    DiskMap { map: String },
    #[display("free {free} of {block_count} blocks, largest free run {largest_run}")]
    DiskSummary {
        free: usize,
        block_count: usize,
        largest_run: usize,
    },
}

/// Ordered events, rendered one per line with a blank line before every
/// section header except the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    events: Vec<Event>,
}

impl Trace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Rendered output lines, including the blank separators.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.to_string().lines().map(str::to_owned).collect()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, event) in self.events.iter().enumerate() {
            if i > 0 && event.is_section() {
                writeln!(f)?;
            }
            writeln!(f, "{event}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_are_separated() {
        let mut trace = Trace::new();
        trace.push(Event::Section {
            title: "A:".into(),
        });
        trace.push(Event::InsufficientMemory);
        trace.push(Event::Section {
            title: "B:".into(),
        });
        trace.push(Event::FileNotFound);
        assert_eq!(
            trace.to_string(),
            "A:\nNo sufficient memory available!\n\nB:\nFile not found!\n"
        );
    }

    #[test]
    fn test_region_line() {
        let event = Event::Region {
            start: 600,
            end: 1024,
            size: 424,
            is_free: true,
        };
        assert_eq!(event.to_string(), "[600, 1024) size 424 free");
    }
}
