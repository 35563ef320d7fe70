use allocator::{
    bitmap::{AllocateBlocksError, BlockBitmap},
    region::{AllocateRegionError, Placement, RegionAllocator},
};
use filesystem::{CreateFileError, DirectoryLimits, FileSystem};
use scheduler::{Policy, Task, TaskQueue, TaskQueueError};
use snafu::{ResultExt as _, Snafu};
use snafu_utils::Location;

use crate::{
    config::{Config, ConfigError},
    trace::{Event, Trace},
    workload::{Request, Workload},
};

#[derive(Debug, Snafu)]
pub enum SimulatorError {
    #[snafu(display("invalid configuration"))]
    InvalidConfig {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        source: ConfigError,
    },
    #[snafu(display("failed to enqueue task {task_id}"))]
    LoadTask {
        task_id: scheduler::TaskId,
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        source: TaskQueueError,
    },
}

/// Owns one instance of each resource manager and records what they decide.
///
/// Failed requests become trace events; the simulator always carries on with
/// the next request.
#[derive(Debug)]
pub struct Simulator {
    queue: TaskQueue,
    memory: RegionAllocator,
    fs: FileSystem,
    trace: Trace,
}

impl Simulator {
    /// Builds fresh resource managers from `config` and enqueues `tasks`.
    ///
    /// Fails without touching `tasks` if `config` does not pass
    /// [`Config::validate`].
    pub fn new<I>(config: &Config, tasks: I) -> Result<Self, SimulatorError>
    where
        I: IntoIterator<Item = Task>,
    {
        config.validate().context(InvalidConfigSnafu)?;
        let mut queue = TaskQueue::new(config.max_tasks);
        for task in tasks {
            queue.push(task).context(LoadTaskSnafu { task_id: task.id() })?;
        }
        let memory = RegionAllocator::new(config.total_memory_size, config.max_regions);
        let fs = FileSystem::new(
            BlockBitmap::new(config.total_storage_size, config.block_size),
            DirectoryLimits {
                max_files: config.max_files,
                max_filename_length: config.max_filename_length,
            },
        );
        debug!(
            "simulator ready: tasks={}, memory={}, blocks={}x{}",
            queue.tasks().len(),
            memory.capacity(),
            fs.disk().block_count(),
            fs.disk().block_size(),
        );
        Ok(Self {
            queue,
            memory,
            fs,
            trace: Trace::new(),
        })
    }

    #[must_use]
    pub fn memory(&self) -> &RegionAllocator {
        &self.memory
    }

    #[must_use]
    pub fn fs(&self) -> &FileSystem {
        &self.fs
    }

    #[must_use]
    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    #[must_use]
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    #[must_use]
    pub fn into_trace(self) -> Trace {
        self.trace
    }

    pub fn run(&mut self, workload: &Workload) {
        for stage in &workload.stages {
            info!("stage: {}", stage.title);
            self.section(stage.title.clone());
            for request in &stage.requests {
                self.execute(request);
            }
        }
    }

    pub fn execute(&mut self, request: &Request) {
        debug!("request: {request:?}");
        match request {
            Request::Schedule(policy) => self.schedule(*policy),
            Request::Allocate { placement, size } => self.allocate(*placement, *size),
            Request::CreateFile { name, size } => self.create_file(name, *size),
            Request::ReadFile { name } => self.read_file(name),
        }
    }

    /// Appends the final memory region table and disk bitmap to the trace.
    pub fn dump(&mut self) {
        self.section("Memory Map:".into());
        for region in self.memory.regions() {
            self.trace.push(Event::Region {
                start: region.start(),
                end: region.end(),
                size: region.size(),
                is_free: region.is_free(),
            });
        }
        self.trace.push(Event::MemorySummary {
            free: self.memory.free_size(),
            capacity: self.memory.capacity(),
            largest: self.memory.largest_free(),
        });

        self.section("Disk Map:".into());
        let disk = self.fs.disk();
        self.trace.push(Event::DiskMap {
            map: disk.to_string(),
        });
        self.trace.push(Event::DiskSummary {
            free: disk.free_blocks(),
            block_count: disk.block_count(),
            largest_run: disk.largest_free_run(),
        });
    }

    fn section(&mut self, title: String) {
        self.trace.push(Event::Section { title });
    }

    fn schedule(&mut self, policy: Policy) {
        let schedule = self.queue.run(policy);
        for step in schedule.steps() {
            trace!(
                "{policy}: t={} task={} units={}",
                step.start_time, step.task_id, step.units
            );
            let (task_id, units) = (step.task_id, step.units);
            self.trace.push(if policy.is_round_robin() {
                Event::Sliced { task_id, units }
            } else {
                Event::Executed { task_id, units }
            });
        }
        debug!("{policy} finished at t={}", schedule.total_time());
    }

    fn allocate(&mut self, placement: Placement, size: usize) {
        let event = match self.memory.allocate(size, placement) {
            Ok(region) => Event::Allocated {
                address: region.start(),
                size: region.size(),
            },
            Err(err) => {
                warn!("{placement} allocation failed: {err}");
                match err {
                    AllocateRegionError::ZeroSize { .. } => Event::ZeroSize,
                    AllocateRegionError::InsufficientMemory { .. } => Event::InsufficientMemory,
                    AllocateRegionError::RegionTableFull { .. } => Event::RegionTableFull,
                }
            }
        };
        self.trace.push(event);
    }

    fn create_file(&mut self, name: &str, size: usize) {
        let event = match self.fs.create_file(name, size) {
            Ok(file) => Event::FileCreated {
                name: file.name().to_owned(),
                size: file.size(),
                start_block: file.start_block(),
            },
            Err(err) => {
                warn!("cannot create {name:?}: {err}");
                match err {
                    CreateFileError::DirectoryFull { .. } => Event::DirectoryFull,
                    CreateFileError::InvalidName { name, .. } => Event::InvalidName { name },
                    CreateFileError::Storage { source, .. } => match source {
                        AllocateBlocksError::ZeroSize { .. } => Event::ZeroSize,
                        AllocateBlocksError::InsufficientStorage { .. } => {
                            Event::InsufficientStorage
                        }
                    },
                }
            }
        };
        self.trace.push(event);
    }

    fn read_file(&mut self, name: &str) {
        let event = match self.fs.read_file(name) {
            Ok(run) => Event::FileRead {
                start_block: run.start(),
                block_count: run.count(),
            },
            Err(err) => {
                warn!("cannot read {name:?}: {err}");
                Event::FileNotFound
            }
        };
        self.trace.push(event);
    }
}
