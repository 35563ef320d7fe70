//! Textbook CPU scheduling policies over a queue of task descriptors.
//!
//! A [`TaskQueue`] holds tasks in their current order. Running a [`Policy`]
//! produces a [`Schedule`]: the ordered list of execution steps, each naming a
//! task and how many time units it ran. Sorting policies reorder the queue in
//! place, and round-robin consumes each task's remaining time, so policies run
//! one after another observe each other's effects.
//!
//! ```rust
//! use core::num::NonZeroU32;
//!
//! use scheduler::{Policy, Task, TaskQueue};
//!
//! let mut queue = TaskQueue::new(10);
//! queue.push(Task::new(1, 0, 3, 1)).unwrap();
//! queue.push(Task::new(2, 1, 1, 1)).unwrap();
//!
//! let sjf = queue.run(Policy::Sjf);
//! assert_eq!(sjf.task_order(), [2, 1]);
//!
//! let rr = queue.run(Policy::RoundRobin {
//!     quantum: NonZeroU32::new(2).unwrap(),
//! });
//! assert_eq!(rr.task_order(), [2, 1, 1]);
//! assert_eq!(rr.total_time(), 4);
//! ```

use core::num::NonZeroU32;

use snafu::{Snafu, ensure};
use snafu_utils::Location;

pub type TaskId = u32;

/// Process control block of a simulated task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Task {
    id: TaskId,
    arrival_time: u32,
    burst_time: u32,
    priority: u32,
    remaining_time: u32,
}

impl Task {
    /// Creates a task that has not run yet.
    #[must_use]
    pub fn new(id: TaskId, arrival_time: u32, burst_time: u32, priority: u32) -> Self {
        Self {
            id,
            arrival_time,
            burst_time,
            priority,
            remaining_time: burst_time,
        }
    }

    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[must_use]
    pub fn arrival_time(&self) -> u32 {
        self.arrival_time
    }

    #[must_use]
    pub fn burst_time(&self) -> u32 {
        self.burst_time
    }

    #[must_use]
    pub fn priority(&self) -> u32 {
        self.priority
    }

    #[must_use]
    pub fn remaining_time(&self) -> u32 {
        self.remaining_time
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::IsVariant)]
pub enum Policy {
    /// First-come first-served: ordered by arrival time.
    #[display("FCFS")]
    Fcfs,
    /// Shortest job first: ordered by burst time.
    #[display("SJF")]
    Sjf,
    /// Sweeps the queue repeatedly, running each task for at most `quantum`.
    #[display("RR")]
    RoundRobin { quantum: NonZeroU32 },
}

/// One contiguous slice of CPU time given to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    pub task_id: TaskId,
    pub start_time: u64,
    pub units: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    policy: Policy,
    steps: Vec<Step>,
}

impl Schedule {
    #[must_use]
    pub fn policy(&self) -> Policy {
        self.policy
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Task ids in execution order, one per step.
    #[must_use]
    pub fn task_order(&self) -> Vec<TaskId> {
        self.steps.iter().map(|step| step.task_id).collect()
    }

    /// Simulated time at which the last step finishes.
    #[must_use]
    pub fn total_time(&self) -> u64 {
        self.steps
            .last()
            .map_or(0, |step| step.start_time + u64::from(step.units))
    }
}

#[derive(Debug, Snafu)]
pub enum TaskQueueError {
    #[snafu(display("task queue is full: max_tasks={max_tasks}"))]
    QueueFull {
        max_tasks: usize,
        #[snafu(implicit)]
        location: Location,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQueue {
    max_tasks: usize,
    tasks: Vec<Task>,
}

impl TaskQueue {
    #[must_use]
    pub fn new(max_tasks: usize) -> Self {
        Self {
            max_tasks,
            tasks: Vec::new(),
        }
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn push(&mut self, task: Task) -> Result<(), TaskQueueError> {
        ensure!(
            self.tasks.len() < self.max_tasks,
            QueueFullSnafu {
                max_tasks: self.max_tasks
            }
        );
        self.tasks.push(task);
        Ok(())
    }

    /// Runs `policy` over the queue and returns the resulting schedule.
    pub fn run(&mut self, policy: Policy) -> Schedule {
        let steps = match policy {
            Policy::Fcfs => {
                self.tasks.sort_by_key(Task::arrival_time);
                self.run_to_completion()
            }
            Policy::Sjf => {
                self.tasks.sort_by_key(Task::burst_time);
                self.run_to_completion()
            }
            Policy::RoundRobin { quantum } => self.round_robin(quantum.get()),
        };
        Schedule { policy, steps }
    }

    /// One step per task, in queue order, for its whole burst.
    fn run_to_completion(&self) -> Vec<Step> {
        let mut clock = 0;
        self.tasks
            .iter()
            .map(|task| {
                let step = Step {
                    task_id: task.id,
                    start_time: clock,
                    units: task.burst_time,
                };
                clock += u64::from(task.burst_time);
                step
            })
            .collect()
    }

    fn round_robin(&mut self, quantum: u32) -> Vec<Step> {
        let mut clock = 0;
        let mut steps = vec![];
        while self.tasks.iter().any(|task| task.remaining_time > 0) {
            for task in &mut self.tasks {
                if task.remaining_time == 0 {
                    continue;
                }
                let units = u32::min(quantum, task.remaining_time);
                steps.push(Step {
                    task_id: task.id,
                    start_time: clock,
                    units,
                });
                task.remaining_time -= units;
                clock += u64::from(units);
            }
        }
        steps
    }
}
