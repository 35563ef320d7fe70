//! The fixed request stream the simulator replays.

use allocator::region::Placement;
use scheduler::{Policy, Task};

use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Schedule(Policy),
    Allocate { placement: Placement, size: usize },
    CreateFile { name: String, size: usize },
    ReadFile { name: String },
}

/// A titled group of requests, traced under one header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub title: String,
    pub requests: Vec<Request>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    pub tasks: Vec<Task>,
    pub stages: Vec<Stage>,
}

fn stage(title: impl Into<String>, requests: impl IntoIterator<Item = Request>) -> Stage {
    Stage {
        title: title.into(),
        requests: requests.into_iter().collect(),
    }
}

fn allocations(placement: Placement, sizes: &[usize]) -> Vec<Request> {
    sizes
        .iter()
        .map(|&size| Request::Allocate { placement, size })
        .collect()
}

/// Four tasks through FCFS, SJF and round-robin, six memory requests and two
/// files written then read back.
#[must_use]
pub fn sample(config: &Config) -> Workload {
    let tasks = vec![
        Task::new(1, 0, 5, 1),
        Task::new(2, 1, 3, 1),
        Task::new(3, 2, 8, 1),
        Task::new(4, 3, 6, 1),
    ];
    let quantum = config.quantum;

    let stages = vec![
        stage("FCFS Scheduling:", [Request::Schedule(Policy::Fcfs)]),
        stage("SJF Scheduling:", [Request::Schedule(Policy::Sjf)]),
        stage(
            format!("RR Scheduling (Quantum = {quantum}):"),
            [Request::Schedule(Policy::RoundRobin { quantum })],
        ),
        stage(
            format!("Memory Allocation ({}):", Placement::FirstFit),
            allocations(Placement::FirstFit, &[100, 200, 300]),
        ),
        stage(
            format!("Memory Allocation ({}):", Placement::BestFit),
            allocations(Placement::BestFit, &[150, 50, 250]),
        ),
        stage(
            "File Management:",
            [
                Request::CreateFile {
                    name: "file1.txt".into(),
                    size: 100,
                },
                Request::CreateFile {
                    name: "file2.txt".into(),
                    size: 200,
                },
                Request::ReadFile {
                    name: "file1.txt".into(),
                },
                Request::ReadFile {
                    name: "file2.txt".into(),
                },
            ],
        ),
    ];

    Workload { tasks, stages }
}
