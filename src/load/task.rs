//! Load tasks and the task-set reducer
//!
//! Every remote call of a load sequence is a `LoadTask`. The tasks of the
//! current request live in a `TaskSet`, which changes only through
//! [`TaskSet::apply`]: a pure reducer over `TaskEvent`s that rejects
//! anything from a superseded generation.

use std::collections::BTreeMap;
use std::fmt;

use super::error::{LoadError, LoadFailure, LoadResult};
use super::request::LoadRequest;
use crate::api::{Account, AccountOpen, BlockType, BlocksSummary};

/// Which call of the sequence a task stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    /// Account record; everything else depends on it
    Primary,
    /// Opening information
    Detail,
    /// Blocks summary for one category
    Auxiliary(BlockType),
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Primary => f.write_str("primary"),
            TaskKind::Detail => f.write_str("detail"),
            TaskKind::Auxiliary(block_type) => write!(f, "{} summary", block_type),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Success,
    Failure,
}

/// Result payload of a successful task
#[derive(Debug, Clone, PartialEq)]
pub enum TaskPayload {
    Account(Account),
    Open(AccountOpen),
    Summary(BlocksSummary),
}

/// Outcome carried by a completion event
pub type TaskOutcome = Result<TaskPayload, LoadFailure>;

#[derive(Debug, Clone, PartialEq)]
enum TaskState {
    Pending,
    Succeeded(TaskPayload),
    Failed(LoadFailure),
}

/// One remote call of a load sequence
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTask {
    kind: TaskKind,
    state: TaskState,
}

impl LoadTask {
    fn pending(kind: TaskKind) -> Self {
        Self {
            kind,
            state: TaskState::Pending,
        }
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn status(&self) -> TaskStatus {
        match self.state {
            TaskState::Pending => TaskStatus::Pending,
            TaskState::Succeeded(_) => TaskStatus::Success,
            TaskState::Failed(_) => TaskStatus::Failure,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status() == TaskStatus::Pending
    }

    pub fn payload(&self) -> Option<&TaskPayload> {
        match &self.state {
            TaskState::Succeeded(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&LoadFailure> {
        match &self.state {
            TaskState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Task transition, stamped with the generation of its sequence
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    Started {
        generation: u64,
        kind: TaskKind,
    },
    Completed {
        generation: u64,
        kind: TaskKind,
        outcome: TaskOutcome,
    },
}

impl TaskEvent {
    pub fn started(generation: u64, kind: TaskKind) -> Self {
        TaskEvent::Started { generation, kind }
    }

    pub fn completed(generation: u64, kind: TaskKind, outcome: TaskOutcome) -> Self {
        TaskEvent::Completed {
            generation,
            kind,
            outcome,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            TaskEvent::Started { generation, .. } | TaskEvent::Completed { generation, .. } => {
                *generation
            }
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            TaskEvent::Started { kind, .. } | TaskEvent::Completed { kind, .. } => *kind,
        }
    }
}

/// Tasks of the authoritative request
#[derive(Debug, Clone, Default)]
pub struct TaskSet {
    generation: u64,
    request: Option<LoadRequest>,
    tasks: BTreeMap<TaskKind, LoadTask>,
}

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `request` authoritative and return its generation.
    ///
    /// Tasks of the previous request are dropped; their later events are
    /// rejected as stale. The primary task of the new request starts out
    /// pending.
    pub fn begin(&mut self, request: LoadRequest) -> u64 {
        self.generation += 1;
        self.request = Some(request);
        self.tasks.clear();
        self.tasks
            .insert(TaskKind::Primary, LoadTask::pending(TaskKind::Primary));
        self.generation
    }

    /// Apply one task transition
    pub fn apply(&mut self, event: TaskEvent) -> LoadResult<()> {
        let generation = event.generation();
        if generation != self.generation {
            return Err(LoadError::Stale {
                generation,
                current: self.generation,
            });
        }

        match event {
            TaskEvent::Started { kind, .. } => {
                if self.tasks.contains_key(&kind) {
                    return Err(LoadError::AlreadyStarted(kind));
                }
                if !self.primary_succeeded() {
                    return Err(LoadError::PrimaryNotReady);
                }
                self.tasks.insert(kind, LoadTask::pending(kind));
            }
            TaskEvent::Completed { kind, outcome, .. } => {
                let task = self
                    .tasks
                    .get_mut(&kind)
                    .filter(|task| task.is_pending())
                    .ok_or(LoadError::UnknownTask(kind))?;

                task.state = match outcome {
                    Ok(payload) => TaskState::Succeeded(payload),
                    Err(failure) => TaskState::Failed(failure),
                };
            }
        }

        Ok(())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> Option<&LoadRequest> {
        self.request.as_ref()
    }

    pub fn get(&self, kind: TaskKind) -> Option<&LoadTask> {
        self.tasks.get(&kind)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &LoadTask> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn primary_succeeded(&self) -> bool {
        self.tasks
            .get(&TaskKind::Primary)
            .map(|task| task.status() == TaskStatus::Success)
            .unwrap_or(false)
    }
}
