//! Task model
//!
//! Tasks are resumable state machines: the scheduler calls [`Task::poll`]
//! once per dispatch pass, the task performs one logical unit of work and
//! returns a [`Control`] describing its suspension point. There is no
//! per-task stack and no context switching; a task that never returns from
//! `poll` starves every other task.

use crate::types::{TaskId, TaskState, Tick};

/// Suspension point returned from [`Task::poll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Stay ready; resume no earlier than the next dispatch pass
    Yield,
    /// Block until at least the given number of ticks have elapsed.
    ///
    /// The delay is a lower bound; actual resumption adds the time other
    /// tasks spend reaching their own suspension points.
    Sleep(Tick),
}

/// A cooperatively scheduled task
pub trait Task {
    /// Task name for diagnostics
    fn name(&self) -> &'static str;

    /// Run one logical unit of work.
    ///
    /// `now` is the tick at the start of the dispatch pass. Non-fatal
    /// errors are the task's own business and should be handled locally
    /// (typically logged and retried on the next poll); returning a fatal
    /// error stops the dispatch loop.
    fn poll(&mut self, now: Tick) -> crate::Result<Control>;
}

/// Per-slot bookkeeping owned by the scheduler
#[derive(Debug, Clone, Copy)]
pub struct TaskDescriptor {
    /// Task name captured at registration
    pub name: &'static str,
    /// Slot index assigned at registration
    pub id: TaskId,
    /// Dispatch priority, 0 = highest
    pub prio: u8,
    /// Current state
    pub state: TaskState,
    /// Tick at which a blocked task becomes ready
    pub wake_at: Tick,
    /// Suspend nesting counter
    pub suspend_ctr: u8,
    /// Number of completed polls
    pub polls: u32,
}

impl TaskDescriptor {
    pub(crate) fn new(name: &'static str, id: TaskId, prio: u8) -> Self {
        Self {
            name,
            id,
            prio,
            state: TaskState::Ready,
            wake_at: 0,
            suspend_ctr: 0,
            polls: 0,
        }
    }

    /// Check if the task is ready to run
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.state == TaskState::Ready
    }

    /// Check if the task is suspended
    #[inline]
    pub fn is_suspended(&self) -> bool {
        self.state == TaskState::Suspended
    }
}
