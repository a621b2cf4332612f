//! Scheduler
//!
//! Cooperative dispatcher over a fixed arena of task slots. Tasks are
//! registered before the scheduler starts; registration is closed once the
//! dispatch loop begins. Each pass wakes due sleepers and polls every
//! ready task once, in (priority, slot) order. There is no preemption
//! beyond interrupt service routines.

use core::convert::Infallible;

use heapless::Vec;

use crate::config::CFG_TASK_MAX;
use crate::error::{Error, Result};
use crate::hal::TickSource;
use crate::task::{Control, Task, TaskDescriptor};
use crate::time;
use crate::types::{TaskId, TaskState, Tick};

/// Scheduler lifecycle state
enum State {
    /// Accepting registrations, not dispatching
    Registering,
    /// Dispatch loop active, registration closed
    Running,
}

/// One arena entry: the task and its bookkeeping
struct Slot<'a> {
    task: &'a mut dyn Task,
    desc: TaskDescriptor,
}

/// Cooperative scheduler owning an arena of `N` task slots.
///
/// The task id handed out by [`register`](Scheduler::register) is the slot
/// index; tasks are never deleted at runtime, only suspended.
pub struct Scheduler<'a, const N: usize = CFG_TASK_MAX> {
    slots: Vec<Slot<'a>, N>,
    /// Slot ids sorted by (priority, registration order)
    order: Vec<TaskId, N>,
    state: State,
    passes: u32,
}

impl<'a, const N: usize> Scheduler<'a, N> {
    /// Create an empty scheduler accepting registrations
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            order: Vec::new(),
            state: State::Registering,
            passes: 0,
        }
    }

    /// Register a task with the given priority (0 = highest).
    ///
    /// Must be called before [`start`](Scheduler::start); fails with
    /// [`Error::RegistrationClosed`] afterwards and [`Error::Capacity`]
    /// when the arena is full. Returns the task's id.
    pub fn register(&mut self, task: &'a mut dyn Task, prio: u8) -> Result<TaskId> {
        if matches!(self.state, State::Running) {
            return Err(Error::RegistrationClosed);
        }
        if self.slots.is_full() {
            return Err(Error::Capacity);
        }

        let id = self.slots.len() as TaskId;
        let desc = TaskDescriptor::new(task.name(), id, prio);

        if self.slots.push(Slot { task, desc }).is_err() {
            return Err(Error::Capacity);
        }
        if self.order.push(id).is_err() {
            return Err(Error::Capacity);
        }

        // Bubble into place; strict comparison keeps registration order
        // stable within a priority.
        let mut i = self.order.len() - 1;
        while i > 0 && self.slots[self.order[i - 1] as usize].desc.prio > prio {
            self.order.swap(i, i - 1);
            i -= 1;
        }

        Ok(id)
    }

    /// Close registration and mark the scheduler runnable.
    ///
    /// Split out of [`start`](Scheduler::start) so tests can drive the
    /// dispatch loop pass by pass with a simulated clock.
    pub fn begin(&mut self) -> Result<()> {
        if matches!(self.state, State::Running) {
            return Err(Error::AlreadyRunning);
        }
        if self.slots.is_empty() {
            return Err(Error::NoTasks);
        }
        self.state = State::Running;
        Ok(())
    }

    /// Enter the dispatch loop.
    ///
    /// Never returns under normal operation. The only exit is a fatal
    /// hardware fault propagated from a task, which the caller escalates
    /// to the system fault handler.
    pub fn start<C: TickSource>(&mut self, clock: &C) -> Result<Infallible> {
        self.begin()?;
        loop {
            self.run_pass(clock.now())?;
        }
    }

    /// Run one dispatch pass at the given tick.
    ///
    /// Wakes blocked tasks whose deadline is reached, then polls each
    /// ready task once in (priority, slot) order.
    pub fn run_pass(&mut self, now: Tick) -> Result<()> {
        if matches!(self.state, State::Registering) {
            return Err(Error::NotRunning);
        }

        self.passes = self.passes.wrapping_add(1);

        // Wake due sleepers
        for slot in self.slots.iter_mut() {
            if slot.desc.state == TaskState::Blocked && time::reached(now, slot.desc.wake_at) {
                slot.desc.state = TaskState::Ready;
            }
        }

        // Dispatch; the order table is copied out so slots can be borrowed
        // mutably while iterating.
        let mut order = [0 as TaskId; N];
        let count = self.order.len();
        order[..count].copy_from_slice(&self.order);

        for &id in &order[..count] {
            let slot = &mut self.slots[id as usize];
            if slot.desc.state != TaskState::Ready {
                continue;
            }

            slot.desc.state = TaskState::Running;
            slot.desc.polls = slot.desc.polls.wrapping_add(1);

            match slot.task.poll(now) {
                Ok(Control::Yield) => slot.desc.state = TaskState::Ready,
                Ok(Control::Sleep(ticks)) => {
                    slot.desc.state = TaskState::Blocked;
                    slot.desc.wake_at = now.wrapping_add(ticks);
                }
                Err(e) if e.is_fatal() => {
                    // Park the faulted task; the fault escalates to the
                    // system-level handler which resets the device.
                    slot.desc.state = TaskState::Suspended;
                    slot.desc.suspend_ctr = slot.desc.suspend_ctr.saturating_add(1);
                    return Err(e);
                }
                Err(_) => slot.desc.state = TaskState::Ready,
            }
        }

        Ok(())
    }

    /// Exclude a task from dispatch; suspends nest
    pub fn suspend(&mut self, id: TaskId) -> Result<()> {
        let slot = self
            .slots
            .get_mut(id as usize)
            .ok_or(Error::TaskNotFound)?;
        slot.desc.suspend_ctr = slot.desc.suspend_ctr.saturating_add(1);
        slot.desc.state = TaskState::Suspended;
        Ok(())
    }

    /// Undo one suspend; the task re-enters dispatch through the wake
    /// check on the next pass once the nesting count reaches zero.
    pub fn resume(&mut self, id: TaskId) -> Result<()> {
        let slot = self
            .slots
            .get_mut(id as usize)
            .ok_or(Error::TaskNotFound)?;
        if slot.desc.suspend_ctr == 0 {
            return Err(Error::TaskNotSuspended);
        }
        slot.desc.suspend_ctr -= 1;
        if slot.desc.suspend_ctr == 0 {
            slot.desc.state = TaskState::Blocked;
        }
        Ok(())
    }

    /// Bookkeeping for a registered task
    pub fn descriptor(&self, id: TaskId) -> Option<&TaskDescriptor> {
        self.slots.get(id as usize).map(|s| &s.desc)
    }

    /// Number of registered tasks
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if no tasks are registered
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Check if the dispatch loop has been entered
    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running)
    }

    /// Completed dispatch passes
    pub fn passes(&self) -> u32 {
        self.passes
    }
}

impl<'a, const N: usize> Default for Scheduler<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}
