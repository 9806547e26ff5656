//! Event loop implementation.
//!
//! This module provides the event loop that coordinates task, microtask and
//! timer execution for host components.

use crate::task_queue::{MicroTask, MicrotaskQueue, Task, TaskQueue, TimerId, TimerQueue};
use core_types::JsError;
use tracing::trace;

/// The host event loop.
///
/// Each iteration (turn) of the loop:
/// 1. Takes the oldest task from the task queue and executes it
/// 2. Drains all microtasks in the microtask queue
/// 3. Repeats
///
/// Timers run on a virtual millisecond clock that only moves when the loop
/// is told to advance it. A timer whose deadline passes is queued as a task,
/// so its promise reactions run in the microtask drain that follows it.
///
/// # Examples
///
/// ```
/// use async_runtime::{EventLoop, Task};
/// use core_types::Value;
///
/// let mut event_loop = EventLoop::new();
///
/// event_loop.set_timeout(1500, Task::new(|| Ok(Value::Undefined)));
/// event_loop.run_until_done().unwrap();
/// assert_eq!(event_loop.now_ms(), 1500);
/// ```
#[derive(Debug, Default)]
pub struct EventLoop {
    task_queue: TaskQueue,
    microtask_queue: MicrotaskQueue,
    timers: TimerQueue,
    now_ms: u64,
}

impl EventLoop {
    /// Creates a new EventLoop with empty queues and the clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the event loop until no tasks, microtasks or timers remain.
    ///
    /// When only timers are left the clock jumps straight to the next
    /// deadline.
    ///
    /// # Returns
    ///
    /// `Ok(())` if all tasks completed successfully, or the first task error.
    pub fn run_until_done(&mut self) -> Result<(), JsError> {
        loop {
            while !self.task_queue.is_empty() || !self.microtask_queue.is_empty() {
                self.process_one_cycle()?;
            }
            match self.timers.next_deadline() {
                Some(deadline) => {
                    let target = deadline.max(self.now_ms);
                    self.advance_to(target)?;
                }
                None => return Ok(()),
            }
        }
    }

    /// Moves the clock forward by `ms`, running every timer that becomes due.
    ///
    /// Each fired timer is followed by a microtask drain. Queued tasks are
    /// processed before the clock moves.
    pub fn advance_by(&mut self, ms: u64) -> Result<(), JsError> {
        let target = self.now_ms.saturating_add(ms);
        self.advance_to(target)
    }

    /// Adds a task to the task queue.
    pub fn enqueue_task(&mut self, task: Task) {
        self.task_queue.enqueue(task);
    }

    /// Adds a microtask to the microtask queue.
    ///
    /// The microtask will be executed after the current task completes.
    pub fn enqueue_microtask(&mut self, microtask: MicroTask) {
        self.microtask_queue.enqueue(microtask);
    }

    /// A handle onto this loop's microtask queue.
    ///
    /// Promises created with [`Promise::new_on`](crate::Promise::new_on)
    /// queue their reactions through it.
    pub fn microtasks(&self) -> MicrotaskQueue {
        self.microtask_queue.clone()
    }

    /// Schedules `task` to run once `delay_ms` have elapsed on the loop clock.
    pub fn set_timeout(&mut self, delay_ms: u64, task: Task) -> TimerId {
        let deadline = self.now_ms.saturating_add(delay_ms);
        let id = self.timers.schedule(deadline, task);
        trace!(
            event = "timer.set",
            timer = id.as_u64(),
            delay_ms,
            deadline,
            "scheduled timer"
        );
        id
    }

    /// Cancels a timer. Returns false if it already fired or never existed.
    pub fn clear_timeout(&mut self, id: TimerId) -> bool {
        self.timers.cancel(id)
    }

    /// Current value of the virtual clock in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of timers that have not fired or been cancelled.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Returns true if the task queue is empty.
    pub fn is_task_queue_empty(&self) -> bool {
        self.task_queue.is_empty()
    }

    /// Returns true if the microtask queue is empty.
    pub fn is_microtask_queue_empty(&self) -> bool {
        self.microtask_queue.is_empty()
    }

    /// Runs all microtasks in the queue until empty.
    pub fn run_all_microtasks(&mut self) -> Result<(), JsError> {
        while let Some(microtask) = self.microtask_queue.dequeue() {
            microtask.run()?;
        }
        Ok(())
    }

    /// Processes one complete cycle: one task followed by all microtasks.
    pub fn process_one_cycle(&mut self) -> Result<(), JsError> {
        if let Some(task) = self.task_queue.dequeue() {
            task.run()?;
        }
        self.run_all_microtasks()
    }

    fn advance_to(&mut self, target_ms: u64) -> Result<(), JsError> {
        while !self.task_queue.is_empty() || !self.microtask_queue.is_empty() {
            self.process_one_cycle()?;
        }
        while let Some(deadline) = self.timers.next_deadline() {
            if deadline > target_ms {
                break;
            }
            self.now_ms = self.now_ms.max(deadline);
            if let Some((id, task)) = self.timers.pop_due(self.now_ms) {
                trace!(
                    event = "timer.fire",
                    timer = id.as_u64(),
                    now_ms = self.now_ms,
                    "timer fired"
                );
                // A due timer becomes an ordinary task; the queue is empty
                // here, so this turn runs exactly that task.
                self.task_queue.enqueue(task);
                self.process_one_cycle()?;
            }
        }
        self.now_ms = self.now_ms.max(target_ms);
        Ok(())
    }
}
