//! Task, microtask and timer queue management.
//!
//! This module provides the queues used by the event loop. Tasks are executed
//! one at a time, with all microtasks draining after each task. Timers hold
//! tasks back until the loop's clock reaches their deadline.

use core_types::{JsError, Value};
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

/// A task to be executed by the event loop.
///
/// Timer callbacks become tasks once their deadline passes; host code may
/// also queue tasks directly.
pub struct Task {
    callback: Box<dyn FnOnce() -> Result<Value, JsError> + Send>,
}

impl Task {
    /// Creates a new Task from a closure.
    ///
    /// # Arguments
    ///
    /// * `f` - The function to execute when the task runs
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<Value, JsError> + Send + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Executes the task.
    pub fn run(self) -> Result<Value, JsError> {
        (self.callback)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task {{ ... }}")
    }
}

/// A microtask to be executed by the event loop.
///
/// Microtasks run after each task; promise reactions are queued as
/// microtasks.
pub struct MicroTask {
    callback: Box<dyn FnOnce() -> Result<Value, JsError> + Send>,
}

impl MicroTask {
    /// Creates a new MicroTask from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<Value, JsError> + Send + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Executes the microtask.
    pub fn run(self) -> Result<Value, JsError> {
        (self.callback)()
    }
}

impl fmt::Debug for MicroTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MicroTask {{ ... }}")
    }
}

/// A queue for tasks.
///
/// Tasks are processed in FIFO order, one at a time.
#[derive(Debug, Default)]
pub struct TaskQueue {
    queue: VecDeque<Task>,
}

impl TaskQueue {
    /// Creates a new empty TaskQueue.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Adds a task to the end of the queue.
    pub fn enqueue(&mut self, task: Task) {
        self.queue.push_back(task);
    }

    /// Removes and returns the next task from the queue.
    pub fn dequeue(&mut self) -> Option<Task> {
        self.queue.pop_front()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of tasks in the queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}

/// A shared queue for microtasks.
///
/// Clones are handles onto the same queue, so a promise settled from inside
/// a running task can push its reactions without borrowing the event loop.
/// The lock is held only to push or pop; microtasks run after it is
/// released.
#[derive(Debug, Clone, Default)]
pub struct MicrotaskQueue {
    queue: Arc<Mutex<VecDeque<MicroTask>>>,
}

impl MicrotaskQueue {
    /// Creates a new empty MicrotaskQueue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a microtask to the end of the queue.
    pub fn enqueue(&self, microtask: MicroTask) {
        self.queue.lock().push_back(microtask);
    }

    /// Removes and returns the next microtask from the queue.
    pub fn dequeue(&self) -> Option<MicroTask> {
        self.queue.lock().pop_front()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Returns the number of microtasks in the queue.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }
}

/// Handle returned by `set_timeout`, used to cancel the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Returns the raw id.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

struct TimerEntry {
    deadline_ms: u64,
    seq: u64,
    id: TimerId,
    task: Task,
}

// Min-heap on (deadline, seq) via reversed comparison.
impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.deadline_ms, other.seq).cmp(&(self.deadline_ms, self.seq))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline_ms == other.deadline_ms && self.seq == other.seq
    }
}

impl Eq for TimerEntry {}

/// Tasks waiting for a deadline on a millisecond clock.
///
/// Timers with the same deadline come out in the order they were scheduled.
/// Cancelled timers are skipped lazily when they reach the head of the heap.
#[derive(Default)]
pub struct TimerQueue {
    heap: BinaryHeap<TimerEntry>,
    cancelled: HashSet<TimerId>,
    next_id: u64,
}

impl TimerQueue {
    /// Creates an empty timer queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` to become due at `deadline_ms`.
    pub fn schedule(&mut self, deadline_ms: u64, task: Task) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.heap.push(TimerEntry {
            deadline_ms,
            seq: self.next_id,
            id,
            task,
        });
        id
    }

    /// Cancels a scheduled timer.
    ///
    /// Returns false if the timer already fired, was already cancelled, or
    /// never existed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        if !self.heap.iter().any(|entry| entry.id == id) {
            return false;
        }
        self.cancelled.insert(id)
    }

    /// Deadline of the earliest live timer.
    pub fn next_deadline(&mut self) -> Option<u64> {
        self.skip_cancelled();
        self.heap.peek().map(|entry| entry.deadline_ms)
    }

    /// Removes and returns the earliest timer if it is due at `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TimerId, Task)> {
        self.skip_cancelled();
        if self.heap.peek()?.deadline_ms > now_ms {
            return None;
        }
        self.heap.pop().map(|entry| (entry.id, entry.task))
    }

    /// Number of live timers.
    pub fn len(&self) -> usize {
        self.heap.len() - self.cancelled.len()
    }

    /// Returns true if no live timers remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn skip_cancelled(&mut self) {
        while let Some(entry) = self.heap.peek() {
            if !self.cancelled.remove(&entry.id) {
                break;
            }
            self.heap.pop();
        }
    }
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("live", &self.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
