use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use forge_logging::{forge_debug, forge_info};

use crate::task::TaskId;

pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Unbounded FIFO of prompts awaiting submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestQueue {
    prompts: VecDeque<String>,
}

impl RequestQueue {
    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.prompts.iter().map(String::as_str)
    }

    fn extend(&mut self, prompts: impl IntoIterator<Item = String>) {
        self.prompts.extend(prompts);
    }

    fn take_front(&mut self, max: usize) -> Vec<String> {
        let count = max.min(self.prompts.len());
        self.prompts.drain(..count).collect()
    }

    fn clear(&mut self) -> usize {
        let dropped = self.prompts.len();
        self.prompts.clear();
        dropped
    }
}

/// Tasks submitted together; discarded once every one of them has settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    task_ids: Vec<TaskId>,
    settled: BTreeSet<TaskId>,
}

impl Batch {
    fn new(task_ids: Vec<TaskId>) -> Self {
        Self {
            task_ids,
            settled: BTreeSet::new(),
        }
    }

    pub fn task_ids(&self) -> &[TaskId] {
        &self.task_ids
    }

    pub fn size(&self) -> usize {
        self.task_ids.len()
    }

    pub fn settled_count(&self) -> usize {
        self.settled.len()
    }

    pub fn contains(&self, task_id: TaskId) -> bool {
        self.task_ids.contains(&task_id)
    }

    fn is_settled(&self) -> bool {
        self.settled.len() == self.task_ids.len()
    }
}

/// Result of reporting a settled Task to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// The Task is not part of the batch in flight, or was already counted.
    Ignored,
    Counted { settled: usize, size: usize },
    /// The last Task of the batch settled; the batch has been discarded.
    BatchComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStatus {
    pub pending_count: usize,
    pub batch_in_flight: bool,
    pub current_batch_size: usize,
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Queue: {} pending, Processing: {}, Current batch: {}",
            self.pending_count, self.batch_in_flight, self.current_batch_size
        )
    }
}

/// Owns the request queue and the batch in flight. At most one batch is
/// in flight; the next one is pulled only after the current one settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCoordinator {
    queue: RequestQueue,
    batch: Option<Batch>,
    batch_size: usize,
}

impl Default for BatchCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl BatchCoordinator {
    /// A `batch_size` of zero is treated as one.
    pub fn new(batch_size: usize) -> Self {
        Self {
            queue: RequestQueue::default(),
            batch: None,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    pub fn batch(&self) -> Option<&Batch> {
        self.batch.as_ref()
    }

    pub fn batch_in_flight(&self) -> bool {
        self.batch.is_some()
    }

    /// Appends prompts in order. Returns true when the caller should pull a
    /// batch now (nothing is in flight).
    pub fn enqueue(&mut self, prompts: impl IntoIterator<Item = String>) -> bool {
        let before = self.queue.len();
        self.queue.extend(prompts);
        forge_debug!(
            "Enqueued {} prompts, {} pending",
            self.queue.len() - before,
            self.queue.len()
        );
        !self.batch_in_flight()
    }

    /// Removes up to `batch_size` prompts from the head of the queue and
    /// turns each into a Task via `spawn`. No-op while a batch is in flight
    /// or when the queue is empty.
    pub fn pull_next_batch(&mut self, mut spawn: impl FnMut(String) -> TaskId) -> Vec<TaskId> {
        if self.batch_in_flight() || self.queue.is_empty() {
            return Vec::new();
        }

        let prompts = self.queue.take_front(self.batch_size);
        let task_ids: Vec<TaskId> = prompts.into_iter().map(&mut spawn).collect();
        forge_info!(
            "Processing batch of {} requests, {} still queued",
            task_ids.len(),
            self.queue.len()
        );
        self.batch = Some(Batch::new(task_ids.clone()));
        task_ids
    }

    /// Counts one Task toward its batch. Each Task is counted at most once.
    pub fn settle(&mut self, task_id: TaskId) -> SettleOutcome {
        let Some(batch) = self.batch.as_mut() else {
            return SettleOutcome::Ignored;
        };
        if !batch.contains(task_id) || !batch.settled.insert(task_id) {
            return SettleOutcome::Ignored;
        }

        if batch.is_settled() {
            forge_info!(
                "Batch of {} completed, queue remaining: {}",
                batch.size(),
                self.queue.len()
            );
            self.batch = None;
            SettleOutcome::BatchComplete
        } else {
            forge_debug!(
                "Settled {}/{} in current batch",
                batch.settled_count(),
                batch.size()
            );
            SettleOutcome::Counted {
                settled: batch.settled_count(),
                size: batch.size(),
            }
        }
    }

    /// Drops every queued prompt. The batch in flight is left to settle.
    pub fn clear_queue(&mut self) -> usize {
        self.queue.clear()
    }

    pub fn status(&self) -> QueueStatus {
        QueueStatus {
            pending_count: self.queue.len(),
            batch_in_flight: self.batch_in_flight(),
            current_batch_size: self.batch.as_ref().map_or(0, Batch::size),
        }
    }
}
