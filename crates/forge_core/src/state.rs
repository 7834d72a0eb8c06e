use forge_logging::{forge_debug, forge_info, forge_warn};

use crate::queue::{BatchCoordinator, SettleOutcome, DEFAULT_BATCH_SIZE};
use crate::scheduler::{ActivationScheduler, TimingEntry};
use crate::task::{ProgressEvent, Settlement, Task, TaskId};
use crate::view_model::{AppViewModel, ChildStatus};
use crate::{Effect, GenerationOptions};

/// Everything the orchestrator owns: the batch coordinator, every Task ever
/// created (one per slot, in creation order), and the activation scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    coordinator: BatchCoordinator,
    tasks: Vec<Task>,
    scheduler: ActivationScheduler,
    options: GenerationOptions,
    next_task_id: TaskId,
    active_slot: Option<usize>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_settings(DEFAULT_BATCH_SIZE, GenerationOptions::default())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(batch_size: usize, options: GenerationOptions) -> Self {
        Self {
            coordinator: BatchCoordinator::new(batch_size),
            tasks: Vec::new(),
            scheduler: ActivationScheduler::new(),
            options,
            next_task_id: 1,
            active_slot: None,
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            queue: self.coordinator.status(),
            children: self.children_status(),
            activation: self.scheduler.status(),
            active_slot: self.active_slot,
            dirty: self.dirty,
        }
    }

    /// Returns whether the view changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn coordinator(&self) -> &BatchCoordinator {
        &self.coordinator
    }

    pub fn scheduler(&self) -> &ActivationScheduler {
        &self.scheduler
    }

    pub fn options(&self) -> GenerationOptions {
        self.options
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.slot_of(task_id).map(|slot| &self.tasks[slot])
    }

    pub fn slot_count(&self) -> usize {
        self.tasks.len()
    }

    /// Last slot successfully made visible.
    pub fn current_slot(&self) -> Option<usize> {
        self.active_slot
    }

    /// True while any Task is queued, in flight, or awaiting events.
    pub fn has_pending_work(&self) -> bool {
        !self.coordinator.queue().is_empty()
            || self.coordinator.batch_in_flight()
            || self.tasks.iter().any(Task::is_pending)
    }

    pub fn children_status(&self) -> Vec<ChildStatus> {
        self.tasks
            .iter()
            .enumerate()
            .map(|(index, task)| ChildStatus {
                index,
                task_id: task.id(),
                prompt: task.prompt().to_string(),
                state: task.state(),
                cancelled: task.is_cancelled(),
                loading_image: task.placeholder().loading_image(),
                visible: task.placeholder().enabled(),
            })
            .collect()
    }

    pub(crate) fn enqueue(&mut self, prompts: Vec<String>) -> Vec<Effect> {
        self.dirty = true;
        if self.coordinator.enqueue(prompts) {
            self.pull_next_batch()
        } else {
            Vec::new()
        }
    }

    pub(crate) fn pull_next_batch(&mut self) -> Vec<Effect> {
        let mut coordinator = std::mem::take(&mut self.coordinator);
        let task_ids = coordinator.pull_next_batch(|prompt| self.spawn_task(prompt));
        self.coordinator = coordinator;
        task_ids
            .into_iter()
            .filter_map(|task_id| self.submit(task_id))
            .collect()
    }

    /// Creates and submits one Task outside of any batch.
    pub(crate) fn request_single(&mut self, prompt: String) -> Vec<Effect> {
        let task_id = self.spawn_task(prompt);
        self.submit(task_id).into_iter().collect()
    }

    pub(crate) fn apply_progress(&mut self, task_id: TaskId, event: ProgressEvent) -> Vec<Effect> {
        let Some(slot) = self.slot_of(task_id) else {
            forge_warn!("Progress {} for unknown task {}", event.kind(), task_id);
            return Vec::new();
        };
        let task = &mut self.tasks[slot];
        let before = task.placeholder().revision();
        let settlement = task.apply(event);
        if task.placeholder().revision() != before || settlement.is_some() {
            self.dirty = true;
        }
        match settlement {
            Some(settlement) => self.settle(task_id, &settlement),
            None => Vec::new(),
        }
    }

    pub(crate) fn apply_submission_failure(&mut self, task_id: TaskId, message: String) -> Vec<Effect> {
        let Some(slot) = self.slot_of(task_id) else {
            forge_warn!("Submission failure for unknown task {}: {}", task_id, message);
            return Vec::new();
        };
        forge_warn!("Error submitting task {}: {}", task_id, message);
        match self.tasks[slot].fail_submission(message) {
            Some(settlement) => {
                self.dirty = true;
                self.settle(task_id, &settlement)
            }
            None => Vec::new(),
        }
    }

    /// Cancels the Task in `index`. `None` for an out-of-range slot.
    pub fn cancel_slot(&mut self, index: usize) -> Option<Vec<Effect>> {
        if index >= self.tasks.len() {
            forge_warn!(
                "Invalid slot index for cancellation: {} ({} slots)",
                index,
                self.tasks.len()
            );
            return None;
        }
        self.dirty = true;
        forge_info!("Cancelled slot {}: {}", index, self.tasks[index].prompt());
        let outcome = self.cancel_task_at(index);
        Some(self.after_settle(outcome))
    }

    /// Cancels every slot. Never starts new work: prompts still in the queue
    /// stay there until the next submission pulls them.
    pub fn cancel_all(&mut self) {
        for index in 0..self.tasks.len() {
            self.cancel_task_at(index);
        }
        if !self.tasks.is_empty() {
            self.dirty = true;
        }
        forge_info!(
            "Cancelled all {} slots, {} prompts left in queue",
            self.tasks.len(),
            self.coordinator.queue().len()
        );
    }

    pub fn clear_queue(&mut self) {
        let dropped = self.coordinator.clear_queue();
        self.dirty = true;
        forge_info!("Cleared {} queued prompts", dropped);
        self.cancel_all();
    }

    /// Hides every slot, then shows `index`. Rejected (no change) for an
    /// out-of-range index or when no slots exist.
    pub fn enable_slot(&mut self, index: usize) -> bool {
        let count = self.tasks.len();
        if index >= count {
            forge_warn!("Invalid slot index: {} ({} slots)", index, count);
            return false;
        }
        for task in &mut self.tasks {
            task.placeholder_mut().set_enabled(false);
        }
        self.tasks[index].placeholder_mut().set_enabled(true);
        self.active_slot = Some(index);
        self.dirty = true;
        forge_debug!("Enabled slot {}: {}", index, self.tasks[index].prompt());
        true
    }

    pub(crate) fn configure_timing(&mut self, entries: Vec<TimingEntry>) {
        self.scheduler.configure(entries);
        self.dirty = true;
    }

    pub(crate) fn start_playback(&mut self) {
        if self.scheduler.start() {
            self.disable_all_slots();
            self.dirty = true;
        }
    }

    pub(crate) fn stop_playback(&mut self) {
        self.scheduler.stop();
        self.dirty = true;
    }

    pub(crate) fn tick(&mut self, delta_seconds: f64) {
        if let Some(slot) = self.scheduler.tick(delta_seconds) {
            self.dirty = true;
            if !self.enable_slot(slot) {
                forge_warn!("Timing reached slot {} before it was created", slot);
            }
        }
    }

    fn spawn_task(&mut self, prompt: String) -> TaskId {
        let task_id = self.next_task_id;
        self.next_task_id += 1;
        self.tasks
            .push(Task::new(task_id, prompt, self.options.refine));
        task_id
    }

    fn submit(&mut self, task_id: TaskId) -> Option<Effect> {
        let slot = self.slot_of(task_id)?;
        let task = &mut self.tasks[slot];
        if !task.submit() {
            return None;
        }
        self.dirty = true;
        Some(Effect::Submit {
            task_id,
            prompt: task.prompt().to_string(),
            options: self.options,
        })
    }

    fn cancel_task_at(&mut self, index: usize) -> SettleOutcome {
        let task = &mut self.tasks[index];
        let task_id = task.id();
        if task.cancel() {
            self.coordinator.settle(task_id)
        } else {
            SettleOutcome::Ignored
        }
    }

    fn settle(&mut self, task_id: TaskId, settlement: &Settlement) -> Vec<Effect> {
        match settlement {
            Settlement::Succeeded => forge_debug!("Task {} succeeded", task_id),
            Settlement::Failed { message } => {
                forge_debug!("Task {} settled as failed: {}", task_id, message)
            }
        }
        let outcome = self.coordinator.settle(task_id);
        self.after_settle(outcome)
    }

    fn after_settle(&mut self, outcome: SettleOutcome) -> Vec<Effect> {
        match outcome {
            SettleOutcome::BatchComplete => {
                self.dirty = true;
                self.pull_next_batch()
            }
            SettleOutcome::Counted { .. } => {
                self.dirty = true;
                Vec::new()
            }
            SettleOutcome::Ignored => Vec::new(),
        }
    }

    fn disable_all_slots(&mut self) {
        for task in &mut self.tasks {
            task.placeholder_mut().set_enabled(false);
        }
        self.active_slot = None;
        forge_debug!("Disabled all {} slots", self.tasks.len());
    }

    /// Task ids are handed out densely from 1, so id `n` lives in slot `n - 1`.
    fn slot_of(&self, task_id: TaskId) -> Option<usize> {
        let slot = usize::try_from(task_id.checked_sub(1)?).ok()?;
        let task = self.tasks.get(slot)?;
        (task.id() == task_id).then_some(slot)
    }
}
