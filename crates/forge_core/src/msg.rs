use crate::{ProgressEvent, TaskId, TimingEntry};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Prompts to enqueue for batched submission.
    PromptsSubmitted(Vec<String>),
    /// One prompt to submit immediately, outside the queue.
    PromptRequested(String),
    /// Generation service progress for a Task.
    TaskProgress { task_id: TaskId, event: ProgressEvent },
    /// The submission itself could not be made.
    SubmissionFailed { task_id: TaskId, message: String },
    /// User cancelled one slot.
    CancelSlot(usize),
    CancelAll,
    ClearQueue,
    /// User picked the slot to show.
    SlotSelected(usize),
    /// Reveal offsets for the upcoming playback.
    TimingConfigured(Vec<TimingEntry>),
    PlaybackStarted,
    PlaybackStopped,
    /// Frame tick carrying elapsed playback time since the previous one.
    Tick { delta_seconds: f64 },
}
