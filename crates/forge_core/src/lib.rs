//! Forge core: pure orchestration state machine and view-model helpers.
mod effect;
mod msg;
mod options;
mod placeholder;
mod queue;
mod scheduler;
mod state;
mod task;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use options::{GenerationOptions, ModelFormat};
pub use placeholder::{AssetRef, Placeholder};
pub use queue::{
    Batch, BatchCoordinator, QueueStatus, RequestQueue, SettleOutcome, DEFAULT_BATCH_SIZE,
};
pub use scheduler::{ActivationScheduler, ActivationStatus, TimingEntry};
pub use state::AppState;
pub use task::{ProgressEvent, Settlement, Task, TaskId, TaskState, TaskStatus};
pub use update::update;
pub use view_model::{AppViewModel, ChildStatus};
