use crate::{ActivationStatus, QueueStatus, TaskId, TaskState};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub queue: QueueStatus,
    pub children: Vec<ChildStatus>,
    pub activation: ActivationStatus,
    pub active_slot: Option<usize>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildStatus {
    pub index: usize,
    pub task_id: TaskId,
    pub prompt: String,
    pub state: TaskState,
    pub cancelled: bool,
    pub loading_image: bool,
    pub visible: bool,
}

impl ChildStatus {
    pub fn status_label(&self) -> &'static str {
        if self.cancelled {
            "[CANCELLED]"
        } else if self.state == TaskState::Failed {
            "[FAILED]"
        } else if self.loading_image {
            "[LOADING IMAGE]"
        } else {
            "[ACTIVE]"
        }
    }
}
