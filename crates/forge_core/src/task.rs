use forge_logging::{forge_debug, forge_info, forge_warn};

use crate::placeholder::{AssetRef, Placeholder};

pub type TaskId = u64;

/// Lifecycle of one prompt's generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskState {
    #[default]
    Queued,
    Submitted,
    PreviewReady,
    BaseMeshReady,
    RefinedMeshReady,
    BaseMeshOnlyComplete,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::RefinedMeshReady | TaskState::BaseMeshOnlyComplete | TaskState::Failed
        )
    }
}

/// What callers see: cancellation masks the lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Lifecycle(TaskState),
    Cancelled,
}

/// Progress reported by the generation service, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Image { texture: AssetRef },
    BaseMesh { model: AssetRef },
    RefinedMesh { model: AssetRef },
    Failed { error_message: String },
}

impl ProgressEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ProgressEvent::Image { .. } => "image",
            ProgressEvent::BaseMesh { .. } => "base_mesh",
            ProgressEvent::RefinedMesh { .. } => "refined_mesh",
            ProgressEvent::Failed { .. } => "failed",
        }
    }
}

/// How a Task reached a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Succeeded,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    prompt: String,
    state: TaskState,
    cancelled: bool,
    refine: bool,
    placeholder: Placeholder,
}

impl Task {
    pub fn new(id: TaskId, prompt: impl Into<String>, refine: bool) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            state: TaskState::Queued,
            cancelled: false,
            refine,
            placeholder: Placeholder::new(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn placeholder(&self) -> &Placeholder {
        &self.placeholder
    }

    pub(crate) fn placeholder_mut(&mut self) -> &mut Placeholder {
        &mut self.placeholder
    }

    pub fn status(&self) -> TaskStatus {
        if self.cancelled {
            TaskStatus::Cancelled
        } else {
            TaskStatus::Lifecycle(self.state)
        }
    }

    /// True while the Task still occupies a concurrency slot in its batch.
    pub fn is_pending(&self) -> bool {
        !self.cancelled && !self.state.is_terminal()
    }

    /// `Queued -> Submitted`. Returns false if the Task was already submitted.
    pub(crate) fn submit(&mut self) -> bool {
        if self.state != TaskState::Queued {
            return false;
        }
        self.state = TaskState::Submitted;
        self.placeholder.begin_loading();
        true
    }

    /// Applies one progress event. Returns the settlement when this event
    /// moved the Task into a terminal state.
    pub(crate) fn apply(&mut self, event: ProgressEvent) -> Option<Settlement> {
        if self.cancelled {
            forge_debug!(
                "Ignoring {} for cancelled task {} ({})",
                event.kind(),
                self.id,
                self.prompt
            );
            return None;
        }
        if self.state.is_terminal() {
            forge_warn!(
                "Ignoring {} for task {} already in {:?}",
                event.kind(),
                self.id,
                self.state
            );
            return None;
        }

        match event {
            ProgressEvent::Image { texture } => {
                self.placeholder.set_image(texture);
                if self.state == TaskState::Submitted {
                    self.state = TaskState::PreviewReady;
                }
                None
            }
            ProgressEvent::BaseMesh { model } => {
                if self.refine {
                    self.placeholder.set_model(model, false);
                    self.state = TaskState::BaseMeshReady;
                    None
                } else {
                    self.placeholder.set_model(model, true);
                    self.state = TaskState::BaseMeshOnlyComplete;
                    forge_info!("Task {} complete with base mesh: {}", self.id, self.prompt);
                    Some(Settlement::Succeeded)
                }
            }
            ProgressEvent::RefinedMesh { model } => {
                self.placeholder.set_model(model, true);
                self.state = TaskState::RefinedMeshReady;
                forge_info!("Task {} complete with refined mesh: {}", self.id, self.prompt);
                Some(Settlement::Succeeded)
            }
            ProgressEvent::Failed { error_message } => Some(self.fail(error_message)),
        }
    }

    /// Submission itself failed; bookkeeping matches a `failed` event.
    pub(crate) fn fail_submission(&mut self, message: String) -> Option<Settlement> {
        self.apply(ProgressEvent::Failed {
            error_message: message,
        })
    }

    /// Cooperative cancel. Returns true if this call took a still-pending
    /// Task out of play.
    pub(crate) fn cancel(&mut self) -> bool {
        let was_pending = self.is_pending();
        self.cancelled = true;
        self.placeholder.cancel();
        was_pending
    }

    fn fail(&mut self, message: String) -> Settlement {
        forge_warn!("Task {} failed ({}): {}", self.id, self.prompt, message);
        self.placeholder.fail(&message);
        self.state = TaskState::Failed;
        Settlement::Failed { message }
    }
}

#[cfg(test)]
mod tests {
    use super::{ProgressEvent, Settlement, Task, TaskState, TaskStatus};
    use crate::placeholder::AssetRef;

    fn submitted(refine: bool) -> Task {
        let mut task = Task::new(1, "a cute dog wearing a hat", refine);
        assert!(task.submit());
        task
    }

    #[test]
    fn refine_path_walks_every_stage() {
        let mut task = submitted(true);
        assert_eq!(
            task.apply(ProgressEvent::Image {
                texture: AssetRef::new("tex")
            }),
            None
        );
        assert_eq!(task.state(), TaskState::PreviewReady);

        assert_eq!(
            task.apply(ProgressEvent::BaseMesh {
                model: AssetRef::new("base")
            }),
            None
        );
        assert_eq!(task.state(), TaskState::BaseMeshReady);

        assert_eq!(
            task.apply(ProgressEvent::RefinedMesh {
                model: AssetRef::new("refined")
            }),
            Some(Settlement::Succeeded)
        );
        assert_eq!(task.state(), TaskState::RefinedMeshReady);
        assert_eq!(
            task.placeholder().final_model(),
            Some(&AssetRef::new("refined"))
        );
    }

    #[test]
    fn terminal_state_is_sticky() {
        let mut task = submitted(false);
        task.apply(ProgressEvent::BaseMesh {
            model: AssetRef::new("base"),
        });
        let before = task.clone();

        assert_eq!(
            task.apply(ProgressEvent::Failed {
                error_message: "late".into()
            }),
            None
        );
        assert_eq!(task, before);
    }

    #[test]
    fn late_image_does_not_rewind_state() {
        let mut task = submitted(true);
        task.apply(ProgressEvent::BaseMesh {
            model: AssetRef::new("base"),
        });
        task.apply(ProgressEvent::Image {
            texture: AssetRef::new("tex"),
        });
        assert_eq!(task.state(), TaskState::BaseMeshReady);
    }

    #[test]
    fn submit_is_single_shot() {
        let mut task = submitted(true);
        assert!(!task.submit());
        assert_eq!(task.state(), TaskState::Submitted);
    }

    #[test]
    fn cancel_masks_status_and_reports_pending_once() {
        let mut task = submitted(true);
        assert!(task.cancel());
        assert!(!task.cancel());
        assert_eq!(task.status(), TaskStatus::Cancelled);
        assert_eq!(task.state(), TaskState::Submitted);
    }

    #[test]
    fn cancel_after_settling_frees_nothing() {
        let mut task = submitted(false);
        task.apply(ProgressEvent::BaseMesh {
            model: AssetRef::new("base"),
        });
        assert!(!task.cancel());
        assert!(task.is_cancelled());
    }
}
