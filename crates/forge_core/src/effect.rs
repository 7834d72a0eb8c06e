use crate::{GenerationOptions, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send one prompt to the generation service.
    Submit {
        task_id: TaskId,
        prompt: String,
        options: GenerationOptions,
    },
}
