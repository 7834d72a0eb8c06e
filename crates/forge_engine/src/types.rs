use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type TaskId = u64;

/// Body of one generation submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub format: String,
    pub refine: bool,
    pub use_vertex_color: bool,
}

/// One progress line from the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationEvent {
    Image { texture: String },
    BaseMesh { model: String },
    RefinedMesh { model: String },
    Failed { error_message: String },
}

impl GenerationEvent {
    /// Whether no further events are expected after this one.
    pub fn is_terminal(&self, refine: bool) -> bool {
        match self {
            GenerationEvent::Image { .. } => false,
            GenerationEvent::BaseMesh { .. } => !refine,
            GenerationEvent::RefinedMesh { .. } | GenerationEvent::Failed { .. } => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Progress {
        task_id: TaskId,
        event: GenerationEvent,
    },
    /// The request could not be made or its stream broke off.
    SubmissionFailed {
        task_id: TaskId,
        error: GenerationError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("could not encode request: {0}")]
    Encode(String),
    #[error("could not decode progress event: {0}")]
    Decode(String),
    #[error("progress stream ended before a final event")]
    StreamEnded,
    #[error("engine unavailable: {0}")]
    EngineUnavailable(String),
}
