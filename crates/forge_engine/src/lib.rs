//! Forge engine: generation service I/O and song-plan decoding.
mod client;
mod engine;
mod plan;
mod types;

pub use client::{
    ChannelProgressSink, ClientSettings, GenerationClient, HttpGenerationClient, ProgressSink,
};
pub use engine::EngineHandle;
pub use plan::{ImageCue, PlanError, SongPlan};
pub use types::{EngineEvent, GenerationError, GenerationEvent, GenerationRequest, TaskId};
