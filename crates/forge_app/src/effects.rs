use forge_core::{AssetRef, Effect, Msg, ProgressEvent};
use forge_engine::{EngineEvent, EngineHandle, GenerationEvent, GenerationRequest};
use forge_logging::{forge_info, forge_warn};

/// Bridges core effects to the engine and engine events back to messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Submit {
                    task_id,
                    prompt,
                    options,
                } => {
                    forge_info!("Submit task_id={} prompt={:?}", task_id, prompt);
                    self.engine.submit(
                        task_id,
                        GenerationRequest {
                            prompt,
                            format: options.format.as_str().to_string(),
                            refine: options.refine,
                            use_vertex_color: options.use_vertex_color,
                        },
                    );
                }
            }
        }
    }

    /// Everything the engine delivered since the last frame, in order.
    pub fn drain_messages(&self) -> Vec<Msg> {
        let mut inbox = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            inbox.push(map_event(event));
        }
        inbox
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Progress { task_id, event } => Msg::TaskProgress {
            task_id,
            event: map_progress(event),
        },
        EngineEvent::SubmissionFailed { task_id, error } => {
            forge_warn!("Task {} submission failed: {}", task_id, error);
            Msg::SubmissionFailed {
                task_id,
                message: error.to_string(),
            }
        }
    }
}

fn map_progress(event: GenerationEvent) -> ProgressEvent {
    match event {
        GenerationEvent::Image { texture } => ProgressEvent::Image {
            texture: AssetRef::new(texture),
        },
        GenerationEvent::BaseMesh { model } => ProgressEvent::BaseMesh {
            model: AssetRef::new(model),
        },
        GenerationEvent::RefinedMesh { model } => ProgressEvent::RefinedMesh {
            model: AssetRef::new(model),
        },
        GenerationEvent::Failed { error_message } => ProgressEvent::Failed { error_message },
    }
}
