use forge_logging::forge_debug;

use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::PromptsSubmitted(raw) => {
            let prompts = clean_prompts(raw);
            if prompts.is_empty() {
                return (state, Vec::new());
            }
            state.enqueue(prompts)
        }
        Msg::PromptRequested(raw) => {
            let prompt = raw.trim();
            if prompt.is_empty() {
                return (state, Vec::new());
            }
            state.request_single(prompt.to_owned())
        }
        Msg::TaskProgress { task_id, event } => state.apply_progress(task_id, event),
        Msg::SubmissionFailed { task_id, message } => {
            state.apply_submission_failure(task_id, message)
        }
        Msg::CancelSlot(index) => state.cancel_slot(index).unwrap_or_default(),
        Msg::CancelAll => {
            state.cancel_all();
            Vec::new()
        }
        Msg::ClearQueue => {
            state.clear_queue();
            Vec::new()
        }
        Msg::SlotSelected(index) => {
            state.enable_slot(index);
            Vec::new()
        }
        Msg::TimingConfigured(entries) => {
            state.configure_timing(entries);
            Vec::new()
        }
        Msg::PlaybackStarted => {
            state.start_playback();
            Vec::new()
        }
        Msg::PlaybackStopped => {
            state.stop_playback();
            Vec::new()
        }
        Msg::Tick { delta_seconds } => {
            state.tick(delta_seconds);
            Vec::new()
        }
    };

    if !effects.is_empty() {
        forge_debug!("update produced {} effects", effects.len());
    }
    (state, effects)
}

fn clean_prompts(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .map(|prompt| prompt.trim().to_owned())
        .filter(|prompt| !prompt.is_empty())
        .collect()
}
