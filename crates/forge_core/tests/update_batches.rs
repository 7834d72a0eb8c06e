use std::sync::Once;

use forge_core::{
    update, AppState, AssetRef, Effect, GenerationOptions, Msg, ProgressEvent, QueueStatus, TaskId,
    TaskState,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(forge_logging::initialize_for_tests);
}

fn prompts(count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("prompt {n}")).collect()
}

fn submitted(effects: &[Effect]) -> Vec<(TaskId, String)> {
    effects
        .iter()
        .map(|effect| match effect {
            Effect::Submit {
                task_id, prompt, ..
            } => (*task_id, prompt.clone()),
        })
        .collect()
}

fn finish(state: AppState, task_id: TaskId) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::TaskProgress {
            task_id,
            event: ProgressEvent::RefinedMesh {
                model: AssetRef::new(format!("mesh://{task_id}")),
            },
        },
    )
}

fn fail(state: AppState, task_id: TaskId) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::TaskProgress {
            task_id,
            event: ProgressEvent::Failed {
                error_message: "generation failed".to_string(),
            },
        },
    )
}

#[test]
fn seven_prompts_run_as_five_then_two() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::PromptsSubmitted(prompts(7)));

    assert_eq!(
        submitted(&effects),
        (1..=5)
            .map(|n| (n as TaskId, format!("prompt {n}")))
            .collect::<Vec<_>>()
    );
    assert_eq!(
        state.view().queue,
        QueueStatus {
            pending_count: 2,
            batch_in_flight: true,
            current_batch_size: 5,
        }
    );

    let mut state = state;
    for task_id in 1..=4 {
        let (next, effects) = finish(state, task_id);
        assert!(effects.is_empty(), "batch must wait for task 5");
        state = next;
    }

    let (state, effects) = finish(state, 5);
    assert_eq!(
        submitted(&effects),
        vec![(6, "prompt 6".to_string()), (7, "prompt 7".to_string())]
    );
    assert_eq!(
        state.view().queue,
        QueueStatus {
            pending_count: 0,
            batch_in_flight: true,
            current_batch_size: 2,
        }
    );

    let (state, _) = finish(state, 6);
    let (state, effects) = finish(state, 7);
    assert!(effects.is_empty());
    assert_eq!(state.view().queue, QueueStatus::default());
    assert_eq!(state.slot_count(), 7);
    assert!(!state.has_pending_work());
}

#[test]
fn failures_count_toward_settlement_without_retry() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::PromptsSubmitted(prompts(6)));

    let (state, _) = fail(state, 1);
    let (state, _) = fail(state, 2);
    let (state, _) = finish(state, 3);
    let (state, _) = fail(state, 4);
    let (state, effects) = fail(state, 5);

    assert_eq!(submitted(&effects), vec![(6, "prompt 6".to_string())]);
    assert_eq!(state.task(1).unwrap().state(), TaskState::Failed);
    assert_eq!(state.task(3).unwrap().state(), TaskState::RefinedMeshReady);
    // Six prompts, six tasks: nothing was resubmitted.
    assert_eq!(state.slot_count(), 6);
}

#[test]
fn enqueue_while_in_flight_waits_for_the_batch() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::PromptsSubmitted(prompts(2)));
    let (state, effects) = update(
        state,
        Msg::PromptsSubmitted(vec!["late arrival".to_string()]),
    );

    assert!(effects.is_empty());
    assert_eq!(state.view().queue.pending_count, 1);

    let (state, _) = finish(state, 1);
    let (_state, effects) = finish(state, 2);
    assert_eq!(submitted(&effects), vec![(3, "late arrival".to_string())]);
}

#[test]
fn pending_tasks_never_exceed_batch_size() {
    init_logging();
    let (mut state, _) = update(
        AppState::with_settings(3, GenerationOptions::default()),
        Msg::PromptsSubmitted(prompts(10)),
    );

    let mut next_to_finish: TaskId = 1;
    while state.has_pending_work() {
        let pending = state.tasks().iter().filter(|task| task.is_pending()).count();
        assert!(pending <= 3, "{pending} tasks pending at once");
        let (next, _) = finish(state, next_to_finish);
        state = next;
        next_to_finish += 1;
    }
    assert_eq!(state.slot_count(), 10);
}

#[test]
fn blank_prompts_are_dropped() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::PromptsSubmitted(vec![
            "  a red teapot ".to_string(),
            "   ".to_string(),
            String::new(),
        ]),
    );

    assert_eq!(submitted(&effects), vec![(1, "a red teapot".to_string())]);

    let (next, effects) = update(state.clone(), Msg::PromptsSubmitted(vec!["\t".to_string()]));
    assert!(effects.is_empty());
    assert_eq!(next, state);
}

#[test]
fn single_request_bypasses_the_queue() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::PromptsSubmitted(prompts(5)));
    let (state, effects) = update(state, Msg::PromptRequested("a lone cactus".to_string()));

    assert_eq!(submitted(&effects), vec![(6, "a lone cactus".to_string())]);
    assert_eq!(state.view().queue.current_batch_size, 5);

    // Settling the unbatched task does not count toward the batch.
    let (state, _) = finish(state, 6);
    assert!(state.coordinator().batch_in_flight());
    assert_eq!(state.coordinator().batch().unwrap().settled_count(), 0);
}

#[test]
fn submit_effects_carry_generation_options() {
    init_logging();
    let options = GenerationOptions {
        refine: false,
        use_vertex_color: true,
        ..GenerationOptions::default()
    };
    let (_state, effects) = update(
        AppState::with_settings(5, options),
        Msg::PromptsSubmitted(prompts(1)),
    );

    assert_eq!(
        effects,
        vec![Effect::Submit {
            task_id: 1,
            prompt: "prompt 1".to_string(),
            options,
        }]
    );
}
