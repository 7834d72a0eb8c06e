use std::sync::Once;

use forge_core::{
    update, AppState, AssetRef, Effect, GenerationOptions, Msg, ProgressEvent, TaskId, TaskState,
    TaskStatus,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(forge_logging::initialize_for_tests);
}

fn start_one(options: GenerationOptions) -> AppState {
    let (state, effects) = update(
        AppState::with_settings(5, options),
        Msg::PromptsSubmitted(vec!["a cute dog wearing a hat".to_string()]),
    );
    assert_eq!(effects.len(), 1);
    state
}

fn progress(state: AppState, task_id: TaskId, event: ProgressEvent) -> (AppState, Vec<Effect>) {
    update(state, Msg::TaskProgress { task_id, event })
}

fn image(name: &str) -> ProgressEvent {
    ProgressEvent::Image {
        texture: AssetRef::new(name),
    }
}

fn base(name: &str) -> ProgressEvent {
    ProgressEvent::BaseMesh {
        model: AssetRef::new(name),
    }
}

fn refined(name: &str) -> ProgressEvent {
    ProgressEvent::RefinedMesh {
        model: AssetRef::new(name),
    }
}

#[test]
fn base_mesh_is_final_when_refine_is_disabled() {
    init_logging();
    let options = GenerationOptions {
        refine: false,
        ..GenerationOptions::default()
    };
    let state = start_one(options);

    let (state, _) = progress(state, 1, image("tex://1"));
    let (state, _) = progress(state, 1, base("mesh://base"));

    let task = state.task(1).unwrap();
    assert_eq!(task.state(), TaskState::BaseMeshOnlyComplete);
    assert_eq!(task.placeholder().final_model(), Some(&AssetRef::new("mesh://base")));
    assert_eq!(task.placeholder().temp_model(), None);
    assert!(!state.coordinator().batch_in_flight());
}

#[test]
fn refine_waits_for_refined_mesh() {
    init_logging();
    let state = start_one(GenerationOptions::default());

    let (state, _) = progress(state, 1, base("mesh://base"));
    let task = state.task(1).unwrap();
    assert_eq!(task.state(), TaskState::BaseMeshReady);
    assert_eq!(task.placeholder().temp_model(), Some(&AssetRef::new("mesh://base")));
    assert!(state.coordinator().batch_in_flight());

    let (state, _) = progress(state, 1, refined("mesh://refined"));
    assert_eq!(state.task(1).unwrap().state(), TaskState::RefinedMeshReady);
    assert!(!state.coordinator().batch_in_flight());
}

#[test]
fn cancelled_task_ignores_late_refined_mesh() {
    init_logging();
    let state = start_one(GenerationOptions::default());
    let (state, _) = progress(state, 1, image("tex://1"));
    let (state, _) = update(state, Msg::CancelSlot(0));
    let before = state.task(1).unwrap().placeholder().clone();

    let (mut state, effects) = progress(state, 1, refined("mesh://refined"));

    assert!(effects.is_empty());
    let task = state.task(1).unwrap();
    assert_eq!(task.placeholder(), &before);
    assert_eq!(task.status(), TaskStatus::Cancelled);
    assert_eq!(task.state(), TaskState::PreviewReady);
    assert!(state.view().children[0].cancelled);
    // Dirty was consumed by nobody yet; the late event itself changed nothing.
    assert!(state.consume_dirty());
    let (mut state, _) = progress(state, 1, base("mesh://late"));
    assert!(!state.consume_dirty());
}

#[test]
fn failure_discards_temporary_model() {
    init_logging();
    let state = start_one(GenerationOptions::default());
    let (state, _) = progress(state, 1, base("mesh://base"));
    let (state, _) = progress(
        state,
        1,
        ProgressEvent::Failed {
            error_message: "moderation rejected prompt".to_string(),
        },
    );

    let task = state.task(1).unwrap();
    assert_eq!(task.state(), TaskState::Failed);
    assert_eq!(task.placeholder().temp_model(), None);
    assert_eq!(task.placeholder().label(), "Error: moderation rejected prompt");
    assert!(!state.coordinator().batch_in_flight());
}

#[test]
fn submission_error_fails_the_task() {
    init_logging();
    let state = start_one(GenerationOptions::default());
    let (state, _) = update(
        state,
        Msg::SubmissionFailed {
            task_id: 1,
            message: "connection refused".to_string(),
        },
    );

    let task = state.task(1).unwrap();
    assert_eq!(task.state(), TaskState::Failed);
    assert_eq!(task.placeholder().label(), "Error: connection refused");
    assert!(!state.has_pending_work());

    let child = &state.view().children[0];
    assert!(!child.cancelled);
    assert!(!child.loading_image);
    assert_eq!(child.status_label(), "[FAILED]");
}

#[test]
fn submission_error_after_cancel_is_not_counted_again() {
    init_logging();
    let (state, effects) = update(
        AppState::with_settings(2, GenerationOptions::default()),
        Msg::PromptsSubmitted(vec!["p1".into(), "p2".into(), "p3".into()]),
    );
    assert_eq!(effects.len(), 2);

    let (state, effects) = update(state, Msg::CancelSlot(0));
    assert!(effects.is_empty());
    let cancelled = state.task(1).unwrap().placeholder().clone();

    let (state, effects) = update(
        state,
        Msg::SubmissionFailed {
            task_id: 1,
            message: "connection refused".to_string(),
        },
    );
    assert!(effects.is_empty(), "a second count would pull the queued prompt");
    assert_eq!(state.slot_count(), 2);
    assert_eq!(state.task(1).unwrap().placeholder(), &cancelled);
    assert_eq!(state.task(1).unwrap().status(), TaskStatus::Cancelled);

    let (state, effects) = progress(state, 2, refined("mesh://2"));
    assert_eq!(effects.len(), 1);
    assert_eq!(state.slot_count(), 3);
}

#[test]
fn visual_updates_follow_delivery_order() {
    init_logging();
    let state = start_one(GenerationOptions::default());
    let (state, _) = progress(state, 1, image("tex://first"));
    let (state, _) = progress(state, 1, image("tex://second"));
    let (state, _) = progress(state, 1, base("mesh://base"));

    let placeholder = state.task(1).unwrap().placeholder();
    assert_eq!(placeholder.preview(), Some(&AssetRef::new("tex://second")));
    assert_eq!(placeholder.revision(), 3);
}

#[test]
fn submitted_task_reports_loading_until_first_image() {
    init_logging();
    let state = start_one(GenerationOptions::default());
    let child = &state.view().children[0];
    assert!(child.loading_image);
    assert_eq!(child.status_label(), "[LOADING IMAGE]");
    assert_eq!(child.state, TaskState::Submitted);

    let (state, _) = progress(state, 1, image("tex://1"));
    let child = &state.view().children[0];
    assert_eq!(child.status_label(), "[ACTIVE]");
    assert_eq!(child.state, TaskState::PreviewReady);
}

#[test]
fn progress_for_unknown_task_is_ignored() {
    init_logging();
    let state = start_one(GenerationOptions::default());
    let (next, effects) = progress(state.clone(), 42, refined("mesh://ghost"));

    assert!(effects.is_empty());
    assert_eq!(next, state);
}

#[test]
fn progress_reaches_the_task_in_its_own_slot() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::PromptsSubmitted((1..=7).map(|n| format!("p{n}")).collect()),
    );
    let (state, effects) = progress(state, 0, image("tex://none"));
    assert!(effects.is_empty());

    let (state, _) = progress(state, 4, image("tex://4"));
    let children = state.view().children;
    assert_eq!(children[3].task_id, 4);
    assert_eq!(children[3].state, TaskState::PreviewReady);
    assert!(children
        .iter()
        .filter(|child| child.index != 3)
        .all(|child| child.state != TaskState::PreviewReady));
}
