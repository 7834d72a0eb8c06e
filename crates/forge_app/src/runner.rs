use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use forge_core::{update, AppState, Msg, TaskState, TaskStatus, TimingEntry};
use forge_engine::{EngineHandle, SongPlan};
use forge_logging::{forge_info, forge_warn};

use crate::config::ForgeConfig;
use crate::effects::EffectRunner;
use crate::render::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    /// Every slot was revealed and no Task is still pending.
    Finished,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub frames: u64,
    pub tasks: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub timed_out: bool,
}

/// One playback session: owns the state, feeds it messages, and runs the
/// resulting effects. Driven one frame at a time.
pub struct Session {
    state: AppState,
    effects: EffectRunner,
    playback_delay_seconds: f64,
    playback_countdown: Option<f64>,
    playback_started: bool,
    max_runtime_seconds: Option<f64>,
    elapsed_seconds: f64,
    frame: u64,
    needs_render: bool,
}

impl Session {
    pub fn new(config: &ForgeConfig, effects: EffectRunner) -> Self {
        Self {
            state: AppState::with_settings(config.batch_size, config.generation),
            effects,
            playback_delay_seconds: config.playback_delay_seconds,
            playback_countdown: None,
            playback_started: false,
            max_runtime_seconds: config.max_runtime_seconds,
            elapsed_seconds: 0.0,
            frame: 0,
            needs_render: false,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn playback_started(&self) -> bool {
        self.playback_started
    }

    /// Configures reveal timing, enqueues the plan's prompts, and arms the
    /// playback countdown.
    pub fn load_plan(&mut self, plan: &SongPlan) {
        forge_info!(
            "Loading plan {:?}: {} objects",
            plan.song,
            plan.images.len()
        );
        self.dispatch(Msg::TimingConfigured(TimingEntry::from_offsets(
            &plan.timing_offsets(),
        )));
        self.dispatch(Msg::PromptsSubmitted(plan.prompts()));
        self.playback_countdown = Some(self.playback_delay_seconds);
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.needs_render |= self.state.consume_dirty();
        self.effects.run(effects);
    }

    /// Runs one frame: engine events first, then the playback tick.
    pub fn frame(&mut self, delta_seconds: f64) -> FrameOutcome {
        self.frame += 1;
        forge_logging::set_frame(self.frame);
        self.elapsed_seconds += delta_seconds;

        for msg in self.effects.drain_messages() {
            self.dispatch(msg);
        }
        self.dispatch(Msg::Tick { delta_seconds });

        if let Some(remaining) = self.playback_countdown {
            let remaining = remaining - delta_seconds;
            if remaining <= 0.0 {
                self.playback_countdown = None;
                self.playback_started = true;
                forge_info!("Playback started");
                self.dispatch(Msg::PlaybackStarted);
            } else {
                self.playback_countdown = Some(remaining);
            }
        }

        if std::mem::take(&mut self.needs_render) {
            for line in render(&self.state.view()) {
                forge_info!("{}", line);
            }
        }

        if self.playback_started
            && self.state.scheduler().is_exhausted()
            && !self.state.has_pending_work()
        {
            self.dispatch(Msg::PlaybackStopped);
            return FrameOutcome::Finished;
        }
        match self.max_runtime_seconds {
            Some(limit) if self.elapsed_seconds >= limit => {
                forge_warn!(
                    "Stopping after {:.1}s: {}",
                    self.elapsed_seconds,
                    self.state.coordinator().status()
                );
                FrameOutcome::TimedOut
            }
            _ => FrameOutcome::Continue,
        }
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            frames: self.frame,
            tasks: self.state.slot_count(),
            ..RunSummary::default()
        };
        for task in self.state.tasks() {
            match task.status() {
                TaskStatus::Cancelled => summary.cancelled += 1,
                TaskStatus::Lifecycle(TaskState::Failed) => summary.failed += 1,
                TaskStatus::Lifecycle(state) if state.is_terminal() => summary.succeeded += 1,
                TaskStatus::Lifecycle(_) => {}
            }
        }
        summary
    }
}

/// Runs `plan` against the configured generation service until every slot
/// is revealed (or the runtime limit hits).
pub fn run(config: &ForgeConfig, plan: &SongPlan) -> anyhow::Result<RunSummary> {
    let engine = EngineHandle::new(config.client_settings());
    let mut session = Session::new(config, EffectRunner::new(engine));
    session.load_plan(plan);

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let interval = config.frame_interval();

    // Frame ticker; stops once the receiver is dropped.
    thread::spawn(move || {
        let mut last = Instant::now();
        loop {
            thread::sleep(interval);
            let now = Instant::now();
            let delta_seconds = now.duration_since(last).as_secs_f64();
            last = now;
            if msg_tx.send(Msg::Tick { delta_seconds }).is_err() {
                break;
            }
        }
    });

    for msg in msg_rx {
        let Msg::Tick { delta_seconds } = msg else {
            session.dispatch(msg);
            continue;
        };
        match session.frame(delta_seconds) {
            FrameOutcome::Continue => {}
            FrameOutcome::Finished => return Ok(session.summary()),
            FrameOutcome::TimedOut => {
                return Ok(RunSummary {
                    timed_out: true,
                    ..session.summary()
                })
            }
        }
    }

    anyhow::bail!("frame ticker stopped unexpectedly")
}
