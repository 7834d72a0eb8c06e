use std::io;
use std::sync::{mpsc, Arc};
use std::thread;

use forge_logging::{forge_error, forge_warn};
use tokio::runtime::Runtime;

use crate::client::{ChannelProgressSink, ClientSettings, GenerationClient, HttpGenerationClient};
use crate::{EngineEvent, GenerationError, GenerationRequest, TaskId};

enum EngineCommand {
    Submit {
        task_id: TaskId,
        request: GenerationRequest,
    },
}

/// Runs submissions on a background tokio runtime and hands progress back
/// through a channel drained once per frame.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Self {
        Self::with_client(Arc::new(HttpGenerationClient::new(settings)))
    }

    pub fn with_client(client: Arc<dyn GenerationClient>) -> Self {
        Self::spawn(client, tokio::runtime::Runtime::new)
    }

    fn spawn(
        client: Arc<dyn GenerationClient>,
        make_runtime: impl FnOnce() -> io::Result<Runtime> + Send + 'static,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let worker_tx = event_tx.clone();

        thread::spawn(move || {
            let runtime = match make_runtime() {
                Ok(runtime) => runtime,
                Err(err) => {
                    forge_error!("Failed to start engine runtime: {}", err);
                    reject_all(cmd_rx, &worker_tx, &err.to_string());
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                let client = client.clone();
                let event_tx = worker_tx.clone();
                runtime.spawn(async move {
                    handle_command(client.as_ref(), command, event_tx).await;
                });
            }
        });

        Self {
            cmd_tx,
            event_tx,
            event_rx,
        }
    }

    /// Queues a submission. If the worker is gone the Task is failed right
    /// away, so every submission ends in a progress or failure event.
    pub fn submit(&self, task_id: TaskId, request: GenerationRequest) {
        if self
            .cmd_tx
            .send(EngineCommand::Submit { task_id, request })
            .is_err()
        {
            forge_warn!("Engine is gone; failing task {}", task_id);
            let _ = self.event_tx.send(EngineEvent::SubmissionFailed {
                task_id,
                error: GenerationError::EngineUnavailable("engine thread stopped".to_string()),
            });
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}

/// Fails every submission that arrives while the engine has no runtime.
fn reject_all(
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: &mpsc::Sender<EngineEvent>,
    reason: &str,
) {
    while let Ok(EngineCommand::Submit { task_id, .. }) = cmd_rx.recv() {
        let _ = event_tx.send(EngineEvent::SubmissionFailed {
            task_id,
            error: GenerationError::EngineUnavailable(reason.to_string()),
        });
    }
}

async fn handle_command(
    client: &dyn GenerationClient,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Submit { task_id, request } => {
            let sink = ChannelProgressSink::new(event_tx.clone());
            if let Err(error) = client.generate(task_id, &request, &sink).await {
                let _ = event_tx.send(EngineEvent::SubmissionFailed { task_id, error });
            }
        }
    }
}
