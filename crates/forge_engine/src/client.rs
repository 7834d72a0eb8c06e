use std::time::Duration;

use forge_logging::{forge_debug, forge_warn};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;

use crate::{EngineEvent, GenerationError, GenerationEvent, GenerationRequest, TaskId};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub endpoint: String,
    pub connect_timeout: Duration,
    /// `None` waits on a stalled stream forever.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5001/generate".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Remote generation service boundary.
///
/// Implementations push every progress event into `sink` in delivery order
/// and return `Ok(())` once a final event has been delivered.
#[async_trait::async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(
        &self,
        task_id: TaskId,
        request: &GenerationRequest,
        sink: &dyn ProgressSink,
    ) -> Result<(), GenerationError>;
}

/// Posts the request as JSON and reads newline-delimited JSON events back.
///
/// One `reqwest::Client` is shared by every request so connections pool.
#[derive(Debug, Clone)]
pub struct HttpGenerationClient {
    settings: ClientSettings,
    client: Result<reqwest::Client, GenerationError>,
}

impl HttpGenerationClient {
    pub fn new(settings: ClientSettings) -> Self {
        let client = build_client(&settings);
        if let Err(err) = &client {
            forge_warn!("Generation client unavailable: {}", err);
        }
        Self { settings, client }
    }
}

fn build_client(settings: &ClientSettings) -> Result<reqwest::Client, GenerationError> {
    let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
    if let Some(timeout) = settings.request_timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|err| GenerationError::Network(err.to_string()))
}

#[async_trait::async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate(
        &self,
        task_id: TaskId,
        request: &GenerationRequest,
        sink: &dyn ProgressSink,
    ) -> Result<(), GenerationError> {
        let endpoint = reqwest::Url::parse(&self.settings.endpoint)
            .map_err(|err| GenerationError::InvalidEndpoint(err.to_string()))?;
        let body = encode_body(request)?;
        let client = self.client.as_ref().map_err(Clone::clone)?;

        let response = client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::HttpStatus(status.as_u16()));
        }
        forge_debug!("Task {} accepted by generation service", task_id);

        let mut decoder = EventLineDecoder::default();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            for event in decoder.push(&chunk)? {
                if deliver(task_id, event, request.refine, sink) {
                    return Ok(());
                }
            }
        }
        if let Some(event) = decoder.finish()? {
            if deliver(task_id, event, request.refine, sink) {
                return Ok(());
            }
        }

        Err(GenerationError::StreamEnded)
    }
}

fn encode_body<T: serde::Serialize>(body: &T) -> Result<Vec<u8>, GenerationError> {
    serde_json::to_vec(body).map_err(|err| GenerationError::Encode(err.to_string()))
}

/// Emits one event; returns true if it was the final one.
fn deliver(task_id: TaskId, event: GenerationEvent, refine: bool, sink: &dyn ProgressSink) -> bool {
    let terminal = event.is_terminal(refine);
    sink.emit(EngineEvent::Progress { task_id, event });
    terminal
}

/// Splits a byte stream into newline-terminated JSON events.
#[derive(Debug, Default)]
struct EventLineDecoder {
    buffer: Vec<u8>,
}

impl EventLineDecoder {
    fn push(&mut self, chunk: &[u8]) -> Result<Vec<GenerationEvent>, GenerationError> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = parse_line(&line)? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Parses a trailing line that had no newline.
    fn finish(&mut self) -> Result<Option<GenerationEvent>, GenerationError> {
        let line = std::mem::take(&mut self.buffer);
        parse_line(&line)
    }
}

fn parse_line(line: &[u8]) -> Result<Option<GenerationEvent>, GenerationError> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(line)
        .map(Some)
        .map_err(|err| GenerationError::Decode(err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        return GenerationError::Timeout;
    }
    GenerationError::Network(err.to_string())
}
