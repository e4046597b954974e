//! Client-side interaction controller for the answerme document QA service.
//!
//! One controller instance owns the state of a single upload/ask session:
//! the selected file, the server-issued document identifier, the in-flight
//! status of both request lanes, the latest answer, and the one visible
//! error. Presentation layers send commands ([`InteractionController::submit_upload`],
//! [`InteractionController::submit_question`]) and read snapshots; they
//! never mutate state themselves.

use std::sync::Arc;

use shared::{domain::DocumentId, protocol::AskResponse};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

pub mod transport;
pub use transport::{HttpQaTransport, QaTransport};

/// The only media type the upload surface accepts.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// The one candidate document of a session: replaced wholesale when a new
/// file is picked, never accumulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn pdf(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: PDF_MEDIA_TYPE.to_string(),
            bytes,
        }
    }
}

/// User-facing failure of the last operation. `Display` is the exact message
/// shown to the user; underlying transport causes go to the log instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InteractionError {
    #[error("Error uploading file. Please try again.")]
    UploadTransport,
    #[error("Error asking question. Please try again.")]
    QueryTransport,
    #[error("Please upload a PDF first.")]
    NoDocument,
    #[error("Only PDF files are supported.")]
    InvalidInput,
}

/// A supporting fragment quoted back with an answer. Boundaries are chosen
/// by the server; clipping for display happens client-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceExcerpt {
    pub text: String,
}

impl SourceExcerpt {
    /// Display form: at most `max_chars` characters (clipped on a char
    /// boundary) wrapped in the ellipses excerpts are rendered with.
    pub fn preview(&self, max_chars: usize) -> String {
        let body: String = self.text.chars().take(max_chars).collect();
        format!("...{body}...")
    }
}

/// The most recent successful answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub answer: String,
    pub sources: Vec<SourceExcerpt>,
}

impl From<AskResponse> for QueryResult {
    fn from(response: AskResponse) -> Self {
        Self {
            answer: response.text,
            sources: response
                .source_documents
                .into_iter()
                .map(|doc| SourceExcerpt {
                    text: doc.page_content,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    DocumentIndexed { document_id: DocumentId },
    AnswerReady { result: QueryResult },
    Error(InteractionError),
}

/// Point-in-time read-only view of the controller state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSnapshot {
    pub file_name: Option<String>,
    pub document_id: Option<DocumentId>,
    pub uploading: bool,
    pub asking: bool,
    pub result: Option<QueryResult>,
    pub error: Option<InteractionError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LaneState<T> {
    Idle,
    Pending,
    Succeeded(T),
}

/// One request/response lane (upload or query). The sequence counter
/// implements stale-response suppression: a response may only mutate state
/// while its sequence number is still the most recently issued one.
#[derive(Debug)]
struct Lane<T> {
    state: LaneState<T>,
    issued_seq: u64,
}

impl<T> Lane<T> {
    fn new() -> Self {
        Self {
            state: LaneState::Idle,
            issued_seq: 0,
        }
    }

    /// Starts a new request cycle, superseding any in-flight one.
    fn begin(&mut self) -> u64 {
        self.issued_seq += 1;
        self.state = LaneState::Pending;
        self.issued_seq
    }

    /// Invalidates any in-flight request without starting a new one.
    fn supersede(&mut self) {
        self.issued_seq += 1;
    }

    fn is_current(&self, seq: u64) -> bool {
        self.issued_seq == seq
    }

    fn is_pending(&self) -> bool {
        matches!(self.state, LaneState::Pending)
    }

    fn clear(&mut self) {
        self.state = LaneState::Idle;
    }

    fn succeeded(&self) -> Option<&T> {
        match &self.state {
            LaneState::Succeeded(value) => Some(value),
            _ => None,
        }
    }
}

struct ControllerState {
    file: Option<UploadedFile>,
    upload: Lane<DocumentId>,
    query: Lane<QueryResult>,
    error: Option<InteractionError>,
}

pub struct InteractionController {
    transport: Arc<dyn QaTransport>,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<ControllerEvent>,
}

impl InteractionController {
    /// Controller wired to the real HTTP transport at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Arc<Self> {
        Self::with_transport(Arc::new(HttpQaTransport::new(base_url)))
    }

    pub fn with_transport(transport: Arc<dyn QaTransport>) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            transport,
            inner: Mutex::new(ControllerState {
                file: None,
                upload: Lane::new(),
                query: Lane::new(),
                error: None,
            }),
            events,
        })
    }

    /// Uploads `file` for indexing. Replaces any previously indexed document
    /// and clears the previous answer and error before transmitting. All
    /// failures land in the error slot; nothing propagates to the caller.
    pub async fn submit_upload(&self, file: UploadedFile) {
        if file.media_type != PDF_MEDIA_TYPE {
            warn!(
                file = %file.name,
                media_type = %file.media_type,
                "upload: rejected non-pdf file before transmission"
            );
            let mut state = self.inner.lock().await;
            state.error = Some(InteractionError::InvalidInput);
            let _ = self
                .events
                .send(ControllerEvent::Error(InteractionError::InvalidInput));
            return;
        }

        let seq = {
            let mut state = self.inner.lock().await;
            state.file = Some(file.clone());
            state.error = None;
            // The new file is now the record: any in-flight question and its
            // eventual response belong to the replaced document.
            state.query.clear();
            state.query.supersede();
            state.upload.begin()
        };

        info!(file = %file.name, size_bytes = file.bytes.len(), "upload: transmitting document");
        let outcome = self.transport.upload_document(&file).await;

        let mut state = self.inner.lock().await;
        if !state.upload.is_current(seq) {
            info!(file = %file.name, "upload: discarding superseded response");
            return;
        }

        match outcome {
            Ok(document_id) => {
                info!(document_id = %document_id.0, "upload: document indexed");
                state.upload.state = LaneState::Succeeded(document_id.clone());
                let _ = self
                    .events
                    .send(ControllerEvent::DocumentIndexed { document_id });
            }
            Err(err) => {
                warn!(file = %file.name, "upload: failed: {err:#}");
                state.upload.clear();
                state.error = Some(InteractionError::UploadTransport);
                let _ = self
                    .events
                    .send(ControllerEvent::Error(InteractionError::UploadTransport));
            }
        }
    }

    /// Asks `text` against the currently indexed document. Whitespace-only
    /// input is a no-op; asking before a successful upload fails without a
    /// network call. Only the most recently submitted question's response is
    /// applied.
    pub async fn submit_question(&self, text: &str) {
        let question = text.trim();
        if question.is_empty() {
            return;
        }

        let (seq, document_id) = {
            let mut state = self.inner.lock().await;
            let Some(document_id) = state.upload.succeeded().cloned() else {
                warn!("ask: question submitted before any document was indexed");
                state.error = Some(InteractionError::NoDocument);
                let _ = self
                    .events
                    .send(ControllerEvent::Error(InteractionError::NoDocument));
                return;
            };
            state.error = None;
            (state.query.begin(), document_id)
        };

        info!(document_id = %document_id.0, "ask: transmitting question");
        let outcome = self.transport.ask(&document_id, question).await;

        let mut state = self.inner.lock().await;
        if !state.query.is_current(seq) {
            info!(document_id = %document_id.0, "ask: discarding superseded response");
            return;
        }

        match outcome {
            Ok(response) => {
                let result = QueryResult::from(response);
                info!(
                    document_id = %document_id.0,
                    sources = result.sources.len(),
                    "ask: answer received"
                );
                state.query.state = LaneState::Succeeded(result.clone());
                let _ = self.events.send(ControllerEvent::AnswerReady { result });
            }
            Err(err) => {
                warn!(document_id = %document_id.0, "ask: failed: {err:#}");
                state.query.clear();
                state.error = Some(InteractionError::QueryTransport);
                let _ = self
                    .events
                    .send(ControllerEvent::Error(InteractionError::QueryTransport));
            }
        }
    }

    pub async fn snapshot(&self) -> ControllerSnapshot {
        let state = self.inner.lock().await;
        ControllerSnapshot {
            file_name: state.file.as_ref().map(|file| file.name.clone()),
            document_id: state.upload.succeeded().cloned(),
            uploading: state.upload.is_pending(),
            asking: state.query.is_pending(),
            result: state.query.succeeded().cloned(),
            error: state.error,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
