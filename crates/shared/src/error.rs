use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body the QA service attaches to non-2xx responses, e.g.
/// `{"message": "Failed to process PDF."}`. The reason is for logs only;
/// user-visible errors stay generic.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
