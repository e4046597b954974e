use serde::{Deserialize, Serialize};

/// Opaque identifier the QA service issues once a document has been uploaded
/// and indexed. Correlates every subsequent question to that document; a new
/// upload replaces it outright.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}
