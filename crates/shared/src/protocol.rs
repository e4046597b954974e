use serde::{Deserialize, Serialize};

/// Success body of `POST /api/upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_id: String,
}

/// Request body of `POST /api/ask`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub question: String,
    pub file_id: String,
}

/// Success body of `POST /api/ask`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub text: String,
    #[serde(default)]
    pub source_documents: Vec<SourceDocument>,
}

/// One supporting excerpt returned alongside an answer. The service may
/// attach arbitrary metadata (page numbers, loader details); only the
/// fragment text is contractual.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDocument {
    pub page_content: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}
