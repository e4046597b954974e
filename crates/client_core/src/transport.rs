//! HTTP transport for the document QA service.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use shared::{
    domain::DocumentId,
    error::ApiMessage,
    protocol::{AskRequest, AskResponse, UploadResponse},
};

use crate::UploadedFile;

/// Seam between the interaction controller and the QA service. The
/// production implementation is [`HttpQaTransport`]; tests substitute their
/// own.
#[async_trait]
pub trait QaTransport: Send + Sync {
    /// Transmits the file for indexing and returns the identifier the
    /// service issued for it.
    async fn upload_document(&self, file: &UploadedFile) -> Result<DocumentId>;

    /// Asks a question against a previously indexed document.
    async fn ask(&self, document_id: &DocumentId, question: &str) -> Result<AskResponse>;
}

/// Talks to the service over its two-endpoint HTTP API: multipart upload to
/// `/api/upload`, JSON question/answer exchange on `/api/ask`.
pub struct HttpQaTransport {
    http: Client,
    base_url: String,
}

impl HttpQaTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl QaTransport for HttpQaTransport {
    async fn upload_document(&self, file: &UploadedFile) -> Result<DocumentId> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.media_type)?;
        let form = Form::new().part("pdf", part);

        let response = self
            .http
            .post(format!("{}/api/upload", self.base_url))
            .multipart(form)
            .send()
            .await?;
        let body: UploadResponse = accepted(response).await?.json().await?;

        Ok(DocumentId(body.file_id))
    }

    async fn ask(&self, document_id: &DocumentId, question: &str) -> Result<AskResponse> {
        let response = self
            .http
            .post(format!("{}/api/ask", self.base_url))
            .json(&AskRequest {
                question: question.to_string(),
                file_id: document_id.0.clone(),
            })
            .send()
            .await?;

        Ok(accepted(response).await?.json().await?)
    }
}

/// Any non-2xx status is a failure; the service's `{"message": ...}` body,
/// when parseable, is folded into the error for logging.
async fn accepted(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match response.json::<ApiMessage>().await {
        Ok(body) => Err(anyhow!("service returned {status}: {body}")),
        Err(_) => Err(anyhow!("service returned {status}")),
    }
}
