use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{CreateInvoiceDto, InvoiceDto, error_message};
use crate::core::{Document, DocumentId, ServiceError, SubmissionRequest};
use crate::pipeline::DocumentProcessingService;

/// Connection settings for the invoicing backend.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Root of the backend, e.g. `https://facturacion.example.pe`.
    pub base_url: String,
    /// Bearer token from the login flow.
    pub token: Option<String>,
    pub timeout: Duration,
}

impl HttpConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// Processing service backed by the `/api/invoices` REST endpoints.
#[derive(Debug, Clone)]
pub struct HttpProcessingService {
    client: reqwest::Client,
    config: HttpConfig,
}

impl HttpProcessingService {
    pub fn new(config: HttpConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/invoices{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        target: Option<DocumentId>,
    ) -> Result<String, ServiceError> {
        let request = match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let resp = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ServiceError::Timeout(self.config.timeout)
            } else {
                ServiceError::Transport(e.to_string())
            }
        })?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        debug!(%status, document = ?target, "backend response");

        classify(status, &body, target)?;
        Ok(body)
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        target: Option<DocumentId>,
    ) -> Result<T, ServiceError> {
        let body = self.execute(request, target).await?;
        serde_json::from_str(&body).map_err(|e| ServiceError::Malformed(e.to_string()))
    }

    async fn post_action(&self, id: DocumentId, action: &str) -> Result<(), ServiceError> {
        let request = self.client.post(self.url(&format!("/{id}/{action}")));
        self.execute(request, Some(id)).await.map(|_| ())
    }
}

/// Map a response status to the service error taxonomy.
pub(crate) fn classify(
    status: StatusCode,
    body: &str,
    target: Option<DocumentId>,
) -> Result<(), ServiceError> {
    if status.is_success() {
        return Ok(());
    }
    let message = error_message(body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("no details").to_string());
    Err(match (status.as_u16(), target) {
        (404, Some(id)) => ServiceError::NotFound(id),
        (409 | 422, _) => ServiceError::Conflict(message),
        (code, _) => ServiceError::Rejected(format!("HTTP {code}: {message}")),
    })
}

#[async_trait]
impl DocumentProcessingService for HttpProcessingService {
    async fn create_document(&self, request: &SubmissionRequest) -> Result<Document, ServiceError> {
        let body = CreateInvoiceDto::from(request);
        let dto: InvoiceDto = self
            .execute_json(self.client.post(self.url("")).json(&body), None)
            .await?;
        dto.into_document()
    }

    async fn generate_xml(&self, id: DocumentId) -> Result<(), ServiceError> {
        self.post_action(id, "xml").await
    }

    async fn sign(&self, id: DocumentId) -> Result<(), ServiceError> {
        self.post_action(id, "sign").await
    }

    async fn send(&self, id: DocumentId) -> Result<(), ServiceError> {
        self.post_action(id, "send").await
    }

    async fn get_document(&self, id: DocumentId) -> Result<Document, ServiceError> {
        let dto: InvoiceDto = self
            .execute_json(self.client.get(self.url(&format!("/{id}"))), Some(id))
            .await?;
        dto.into_document()
    }

    async fn list_documents(&self) -> Result<Vec<Document>, ServiceError> {
        let dtos: Vec<InvoiceDto> = self
            .execute_json(self.client.get(self.url("")), None)
            .await?;
        dtos.into_iter().map(InvoiceDto::into_document).collect()
    }
}
