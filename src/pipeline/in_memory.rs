use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::debug;

use super::directory::Directory;
use super::service::DocumentProcessingService;
use crate::core::*;
use crate::xml::{document_filename, to_ubl_xml};

/// Reference processing service that keeps everything in memory.
///
/// It enforces the same lifecycle table as the pipeline, so a caller whose
/// local view is stale gets `ServiceError::Conflict` back. The authority's
/// verdict and external annulment are simulated with [`resolve`] and
/// [`annul`].
///
/// [`resolve`]: InMemoryProcessingService::resolve
/// [`annul`]: InMemoryProcessingService::annul
#[derive(Clone)]
pub struct InMemoryProcessingService {
    config: Arc<IssuerConfig>,
    directory: Arc<dyn Directory>,
    state: Arc<RwLock<State>>,
}

#[derive(Default)]
struct State {
    last_id: u64,
    documents: BTreeMap<DocumentId, StoredDocument>,
    sequences: HashMap<String, SeriesSequence>,
    injected: HashMap<ServiceOperation, ServiceError>,
}

struct StoredDocument {
    document: Document,
    xml: Option<GeneratedXml>,
    signature: Option<String>,
}

/// XML rendered by `generate_xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedXml {
    pub filename: String,
    pub content: String,
}

impl InMemoryProcessingService {
    pub fn new<D>(config: IssuerConfig, directory: D) -> Self
    where
        D: Directory + 'static,
    {
        Self {
            config: Arc::new(config),
            directory: Arc::new(directory),
            state: Arc::new(RwLock::new(State::default())),
        }
    }

    /// Continue `series` from `next_number` instead of 1.
    pub async fn seed_sequence(&self, series: impl Into<String>, next_number: u64) {
        let series = series.into();
        let sequence = SeriesSequence::starting_at(series.clone(), next_number);
        self.state.write().await.sequences.insert(series, sequence);
    }

    /// Make the next call of `operation` fail with `error`, without side
    /// effects.
    pub async fn fail_next(&self, operation: ServiceOperation, error: ServiceError) {
        self.state.write().await.injected.insert(operation, error);
    }

    /// Record the tax authority's verdict on a `SENT` document.
    pub async fn resolve(&self, id: DocumentId, accepted: bool) -> Result<Document, ServiceError> {
        let transition = if accepted {
            Transition::Accept
        } else {
            Transition::Reject
        };
        self.transition(id, transition).await
    }

    /// Annul a document that has not reached a terminal status.
    pub async fn annul(&self, id: DocumentId) -> Result<Document, ServiceError> {
        self.transition(id, Transition::Annul).await
    }

    pub async fn xml(&self, id: DocumentId) -> Option<GeneratedXml> {
        let state = self.state.read().await;
        state.documents.get(&id).and_then(|s| s.xml.clone())
    }

    /// Hex SHA-256 of the XML, recorded when the document was signed.
    pub async fn signature(&self, id: DocumentId) -> Option<String> {
        let state = self.state.read().await;
        state.documents.get(&id).and_then(|s| s.signature.clone())
    }

    async fn transition(
        &self,
        id: DocumentId,
        transition: Transition,
    ) -> Result<Document, ServiceError> {
        let mut state = self.state.write().await;
        let stored = state
            .documents
            .get_mut(&id)
            .ok_or(ServiceError::NotFound(id))?;
        stored.document.status = checked_apply(stored.document.status, transition)?;
        Ok(stored.document.clone())
    }

    async fn take_injected(&self, operation: ServiceOperation) -> Result<(), ServiceError> {
        match self.state.write().await.injected.remove(&operation) {
            Some(error) => {
                debug!(%operation, %error, "injected failure");
                Err(error)
            }
            None => Ok(()),
        }
    }

    async fn snapshot(&self, id: DocumentId) -> Result<Document, ServiceError> {
        let state = self.state.read().await;
        state
            .documents
            .get(&id)
            .map(|s| s.document.clone())
            .ok_or(ServiceError::NotFound(id))
    }
}

fn checked_apply(
    status: DocumentStatus,
    transition: Transition,
) -> Result<DocumentStatus, ServiceError> {
    status
        .apply(transition)
        .map_err(|e| ServiceError::Conflict(e.to_string()))
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[async_trait]
impl DocumentProcessingService for InMemoryProcessingService {
    async fn create_document(&self, request: &SubmissionRequest) -> Result<Document, ServiceError> {
        self.take_injected(ServiceOperation::CreateDocument).await?;

        let client = self
            .directory
            .client(request.client_id)
            .await
            .map_err(|e| ServiceError::Rejected(e.to_string()))?;
        let breakdown = compute_breakdown_with(&request.items, request.kind, &self.config.rates)
            .map_err(|e| ServiceError::Rejected(e.to_string()))?;

        let mut state = self.state.write().await;
        let number = state
            .sequences
            .entry(request.series.clone())
            .or_insert_with(|| SeriesSequence::new(request.series.clone()))
            .next_number()
            .map_err(|e| ServiceError::Rejected(e.to_string()))?;
        state.last_id += 1;
        let document = Document {
            id: DocumentId(state.last_id),
            series: request.series.clone(),
            number,
            issued_at: now(),
            currency: request.currency,
            kind: request.kind,
            client_id: client.id,
            client_name: client.name,
            items: request.items.clone(),
            breakdown,
            status: DocumentStatus::Created,
        };
        state.documents.insert(
            document.id,
            StoredDocument {
                document: document.clone(),
                xml: None,
                signature: None,
            },
        );
        debug!(id = %document.id, identifier = %document.identifier(), "document created");
        Ok(document)
    }

    async fn generate_xml(&self, id: DocumentId) -> Result<(), ServiceError> {
        self.take_injected(ServiceOperation::GenerateXml).await?;

        let document = self.snapshot(id).await?;
        checked_apply(document.status, Transition::GenerateXml)?;
        let customer = self.directory.client(document.client_id).await.ok();
        let content = to_ubl_xml(&document, &self.config, customer.as_ref())
            .map_err(|e| ServiceError::Rejected(e.to_string()))?;
        let filename = document_filename(&document, &self.config.issuer);

        let mut state = self.state.write().await;
        let stored = state
            .documents
            .get_mut(&id)
            .ok_or(ServiceError::NotFound(id))?;
        // Status may have moved while rendering.
        stored.document.status = checked_apply(stored.document.status, Transition::GenerateXml)?;
        stored.xml = Some(GeneratedXml { filename, content });
        Ok(())
    }

    async fn sign(&self, id: DocumentId) -> Result<(), ServiceError> {
        self.take_injected(ServiceOperation::Sign).await?;

        let mut state = self.state.write().await;
        let stored = state
            .documents
            .get_mut(&id)
            .ok_or(ServiceError::NotFound(id))?;
        let next = checked_apply(stored.document.status, Transition::Sign)?;
        let xml = stored
            .xml
            .as_ref()
            .ok_or_else(|| ServiceError::Conflict(format!("document {id} has no XML")))?;
        stored.signature = Some(format!("{:x}", Sha256::digest(xml.content.as_bytes())));
        stored.document.status = next;
        Ok(())
    }

    async fn send(&self, id: DocumentId) -> Result<(), ServiceError> {
        self.take_injected(ServiceOperation::Send).await?;
        self.transition(id, Transition::Send).await.map(|_| ())
    }

    async fn get_document(&self, id: DocumentId) -> Result<Document, ServiceError> {
        self.take_injected(ServiceOperation::GetDocument).await?;
        self.snapshot(id).await
    }

    async fn list_documents(&self) -> Result<Vec<Document>, ServiceError> {
        self.take_injected(ServiceOperation::ListDocuments).await?;
        let state = self.state.read().await;
        Ok(state.documents.values().map(|s| s.document.clone()).collect())
    }
}
