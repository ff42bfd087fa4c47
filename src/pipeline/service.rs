use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{ActionKind, Document, DocumentId, ServiceError, SubmissionRequest};

/// The system of record for issued documents.
///
/// Implementations own numbering, the authoritative breakdown and every
/// status change. Mutating calls return nothing; callers re-read the
/// document to learn its new status.
#[async_trait]
pub trait DocumentProcessingService: Send + Sync {
    async fn create_document(&self, request: &SubmissionRequest) -> Result<Document, ServiceError>;

    async fn generate_xml(&self, id: DocumentId) -> Result<(), ServiceError>;

    async fn sign(&self, id: DocumentId) -> Result<(), ServiceError>;

    /// Submit to the tax authority. Returns once the document is `SENT`; the
    /// verdict arrives later.
    async fn send(&self, id: DocumentId) -> Result<(), ServiceError>;

    async fn get_document(&self, id: DocumentId) -> Result<Document, ServiceError>;

    async fn list_documents(&self) -> Result<Vec<Document>, ServiceError>;

    /// Dispatch one of the operator actions.
    async fn perform(&self, action: ActionKind, id: DocumentId) -> Result<(), ServiceError> {
        match action {
            ActionKind::GenerateXml => self.generate_xml(id).await,
            ActionKind::Sign => self.sign(id).await,
            ActionKind::Send => self.send(id).await,
        }
    }
}

#[async_trait]
impl<T> DocumentProcessingService for Arc<T>
where
    T: DocumentProcessingService + ?Sized,
{
    async fn create_document(&self, request: &SubmissionRequest) -> Result<Document, ServiceError> {
        (**self).create_document(request).await
    }

    async fn generate_xml(&self, id: DocumentId) -> Result<(), ServiceError> {
        (**self).generate_xml(id).await
    }

    async fn sign(&self, id: DocumentId) -> Result<(), ServiceError> {
        (**self).sign(id).await
    }

    async fn send(&self, id: DocumentId) -> Result<(), ServiceError> {
        (**self).send(id).await
    }

    async fn get_document(&self, id: DocumentId) -> Result<Document, ServiceError> {
        (**self).get_document(id).await
    }

    async fn list_documents(&self) -> Result<Vec<Document>, ServiceError> {
        (**self).list_documents().await
    }
}
