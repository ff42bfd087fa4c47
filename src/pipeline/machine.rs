use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::audit::{AuditRecord, AuditResult, AuditSink};
use super::service::DocumentProcessingService;
use crate::core::*;

/// Timing bounds for pipeline calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Upper bound for each processing-service call.
    pub action_timeout: Duration,
    /// Pause between status reads in [`IssuancePipeline::await_resolution`].
    pub poll_interval: Duration,
    pub max_polls: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            action_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(5),
            max_polls: 60,
        }
    }
}

/// Drives documents through `CREATED → XML_GENERATED → SIGNED → SENT` on
/// behalf of one operator.
///
/// Every action re-reads the document first and refuses to call the service
/// when the fresh status does not permit it. After a successful call the
/// document is read again and returned as is; the pipeline never moves a
/// status locally. Failures are reported once and never retried.
pub struct IssuancePipeline<S> {
    service: S,
    operator: Operator,
    config: PipelineConfig,
    audit: Option<Arc<dyn AuditSink>>,
    in_flight: Mutex<HashSet<DocumentId>>,
}

impl<S: DocumentProcessingService> IssuancePipeline<S> {
    pub fn new(service: S, operator: Operator) -> Self {
        Self {
            service,
            operator,
            config: PipelineConfig::default(),
            audit: None,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_audit(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Submit `draft` to the service, which assigns id, number and the
    /// authoritative breakdown.
    pub async fn create_document(&self, draft: &InvoiceDraft) -> Result<Document> {
        let request = draft.build_submission_request()?;
        let result = self
            .bounded(
                ServiceOperation::CreateDocument,
                self.service.create_document(&request),
            )
            .await;

        match &result {
            Ok(document) => info!(
                operator = %self.operator.username,
                document = %document.id,
                identifier = %document.identifier(),
                total = %document.breakdown.total_amount,
                "document created"
            ),
            Err(e) => warn!(
                operator = %self.operator.username,
                series = %request.series,
                error = %e,
                "document creation failed"
            ),
        }
        let target = result.as_ref().ok().map(|d| d.id);
        self.audit("create_document", target, &result).await;
        result
    }

    pub async fn generate_xml(&self, id: DocumentId) -> Result<Document> {
        self.perform(ActionKind::GenerateXml, id).await
    }

    pub async fn sign(&self, id: DocumentId) -> Result<Document> {
        self.perform(ActionKind::Sign, id).await
    }

    /// Returns once the document is `SENT`. Use [`await_resolution`] to
    /// observe the authority's verdict.
    ///
    /// [`await_resolution`]: IssuancePipeline::await_resolution
    pub async fn send(&self, id: DocumentId) -> Result<Document> {
        self.perform(ActionKind::Send, id).await
    }

    /// Run one operator action against the freshly read status.
    pub async fn perform(&self, action: ActionKind, id: DocumentId) -> Result<Document> {
        let _guard = self.claim(id)?;
        let result = self.run_action(action, id).await;

        match &result {
            Ok(document) => info!(
                operator = %self.operator.username,
                document = %id,
                action = action.name(),
                status = %document.status,
                "action completed"
            ),
            Err(e) => warn!(
                operator = %self.operator.username,
                document = %id,
                action = action.name(),
                error = %e,
                "action failed"
            ),
        }
        self.audit(action.name(), Some(id), &result).await;
        result
    }

    /// Authoritative read of one document.
    pub async fn refresh(&self, id: DocumentId) -> Result<Document> {
        self.bounded(ServiceOperation::GetDocument, self.service.get_document(id))
            .await
    }

    /// The action the operator may take next, from a fresh read.
    pub async fn next_action(&self, id: DocumentId) -> Result<Option<ActionKind>> {
        Ok(self.refresh(id).await?.next_legal_action())
    }

    /// Poll until the document reaches a terminal status or `max_polls` reads
    /// have been made, and return the last read. Only reads; never re-sends.
    pub async fn await_resolution(&self, id: DocumentId) -> Result<Document> {
        let mut document = self.refresh(id).await?;
        let mut polls = 1;
        while !document.status.is_terminal() && polls < self.config.max_polls {
            tokio::time::sleep(self.config.poll_interval).await;
            document = self.refresh(id).await?;
            polls += 1;
        }
        debug!(document = %id, status = %document.status, polls, "resolution polling finished");
        Ok(document)
    }

    /// Registry rows, newest first, with next actions derived from fresh
    /// statuses.
    pub async fn registry(&self) -> Result<Vec<RegistryEntry>> {
        let documents = self
            .bounded(ServiceOperation::ListDocuments, self.service.list_documents())
            .await?;
        Ok(registry_view(&documents))
    }

    async fn run_action(&self, action: ActionKind, id: DocumentId) -> Result<Document> {
        let current = self.refresh(id).await?;
        current.status.apply(action.transition())?;

        let operation = service_operation(action);
        match self.bounded(operation, self.service.perform(action, id)).await {
            Ok(()) => {}
            Err(ComprobanteError::ServiceFailure {
                operation,
                source: ServiceError::Conflict(reason),
            }) => {
                debug!(document = %id, %reason, "service reported a conflict");
                let fresh = self.refresh(id).await?;
                if fresh.status.permits(action.transition()) {
                    // Status did not move, so the refusal is the service's own.
                    return Err(ComprobanteError::ServiceFailure {
                        operation,
                        source: ServiceError::Conflict(reason),
                    });
                }
                return Err(ComprobanteError::IllegalTransition {
                    action: action.transition(),
                    status: fresh.status,
                });
            }
            Err(e) => return Err(e),
        }

        self.refresh(id).await
    }

    async fn bounded<T, F>(&self, operation: ServiceOperation, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, ServiceError>>,
    {
        let limit = self.config.action_timeout;
        match tokio::time::timeout(limit, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(ComprobanteError::ServiceFailure { operation, source }),
            Err(_) => Err(ComprobanteError::ServiceFailure {
                operation,
                source: ServiceError::Timeout(limit),
            }),
        }
    }

    async fn audit(&self, action: &str, target: Option<DocumentId>, result: &Result<Document>) {
        let Some(sink) = &self.audit else {
            return;
        };
        let (outcome, details) = match result {
            Ok(document) => (AuditResult::Success, format!("status {}", document.status)),
            Err(e) => (AuditResult::Failure, e.to_string()),
        };
        let record = AuditRecord::new(&self.operator.username, action, target, outcome, details);
        if let Err(e) = sink.record(record).await {
            warn!(action, error = %e, "audit record dropped");
        }
    }

    fn claim(&self, id: DocumentId) -> Result<InFlight<'_>> {
        let mut set = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !set.insert(id) {
            return Err(ComprobanteError::ActionInFlight(id));
        }
        Ok(InFlight {
            set: &self.in_flight,
            id,
        })
    }
}

fn service_operation(action: ActionKind) -> ServiceOperation {
    match action {
        ActionKind::GenerateXml => ServiceOperation::GenerateXml,
        ActionKind::Sign => ServiceOperation::Sign,
        ActionKind::Send => ServiceOperation::Send,
    }
}

/// Releases the document's in-flight slot when the action finishes.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<DocumentId>>,
    id: DocumentId,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}
