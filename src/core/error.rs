use std::fmt;
use std::time::Duration;

use thiserror::Error;

use super::lifecycle::Transition;
use super::types::{ClientId, DocumentId, DocumentStatus, ProductId};

/// Errors produced while drafting, computing or issuing documents.
///
/// None of these is fatal: every variant leaves the draft or the document in
/// a well-defined state the operator can act on again.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ComprobanteError {
    /// Bad quantity or price, or an empty/overflowing item set.
    #[error("invalid line item: {0}")]
    InvalidLineItem(String),

    /// Client or line items missing at submission time.
    #[error("incomplete draft: {0}")]
    IncompleteDraft(String),

    /// `remove_line` called with a position outside the draft.
    #[error("line index {index} out of range (draft has {len} lines)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The document's current status does not permit the requested action.
    #[error("cannot {action} a document in status {status}")]
    IllegalTransition {
        action: Transition,
        status: DocumentStatus,
    },

    /// The processing service failed or did not answer. Status is unchanged.
    #[error("{operation} failed: {source}")]
    ServiceFailure {
        operation: ServiceOperation,
        #[source]
        source: ServiceError,
    },

    /// Another action on the same document has not finished yet.
    #[error("an action is already in flight for document {0}")]
    ActionInFlight(DocumentId),

    #[error("unknown product {0}")]
    UnknownProduct(ProductId),

    #[error("unknown client {0}")]
    UnknownClient(ClientId),

    #[error("unsupported currency code '{0}'")]
    InvalidCurrency(String),

    /// Document number sequencing error.
    #[error("numbering error: {0}")]
    Numbering(String),

    /// XML generation error.
    #[error("XML error: {0}")]
    Xml(String),
}

pub type Result<T, E = ComprobanteError> = std::result::Result<T, E>;

/// Failure reported by (or while talking to) the document processing service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ServiceError {
    /// Connection, TLS or I/O problem before a response was obtained.
    #[error("transport error: {0}")]
    Transport(String),

    /// No answer within the configured bound. The outcome is unknown.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("document {0} not found")]
    NotFound(DocumentId),

    /// The service refused a transition its own status does not allow.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The service processed the call and reported failure.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The response could not be interpreted.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Which processing-service call an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceOperation {
    CreateDocument,
    GenerateXml,
    Sign,
    Send,
    GetDocument,
    ListDocuments,
}

impl fmt::Display for ServiceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CreateDocument => "create document",
            Self::GenerateXml => "generate XML",
            Self::Sign => "sign",
            Self::Send => "send",
            Self::GetDocument => "get document",
            Self::ListDocuments => "list documents",
        })
    }
}

/// A single validation finding with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "lines.2.quantity").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
