//! Registry view: what the document list shows, derived on every read.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use super::currencies::Currency;
use super::lifecycle::ActionKind;
use super::types::{Document, DocumentId, DocumentKind, DocumentStatus};

/// Next operator action available from `status`, if any.
///
/// Pure function of the status; never cache its result next to a document.
pub fn next_legal_action(status: DocumentStatus) -> Option<ActionKind> {
    match status {
        DocumentStatus::Created => Some(ActionKind::GenerateXml),
        DocumentStatus::XmlGenerated => Some(ActionKind::Sign),
        DocumentStatus::Signed => Some(ActionKind::Send),
        DocumentStatus::Sent
        | DocumentStatus::Accepted
        | DocumentStatus::Rejected
        | DocumentStatus::Annulled => None,
    }
}

impl Document {
    pub fn next_legal_action(&self) -> Option<ActionKind> {
        next_legal_action(self.status)
    }
}

/// One row of the document list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    pub id: DocumentId,
    /// "F001-00000012".
    pub identifier: String,
    pub kind: DocumentKind,
    /// Printed document title, e.g. "FACTURA ELECTRÓNICA".
    pub title: &'static str,
    pub client_name: String,
    pub issued_at: NaiveDateTime,
    pub currency: Currency,
    pub total_amount: Decimal,
    pub status: DocumentStatus,
    pub next_action: Option<ActionKind>,
    /// Button text for `next_action`.
    pub next_action_label: Option<&'static str>,
}

impl RegistryEntry {
    pub fn from_document(document: &Document) -> Self {
        Self {
            id: document.id,
            identifier: document.identifier(),
            kind: document.kind,
            title: document.kind.title(),
            client_name: document.client_name.clone(),
            issued_at: document.issued_at,
            currency: document.currency,
            total_amount: document.breakdown.total_amount,
            status: document.status,
            next_action: document.next_legal_action(),
            next_action_label: document.next_legal_action().map(|a| a.label()),
        }
    }
}

/// Build list rows, newest first.
pub fn registry_view(documents: &[Document]) -> Vec<RegistryEntry> {
    let mut rows: Vec<RegistryEntry> = documents.iter().map(RegistryEntry::from_document).collect();
    rows.sort_by(|a, b| b.issued_at.cmp(&a.issued_at).then(b.id.cmp(&a.id)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_table() {
        assert_eq!(
            next_legal_action(DocumentStatus::Created),
            Some(ActionKind::GenerateXml)
        );
        assert_eq!(
            next_legal_action(DocumentStatus::XmlGenerated),
            Some(ActionKind::Sign)
        );
        assert_eq!(next_legal_action(DocumentStatus::Signed), Some(ActionKind::Send));
        for status in [
            DocumentStatus::Sent,
            DocumentStatus::Accepted,
            DocumentStatus::Rejected,
            DocumentStatus::Annulled,
        ] {
            assert_eq!(next_legal_action(status), None);
        }
    }

    #[test]
    fn next_action_is_always_permitted() {
        for status in [
            DocumentStatus::Created,
            DocumentStatus::XmlGenerated,
            DocumentStatus::Signed,
        ] {
            let action = next_legal_action(status).unwrap();
            assert!(status.permits(action.transition()));
        }
    }
}
