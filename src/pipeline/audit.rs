use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::core::{DocumentId, ServiceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditResult {
    Success,
    Failure,
}

impl fmt::Display for AuditResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        })
    }
}

/// One attributed pipeline action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub username: String,
    /// Machine name of the action, e.g. "sign" or "create_document".
    pub action: String,
    /// `None` when a creation failed before an id was assigned.
    pub target_id: Option<DocumentId>,
    pub result: AuditResult,
    pub details: String,
    pub timestamp: NaiveDateTime,
}

impl AuditRecord {
    pub fn new(
        username: impl Into<String>,
        action: impl Into<String>,
        target_id: Option<DocumentId>,
        result: AuditResult,
        details: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            action: action.into(),
            target_id,
            result,
            details: details.into(),
            timestamp: Utc::now().naive_utc(),
        }
    }
}

/// Destination for audit records. A failing sink never fails the action.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, record: AuditRecord) -> Result<(), ServiceError>;
}

/// Append-only audit log kept in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAuditLog {
    records: Arc<RwLock<Vec<AuditRecord>>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records in arrival order.
    pub async fn records(&self) -> Vec<AuditRecord> {
        self.records.read().await.clone()
    }

    pub async fn records_for(&self, id: DocumentId) -> Vec<AuditRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.target_id == Some(id))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditLog {
    async fn record(&self, record: AuditRecord) -> Result<(), ServiceError> {
        self.records.write().await.push(record);
        Ok(())
    }
}
