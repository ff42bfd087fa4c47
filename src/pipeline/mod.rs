//! Issuance pipeline: drafts go in, documents come out and move through
//! XML generation, signing and submission.
//!
//! The processing service is a port ([`DocumentProcessingService`]);
//! [`InMemoryProcessingService`] is the reference implementation and the
//! `http` feature adds a REST client.
//!
//! ```
//! use comprobante::core::*;
//! use comprobante::pipeline::*;
//! use rust_decimal_macros::dec;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let directory = InMemoryDirectory::new();
//! directory.insert_client(Client {
//!     id: ClientId(1),
//!     document_type: IdentityDocumentType::Ruc,
//!     document_number: "20100070970".into(),
//!     name: "Comercial Andina S.A.C.".into(),
//!     email: "compras@andina.pe".into(),
//!     address: None,
//!     phone: None,
//! }).await;
//! directory.insert_product(Product {
//!     id: ProductId(1),
//!     code: "P-001".into(),
//!     description: "Monitor 24\"".into(),
//!     unit_price: dec!(100),
//!     unit_code: "NIU".into(),
//!     active: true,
//! }).await;
//!
//! let issuer = Issuer {
//!     ruc: "20601234567".into(),
//!     name: "Mi Empresa S.A.C.".into(),
//!     address: "Av. Arequipa 123, Lima".into(),
//!     email: None,
//!     phone: None,
//! };
//! let service = InMemoryProcessingService::new(IssuerConfig::new(issuer), directory.clone());
//! let pipeline = IssuancePipeline::new(service, Operator::new("ana", Role::User));
//!
//! let mut draft = InvoiceDraft::new();
//! draft.select_client(ClientId(1));
//! add_catalog_line(&directory, &mut draft, ProductId(1), dec!(1), None).await.unwrap();
//!
//! let doc = pipeline.create_document(&draft).await.unwrap();
//! assert_eq!(doc.identifier(), "F001-00000001");
//! assert_eq!(doc.breakdown.total_amount, dec!(118.00));
//!
//! pipeline.generate_xml(doc.id).await.unwrap();
//! pipeline.sign(doc.id).await.unwrap();
//! let sent = pipeline.send(doc.id).await.unwrap();
//! assert_eq!(sent.status, DocumentStatus::Sent);
//! assert_eq!(sent.next_legal_action(), None);
//! # });
//! ```

mod audit;
mod directory;
mod in_memory;
mod machine;
mod service;

pub use audit::{AuditRecord, AuditResult, AuditSink, InMemoryAuditLog};
pub use directory::{Directory, InMemoryDirectory, add_catalog_line};
pub use in_memory::{GeneratedXml, InMemoryProcessingService};
pub use machine::{IssuancePipeline, PipelineConfig};
pub use service::DocumentProcessingService;
