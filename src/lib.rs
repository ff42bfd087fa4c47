//! # comprobante
//!
//! Electronic invoicing core for Peruvian small businesses: sale invoices
//! (*facturas*, IGV 18%) and professional-fee receipts (*recibos por
//! honorarios*, 8% retention above S/ 1,500), plus the issuance pipeline that
//! walks each document through XML generation, signing and submission to the
//! tax authority.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use comprobante::core::*;
//! use rust_decimal_macros::dec;
//!
//! let consulting = Product {
//!     id: ProductId(7),
//!     code: "SRV-01".into(),
//!     description: "Consultoría".into(),
//!     unit_price: dec!(1000),
//!     unit_code: "ZZ".into(),
//!     active: true,
//! };
//!
//! let mut draft = InvoiceDraft::for_kind(DocumentKind::ProfessionalFee);
//! draft.select_client(ClientId(1));
//! draft.add_line(&consulting, dec!(2), dec!(1000)).unwrap();
//!
//! let breakdown = draft.preview().unwrap();
//! assert_eq!(breakdown.retention_amount, dec!(160.00));
//! assert_eq!(breakdown.total_amount, dec!(1840.00));
//!
//! let request = draft.build_submission_request().unwrap();
//! assert_eq!(request.series, "E001");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Types, tax engine, draft builder, lifecycle, registry view |
//! | `xml` | UBL 2.1 rendering of issued documents |
//! | `pipeline` | Async issuance state machine + in-memory processing service |
//! | `http` | REST client for the document processing backend |
//! | `session` | Process-wide inactivity timer |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "xml")]
pub mod xml;

#[cfg(feature = "pipeline")]
pub mod pipeline;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "session")]
pub mod session;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
