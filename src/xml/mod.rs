//! UBL 2.1 rendering of issued documents (SUNAT profile).
//!
//! Facturas render as catalog 01 type `01`, fee receipts as `02`. The
//! signature slot (`ext:UBLExtensions`) is left empty for the signing
//! collaborator to fill.
//!
//! # Example
//!
//! ```no_run
//! use comprobante::core::*;
//! use comprobante::xml;
//!
//! let document: Document = todo!(); // from the processing service
//! let config: IssuerConfig = todo!();
//! let ubl = xml::to_ubl_xml(&document, &config, None).unwrap();
//! let name = xml::document_filename(&document, &config.issuer);
//! ```

mod ubl;
pub(crate) mod writer;

pub use ubl::{document_filename, to_ubl_xml};
pub use writer::{format_amount, format_decimal};

/// UBL version declared by SUNAT documents.
pub const UBL_VERSION: &str = "2.1";

/// SUNAT customization identifier.
pub const SUNAT_CUSTOMIZATION_ID: &str = "2.0";

/// Catalog 51 operation type: internal sale.
pub const OPERATION_TYPE_INTERNAL_SALE: &str = "0101";

/// UBL 2.1 namespace URIs.
pub mod ubl_ns {
    pub const INVOICE: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2";
    pub const CAC: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
    pub const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
    pub const EXT: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonExtensionComponents-2";
    pub const DS: &str = "http://www.w3.org/2000/09/xmldsig#";
}
