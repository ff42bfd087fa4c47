use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::config;
use super::currencies::Currency;
use super::error::{ComprobanteError, Result};
use super::numbering::format_document_number;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_type!(
    /// Catalog product identifier.
    ProductId
);
id_type!(
    /// Client directory identifier.
    ClientId
);
id_type!(
    /// Identifier assigned by the processing service at creation.
    DocumentId
);

/// Fiscal regime of a document. Determines series, tax and retention rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    /// Factura: standard sale, IGV applies.
    #[default]
    Sale,
    /// Recibo por honorarios: no IGV, retention above the threshold.
    ProfessionalFee,
}

impl DocumentKind {
    /// SUNAT catalog 01 document type code.
    pub fn type_code(&self) -> &'static str {
        match self {
            Self::Sale => "01",
            Self::ProfessionalFee => "02",
        }
    }

    /// Series used when no deployment override is configured.
    pub fn default_series(&self) -> &'static str {
        match self {
            Self::Sale => config::SALE_SERIES,
            Self::ProfessionalFee => config::FEE_SERIES,
        }
    }

    /// Value of the backend's `type` field. Sales omit it.
    pub fn wire_code(&self) -> Option<&'static str> {
        match self {
            Self::Sale => None,
            Self::ProfessionalFee => Some("RECIBO_HONORARIOS"),
        }
    }

    /// Parse the backend's `type`/`invoiceType` field.
    pub fn from_wire_code(code: Option<&str>) -> Option<Self> {
        match code.map(str::trim) {
            None | Some("") | Some("FACTURA") => Some(Self::Sale),
            Some("RECIBO_HONORARIOS") => Some(Self::ProfessionalFee),
            _ => None,
        }
    }

    /// Printed title of the document.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Sale => "FACTURA ELECTRÓNICA",
            Self::ProfessionalFee => "RECIBO POR HONORARIOS ELECTRÓNICO",
        }
    }
}

/// Lifecycle status of an issued document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Created,
    XmlGenerated,
    Signed,
    Sent,
    Accepted,
    Rejected,
    #[serde(rename = "ANULADA")]
    Annulled,
}

impl DocumentStatus {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::XmlGenerated => "XML_GENERATED",
            Self::Signed => "SIGNED",
            Self::Sent => "SENT",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Annulled => "ANULADA",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "CREATED" => Some(Self::Created),
            "XML_GENERATED" => Some(Self::XmlGenerated),
            "SIGNED" => Some(Self::Signed),
            "SENT" => Some(Self::Sent),
            "ACCEPTED" => Some(Self::Accepted),
            "REJECTED" => Some(Self::Rejected),
            "ANULADA" => Some(Self::Annulled),
            _ => None,
        }
    }

    /// No transition of any kind leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::Annulled)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Catalog product as returned by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub code: String,
    pub description: String,
    /// Reference price, used as the default line price.
    pub unit_price: Decimal,
    /// SUNAT catalog 03 unit code (e.g. "NIU", "KGM", "ZZ").
    pub unit_code: String,
    /// `status` on the backend. Inactive products stay listable.
    #[serde(rename = "status")]
    pub active: bool,
}

/// SUNAT catalog 06 identity document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentityDocumentType {
    /// "1": Documento Nacional de Identidad.
    #[serde(rename = "1")]
    Dni,
    /// "6": Registro Único de Contribuyentes.
    #[serde(rename = "6")]
    Ruc,
}

impl IdentityDocumentType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Dni => "1",
            Self::Ruc => "6",
        }
    }
}

/// Client (customer) record from the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,
    pub document_type: IdentityDocumentType,
    pub document_number: String,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Company issuing the documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issuer {
    pub ruc: String,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// One document line. Product fields are a snapshot taken when the line was
/// added and are never re-read from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    pub product_code: String,
    pub description: String,
    pub unit_code: String,
    pub quantity: Decimal,
    pub unit_value: Decimal,
}

impl LineItem {
    /// Snapshot `product` into a new line. Rejects `quantity <= 0` and
    /// negative prices.
    pub fn snapshot(product: &Product, quantity: Decimal, unit_value: Decimal) -> Result<Self> {
        if quantity <= Decimal::ZERO {
            return Err(ComprobanteError::InvalidLineItem(format!(
                "quantity must be greater than zero, got {quantity}"
            )));
        }
        if unit_value < Decimal::ZERO {
            return Err(ComprobanteError::InvalidLineItem(format!(
                "unit value must not be negative, got {unit_value}"
            )));
        }
        Ok(Self {
            product_id: product.id,
            product_code: product.code.clone(),
            description: product.description.clone(),
            unit_code: product.unit_code.clone(),
            quantity,
            unit_value,
        })
    }

    /// `quantity × unit_value`, unrounded. Panics only on `Decimal` overflow;
    /// use [`LineItem::checked_line_total`] on untrusted input.
    pub fn line_total(&self) -> Decimal {
        self.quantity * self.unit_value
    }

    pub fn checked_line_total(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.unit_value)
    }
}

/// Monetary breakdown of a document.
///
/// Always satisfies `total_amount = subtotal + tax_amount - retention_amount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonetaryBreakdown {
    pub subtotal: Decimal,
    /// IGV. Zero for professional-fee receipts.
    pub tax_amount: Decimal,
    /// Withheld amount. Zero for sales.
    pub retention_amount: Decimal,
    /// Amount payable: gross total for sales, net for fee receipts.
    pub total_amount: Decimal,
}

impl MonetaryBreakdown {
    pub fn is_consistent(&self) -> bool {
        self.subtotal
            .checked_add(self.tax_amount)
            .and_then(|gross| gross.checked_sub(self.retention_amount))
            .is_some_and(|expected| expected == self.total_amount)
    }
}

/// A persisted document, as held by the processing service.
///
/// Line items and breakdown are frozen at creation; only `status` changes
/// afterwards, and only through the processing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub series: String,
    pub number: u64,
    pub issued_at: NaiveDateTime,
    pub currency: Currency,
    pub kind: DocumentKind,
    pub client_id: ClientId,
    pub client_name: String,
    pub items: Vec<LineItem>,
    pub breakdown: MonetaryBreakdown,
    pub status: DocumentStatus,
}

impl Document {
    /// Regulatory identifier, e.g. "F001-00000042".
    pub fn identifier(&self) -> String {
        format_document_number(&self.series, self.number)
    }
}
