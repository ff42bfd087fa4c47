//! JSON shapes of the invoicing backend.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::*;

/// `POST /api/invoices` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateInvoiceDto<'a> {
    client_id: ClientId,
    series: &'a str,
    /// Absent for sales.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    currency: &'static str,
    items: Vec<CreateItemDto<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateItemDto<'a> {
    product_id: ProductId,
    product_code: &'a str,
    description: &'a str,
    unit_code: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    unit_value: Decimal,
}

impl<'a> From<&'a SubmissionRequest> for CreateInvoiceDto<'a> {
    fn from(request: &'a SubmissionRequest) -> Self {
        Self {
            client_id: request.client_id,
            series: &request.series,
            kind: request.kind.wire_code(),
            currency: request.currency.code(),
            items: request
                .items
                .iter()
                .map(|item| CreateItemDto {
                    product_id: item.product_id,
                    product_code: &item.product_code,
                    description: &item.description,
                    unit_code: &item.unit_code,
                    quantity: item.quantity,
                    unit_value: item.unit_value,
                })
                .collect(),
        }
    }
}

/// Invoice as returned by the backend.
///
/// The document kind arrives as `invoiceType` on some endpoints and `type`
/// on others. For fee receipts `totalAmount` is the gross amount and
/// `netAmount` the payable one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InvoiceDto {
    id: DocumentId,
    series: String,
    number: WireNumber,
    issue_date: String,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    invoice_type: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    status: String,
    #[serde(default)]
    client_id: Option<ClientId>,
    #[serde(default)]
    client_name: Option<String>,
    #[serde(default)]
    client: Option<ClientRefDto>,
    #[serde(default)]
    items: Vec<InvoiceItemDto>,
    #[serde(default)]
    subtotal: Option<Decimal>,
    total_amount: Decimal,
    #[serde(default)]
    retention_amount: Option<Decimal>,
    #[serde(default)]
    net_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireNumber {
    Int(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientRefDto {
    id: ClientId,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceItemDto {
    product_id: ProductId,
    #[serde(default)]
    product_code: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    unit_code: Option<String>,
    quantity: Decimal,
    unit_value: Decimal,
    #[serde(default)]
    igv: Option<Decimal>,
}

impl InvoiceDto {
    pub(crate) fn into_document(self) -> Result<Document, ServiceError> {
        let wire_kind =
            non_blank(self.invoice_type.as_deref()).or(non_blank(self.kind.as_deref()));
        let kind = DocumentKind::from_wire_code(wire_kind).ok_or_else(|| {
            ServiceError::Malformed(format!("unknown invoice type {wire_kind:?}"))
        })?;
        let status = DocumentStatus::from_code(&self.status)
            .ok_or_else(|| ServiceError::Malformed(format!("unknown status '{}'", self.status)))?;
        let currency = match self.currency.as_deref() {
            None => Currency::default(),
            Some(code) => {
                Currency::from_code(code).map_err(|e| ServiceError::Malformed(e.to_string()))?
            }
        };
        let number = match self.number {
            WireNumber::Int(n) => n,
            WireNumber::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| ServiceError::Malformed(format!("bad document number '{s}'")))?,
        };
        let issued_at = parse_issue_date(&self.issue_date)?;

        let client_id = self
            .client_id
            .or(self.client.as_ref().map(|c| c.id))
            .ok_or_else(|| ServiceError::Malformed(format!("invoice {} has no client", self.id)))?;
        let client_name = self
            .client_name
            .or(self.client.and_then(|c| c.name))
            .unwrap_or_default();

        let fallback_unit = match kind {
            DocumentKind::Sale => config::DEFAULT_UNIT_CODE,
            DocumentKind::ProfessionalFee => config::SERVICE_UNIT_CODE,
        };
        let id = self.id;
        let overflow = || ServiceError::Malformed(format!("invoice {id} amounts overflow"));
        let mut line_tax: Option<Decimal> = None;
        let mut items = Vec::with_capacity(self.items.len());
        for item in self.items {
            if let Some(igv) = item.igv {
                let sum = line_tax.unwrap_or_default().checked_add(igv).ok_or_else(overflow)?;
                line_tax = Some(sum);
            }
            items.push(LineItem {
                product_id: item.product_id,
                product_code: item.product_code,
                description: item.description,
                unit_code: item.unit_code.unwrap_or_else(|| fallback_unit.to_string()),
                quantity: item.quantity,
                unit_value: item.unit_value,
            });
        }

        let amounts = WireAmounts {
            subtotal: self.subtotal,
            line_tax,
            total_amount: self.total_amount,
            retention_amount: self.retention_amount,
            net_amount: self.net_amount,
        };
        let breakdown = amounts.breakdown(kind).ok_or_else(overflow)?;
        if !breakdown.is_consistent() {
            return Err(ServiceError::Malformed(format!("invoice {id} amounts do not add up")));
        }

        Ok(Document {
            id: self.id,
            series: self.series,
            number,
            issued_at,
            currency,
            kind,
            client_id,
            client_name,
            items,
            breakdown,
            status,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Amount fields of an invoice response, before they are reconciled into a
/// breakdown.
struct WireAmounts {
    subtotal: Option<Decimal>,
    /// Sum of the per-line `igv` values, if any line carried one.
    line_tax: Option<Decimal>,
    total_amount: Decimal,
    retention_amount: Option<Decimal>,
    net_amount: Option<Decimal>,
}

impl WireAmounts {
    /// `None` on arithmetic overflow.
    ///
    /// A sale with neither a subtotal nor per-line IGV only tells us the
    /// gross total; subtotal and IGV are then split out of it at the
    /// statutory rate. For fee receipts `totalAmount` is the gross.
    fn breakdown(&self, kind: DocumentKind) -> Option<MonetaryBreakdown> {
        match kind {
            DocumentKind::Sale => {
                let (subtotal, tax_amount) = match (self.subtotal, self.line_tax) {
                    (Some(subtotal), Some(tax)) => (subtotal, tax),
                    (Some(subtotal), None) => (subtotal, self.total_amount.checked_sub(subtotal)?),
                    (None, Some(tax)) => (self.total_amount.checked_sub(tax)?, tax),
                    (None, None) => {
                        let subtotal = round_half_up(
                            self.total_amount
                                .checked_div(Decimal::ONE.checked_add(config::IGV_RATE)?)?,
                        );
                        (subtotal, self.total_amount.checked_sub(subtotal)?)
                    }
                };
                Some(MonetaryBreakdown {
                    subtotal,
                    tax_amount,
                    retention_amount: Decimal::ZERO,
                    total_amount: self.total_amount,
                })
            }
            DocumentKind::ProfessionalFee => {
                let retention_amount = self.retention_amount.unwrap_or_default();
                let total_amount = match self.net_amount {
                    Some(net) => net,
                    None => self.total_amount.checked_sub(retention_amount)?,
                };
                Some(MonetaryBreakdown {
                    subtotal: self.subtotal.unwrap_or(self.total_amount),
                    tax_amount: Decimal::ZERO,
                    retention_amount,
                    total_amount,
                })
            }
        }
    }
}

/// Accepts RFC 3339, a bare local date-time, or a bare date (midnight).
fn parse_issue_date(raw: &str) -> Result<NaiveDateTime, ServiceError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| ServiceError::Malformed(format!("bad issue date '{raw}'")))
}

/// Error body shape used by the backend, when it sends one.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Best human-readable message from an error response body.
pub(crate) fn error_message(body: &str) -> Option<String> {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message.or(parsed.error),
        Err(_) => {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
    }
}
