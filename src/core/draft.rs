use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::config::{SERVICE_UNIT_CODE, SeriesConfig, TaxRates};
use super::currencies::Currency;
use super::error::{ComprobanteError, Result, ValidationError};
use super::tax::compute_breakdown_with;
use super::types::*;
use super::units::is_known_unit_code;

/// An invoice or fee receipt being prepared, before submission.
///
/// Field setters never fail; `add_line` and `remove_line` check their own
/// arguments; `build_submission_request` checks the draft as a whole.
///
/// ```
/// use comprobante::core::*;
/// use rust_decimal_macros::dec;
///
/// let product = Product {
///     id: ProductId(3),
///     code: "P-003".into(),
///     description: "Cuaderno A4".into(),
///     unit_price: dec!(12.50),
///     unit_code: "NIU".into(),
///     active: true,
/// };
///
/// let mut draft = InvoiceDraft::new();
/// draft.select_client(ClientId(10)).set_currency(Currency::Usd);
/// draft.add_line(&product, dec!(8), product.unit_price).unwrap();
///
/// let request = draft.build_submission_request().unwrap();
/// assert_eq!(request.series, "F001");
/// assert_eq!(request.items.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    client_id: Option<ClientId>,
    currency: Currency,
    kind: DocumentKind,
    lines: Vec<LineItem>,
    series: SeriesConfig,
}

impl Default for InvoiceDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceDraft {
    /// Empty sale draft in soles.
    pub fn new() -> Self {
        Self::for_kind(DocumentKind::Sale)
    }

    pub fn for_kind(kind: DocumentKind) -> Self {
        Self {
            client_id: None,
            currency: Currency::Pen,
            kind,
            lines: Vec::new(),
            series: SeriesConfig::default(),
        }
    }

    /// Use deployment-specific series instead of F001/E001.
    pub fn with_series(mut self, series: SeriesConfig) -> Self {
        self.series = series;
        self
    }

    pub fn select_client(&mut self, client_id: ClientId) -> &mut Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn set_currency(&mut self, currency: Currency) -> &mut Self {
        self.currency = currency;
        self
    }

    pub fn set_kind(&mut self, kind: DocumentKind) -> &mut Self {
        self.kind = kind;
        self
    }

    /// Append a snapshot of `product` at `unit_price`.
    pub fn add_line(
        &mut self,
        product: &Product,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Result<&mut Self> {
        let line = LineItem::snapshot(product, quantity, unit_price)?;
        self.lines.push(line);
        Ok(self)
    }

    /// Remove and return the line at `index`.
    pub fn remove_line(&mut self, index: usize) -> Result<LineItem> {
        if index >= self.lines.len() {
            return Err(ComprobanteError::IndexOutOfRange {
                index,
                len: self.lines.len(),
            });
        }
        Ok(self.lines.remove(index))
    }

    pub fn client_id(&self) -> Option<ClientId> {
        self.client_id
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Series the request will carry for the current kind.
    pub fn series(&self) -> &str {
        self.series.for_kind(self.kind)
    }

    /// Live totals for display. `None` while the draft has no lines.
    ///
    /// Never persist this: the processing service computes the authoritative
    /// breakdown when it creates the document.
    pub fn preview(&self) -> Option<MonetaryBreakdown> {
        self.preview_with(&TaxRates::default())
    }

    pub fn preview_with(&self, rates: &TaxRates) -> Option<MonetaryBreakdown> {
        if self.lines.is_empty() {
            return None;
        }
        compute_breakdown_with(&self.lines, self.kind, rates).ok()
    }

    /// All current problems with the draft, not just the first.
    ///
    /// Unknown unit codes are reported here but do not block
    /// `build_submission_request`; the backend has the final word on them.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.client_id.is_none() {
            errors.push(ValidationError::new("client_id", "a client must be selected"));
        }
        if self.lines.is_empty() {
            errors.push(ValidationError::new(
                "lines",
                "at least one line item is required",
            ));
        }
        for (i, line) in self.lines.iter().enumerate() {
            if self.kind == DocumentKind::Sale && !is_known_unit_code(&line.unit_code) {
                errors.push(ValidationError::new(
                    format!("lines.{i}.unit_code"),
                    format!("unit code '{}' is not in SUNAT catalog 03", line.unit_code),
                ));
            }
        }

        errors
    }

    /// Produce the request handed to the processing service.
    ///
    /// Carries no totals. Fee-receipt lines are normalized to the service
    /// unit code.
    pub fn build_submission_request(&self) -> Result<SubmissionRequest> {
        let mut missing = Vec::new();
        if self.client_id.is_none() {
            missing.push("client is required");
        }
        if self.lines.is_empty() {
            missing.push("at least one line item is required");
        }
        let Some(client_id) = self.client_id.filter(|_| missing.is_empty()) else {
            return Err(ComprobanteError::IncompleteDraft(missing.join("; ")));
        };

        let items = match self.kind {
            DocumentKind::Sale => self.lines.clone(),
            DocumentKind::ProfessionalFee => self
                .lines
                .iter()
                .map(|line| LineItem {
                    unit_code: SERVICE_UNIT_CODE.to_string(),
                    ..line.clone()
                })
                .collect(),
        };

        Ok(SubmissionRequest {
            client_id,
            series: self.series().to_string(),
            kind: self.kind,
            currency: self.currency,
            items,
        })
    }
}

/// Validated creation request for the processing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub client_id: ClientId,
    pub series: String,
    pub kind: DocumentKind,
    pub currency: Currency,
    pub items: Vec<LineItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product() -> Product {
        Product {
            id: ProductId(1),
            code: "P-001".into(),
            description: "Teclado".into(),
            unit_price: dec!(80),
            unit_code: "NIU".into(),
            active: true,
        }
    }

    #[test]
    fn rejects_non_positive_quantity() {
        let mut draft = InvoiceDraft::new();
        assert!(matches!(
            draft.add_line(&product(), dec!(0), dec!(10)),
            Err(ComprobanteError::InvalidLineItem(_))
        ));
        assert!(draft.add_line(&product(), dec!(-2), dec!(10)).is_err());
        assert!(draft.lines().is_empty());
    }

    #[test]
    fn remove_out_of_range() {
        let mut draft = InvoiceDraft::new();
        draft.add_line(&product(), dec!(1), dec!(10)).unwrap();
        assert!(matches!(
            draft.remove_line(1),
            Err(ComprobanteError::IndexOutOfRange { index: 1, len: 1 })
        ));
        assert_eq!(draft.remove_line(0).unwrap().product_code, "P-001");
        assert!(draft.lines().is_empty());
    }

    #[test]
    fn missing_client_and_items_reported_together() {
        let err = InvoiceDraft::new().build_submission_request().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("client is required"));
        assert!(msg.contains("at least one line item"));
        assert_eq!(InvoiceDraft::new().validate().len(), 2);
    }

    #[test]
    fn fee_lines_use_service_unit() {
        let mut draft = InvoiceDraft::for_kind(DocumentKind::ProfessionalFee);
        draft.select_client(ClientId(5));
        draft.add_line(&product(), dec!(1), dec!(500)).unwrap();
        let request = draft.build_submission_request().unwrap();
        assert_eq!(request.items[0].unit_code, "ZZ");
        // The draft's own snapshot is untouched.
        assert_eq!(draft.lines()[0].unit_code, "NIU");
    }

    #[test]
    fn preview_is_empty_without_lines() {
        assert!(InvoiceDraft::new().preview().is_none());
    }

    #[test]
    fn custom_series() {
        let mut draft = InvoiceDraft::new().with_series(SeriesConfig {
            sale: "F002".into(),
            ..SeriesConfig::default()
        });
        draft.select_client(ClientId(1));
        draft.add_line(&product(), dec!(1), dec!(1)).unwrap();
        assert_eq!(draft.build_submission_request().unwrap().series, "F002");
        draft.set_kind(DocumentKind::ProfessionalFee);
        assert_eq!(draft.build_submission_request().unwrap().series, "E001");
    }
}
