//! Fiscal constants and deployment configuration.
//!
//! Rates, thresholds and series are named constants so that a change in
//! the law touches this file only. Deployments that need different values
//! deserialize [`IssuerConfig`] (any serde format) instead.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::types::{DocumentKind, Issuer};

/// IGV (value-added tax) rate applied to sale invoices.
pub const IGV_RATE: Decimal = dec!(0.18);

/// Retention rate on professional-fee receipts.
pub const RETENTION_RATE: Decimal = dec!(0.08);

/// Subtotal above which retention applies (strictly greater than).
pub const RETENTION_THRESHOLD: Decimal = dec!(1500.00);

/// Default series for sale invoices.
pub const SALE_SERIES: &str = "F001";

/// Default series for professional-fee receipts.
pub const FEE_SERIES: &str = "E001";

/// Unit code for services (catalog 03 "ZZ"), used on fee-receipt lines.
pub const SERVICE_UNIT_CODE: &str = "ZZ";

/// Unit code assumed when the backend omits one on a sale line.
pub const DEFAULT_UNIT_CODE: &str = "NIU";

/// Decimal places of every monetary amount.
pub const MONEY_SCALE: u32 = 2;

/// Rates used by the tax engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxRates {
    pub igv_rate: Decimal,
    pub retention_rate: Decimal,
    pub retention_threshold: Decimal,
}

impl Default for TaxRates {
    fn default() -> Self {
        Self {
            igv_rate: IGV_RATE,
            retention_rate: RETENTION_RATE,
            retention_threshold: RETENTION_THRESHOLD,
        }
    }
}

/// Series per document kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesConfig {
    pub sale: String,
    pub professional_fee: String,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            sale: SALE_SERIES.to_string(),
            professional_fee: FEE_SERIES.to_string(),
        }
    }
}

impl SeriesConfig {
    pub fn for_kind(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::Sale => &self.sale,
            DocumentKind::ProfessionalFee => &self.professional_fee,
        }
    }
}

/// Everything the issuing side needs to know about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerConfig {
    pub issuer: Issuer,
    #[serde(default)]
    pub rates: TaxRates,
    #[serde(default)]
    pub series: SeriesConfig,
}

impl IssuerConfig {
    pub fn new(issuer: Issuer) -> Self {
        Self {
            issuer,
            rates: TaxRates::default(),
            series: SeriesConfig::default(),
        }
    }
}
