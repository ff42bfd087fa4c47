//! Core document types, tax computation, drafts and lifecycle rules.
//!
//! Everything in here is synchronous and side-effect free. The async
//! orchestration against the processing backend lives in `pipeline`.

pub mod config;
mod currencies;
mod draft;
mod error;
mod identity;
mod lifecycle;
mod numbering;
mod registry;
mod tax;
mod types;
pub mod units;

pub use config::{IssuerConfig, SeriesConfig, TaxRates};
pub use currencies::Currency;
pub use draft::*;
pub use error::*;
pub use identity::*;
pub use lifecycle::*;
pub use numbering::*;
pub use registry::*;
pub use tax::*;
pub use types::*;
pub use units::is_known_unit_code;
