//! REST client for the invoicing backend.
//!
//! Implements [`DocumentProcessingService`](crate::pipeline::DocumentProcessingService)
//! over `/api/invoices`. Requests carry a bearer token and camelCase JSON.
//! This module requires network access at runtime.

mod client;
mod dto;

pub use client::{HttpConfig, HttpProcessingService};
