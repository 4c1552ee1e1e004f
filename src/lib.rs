//! Health Quote - age-bracket pricing engine for health insurance plans
//!
//! This library provides:
//! - Plan catalog loading (CSV directory or JSON export) and filtering
//! - Bracket matching and all-or-nothing quote compilation per plan
//! - Percentage discounts with per-beneficiary breakdowns
//! - Paginated PDF quote documents (pt-BR formatting)
//! - A pre-loaded runner for single and parallel batch quoting

pub mod error;
pub mod catalog;
pub mod pricing;
pub mod report;
pub mod quote;

// Re-export commonly used types
pub use error::{QuoteError, Result};
pub use catalog::{Catalog, Plan, PlanFilter, load_catalog, load_default_catalog, DEFAULT_CATALOG_PATH};
pub use pricing::{compile, matches, BeneficiaryQuoteLine, PlanQuoteResult};
pub use report::{render, render_with, RenderedReport, ReportOptions};
pub use quote::{QuoteRequest, QuoteRunner};
