//! Report Renderer: compiled quotes to a paginated PDF document
//!
//! Rendering is a pure transform. `layout` builds the semantic blocks,
//! `compose` flows them onto pages and `pdf` serializes the pages. Layout is
//! deterministic: the same inputs always compose the same pages.

pub mod compose;
pub mod format;
pub mod layout;
pub mod metrics;
pub mod pdf;

pub use format::{format_currency, format_currency_with, report_filename, CURRENCY_PREFIX};
pub use layout::{build_document, Block};

use crate::error::Result;
use crate::pricing::PlanQuoteResult;
use chrono::NaiveDateTime;
use log::info;
use pdf::{QuoteDocument, A4_HEIGHT, A4_WIDTH};
use serde::{Deserialize, Serialize};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Days a quote stays valid, printed in the footer
pub const DEFAULT_VALIDITY_DAYS: u32 = 7;

pub const DEFAULT_TITLE: &str = "Cotação de Plano de Saúde";

pub const DEFAULT_SYSTEM_NAME: &str = "Sistema de Cotação";

/// Presentation settings (dimensions in points)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    pub title: String,
    pub system_name: String,
    pub currency_prefix: String,
    pub validity_days: u32,
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            system_name: DEFAULT_SYSTEM_NAME.to_string(),
            currency_prefix: CURRENCY_PREFIX.to_string(),
            validity_days: DEFAULT_VALIDITY_DAYS,
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            margin: 36.0,
        }
    }
}

/// Rendered document with its download metadata
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: &'static str,
}

/// Render with default options
pub fn render(
    results: &[PlanQuoteResult],
    discount_percent: Option<f64>,
    generated_at: NaiveDateTime,
) -> Result<RenderedReport> {
    render_with(results, discount_percent, generated_at, &ReportOptions::default())
}

pub fn render_with(
    results: &[PlanQuoteResult],
    discount_percent: Option<f64>,
    generated_at: NaiveDateTime,
    options: &ReportOptions,
) -> Result<RenderedReport> {
    let blocks = build_document(results, discount_percent, generated_at, options);
    let pages = compose::compose(&blocks, options);

    let mut document = QuoteDocument::new(options.title.clone(), generated_at);
    document.width = options.page_width;
    document.height = options.page_height;
    document.pages = pages;
    let bytes = document.to_bytes()?;

    info!(
        "rendered {} plan(s) into {} page(s), {} bytes",
        results.len(),
        document.pages.len(),
        bytes.len()
    );

    Ok(RenderedReport {
        bytes,
        filename: report_filename(generated_at),
        content_type: PDF_CONTENT_TYPE,
    })
}
