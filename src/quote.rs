//! Quote runner for single and batch requests
//!
//! Loads the plan catalog once, then serves any number of quote requests
//! against it without re-reading the catalog files. The runner holds no
//! mutable state, so one instance can be shared across threads.

use crate::catalog::{load_catalog, load_default_catalog, Catalog, PlanFilter};
use crate::error::{QuoteError, Result};
use crate::pricing::{compile, PlanQuoteResult};
use crate::report::{render_with, RenderedReport, ReportOptions};
use chrono::NaiveDateTime;
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Quote request as received from the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Beneficiary ages, in display order
    #[serde(rename = "idades")]
    pub ages: Vec<u32>,

    #[serde(rename = "operadora_id", default)]
    pub insurer_id: Option<u32>,

    #[serde(rename = "tipo_contratacao", default)]
    pub contract_type: Option<String>,

    #[serde(rename = "acomodacao", default)]
    pub accommodation: Option<String>,

    #[serde(rename = "abrangencia", default)]
    pub coverage: Option<String>,

    #[serde(rename = "elegibilidade", default)]
    pub eligibility: Option<bool>,

    #[serde(rename = "coparticipacao", default)]
    pub copayment: Option<bool>,

    /// Restricts the rendered document to a single plan
    #[serde(rename = "plano_id", default)]
    pub plan_id: Option<u32>,

    #[serde(rename = "desconto_percentual", default)]
    pub discount_percent: Option<f64>,
}

impl QuoteRequest {
    pub fn new(ages: Vec<u32>) -> Self {
        Self {
            ages,
            ..Self::default()
        }
    }

    /// Candidate-plan filter carried by this request
    pub fn filter(&self) -> PlanFilter {
        PlanFilter {
            insurer_id: self.insurer_id,
            contract_type: self.contract_type.clone(),
            accommodation: self.accommodation.clone(),
            coverage: self.coverage.clone(),
            eligibility: self.eligibility,
            copayment: self.copayment,
        }
    }
}

/// Pre-loaded quote runner
#[derive(Debug, Clone, Default)]
pub struct QuoteRunner {
    catalog: Catalog,
    options: ReportOptions,
}

impl QuoteRunner {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            options: ReportOptions::default(),
        }
    }

    /// Load the catalog from a CSV directory or a JSON export
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(load_catalog(path)?))
    }

    /// Load the bundled sample catalog
    pub fn from_default() -> Result<Self> {
        Ok(Self::new(load_default_catalog()?))
    }

    pub fn with_options(mut self, options: ReportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// Price every catalog plan accepted by the request's filter.
    ///
    /// Ages are validated before any plan is looked at.
    pub fn quote(&self, request: &QuoteRequest) -> Result<Vec<PlanQuoteResult>> {
        if request.ages.is_empty() {
            return Err(QuoteError::InvalidInput(
                "at least one beneficiary age is required".to_string(),
            ));
        }

        let candidates = request.filter().select(&self.catalog);
        let results = compile(&candidates, &request.ages, request.discount_percent)?;

        info!(
            "quoted {} beneficiaries: {} of {} candidate plans admitted",
            request.ages.len(),
            results.len(),
            candidates.len()
        );
        Ok(results)
    }

    /// Quote and render the PDF document.
    ///
    /// # Errors
    /// `NotFound` when `plan_id` is set and that plan is not among the
    /// admitted results.
    pub fn quote_document(&self, request: &QuoteRequest, generated_at: NaiveDateTime) -> Result<RenderedReport> {
        let mut results = self.quote(request)?;

        if let Some(plan_id) = request.plan_id {
            results.retain(|r| r.plan_id == plan_id);
            if results.is_empty() {
                return Err(QuoteError::NotFound(format!(
                    "plan {} not found among the quoted plans",
                    plan_id
                )));
            }
        }

        render_with(&results, request.discount_percent, generated_at, &self.options)
    }

    /// Quote independent requests in parallel, keeping input order
    pub fn run_batch(&self, requests: &[QuoteRequest]) -> Vec<Result<Vec<PlanQuoteResult>>> {
        requests.par_iter().map(|request| self.quote(request)).collect()
    }
}
