//! Load a plan catalog from CSV tables or a JSON export
//!
//! The CSV layout mirrors the relational tables of the plan database: one file
//! per record type, associations keyed by `plan_id`. Row order is preserved, so
//! the order of `age_brackets.csv` is the first-match order used for pricing.

use super::{AgeBracket, Catalog, CoPayment, Hospital, Insurer, Municipality, Plan, WaitingPeriod};
use crate::error::{QuoteError, Result};
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Default path to the catalog directory
pub const DEFAULT_CATALOG_PATH: &str = "data/catalog";

#[derive(Debug, serde::Deserialize)]
struct InsurerRow {
    id: u32,
    name: String,
    #[serde(default)]
    network_url: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct PlanRow {
    id: u32,
    #[serde(default)]
    insurer_id: Option<u32>,
    name: String,
    contract_type: String,
    accommodation: String,
    coverage: String,
    #[serde(default)]
    copayment: String,
    #[serde(default)]
    eligibility: String,
    #[serde(default)]
    copayment_image_url: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct BracketRow {
    plan_id: u32,
    label: String,
    price: f64,
}

#[derive(Debug, serde::Deserialize)]
struct HospitalRow {
    #[serde(default)]
    id: u32,
    plan_id: u32,
    name: String,
    #[serde(default)]
    address: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct WaitingPeriodRow {
    #[serde(default)]
    id: u32,
    plan_id: u32,
    description: String,
    days: u32,
}

#[derive(Debug, serde::Deserialize)]
struct CoPaymentRow {
    #[serde(default)]
    id: u32,
    plan_id: u32,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    plan_type: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    service_type: Option<String>,
    #[serde(default)]
    percentage: Option<f64>,
    #[serde(default)]
    min_amount: Option<f64>,
    #[serde(default)]
    max_amount: Option<f64>,
}

#[derive(Debug, serde::Deserialize)]
struct MunicipalityRow {
    #[serde(default)]
    id: u32,
    plan_id: u32,
    name: String,
}

/// Parse a yes/no column ("true", "1", "sim", ...). Empty reads as `false`.
fn parse_flag(value: &str, column: &str, plan_id: u32) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "" | "false" | "0" | "no" | "n" | "não" | "nao" => Ok(false),
        "true" | "1" | "yes" | "y" | "sim" | "s" => Ok(true),
        other => Err(QuoteError::Catalog(format!(
            "plan {}: unknown {} value '{}'",
            plan_id, column, other
        ))),
    }
}

impl PlanRow {
    fn to_plan(self, insurers: &HashMap<u32, Insurer>) -> Result<Plan> {
        let copayment = parse_flag(&self.copayment, "copayment", self.id)?;
        let eligibility = parse_flag(&self.eligibility, "eligibility", self.id)?;

        let insurer = match self.insurer_id {
            Some(insurer_id) => {
                let insurer = insurers.get(&insurer_id).cloned();
                if insurer.is_none() {
                    warn!("plan {} references unknown insurer {}", self.id, insurer_id);
                }
                insurer
            }
            None => None,
        };

        Ok(Plan {
            id: self.id,
            name: self.name,
            insurer,
            contract_type: self.contract_type,
            accommodation: self.accommodation,
            coverage: self.coverage,
            copayment,
            eligibility,
            copayment_image_url: self.copayment_image_url,
            brackets: Vec::new(),
            hospitals: Vec::new(),
            waiting_periods: Vec::new(),
            copayments: Vec::new(),
            municipalities: Vec::new(),
        })
    }
}

/// Raw CSV sources for one catalog; the association tables are optional
pub struct CsvTables<R> {
    pub insurers: R,
    pub plans: R,
    pub age_brackets: R,
    pub hospitals: Option<R>,
    pub waiting_periods: Option<R>,
    pub copayments: Option<R>,
    pub municipalities: Option<R>,
}

fn read_rows<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut rows = Vec::new();

    for result in csv_reader.deserialize() {
        let row: T = result?;
        rows.push(row);
    }

    Ok(rows)
}

fn read_optional_rows<T: DeserializeOwned, R: Read>(reader: Option<R>) -> Result<Vec<T>> {
    match reader {
        Some(r) => read_rows(r),
        None => Ok(Vec::new()),
    }
}

/// Attach association rows to their plans, skipping rows whose plan is unknown
fn attach<T, F>(plans: &mut [Plan], index: &HashMap<u32, usize>, table: &str, rows: Vec<(u32, T)>, mut push: F)
where
    F: FnMut(&mut Plan, T),
{
    for (plan_id, item) in rows {
        match index.get(&plan_id).and_then(|&idx| plans.get_mut(idx)) {
            Some(plan) => push(plan, item),
            None => warn!("{}: skipping row for unknown plan {}", table, plan_id),
        }
    }
}

/// Load a catalog from any set of readers (e.g., string buffers in tests)
pub fn load_catalog_from_readers<R: Read>(tables: CsvTables<R>) -> Result<Catalog> {
    let insurer_rows: Vec<InsurerRow> = read_rows(tables.insurers)?;
    let mut insurers = HashMap::new();
    for row in insurer_rows {
        let insurer = Insurer {
            id: row.id,
            name: row.name,
            network_url: row.network_url,
        };
        if insurers.insert(insurer.id, insurer).is_some() {
            return Err(QuoteError::Catalog(format!("duplicate insurer id {}", row.id)));
        }
    }

    let plan_rows: Vec<PlanRow> = read_rows(tables.plans)?;
    let mut plans = Vec::with_capacity(plan_rows.len());
    let mut index = HashMap::new();
    for row in plan_rows {
        let plan = row.to_plan(&insurers)?;
        if index.insert(plan.id, plans.len()).is_some() {
            return Err(QuoteError::Catalog(format!("duplicate plan id {}", plan.id)));
        }
        plans.push(plan);
    }

    let brackets: Vec<BracketRow> = read_rows(tables.age_brackets)?;
    attach(
        &mut plans,
        &index,
        "age_brackets",
        brackets
            .into_iter()
            .map(|r| (r.plan_id, AgeBracket::new(r.label, r.price)))
            .collect(),
        |plan, bracket| plan.brackets.push(bracket),
    );

    let hospitals: Vec<HospitalRow> = read_optional_rows(tables.hospitals)?;
    attach(
        &mut plans,
        &index,
        "hospitals",
        hospitals
            .into_iter()
            .map(|r| (r.plan_id, Hospital { id: r.id, name: r.name, address: r.address }))
            .collect(),
        |plan, hospital| plan.hospitals.push(hospital),
    );

    let waiting_periods: Vec<WaitingPeriodRow> = read_optional_rows(tables.waiting_periods)?;
    attach(
        &mut plans,
        &index,
        "waiting_periods",
        waiting_periods
            .into_iter()
            .map(|r| {
                (r.plan_id, WaitingPeriod { id: r.id, description: r.description, days: r.days })
            })
            .collect(),
        |plan, period| plan.waiting_periods.push(period),
    );

    let copayments: Vec<CoPaymentRow> = read_optional_rows(tables.copayments)?;
    attach(
        &mut plans,
        &index,
        "copayments",
        copayments
            .into_iter()
            .map(|r| {
                (
                    r.plan_id,
                    CoPayment {
                        id: r.id,
                        name: r.name,
                        plan_type: r.plan_type,
                        image_url: r.image_url,
                        service_type: r.service_type,
                        percentage: r.percentage,
                        min_amount: r.min_amount,
                        max_amount: r.max_amount,
                    },
                )
            })
            .collect(),
        |plan, copayment| plan.copayments.push(copayment),
    );

    let municipalities: Vec<MunicipalityRow> = read_optional_rows(tables.municipalities)?;
    attach(
        &mut plans,
        &index,
        "municipalities",
        municipalities
            .into_iter()
            .map(|r| (r.plan_id, Municipality { id: r.id, name: r.name }))
            .collect(),
        |plan, municipality| plan.municipalities.push(municipality),
    );

    debug!("loaded {} plans from {} insurers", plans.len(), insurers.len());
    Catalog::from_plans(plans)
}

fn open_optional(path: &Path, file_name: &str) -> Result<Option<File>> {
    let full = path.join(file_name);
    if full.exists() {
        Ok(Some(File::open(full)?))
    } else {
        debug!("{} not present, treating as empty", file_name);
        Ok(None)
    }
}

/// Load a catalog from a directory of CSV files
pub fn load_catalog_dir(path: &Path) -> Result<Catalog> {
    let tables = CsvTables {
        insurers: File::open(path.join("insurers.csv"))?,
        plans: File::open(path.join("plans.csv"))?,
        age_brackets: File::open(path.join("age_brackets.csv"))?,
        hospitals: open_optional(path, "hospitals.csv")?,
        waiting_periods: open_optional(path, "waiting_periods.csv")?,
        copayments: open_optional(path, "copayments.csv")?,
        municipalities: open_optional(path, "municipalities.csv")?,
    };
    load_catalog_from_readers(tables)
}

/// Load a catalog from a JSON array of plans in the API shape
pub fn load_catalog_from_json_reader<R: Read>(reader: R) -> Result<Catalog> {
    let plans: Vec<Plan> = serde_json::from_reader(reader)?;
    Catalog::from_plans(plans)
}

/// Load a catalog from a CSV directory, or from a JSON file when `path` ends in `.json`
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        load_catalog_from_json_reader(File::open(path)?)
    } else {
        load_catalog_dir(path)
    }
}

/// Load the catalog from the default data/catalog location
pub fn load_default_catalog() -> Result<Catalog> {
    load_catalog(DEFAULT_CATALOG_PATH)
}
