//! Health Quote CLI
//!
//! Quotes a set of beneficiary ages against the plan catalog and prints the
//! admitted plans, the API JSON, or writes the PDF quote document.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use health_quote::{QuoteRequest, QuoteRunner, DEFAULT_CATALOG_PATH};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "health-quote", about = "Health insurance quotes by beneficiary age")]
struct Cli {
    /// Catalog directory (CSV tables) or JSON export
    #[arg(long, default_value = DEFAULT_CATALOG_PATH)]
    catalog: PathBuf,

    /// Beneficiary ages, comma separated (e.g. 25,65)
    #[arg(long, value_delimiter = ',', required = true)]
    ages: Vec<u32>,

    /// Only plans from this insurer
    #[arg(long)]
    insurer_id: Option<u32>,

    /// Contract type prefix (PF, PJ, Adesão)
    #[arg(long)]
    contract_type: Option<String>,

    /// Accommodation prefix (Enfermaria, Apartamento)
    #[arg(long)]
    accommodation: Option<String>,

    /// Coverage prefix (Local, Regional, Nacional)
    #[arg(long)]
    coverage: Option<String>,

    #[arg(long)]
    eligibility: Option<bool>,

    #[arg(long)]
    copayment: Option<bool>,

    /// Restrict the PDF document to one plan
    #[arg(long)]
    plan_id: Option<u32>,

    /// Discount percentage applied to every beneficiary
    #[arg(long)]
    discount: Option<f64>,

    /// Print the API JSON instead of the console table
    #[arg(long)]
    json: bool,

    /// Write the PDF quote document into this directory
    #[arg(long)]
    pdf: Option<PathBuf>,
}

impl Cli {
    fn request(&self) -> QuoteRequest {
        QuoteRequest {
            ages: self.ages.clone(),
            insurer_id: self.insurer_id,
            contract_type: self.contract_type.clone(),
            accommodation: self.accommodation.clone(),
            coverage: self.coverage.clone(),
            eligibility: self.eligibility,
            copayment: self.copayment,
            plan_id: self.plan_id,
            discount_percent: self.discount,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let runner = QuoteRunner::from_path(&cli.catalog)
        .with_context(|| format!("loading catalog from {}", cli.catalog.display()))?;
    let request = cli.request();
    let results = runner.quote(&request)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        println!("Health Quote v{}", env!("CARGO_PKG_VERSION"));
        println!("======================\n");
        println!("Catalog: {} plans", runner.catalog().len());
        println!("Ages: {:?}", request.ages);
        if let Some(discount) = request.discount_percent {
            println!("Discount: {}%", discount);
        }
        println!();

        println!("{:>5} {:<16} {:<32} {:>12} {:>12}", "Plan", "Insurer", "Name", "Total", "Final");
        println!("{}", "-".repeat(81));
        for result in &results {
            println!(
                "{:>5} {:<16} {:<32} {:>12.2} {:>12.2}",
                result.plan_id,
                result.insurer_name,
                result.plan_name,
                result.total_price,
                result.net_total,
            );
            for line in &result.beneficiaries {
                println!("{:>5} {:<16} age {:>3} -> {:<24} {:>12.2}", "", "", line.age, line.bracket_label, line.net_price);
            }
        }
        println!("\n{} plan(s) admitted", results.len());
    }

    if let Some(dir) = &cli.pdf {
        let report = runner.quote_document(&request, Local::now().naive_local())?;
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let path = dir.join(&report.filename);
        fs::write(&path, &report.bytes).with_context(|| format!("writing {}", path.display()))?;
        println!("PDF written to: {}", path.display());
    }

    Ok(())
}
