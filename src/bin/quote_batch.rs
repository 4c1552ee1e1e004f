//! Quote a batch of requests from a JSON file
//!
//! Requests are evaluated in parallel against one pre-loaded catalog and
//! summarized one CSV row per admitted plan (or per failed request).

use anyhow::{Context, Result};
use clap::Parser;
use health_quote::{QuoteRequest, QuoteRunner, DEFAULT_CATALOG_PATH};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "quote_batch", about = "Quote many requests in parallel into a CSV summary")]
struct Args {
    /// JSON array of quote requests
    input: PathBuf,

    /// Catalog directory (CSV tables) or JSON export
    #[arg(long, default_value = DEFAULT_CATALOG_PATH)]
    catalog: PathBuf,

    /// Output CSV (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SummaryRow {
    request: usize,
    plan_id: Option<u32>,
    insurer: String,
    plan: String,
    beneficiaries: usize,
    gross_total: Option<f64>,
    net_total: Option<f64>,
    error: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    let runner = QuoteRunner::from_path(&args.catalog)
        .with_context(|| format!("loading catalog from {}", args.catalog.display()))?;
    let file = File::open(&args.input).with_context(|| format!("opening {}", args.input.display()))?;
    let requests: Vec<QuoteRequest> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", args.input.display()))?;
    eprintln!(
        "Loaded {} plans and {} requests in {:?}",
        runner.catalog().len(),
        requests.len(),
        start.elapsed()
    );

    let quote_start = Instant::now();
    let outcomes = runner.run_batch(&requests);
    eprintln!("Quotes complete in {:?}", quote_start.elapsed());

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path).with_context(|| format!("creating {}", path.display()))?),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = csv::Writer::from_writer(sink);

    let mut failed = 0;
    for (index, outcome) in outcomes.iter().enumerate() {
        match outcome {
            Ok(results) => {
                for result in results {
                    writer.serialize(SummaryRow {
                        request: index,
                        plan_id: Some(result.plan_id),
                        insurer: result.insurer_name.clone(),
                        plan: result.plan_name.clone(),
                        beneficiaries: result.beneficiary_count(),
                        gross_total: Some(result.total_price),
                        net_total: Some(result.net_total),
                        error: String::new(),
                    })?;
                }
            }
            Err(e) => {
                failed += 1;
                writer.serialize(SummaryRow {
                    request: index,
                    plan_id: None,
                    insurer: String::new(),
                    plan: String::new(),
                    beneficiaries: requests.get(index).map_or(0, |r| r.ages.len()),
                    gross_total: None,
                    net_total: None,
                    error: e.to_string(),
                })?;
            }
        }
    }
    writer.flush()?;

    eprintln!("{} requests, {} failed", outcomes.len(), failed);
    Ok(())
}
