//! AWS Lambda handler for health insurance quotes
//!
//! Accepts a quote request via JSON and returns either the priced plans or
//! the PDF quote document:
//! - `POST .../cotacao`      -> JSON array of plan quotes
//! - `POST .../cotacao/pdf`  -> `application/pdf` attachment
//!
//! Supports Lambda Function URLs for direct HTTP access. The catalog is read
//! once at cold start from `QUOTE_CATALOG_PATH` (default `data/catalog`).

use chrono::Local;
use health_quote::{QuoteError, QuoteRequest, QuoteRunner, DEFAULT_CATALOG_PATH};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;

const CATALOG_PATH_ENV: &str = "QUOTE_CATALOG_PATH";
const ALLOWED_METHODS: &str = "POST, OPTIONS";

fn error_response(status: u16, message: &str) -> Result<Response<Body>, Error> {
    let body = serde_json::json!({ "error": message });
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::Text(body.to_string()))?)
}

fn quote_error_response(err: &QuoteError) -> Result<Response<Body>, Error> {
    if err.is_client_error() {
        info!("rejected request: {}", err);
    } else {
        warn!("quote failed: {}", err);
    }
    error_response(err.status_code(), &err.to_string())
}

fn json_response<T: Serialize>(body: &T) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
        .header("Access-Control-Allow-Headers", "Content-Type")
        .body(Body::Text(serde_json::to_string(body)?))?)
}

/// Lambda handler function
async fn handler(runner: &QuoteRunner, event: Request) -> Result<Response<Body>, Error> {
    let start = std::time::Instant::now();

    // Handle CORS preflight
    match event.method().as_str() {
        "OPTIONS" => {
            return Ok(Response::builder()
                .status(200)
                .header("Access-Control-Allow-Origin", "*")
                .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
                .header("Access-Control-Allow-Headers", "Content-Type")
                .body(Body::Empty)?);
        }
        "POST" => {}
        other => return error_response(405, &format!("Method {} not allowed", other)),
    }

    // Parse request body
    let body_str = match event.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => "{}".to_string(),
    };

    let request: QuoteRequest = match serde_json::from_str(&body_str) {
        Ok(r) => r,
        Err(e) => return error_response(400, &format!("Invalid JSON: {}", e)),
    };

    let wants_pdf = event.uri().path().trim_end_matches('/').ends_with("/cotacao/pdf");

    if wants_pdf {
        let report = match runner.quote_document(&request, Local::now().naive_local()) {
            Ok(report) => report,
            Err(e) => return quote_error_response(&e),
        };
        info!(
            "pdf {} ({} bytes) in {} ms",
            report.filename,
            report.bytes.len(),
            start.elapsed().as_millis()
        );

        return Ok(Response::builder()
            .status(200)
            .header("Content-Type", report.content_type)
            .header(
                "Content-Disposition",
                format!("attachment; filename={}", report.filename),
            )
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Expose-Headers", "Content-Disposition")
            .body(Body::Binary(report.bytes))?);
    }

    let results = match runner.quote(&request) {
        Ok(results) => results,
        Err(e) => return quote_error_response(&e),
    };
    info!("{} plan(s) quoted in {} ms", results.len(), start.elapsed().as_millis());

    json_response(&results)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let catalog_path =
        std::env::var(CATALOG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CATALOG_PATH.to_string());
    let runner = Arc::new(QuoteRunner::from_path(&catalog_path)?);
    info!("loaded {} plans from {}", runner.catalog().len(), catalog_path);

    run(service_fn(move |event: Request| {
        let runner = Arc::clone(&runner);
        async move { handler(&runner, event).await }
    }))
    .await
}
