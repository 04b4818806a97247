//! Browser console bridge example
//!
//! Collects log rows into the `X-ChromeLogger-Data` header that a web
//! framework would copy onto its response, and shows the size guard firing.
//!
//! Run with: cargo run --example chrome_headers

use rust_log_pipeline::handlers::chrome::{HeaderCollector, HEADER_NAME};
use rust_log_pipeline::handlers::{ChromeHandler, ChromeHandlerConfig, ChromePayload, DeliveryState};
use rust_log_pipeline::prelude::*;
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Rust Log Pipeline - Console Bridge Example ===\n");

    let headers = HeaderCollector::new()
        .with_user_agent("Mozilla/5.0 (X11; Linux x86_64) Chrome/120.0.0.0 Safari/537.36")
        .with_request_uri("/checkout");

    let config = ChromeHandlerConfig::from_json(r#"{"level": "INFO", "size_limit": 4096}"#)?;
    let state = Arc::new(DeliveryState::new());
    let handler = ChromeHandler::from_config(&config, Arc::new(headers.clone()), Arc::clone(&state))?;

    let logger = Logger::builder().channel("checkout").handler(handler).build();

    println!("1. Logging a request:");
    logger.info("Cart loaded");
    logger.warning_with_context("Coupon expired", LogContext::new().with_field("code", "SPRING"));

    let header = headers.header(HEADER_NAME).unwrap_or_default();
    println!("   {}: {} bytes", HEADER_NAME, header.len());
    println!("   decoded: {}", ChromePayload::decode(&header)?);

    println!("\n2. Filling the header past its size limit:");
    for i in 0..100 {
        logger.info(format!("Line item {} priced", i));
        if state.is_overflowed() {
            println!("   guard fired after item {}", i);
            break;
        }
    }
    println!(
        "   rows: {}, transmissions: {}",
        state.with_payload(ChromePayload::len),
        state.transmissions()
    );

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
