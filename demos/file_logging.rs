//! File logging example
//!
//! Demonstrates logging to both console and file handlers simultaneously,
//! with a JSON lines file next to the human-readable one.
//!
//! Run with: cargo run --example file_logging

use rust_log_pipeline::handlers::BufferHandler;
use rust_log_pipeline::prelude::*;

fn main() -> Result<()> {
    println!("=== Rust Log Pipeline - File Logging Example ===\n");

    let logger = Logger::builder()
        .channel("app")
        .handler(ConsoleHandler::new().with_level(LogLevel::Info))
        .handler(FileHandler::new("application.log")?)
        .handler(BufferHandler::new(Box::new(
            FileHandler::new("application.jsonl")?.with_formatter(JsonFormatter::lines()),
        )))
        .processor(ThreadProcessor)
        .build();

    println!("1. Logging to console and files:");
    logger.info("Application started");
    logger.debug("Loading configuration...");
    logger.info("Configuration loaded successfully");
    logger.warning("Using default settings for some options");
    logger.error_with_context(
        "Failed to load optional plugin",
        LogContext::new().with_field("plugin", "metrics"),
    );
    logger.info("Application initialization complete");

    logger.flush()?;

    println!("\n2. Logger metrics:");
    let metrics = logger.metrics();
    println!("   Total logged: {}", metrics.total_logged());
    println!("   Dropped: {}", metrics.dropped_count());

    println!("\nLogs written to application.log and application.jsonl");
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
