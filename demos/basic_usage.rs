//! Basic logger usage example
//!
//! Demonstrates synchronous logging to the console at every level.
//!
//! Run with: cargo run --example basic_usage

use rust_log_pipeline::prelude::*;
use rust_log_pipeline::{info, warning};

fn main() -> Result<()> {
    println!("=== Rust Log Pipeline - Basic Usage Example ===\n");

    let mut logger = Logger::new("demo");
    logger.add_handler(Box::new(ConsoleHandler::new()));

    println!("1. Logging at different levels:");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.notice("This is a notice message");
    logger.warning("This is a warning message");
    logger.error("This is an error message");
    logger.critical("This is a critical message");
    logger.alert("This is an alert message");
    logger.emergency("This is an emergency message");

    println!("\n2. Handler with a minimum level:");
    logger.remove_handler()?;
    logger.add_handler(Box::new(ConsoleHandler::new().with_level(LogLevel::Warning)));
    println!("   Minimum level set to WARNING - debug and info won't show:");
    let shown = logger.info("Info message (hidden)");
    println!("   info handled: {}", shown);
    logger.warning("Warning message (visible)");

    println!("\n3. Structured context and macros:");
    logger.warning_with_context(
        "Disk almost full",
        LogContext::new()
            .with_field("mount", "/var")
            .with_field("free_mb", 12),
    );
    let attempt = 2;
    info!(logger, "Retrying upload, attempt {}", attempt);
    warning!(logger, "Upload slow: {} ms", 4200);

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
