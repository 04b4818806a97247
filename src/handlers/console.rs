//! Console handler implementation

use super::{HandlerCore, ProcessingHandler};
use crate::core::{LogLevel, Record, Result};
use crate::formatters::{escape_line_breaks, LineFormatter};
use colored::Colorize;

pub struct ConsoleHandler {
    core: HandlerCore,
    use_colors: bool,
}

impl ConsoleHandler {
    pub fn new() -> Self {
        Self {
            core: HandlerCore::new(LogLevel::Debug, Box::new(LineFormatter::new())),
            use_colors: true,
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            ..Self::new()
        }
    }

    fn render(&self, record: &Record) -> String {
        let output = record
            .formatted()
            .map(|formatted| formatted.to_text())
            .unwrap_or_else(|| escape_line_breaks(record.message()));

        if self.use_colors {
            output.color(record.level().color_code()).to_string()
        } else {
            output
        }
    }
}

impl Default for ConsoleHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingHandler for ConsoleHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn write(&mut self, record: &Record) -> Result<()> {
        let output = self.render(record);

        // Route Error and above to stderr, others to stdout
        if record.level() >= LogLevel::Error {
            eprintln!("{}", output);
        } else {
            println!("{}", output);
        }
        Ok(())
    }

    fn flush_output(&mut self) -> Result<()> {
        use std::io::Write;
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn handler_name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::Handler;

    #[test]
    fn test_console_handler_levels() {
        let mut handler = ConsoleHandler::with_colors(false).with_level(LogLevel::Notice);

        assert!(!handler
            .handle(&Record::new(LogLevel::Info, "hidden", "app"))
            .unwrap());
        assert!(handler
            .handle(&Record::new(LogLevel::Error, "visible", "app"))
            .unwrap());
        assert_eq!(handler.name(), "console");
    }

    #[test]
    fn test_render_without_colors() {
        let handler = ConsoleHandler::with_colors(false);
        let record = handler
            .core()
            .prepare(&Record::new(LogLevel::Info, "plain", "app"));

        assert!(handler.render(&record).ends_with("app.INFO: plain"));
    }
}
