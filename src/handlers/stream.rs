//! File handler implementation

use super::{HandlerCore, ProcessingHandler};
use crate::core::{LogLevel, LoggerError, Record, Result};
use crate::formatters::{escape_line_breaks, LineFormatter};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends formatted records to a file, one per line
pub struct FileHandler {
    core: HandlerCore,
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    #[cfg_attr(not(feature = "file"), allow(dead_code))]
    use_locking: bool,
}

impl FileHandler {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LoggerError::io_operation("opening log file", path.display().to_string(), e))?;

        Ok(Self {
            core: HandlerCore::new(LogLevel::Debug, Box::new(LineFormatter::new())),
            path,
            writer: Some(BufWriter::new(file)),
            use_locking: false,
        })
    }

    /// Hold an exclusive lock on the file for each write
    ///
    /// Needed when several processes append to the same file.
    #[cfg(feature = "file")]
    #[must_use]
    pub fn with_locking(mut self, use_locking: bool) -> Self {
        self.use_locking = use_locking;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn line_of(record: &Record) -> String {
        let mut line = record
            .formatted()
            .map(|formatted| formatted.to_text())
            .unwrap_or_else(|| escape_line_breaks(record.message()));
        if !line.ends_with('\n') {
            line.push('\n');
        }
        line
    }

    fn write_locked(&mut self, bytes: &[u8]) -> Result<()> {
        let path = self.path.display().to_string();
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("File writer not initialized"))?;

        #[cfg(feature = "file")]
        if self.use_locking {
            use fs2::FileExt;

            writer.get_ref().lock_exclusive().map_err(|_| LoggerError::file_lock(&path))?;
            let result = writer.write_all(bytes).and_then(|()| writer.flush());
            writer
                .get_ref()
                .unlock()
                .map_err(|e| LoggerError::io_operation("unlocking log file", path, e))?;
            return result.map_err(LoggerError::from);
        }

        writer
            .write_all(bytes)
            .map_err(|e| LoggerError::file_handler(path, e.to_string()))
    }
}

impl ProcessingHandler for FileHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn write(&mut self, record: &Record) -> Result<()> {
        let line = Self::line_of(record);
        self.write_locked(line.as_bytes())
    }

    fn write_batch(&mut self, records: &[Record]) -> Result<()> {
        let chunk: String = records.iter().map(Self::line_of).collect();
        self.write_locked(chunk.as_bytes())
    }

    fn flush_output(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn handler_name(&self) -> &str {
        "file"
    }
}

impl Drop for FileHandler {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.flush_output();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogContext;
    use crate::formatters::JsonFormatter;
    use crate::handlers::Handler;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_file_handler_writes_lines() -> Result<()> {
        let dir = tempdir()?;
        let log_path = dir.path().join("app.log");

        let mut handler = FileHandler::new(&log_path)?.with_level(LogLevel::Info);
        handler.handle(&Record::new(LogLevel::Debug, "skipped", "app"))?;
        handler.handle(&Record::new(LogLevel::Warning, "disk low", "app"))?;
        handler.flush()?;

        let content = fs::read_to_string(&log_path)?;
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("app.WARNING: disk low"));
        Ok(())
    }

    #[test]
    fn test_file_handler_json_batch() -> Result<()> {
        let dir = tempdir()?;
        let log_path = dir.path().join("app.jsonl");

        let mut handler = FileHandler::new(&log_path)?.with_formatter(JsonFormatter::lines());
        let records: Vec<Record> = (0..5)
            .map(|i| {
                Record::new(LogLevel::Info, format!("Iteration {}", i), "loop")
                    .with_context(LogContext::new().with_field("iteration", i))
            })
            .collect();
        handler.handle_batch(&records)?;
        handler.flush()?;

        let content = fs::read_to_string(&log_path)?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        for (i, line) in lines.iter().enumerate() {
            let parsed: serde_json::Value = serde_json::from_str(line)?;
            assert_eq!(parsed["context"]["iteration"], i as i64);
        }
        Ok(())
    }

    #[cfg(feature = "file")]
    #[test]
    fn test_file_handler_with_locking() -> Result<()> {
        let dir = tempdir()?;
        let log_path = dir.path().join("locked.log");

        let mut handler = FileHandler::new(&log_path)?.with_locking(true);
        handler.handle(&Record::new(LogLevel::Error, "locked write", "app"))?;

        // Locked writes are flushed immediately
        let content = fs::read_to_string(&log_path)?;
        assert!(content.contains("locked write"));
        Ok(())
    }
}
