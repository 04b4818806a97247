//! Socket handler for remote logging
//!
//! Ships JSON lines to a collector over TCP.

use super::{HandlerCore, ProcessingHandler};
use crate::core::{LogLevel, LoggerError, Record, Result};
use crate::formatters::{escape_line_breaks, JsonFormatter};
use std::io::Write;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Handler that writes each formatted record to a TCP stream
///
/// # Example
///
/// ```no_run
/// use rust_log_pipeline::handlers::SocketHandler;
/// use rust_log_pipeline::Logger;
///
/// let handler = SocketHandler::new("127.0.0.1:5140")?;
///
/// let mut logger = Logger::new("orders");
/// logger.add_handler(Box::new(handler));
/// logger.info("shipped to the collector");
/// # Ok::<(), rust_log_pipeline::LoggerError>(())
/// ```
pub struct SocketHandler {
    core: HandlerCore,
    stream: Option<TcpStream>,
    address: String,
    reconnect_on_error: bool,
}

impl SocketHandler {
    /// Connect to `addr`
    ///
    /// # Errors
    ///
    /// Returns error if connection fails
    pub fn new(addr: impl ToSocketAddrs + ToString) -> Result<Self> {
        let address = addr.to_string();
        let stream = Self::connect(&address)?;

        Ok(Self {
            core: HandlerCore::new(LogLevel::Debug, Box::new(JsonFormatter::lines())),
            stream: Some(stream),
            address,
            reconnect_on_error: true,
        })
    }

    /// Enable or disable one reconnect attempt after a failed write
    ///
    /// Default: enabled
    #[must_use]
    pub fn with_reconnect(mut self, enable: bool) -> Self {
        self.reconnect_on_error = enable;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn connect(address: &str) -> Result<TcpStream> {
        let stream = TcpStream::connect(address)
            .map_err(|e| LoggerError::transport("tcp", format!("{}: {}", address, e)))?;

        // Set timeouts to prevent hanging
        stream.set_write_timeout(Some(IO_TIMEOUT))?;
        stream.set_read_timeout(Some(IO_TIMEOUT))?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    fn send(&mut self, payload: &[u8]) -> Result<()> {
        let result = match self.stream {
            Some(ref mut stream) => stream.write_all(payload),
            None if self.reconnect_on_error => Err(std::io::ErrorKind::NotConnected.into()),
            None => return Err(LoggerError::writer("Socket stream not connected")),
        };

        let Err(e) = result else {
            return Ok(());
        };

        // Connection lost
        self.stream = None;
        if !self.reconnect_on_error {
            return Err(e.into());
        }

        match Self::connect(&self.address) {
            Ok(mut stream) => {
                stream.write_all(payload)?;
                self.stream = Some(stream);
                Ok(())
            }
            Err(reconnect_err) => Err(LoggerError::transport(
                "tcp",
                format!(
                    "Failed to send log and reconnect: {} (reconnect: {})",
                    e, reconnect_err
                ),
            )),
        }
    }

    fn text_of(record: &Record) -> String {
        let mut text = record
            .formatted()
            .map(|formatted| formatted.to_text())
            .unwrap_or_else(|| escape_line_breaks(record.message()));
        if !text.ends_with('\n') {
            text.push('\n');
        }
        text
    }
}

impl ProcessingHandler for SocketHandler {
    fn core(&self) -> &HandlerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut HandlerCore {
        &mut self.core
    }

    fn write(&mut self, record: &Record) -> Result<()> {
        let text = Self::text_of(record);
        self.send(text.as_bytes())
    }

    fn write_batch(&mut self, records: &[Record]) -> Result<()> {
        let chunk: String = records.iter().map(Self::text_of).collect();
        self.send(chunk.as_bytes())
    }

    fn flush_output(&mut self) -> Result<()> {
        if let Some(ref mut stream) = self.stream {
            stream.flush()?;
        }
        Ok(())
    }

    fn handler_name(&self) -> &str {
        "socket"
    }
}

impl Drop for SocketHandler {
    fn drop(&mut self) {
        let _ = self.flush_output();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::Handler;
    use std::io::{BufRead, BufReader};
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        assert!(SocketHandler::new(addr).is_err());
    }

    #[test]
    fn test_socket_handler_sends_json_lines() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            BufReader::new(stream)
                .lines()
                .take(2)
                .map(|line| line.unwrap())
                .collect::<Vec<_>>()
        });

        let mut handler = SocketHandler::new(addr).unwrap().with_level(LogLevel::Info);
        assert!(!handler
            .handle(&Record::new(LogLevel::Debug, "skipped", "net"))
            .unwrap());
        handler
            .handle(&Record::new(LogLevel::Info, "first", "net"))
            .unwrap();
        handler
            .handle(&Record::new(LogLevel::Error, "second", "net"))
            .unwrap();
        drop(handler);

        let lines = server.join().unwrap();
        let first: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        let second: serde_json::Value = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(first["message"], "first");
        assert_eq!(second["level_name"], "ERROR");
    }

    #[test]
    fn test_write_without_connection() {
        let mut handler = SocketHandler {
            core: HandlerCore::new(LogLevel::Debug, Box::new(JsonFormatter::lines())),
            stream: None,
            address: "127.0.0.1:9".to_string(),
            reconnect_on_error: false,
        };

        let result = handler.handle(&Record::new(LogLevel::Info, "test", "net"));
        assert!(result.is_err());
    }
}
