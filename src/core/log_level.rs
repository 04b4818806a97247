//! Log level definitions

use super::error::{LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a record
///
/// Discriminants are the stable numeric values used on the wire and in
/// configuration. Ordering follows the numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u16)]
pub enum LogLevel {
    /// Detailed debug information
    #[default]
    Debug = 100,
    /// Interesting events
    Info = 200,
    /// Normal but significant events
    Notice = 250,
    /// Exceptional occurrences that are not errors
    Warning = 300,
    /// Runtime errors that do not require immediate action
    Error = 400,
    /// Critical conditions
    Critical = 500,
    /// Action must be taken immediately
    Alert = 550,
    /// System is unusable
    Emergency = 600,
}

impl LogLevel {
    /// Every level, lowest first
    pub const ALL: [LogLevel; 8] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Notice,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
        LogLevel::Alert,
        LogLevel::Emergency,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Notice => "NOTICE",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
            LogLevel::Alert => "ALERT",
            LogLevel::Emergency => "EMERGENCY",
        }
    }

    #[inline]
    pub fn value(&self) -> u16 {
        *self as u16
    }

    /// Resolve a numeric level
    ///
    /// Fails with [`LoggerError::UndefinedLevel`] for values that have no
    /// canonical name.
    pub fn from_value(value: u16) -> Result<Self> {
        LogLevel::ALL
            .iter()
            .copied()
            .find(|level| level.value() == value)
            .ok_or(LoggerError::UndefinedLevel(value))
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Debug => BrightBlack,
            LogLevel::Info => Green,
            LogLevel::Notice => Cyan,
            LogLevel::Warning => Yellow,
            LogLevel::Error => Red,
            LogLevel::Critical | LogLevel::Alert | LogLevel::Emergency => BrightRed,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "NOTICE" => Ok(LogLevel::Notice),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            "ALERT" => Ok(LogLevel::Alert),
            "EMERGENCY" => Ok(LogLevel::Emergency),
            _ => Err(LoggerError::InvalidLevelName(s.to_string())),
        }
    }
}

impl TryFrom<u16> for LogLevel {
    type Error = LoggerError;

    fn try_from(value: u16) -> std::result::Result<Self, LoggerError> {
        LogLevel::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_are_stable() {
        let values: Vec<u16> = LogLevel::ALL.iter().map(LogLevel::value).collect();
        assert_eq!(values, vec![100, 200, 250, 300, 400, 500, 550, 600]);
    }

    #[test]
    fn test_ordering_follows_value() {
        for pair in LogLevel::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_from_value() {
        assert_eq!(LogLevel::from_value(300).unwrap(), LogLevel::Warning);
        assert!(matches!(
            LogLevel::from_value(301),
            Err(LoggerError::UndefinedLevel(301))
        ));
    }

    #[test]
    fn test_try_from_u16() {
        assert_eq!(LogLevel::try_from(550).unwrap(), LogLevel::Alert);
        let level: std::result::Result<LogLevel, LoggerError> = 42u16.try_into();
        assert!(matches!(level, Err(LoggerError::UndefinedLevel(42))));
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert_eq!("Emergency".parse::<LogLevel>().unwrap(), LogLevel::Emergency);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_serde_uses_names() {
        let json = serde_json::to_string(&LogLevel::Notice).unwrap();
        assert_eq!(json, "\"NOTICE\"");
        let level: LogLevel = serde_json::from_str("\"CRITICAL\"").unwrap();
        assert_eq!(level, LogLevel::Critical);
    }
}
