//! Component-scoped logging context
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.0.0: Replace the global cloudy logger with owned, prefixed loggers

use log::{Level, LevelFilter};
use std::fmt::Display;

/// Log target shared by every cloudy record
pub const TARGET: &str = "cloudy";

/// A logging context owned by a component.
///
/// Records go through the `log` facade under the [`TARGET`] target as
/// `[prefix] message`. The verbosity is fixed when the logger is created;
/// children inherit it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logger {
    prefix: String,
    level: LevelFilter,
}

impl Logger {
    pub fn new(prefix: impl Into<String>, level: LevelFilter) -> Self {
        Self {
            prefix: prefix.into(),
            level,
        }
    }

    /// Derive a logger scoped under this one, e.g. `Bot > hello`
    pub fn child(&self, name: &str) -> Self {
        Self {
            prefix: format!("{} > {name}", self.prefix),
            level: self.level,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    pub fn enabled(&self, level: Level) -> bool {
        level <= self.level
    }

    pub fn log(&self, level: Level, message: impl Display) {
        if self.enabled(level) {
            log::log!(target: TARGET, level, "[{}] {message}", self.prefix);
        }
    }

    pub fn error(&self, message: impl Display) {
        self.log(Level::Error, message);
    }

    pub fn warn(&self, message: impl Display) {
        self.log(Level::Warn, message);
    }

    pub fn info(&self, message: impl Display) {
        self.log(Level::Info, message);
    }

    pub fn debug(&self, message: impl Display) {
        self.log(Level::Debug, message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new("Cloudy", LevelFilter::Warn)
    }
}

/// Parse a verbosity name (`error`, `warn`, `info`, `debug`, `trace`, `off`)
pub fn parse_level(value: &str) -> Option<LevelFilter> {
    value.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_prefix_nests() {
        let bot = Logger::new("Bot", LevelFilter::Info);
        let command = bot.child("hello");
        assert_eq!(command.prefix(), "Bot > hello");
        assert_eq!(command.level(), LevelFilter::Info);
    }

    #[test]
    fn test_level_gate() {
        let logger = Logger::new("Bot", LevelFilter::Warn);
        assert!(logger.enabled(Level::Error));
        assert!(logger.enabled(Level::Warn));
        assert!(!logger.enabled(Level::Info));
        assert!(!logger.enabled(Level::Debug));
    }

    #[test]
    fn test_off_disables_everything() {
        let logger = Logger::new("Bot", LevelFilter::Off);
        assert!(!logger.enabled(Level::Error));
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(LevelFilter::Debug));
        assert_eq!(parse_level(" INFO "), Some(LevelFilter::Info));
        assert_eq!(parse_level("loud"), None);
    }
}
