//! Error types for cloudy
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Constructors take the reporting component's logger
//! - 1.0.0: Initial CloudyError and InvalidParameter

use crate::core::logger::Logger;
use crate::transport::HttpError;
use thiserror::Error;

/// A known failure in cloudy.
///
/// Build errors through the constructors below: each one reports the error
/// at error severity on the given logger, once, where it is identified.
#[derive(Debug, Error)]
pub enum CloudyError {
    #[error("{0}")]
    Message(String),

    #[error("Please enter a discord bot token!")]
    MissingToken,

    #[error("The parameter used in the command '{command}' is NOT allowed >> {parameter}")]
    InvalidParameter { command: String, parameter: String },

    #[error("The command name '{name}' is NOT allowed")]
    InvalidCommandName { name: String },

    #[error(
        "The callback '{callback}' declares {declared} parameter(s) but at least {implicit} are required"
    )]
    Schema {
        callback: String,
        declared: usize,
        implicit: usize,
    },

    #[error("A command named '{name}' is already declared")]
    DuplicateCommand { name: String },

    #[error(
        "Shard manager failed to connect! We got '{message}' from discord.\n\
         This might mean you haven't entered your discord token or it is incorrect!"
    )]
    Unauthorized { message: String },

    #[error("The command '{command}' failed: {source:#}")]
    Invocation {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Discord request failed: {0}")]
    Http(#[source] HttpError),

    #[error("Invalid lifecycle transition {from} -> {to}")]
    Lifecycle { from: String, to: String },
}

impl CloudyError {
    /// Report this error on `logger` and hand it back
    pub fn logged(self, logger: &Logger) -> Self {
        logger.error(&self);
        self
    }

    pub fn new(message: impl Into<String>, logger: &Logger) -> Self {
        Self::Message(message.into()).logged(logger)
    }

    pub fn missing_token(logger: &Logger) -> Self {
        Self::MissingToken.logged(logger)
    }

    pub fn invalid_parameter(command: &str, parameter: &str, logger: &Logger) -> Self {
        Self::InvalidParameter {
            command: command.to_string(),
            parameter: parameter.to_string(),
        }
        .logged(logger)
    }

    pub fn invalid_command_name(name: &str, logger: &Logger) -> Self {
        Self::InvalidCommandName {
            name: name.to_string(),
        }
        .logged(logger)
    }

    pub fn schema(callback: &str, declared: usize, implicit: usize, logger: &Logger) -> Self {
        Self::Schema {
            callback: callback.to_string(),
            declared,
            implicit,
        }
        .logged(logger)
    }

    pub fn duplicate_command(name: &str, logger: &Logger) -> Self {
        Self::DuplicateCommand {
            name: name.to_string(),
        }
        .logged(logger)
    }

    pub fn unauthorized(message: impl Into<String>, logger: &Logger) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
        .logged(logger)
    }

    pub fn invocation(command: &str, source: anyhow::Error, logger: &Logger) -> Self {
        Self::Invocation {
            command: command.to_string(),
            source,
        }
        .logged(logger)
    }

    pub fn http(source: HttpError, logger: &Logger) -> Self {
        Self::Http(source).logged(logger)
    }

    pub fn lifecycle(from: impl ToString, to: impl ToString, logger: &Logger) -> Self {
        Self::Lifecycle {
            from: from.to_string(),
            to: to.to_string(),
        }
        .logged(logger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_message() {
        let err = CloudyError::invalid_parameter("hello", "NAME", &Logger::default());
        assert_eq!(
            err.to_string(),
            "The parameter used in the command 'hello' is NOT allowed >> NAME"
        );
    }

    #[test]
    fn test_unauthorized_names_the_token() {
        let err = CloudyError::unauthorized("401: Unauthorized", &Logger::default());
        let message = err.to_string();
        assert!(message.contains("401: Unauthorized"));
        assert!(message.contains("discord token"));
    }

    #[test]
    fn test_invocation_keeps_source() {
        let err = CloudyError::invocation("ping", anyhow::anyhow!("boom"), &Logger::default());
        assert!(matches!(&err, CloudyError::Invocation { command, .. } if command == "ping"));
        assert!(err.to_string().contains("boom"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_http_error_keeps_source() {
        let err = CloudyError::http(HttpError::Closed, &Logger::default());
        assert!(matches!(err, CloudyError::Http(HttpError::Closed)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
