//! # Interaction Dispatcher
//!
//! Routes `INTERACTION_CREATE` payloads to registered commands. Each
//! interaction runs as its own task, so a failing or panicking callback only
//! affects its own invocation.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.1.0: Per-interaction tasks with panic isolation
//! - 1.0.0: Initial chat input dispatch

use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::arguments::Arguments;
use super::command::{Command, CHAT_INPUT};
use super::droplet::{snowflake, Droplet};
use super::options::OptionType;
use super::registry::CommandRegistry;
use crate::core::{CloudyError, Logger};
use crate::transport::{EventDispatcher, HttpClient, INTERACTION_CREATE};

/// Interaction type of slash command invocations
pub const APPLICATION_COMMAND: u64 = 2;

/// What happened to one inbound interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not a chat input command (pings, autocomplete, components, ...)
    Ignored,
    /// No registered command has this id
    Unknown { id: String },
    Completed { command: String },
}

pub struct InteractionDispatcher {
    registry: Arc<CommandRegistry>,
    http: Arc<dyn HttpClient>,
    logger: Logger,
}

impl InteractionDispatcher {
    pub fn new(
        registry: Arc<CommandRegistry>,
        http: Arc<dyn HttpClient>,
        logger: Logger,
    ) -> Self {
        Self {
            registry,
            http,
            logger,
        }
    }

    /// Start dispatching every `INTERACTION_CREATE` event
    pub fn attach(self: Arc<Self>, events: &EventDispatcher) {
        events.add_listener(INTERACTION_CREATE, move |payload| {
            self.spawn(payload);
        });
    }

    /// Dispatch one interaction on its own task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self: &Arc<Self>, payload: Value) -> JoinHandle<()> {
        let dispatcher = Arc::clone(self);
        let logger = self.logger.clone();
        tokio::spawn(async move {
            let request_id = Uuid::new_v4();
            let task = tokio::spawn(async move { dispatcher.dispatch(payload).await });
            match task.await {
                Ok(Ok(outcome)) => logger.debug(format!("[{request_id}] {outcome:?}")),
                // Already reported where it was raised.
                Ok(Err(_)) => {}
                Err(e) => logger.error(format!("[{request_id}] Interaction task aborted: {e}")),
            }
        })
    }

    pub async fn dispatch(&self, payload: Value) -> Result<DispatchOutcome, CloudyError> {
        if payload.get("type").and_then(Value::as_u64) != Some(APPLICATION_COMMAND) {
            return Ok(DispatchOutcome::Ignored);
        }
        let data = match payload.get("data") {
            Some(data) => data,
            None => return Ok(DispatchOutcome::Ignored),
        };
        // User and message context menus share the interaction type.
        let command_type = data.get("type").and_then(Value::as_u64).unwrap_or(1);
        if command_type != u64::from(CHAT_INPUT) {
            return Ok(DispatchOutcome::Ignored);
        }

        let id = match data.get("id").and_then(snowflake) {
            Some(id) => id,
            None => return Ok(DispatchOutcome::Ignored),
        };
        let command = match self.registry.get(&id) {
            Some(command) => command,
            None => {
                self.logger
                    .debug(format!("No registered command for interaction command id {id}"));
                return Ok(DispatchOutcome::Unknown { id });
            }
        };

        let args = extract_arguments(command, data.get("options"));
        let name = command.name().to_string();
        let droplet = Droplet::new(payload, Arc::clone(&self.http));
        command.invoke(droplet, args).await?;
        Ok(DispatchOutcome::Completed { command: name })
    }
}

/// Build the parameter-keyed arguments of an interaction.
///
/// Sub-command and sub-command-group options are skipped.
pub fn extract_arguments(command: &Command, options: Option<&Value>) -> Arguments {
    let mut args = Arguments::new();
    let options = match options.and_then(Value::as_array) {
        Some(options) => options,
        None => return args,
    };

    for option in options {
        let kind = option
            .get("type")
            .and_then(Value::as_u64)
            .and_then(|kind| u8::try_from(kind).ok())
            .and_then(|kind| OptionType::try_from(kind).ok());
        if kind.is_some_and(OptionType::is_nested) {
            continue;
        }

        let wire_name = match option.get("name").and_then(Value::as_str) {
            Some(name) => name,
            None => continue,
        };
        let value = option.get("value").cloned().unwrap_or(Value::Null);
        args.insert(command.parameter_for(wire_name), value);
    }
    args
}
