//! # Command Descriptor
//!
//! An immutable slash command built from a callback, plus its wire payload.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.2.0: `extra` may override `name` and `description`
//! - 1.1.0: Command-scoped logger for invocation failures
//! - 1.0.0: Builder replacing map-backed commands

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::arguments::Arguments;
use super::callback::CommandCallback;
use super::droplet::Droplet;
use super::options::{map_options, OptionDescriptor, SlashOption};
use super::parameters::{inspect, is_valid_name};
use crate::core::{CloudyError, Logger};

/// Used when the bot has no `no_description_msg`
pub const DEFAULT_COMMAND_DESCRIPTION: &str = "☁️ No description! Sorry.";

/// Application command type for slash commands
pub const CHAT_INPUT: u8 = 1;

/// Bot-wide inputs to command construction
#[derive(Debug, Clone, Default)]
pub struct CommandDefaults {
    pub no_description_msg: Option<String>,
    pub logger: Logger,
}

impl CommandDefaults {
    pub fn new(no_description_msg: Option<String>, logger: Logger) -> Self {
        Self {
            no_description_msg,
            logger,
        }
    }
}

pub struct Command {
    name: String,
    description: String,
    options: Vec<OptionDescriptor>,
    parameters: Vec<String>,
    slash_options: HashMap<String, SlashOption>,
    /// Wire option name to parameter
    wire_parameters: HashMap<String, String>,
    extra: Map<String, Value>,
    callback: Arc<dyn CommandCallback>,
    logger: Logger,
}

impl Command {
    pub fn builder(callback: Arc<dyn CommandCallback>) -> CommandBuilder {
        CommandBuilder::new(callback)
    }

    /// Name as registered (and matched against Discord's response)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn options(&self) -> &[OptionDescriptor] {
        &self.options
    }

    /// Callback parameters that became options, in order
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn slash_options(&self) -> &HashMap<String, SlashOption> {
        &self.slash_options
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub fn kind(&self) -> u8 {
        CHAT_INPUT
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// The parameter an incoming option belongs to.
    ///
    /// Renamed options map back to the parameter whose override declared
    /// the wire name; anything else keeps its wire name.
    pub fn parameter_for<'a>(&'a self, wire_name: &'a str) -> &'a str {
        self.wire_parameters
            .get(wire_name)
            .map_or(wire_name, String::as_str)
    }

    /// Application command payload for bulk registration
    pub fn to_payload(&self) -> Value {
        let mut payload = Map::new();
        payload.insert("name".to_string(), Value::String(self.name.clone()));
        payload.insert(
            "description".to_string(),
            Value::String(self.description.clone()),
        );
        payload.insert(
            "options".to_string(),
            serde_json::to_value(&self.options).unwrap_or_else(|_| Value::Array(Vec::new())),
        );
        payload.insert("type".to_string(), Value::from(CHAT_INPUT));
        for (key, value) in &self.extra {
            payload.insert(key.clone(), value.clone());
        }
        Value::Object(payload)
    }

    pub async fn invoke(&self, droplet: Droplet, args: Arguments) -> Result<(), CloudyError> {
        self.logger
            .debug(format!("Attempting to invoke command '{}'...", self.name));
        self.callback
            .call(droplet, args)
            .await
            .map_err(|e| CloudyError::invocation(&self.name, e, &self.logger))
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("options", &self.options)
            .field("extra", &self.extra)
            .finish_non_exhaustive()
    }
}

/// Declares a command; nothing is registered until the bot runs.
pub struct CommandBuilder {
    callback: Arc<dyn CommandCallback>,
    name: Option<String>,
    description: Option<String>,
    slash_options: HashMap<String, SlashOption>,
    extra: Map<String, Value>,
}

impl CommandBuilder {
    pub fn new(callback: Arc<dyn CommandCallback>) -> Self {
        Self {
            callback,
            name: None,
            description: None,
            slash_options: HashMap::new(),
            extra: Map::new(),
        }
    }

    /// Defaults to the callback's identifier
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Override the generated option for `parameter`
    pub fn option(mut self, parameter: impl Into<String>, option: SlashOption) -> Self {
        self.slash_options.insert(parameter.into(), option);
        self
    }

    /// Raw payload field merged over the computed ones
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn build(self, defaults: &CommandDefaults) -> Result<Command, CloudyError> {
        let Self {
            callback,
            name,
            description,
            mut slash_options,
            mut extra,
        } = self;

        // Extra fields win, so lift name/description into the record itself.
        let name = match extra.remove("name") {
            Some(Value::String(name)) => name,
            Some(_) => {
                return Err(CloudyError::new(
                    "The extra field 'name' must be a string",
                    &defaults.logger,
                ))
            }
            None => name.unwrap_or_else(|| callback.identifier().to_string()),
        };
        if !is_valid_name(&name) {
            return Err(CloudyError::invalid_command_name(&name, &defaults.logger));
        }

        let description = match extra.remove("description") {
            Some(Value::String(description)) => description,
            Some(_) => {
                return Err(CloudyError::new(
                    "The extra field 'description' must be a string",
                    &defaults.logger,
                ))
            }
            None => description.unwrap_or_else(|| {
                defaults
                    .no_description_msg
                    .clone()
                    .unwrap_or_else(|| DEFAULT_COMMAND_DESCRIPTION.to_string())
            }),
        };

        let parameters = inspect(callback.as_ref(), &defaults.logger)?;
        let options = map_options(
            &name,
            &parameters,
            &slash_options,
            defaults.no_description_msg.as_deref(),
            &defaults.logger,
        )?;

        // Overrides matching no parameter were reported by map_options.
        slash_options.retain(|parameter, _| parameters.contains(parameter));
        let wire_parameters = options
            .iter()
            .zip(&parameters)
            .map(|(option, parameter)| (option.name.clone(), parameter.clone()))
            .collect();

        let logger = defaults.logger.child(&name);
        Ok(Command {
            name,
            description,
            options,
            parameters,
            slash_options,
            wire_parameters,
            extra,
            callback,
            logger,
        })
    }
}
