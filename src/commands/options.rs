//! # Slash Options
//!
//! Maps callback parameters to Discord application command options.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.1.0: Reject overrides whose wire names collide
//! - 1.0.0: Default string options with per-parameter overrides

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

use super::parameters::is_valid_name;
use crate::core::{CloudyError, Logger};

/// Used when the bot has no `no_description_msg`
pub const DEFAULT_OPTION_DESCRIPTION: &str = "☁️ Option has no description! Sorry.";

/// Application command option types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OptionType {
    SubCommand = 1,
    SubCommandGroup = 2,
    String = 3,
    Integer = 4,
    Boolean = 5,
    User = 6,
    Channel = 7,
    Role = 8,
    Mentionable = 9,
    Number = 10,
    Attachment = 11,
}

impl OptionType {
    /// Sub-command kinds carry nested options instead of a value
    pub fn is_nested(self) -> bool {
        matches!(self, Self::SubCommand | Self::SubCommandGroup)
    }
}

impl TryFrom<u8> for OptionType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::SubCommand,
            2 => Self::SubCommandGroup,
            3 => Self::String,
            4 => Self::Integer,
            5 => Self::Boolean,
            6 => Self::User,
            7 => Self::Channel,
            8 => Self::Role,
            9 => Self::Mentionable,
            10 => Self::Number,
            11 => Self::Attachment,
            other => return Err(format!("unknown option type {other}")),
        })
    }
}

impl From<OptionType> for u8 {
    fn from(kind: OptionType) -> Self {
        kind as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChoice {
    pub name: String,
    pub value: Value,
}

/// Caller-supplied option fields for one parameter.
///
/// Unset fields fall back to the defaults of the synthesized option, except
/// `required`, which Discord treats as `false` when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlashOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<OptionType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<OptionChoice>,

    /// Any other option field (`min_value`, `channel_types`, ...), sent as is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SlashOption {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename the option on the wire; arguments still arrive under the parameter name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn kind(mut self, kind: OptionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn choice(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.choices.push(OptionChoice {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// One option as registered with Discord
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: OptionType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<OptionChoice>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OptionDescriptor {
    /// A required string option
    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: OptionType::String,
            required: true,
            choices: Vec::new(),
            extra: Map::new(),
        }
    }

    fn from_override(parameter: &str, slash_option: &SlashOption, description: &str) -> Self {
        Self {
            name: slash_option
                .name
                .clone()
                .unwrap_or_else(|| parameter.to_string()),
            description: slash_option
                .description
                .clone()
                .unwrap_or_else(|| description.to_string()),
            kind: slash_option.kind.unwrap_or(OptionType::String),
            required: slash_option.required.unwrap_or(false),
            choices: slash_option.choices.clone(),
            extra: slash_option.extra.clone(),
        }
    }
}

/// Convert parameters to options, keeping declaration order.
///
/// Fails with [`CloudyError::InvalidParameter`] for a parameter Discord
/// would reject, or for an override that renames two options to one name.
pub fn map_options(
    command: &str,
    parameters: &[String],
    slash_options: &HashMap<String, SlashOption>,
    no_description_msg: Option<&str>,
    logger: &Logger,
) -> Result<Vec<OptionDescriptor>, CloudyError> {
    let description = no_description_msg.unwrap_or(DEFAULT_OPTION_DESCRIPTION);
    let mut options = Vec::with_capacity(parameters.len());
    let mut wire_names = HashSet::new();

    for parameter in parameters {
        if !is_valid_name(parameter) {
            return Err(CloudyError::invalid_parameter(command, parameter, logger));
        }

        let option = match slash_options.get(parameter) {
            Some(slash_option) => {
                OptionDescriptor::from_override(parameter, slash_option, description)
            }
            None => OptionDescriptor::string(parameter.as_str(), description),
        };

        if !is_valid_name(&option.name) || !wire_names.insert(option.name.clone()) {
            return Err(CloudyError::invalid_parameter(command, &option.name, logger));
        }
        options.push(option);
    }

    for unused in slash_options.keys().filter(|key| !parameters.contains(*key)) {
        logger.warn(format!(
            "Slash option '{unused}' on command '{command}' matches no parameter and was ignored"
        ));
    }

    Ok(options)
}
