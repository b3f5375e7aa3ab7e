//! # Command System
//!
//! Slash command (/) declaration, registration and dispatch.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.0.0: Callback-derived schemas, id-keyed registry, interaction dispatcher
//! - 2.0.0: Builder-based command declaration
//! - 1.0.0: Initial command module

pub mod arguments;
pub mod callback;
pub mod command;
pub mod dispatcher;
pub mod droplet;
pub mod options;
pub mod parameters;
pub mod registry;

pub use arguments::Arguments;
pub use callback::{callback, CommandCallback, FnCallback};
pub use command::{Command, CommandBuilder, CommandDefaults, CHAT_INPUT, DEFAULT_COMMAND_DESCRIPTION};
pub use dispatcher::{DispatchOutcome, InteractionDispatcher};
pub use droplet::Droplet;
pub use options::{OptionChoice, OptionDescriptor, OptionType, SlashOption, DEFAULT_OPTION_DESCRIPTION};
pub use parameters::{is_valid_name, IMPLICIT_PARAMETERS};
pub use registry::{CommandRegistry, RegistrationReport};
