// Core layer - configuration, errors and logging
pub mod core;

// Transport layer - REST client, gateway and event dispatch
pub mod transport;

// Application layer - command declaration, registration and dispatch
pub mod commands;

// Bot lifecycle
pub mod bot;

pub use crate::bot::{Bot, BotState, StopHandle};
pub use crate::commands::{callback, Arguments, Command, Droplet, OptionType, SlashOption};
pub use crate::core::{CloudyError, Config, Logger};
