//! # Core Module
//!
//! Configuration, error handling and logging shared by every cloudy component.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Add owned logger contexts
//! - 1.1.0: Add error module
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod error;
pub mod logger;

pub use config::{Config, Presence};
pub use error::CloudyError;
pub use logger::Logger;
