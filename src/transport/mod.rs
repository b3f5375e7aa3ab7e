//! # Transport Layer
//!
//! Seams to the Discord HTTP API and gateway. The bot only talks to these
//! traits; [`RestClient`] and [`SerenityGateway`] are the production adapters.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Add interaction callback route for droplet responses
//! - 1.0.0: Initial traits, routes and authentication

pub mod events;
pub mod gateway;
pub mod rest;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub use events::EventDispatcher;
pub use gateway::SerenityGateway;
pub use rest::RestClient;

/// Request headers as sent to the HTTP client
pub type Headers = HashMap<String, String>;

/// Gateway event names consumed by the bot
pub const READY: &str = "READY";
pub const INTERACTION_CREATE: &str = "INTERACTION_CREATE";
/// Internal signal that stops a running bot
pub const CRITICAL: &str = "critical";

/// An HTTP method and API path relative to the versioned base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: Method,
    pub path: String,
}

impl Route {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    /// `GET /oauth2/applications/@me`
    pub fn current_application() -> Self {
        Self::new(Method::GET, "/oauth2/applications/@me")
    }

    /// `GET /users/@me`
    pub fn current_user() -> Self {
        Self::new(Method::GET, "/users/@me")
    }

    /// `PUT /applications/{application_id}/commands`
    pub fn global_commands(application_id: &str) -> Self {
        Self::new(
            Method::PUT,
            format!("/applications/{application_id}/commands"),
        )
    }

    /// `PUT /applications/{application_id}/guilds/{guild_id}/commands`
    pub fn guild_commands(application_id: &str, guild_id: &str) -> Self {
        Self::new(
            Method::PUT,
            format!("/applications/{application_id}/guilds/{guild_id}/commands"),
        )
    }

    /// `POST /interactions/{interaction_id}/{token}/callback`
    pub fn interaction_callback(interaction_id: &str, token: &str) -> Self {
        Self::new(
            Method::POST,
            format!("/interactions/{interaction_id}/{token}/callback"),
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Bot token authentication
#[derive(Clone)]
pub struct BotAuthentication {
    token: String,
}

impl BotAuthentication {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Authorization".to_string(), format!("Bot {}", self.token));
        headers
    }
}

// Never print the token.
impl fmt::Debug for BotAuthentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotAuthentication").finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("http client is closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("gateway error: {0}")]
    Gateway(String),
}

/// Low-level request client for the Discord REST API
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a request and decode the JSON response (`null` when empty)
    async fn request(
        &self,
        route: Route,
        headers: &Headers,
        body: Option<Value>,
    ) -> Result<Value, HttpError>;

    /// Release the client. Later requests fail with [`HttpError::Closed`].
    async fn close(&self);
}

/// Shard manager owning the gateway connection
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Open the connection. Inbound events are forwarded to `events`.
    async fn connect(&self, events: Arc<EventDispatcher>) -> Result<(), TransportError>;

    async fn close(&self);
}
