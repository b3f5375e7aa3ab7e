//! reqwest-backed Discord REST client
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Send the `DiscordBot` User-Agent
//! - 1.0.0: Initial client

use super::{Headers, HttpClient, HttpError, Route};
use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};

/// Versioned Discord API base URL
pub const API_BASE: &str = "https://discord.com/api/v10";

/// `DiscordBot ($url, $version)`, the form Discord requires
pub const USER_AGENT: &str = concat!(
    "DiscordBot (https://crates.io/crates/cloudy, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    closed: AtomicBool,
}

impl RestClient {
    pub fn new() -> Self {
        Self::with_base_url(API_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn url(&self, route: &Route) -> String {
        format!("{}{}", self.base_url, route.path)
    }

    fn prepare(&self, route: &Route, headers: &Headers, body: Option<Value>) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .request(route.method.clone(), self.url(route))
            .header(reqwest::header::USER_AGENT, USER_AGENT);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        request
    }
}

impl Default for RestClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for RestClient {
    async fn request(
        &self,
        route: Route,
        headers: &Headers,
        body: Option<Value>,
    ) -> Result<Value, HttpError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(HttpError::Closed);
        }

        let request = self.prepare(&route, headers, body);

        debug!("{route}");
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(HttpError::Unauthorized {
                message: error_message(status, &text),
            });
        }
        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                message: error_message(status, &text),
            });
        }

        decode_body(&text)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Decode a response body; empty bodies (204 No Content) become `null`
pub fn decode_body(text: &str) -> Result<Value, HttpError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(text)?)
}

/// Prefer Discord's `{"message": ...}` error text over the raw body
fn error_message(status: StatusCode, text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| format!("{}: {text}", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::BotAuthentication;
    use serde_json::json;

    #[test]
    fn test_url_joins_base_and_path() {
        let client = RestClient::with_base_url("http://localhost:8080/api/");
        assert_eq!(
            client.url(&Route::current_user()),
            "http://localhost:8080/api/users/@me"
        );
    }

    #[test]
    fn test_decode_empty_body_is_null() {
        assert_eq!(decode_body("").unwrap(), Value::Null);
        assert_eq!(decode_body("  \n").unwrap(), Value::Null);
    }

    #[test]
    fn test_decode_json_body() {
        assert_eq!(decode_body(r#"{"id":"1"}"#).unwrap(), json!({"id": "1"}));
        assert!(matches!(decode_body("not json"), Err(HttpError::Decode(_))));
    }

    #[test]
    fn test_error_message_prefers_discord_message() {
        let message = error_message(StatusCode::UNAUTHORIZED, r#"{"message": "401: Unauthorized", "code": 0}"#);
        assert_eq!(message, "401: Unauthorized");
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "oops"), "502: oops");
    }

    #[test]
    fn test_requests_carry_user_agent_and_auth() {
        let client = RestClient::new();
        let headers = BotAuthentication::new("tok").headers();
        let request = client
            .prepare(&Route::global_commands("42"), &headers, Some(json!([])))
            .build()
            .unwrap();

        let user_agent = request.headers()[reqwest::header::USER_AGENT].to_str().unwrap();
        assert!(user_agent.starts_with("DiscordBot ("));
        assert!(user_agent.ends_with(&format!("{})", env!("CARGO_PKG_VERSION"))));
        assert_eq!(request.headers()["Authorization"], "Bot tok");
        assert_eq!(request.method(), &reqwest::Method::PUT);
        assert_eq!(request.url().as_str(), "https://discord.com/api/v10/applications/42/commands");
    }

    #[tokio::test]
    async fn test_closed_client_rejects_requests() {
        let client = RestClient::new();
        client.close().await;
        let result = client
            .request(Route::current_user(), &Headers::new(), None)
            .await;
        assert!(matches!(result, Err(HttpError::Closed)));
    }
}
