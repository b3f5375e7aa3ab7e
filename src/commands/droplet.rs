//! # Droplet
//!
//! The interaction context handed to a command callback. One droplet wraps
//! one raw `INTERACTION_CREATE` payload and lives only for that invocation.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.1.0: Add `respond` for channel message interaction responses
//! - 1.0.0: Initial payload accessors

use serde_json::{json, Value};
use std::sync::Arc;

use crate::transport::{Headers, HttpClient, HttpError, Route};

/// Interaction response type: reply with a channel message
pub const CHANNEL_MESSAGE_WITH_SOURCE: u64 = 4;

pub struct Droplet {
    payload: Value,
    http: Arc<dyn HttpClient>,
}

impl Droplet {
    pub fn new(payload: Value, http: Arc<dyn HttpClient>) -> Self {
        Self { payload, http }
    }

    /// The raw interaction payload
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn interaction_id(&self) -> Option<String> {
        self.payload.get("id").and_then(snowflake)
    }

    pub fn token(&self) -> Option<&str> {
        self.payload.get("token").and_then(Value::as_str)
    }

    pub fn application_id(&self) -> Option<String> {
        self.payload.get("application_id").and_then(snowflake)
    }

    pub fn guild_id(&self) -> Option<String> {
        self.payload.get("guild_id").and_then(snowflake)
    }

    pub fn channel_id(&self) -> Option<String> {
        self.payload.get("channel_id").and_then(snowflake)
    }

    /// Invoking user: `member.user` in guilds, `user` in DMs
    pub fn user_id(&self) -> Option<String> {
        self.payload
            .pointer("/member/user/id")
            .or_else(|| self.payload.pointer("/user/id"))
            .and_then(snowflake)
    }

    pub fn command_name(&self) -> Option<&str> {
        self.payload.pointer("/data/name").and_then(Value::as_str)
    }

    /// Reply to the interaction with a plain message
    pub async fn respond(&self, content: impl Into<String>) -> Result<(), HttpError> {
        self.respond_with(json!({ "content": content.into() })).await
    }

    /// Reply with a full message payload (`content`, `embeds`, `flags`, ...)
    pub async fn respond_with(&self, data: Value) -> Result<(), HttpError> {
        let (id, token) = match (self.interaction_id(), self.token()) {
            (Some(id), Some(token)) => (id, token.to_string()),
            _ => {
                return Err(HttpError::Status {
                    status: 400,
                    message: "interaction payload has no id or token".to_string(),
                })
            }
        };

        let body = json!({
            "type": CHANNEL_MESSAGE_WITH_SOURCE,
            "data": data,
        });
        self.http
            .request(Route::interaction_callback(&id, &token), &Headers::new(), Some(body))
            .await?;
        Ok(())
    }
}

/// Read a snowflake id sent either as a JSON string or a number
pub fn snowflake(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => id.as_u64().map(|id| id.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::MockHttp;
    use reqwest::Method;

    fn guild_payload() -> Value {
        json!({
            "id": "900",
            "application_id": 42,
            "type": 2,
            "token": "tok",
            "guild_id": "7",
            "channel_id": "8",
            "member": { "user": { "id": "55", "username": "rain" } },
            "data": { "id": "111", "name": "hello", "type": 1 }
        })
    }

    #[test]
    fn test_accessors() {
        let droplet = Droplet::new(guild_payload(), Arc::new(MockHttp::new()));
        assert_eq!(droplet.interaction_id().as_deref(), Some("900"));
        assert_eq!(droplet.application_id().as_deref(), Some("42"));
        assert_eq!(droplet.token(), Some("tok"));
        assert_eq!(droplet.guild_id().as_deref(), Some("7"));
        assert_eq!(droplet.channel_id().as_deref(), Some("8"));
        assert_eq!(droplet.user_id().as_deref(), Some("55"));
        assert_eq!(droplet.command_name(), Some("hello"));
    }

    #[test]
    fn test_dm_user() {
        let payload = json!({ "id": "1", "user": { "id": "66" } });
        let droplet = Droplet::new(payload, Arc::new(MockHttp::new()));
        assert_eq!(droplet.user_id().as_deref(), Some("66"));
        assert_eq!(droplet.guild_id(), None);
    }

    #[test]
    fn test_snowflake_forms() {
        assert_eq!(snowflake(&json!("123")).as_deref(), Some("123"));
        assert_eq!(snowflake(&json!(123)).as_deref(), Some("123"));
        assert_eq!(snowflake(&json!(null)), None);
        assert_eq!(snowflake(&json!(-1)), None);
    }

    #[tokio::test]
    async fn test_respond_posts_callback() {
        let http = Arc::new(MockHttp::new());
        let droplet = Droplet::new(guild_payload(), http.clone());

        droplet.respond("pong").await.unwrap();

        let requests = http.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].route.method, Method::POST);
        assert_eq!(requests[0].route.path, "/interactions/900/tok/callback");
        assert_eq!(
            requests[0].body,
            Some(json!({ "type": 4, "data": { "content": "pong" } }))
        );
    }

    #[tokio::test]
    async fn test_respond_without_token_fails() {
        let http = Arc::new(MockHttp::new());
        let droplet = Droplet::new(json!({ "id": "1" }), http.clone());
        assert!(droplet.respond("pong").await.is_err());
        assert!(http.requests().is_empty());
    }
}
