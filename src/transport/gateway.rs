//! Serenity-backed gateway adapter
//!
//! Runs a serenity client purely as the shard transport. Gateway events are
//! re-encoded as JSON and handed to the [`EventDispatcher`].
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Announce the configured presence from `ready`
//! - 1.0.0: Initial serenity adapter

use super::{EventDispatcher, Gateway, TransportError, CRITICAL, INTERACTION_CREATE, READY};
use crate::core::config::Presence;
use async_trait::async_trait;
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use serenity::client::bridge::gateway::ShardManager;
use serenity::gateway::GatewayError;
use serenity::model::application::interaction::Interaction;
use serenity::model::gateway::{Activity, GatewayIntents, Ready};
use serenity::model::user::OnlineStatus;
use serenity::prelude::{Client, Context, EventHandler};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

type Connected = Arc<Mutex<Option<oneshot::Sender<Result<(), TransportError>>>>>;

pub struct SerenityGateway {
    token: String,
    intents: u64,
    presence: Presence,
    shard_manager: tokio::sync::Mutex<Option<Arc<serenity::prelude::Mutex<ShardManager>>>>,
}

impl SerenityGateway {
    pub fn new(token: impl Into<String>, intents: u64, presence: Presence) -> Self {
        Self {
            token: token.into(),
            intents,
            presence,
            shard_manager: tokio::sync::Mutex::new(None),
        }
    }
}

/// Map a presence status name to serenity's enum (unknown names stay online)
pub fn online_status(status: &str) -> OnlineStatus {
    match status.to_ascii_lowercase().as_str() {
        "idle" => OnlineStatus::Idle,
        "dnd" => OnlineStatus::DoNotDisturb,
        "invisible" => OnlineStatus::Invisible,
        "offline" => OnlineStatus::Offline,
        _ => OnlineStatus::Online,
    }
}

/// Activity and status announced once the shard is ready
pub fn presence_parts(presence: &Presence) -> (Option<Activity>, OnlineStatus) {
    let activity = presence.activity.as_deref().map(Activity::playing);
    (activity, online_status(&presence.status))
}

fn map_error(error: serenity::Error) -> TransportError {
    match error {
        serenity::Error::Gateway(GatewayError::InvalidAuthentication) => {
            TransportError::Unauthorized("Invalid authentication".to_string())
        }
        other => TransportError::Gateway(other.to_string()),
    }
}

/// Resolve the pending `connect` call, if it is still waiting
fn settle(connected: &Connected, result: Result<(), TransportError>) -> Result<(), Result<(), TransportError>> {
    let sender = connected
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .take();
    match sender {
        Some(sender) => {
            let _ = sender.send(result);
            Ok(())
        }
        None => Err(result),
    }
}

fn encode<T: Serialize>(event_name: &str, value: &T) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(payload) => Some(payload),
        Err(e) => {
            warn!("Failed to encode {event_name} payload: {e}");
            None
        }
    }
}

struct Forwarder {
    events: Arc<EventDispatcher>,
    connected: Connected,
    presence: Presence,
}

#[async_trait]
impl EventHandler for Forwarder {
    async fn ready(&self, ctx: Context, ready: Ready) {
        let (activity, status) = presence_parts(&self.presence);
        ctx.set_presence(activity, status).await;

        let _ = settle(&self.connected, Ok(()));
        if let Some(payload) = encode(READY, &ready) {
            self.events.dispatch(READY, payload);
        }
    }

    async fn interaction_create(&self, _ctx: Context, interaction: Interaction) {
        if let Some(payload) = encode(INTERACTION_CREATE, &interaction) {
            self.events.dispatch(INTERACTION_CREATE, payload);
        }
    }
}

#[async_trait]
impl Gateway for SerenityGateway {
    async fn connect(&self, events: Arc<EventDispatcher>) -> Result<(), TransportError> {
        let (tx, rx) = oneshot::channel();
        let connected: Connected = Arc::new(Mutex::new(Some(tx)));

        let handler = Forwarder {
            events: Arc::clone(&events),
            connected: Arc::clone(&connected),
            presence: self.presence.clone(),
        };

        let mut client = Client::builder(&self.token, GatewayIntents::from_bits_truncate(self.intents))
            .event_handler(handler)
            .await
            .map_err(map_error)?;
        *self.shard_manager.lock().await = Some(Arc::clone(&client.shard_manager));

        tokio::spawn(async move {
            let result = client.start().await;
            let reason = match &result {
                Ok(()) => "Gateway connection closed".to_string(),
                Err(e) => format!("Gateway connection failed: {e}"),
            };
            let outcome = result.map_err(map_error);
            // Once connected, losing the gateway is critical for the bot.
            if settle(&connected, outcome).is_err() {
                events.dispatch(CRITICAL, Value::String(reason));
            }
        });

        rx.await
            .unwrap_or_else(|_| Err(TransportError::Gateway("Gateway task ended early".to_string())))
    }

    async fn close(&self) {
        if let Some(manager) = self.shard_manager.lock().await.take() {
            debug!("Shutting down all shards");
            manager.lock().await.shutdown_all().await;
        }
    }
}
