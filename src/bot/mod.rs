//! # Bot
//!
//! Owns the transports and the command registry, and sequences startup:
//! connect, fetch application metadata, register commands, arm the
//! interaction listener, then run until a critical signal.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Explicit lifecycle state machine and stop handles
//! - 1.1.0: Register commands and dispatch interactions
//! - 1.0.0: Connect, metadata pre-fetch and shutdown

pub mod state;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::watch;

use crate::commands::{
    Command, CommandBuilder, CommandDefaults, CommandRegistry, InteractionDispatcher,
    RegistrationReport,
};
use crate::core::{CloudyError, Config, Logger};
use crate::transport::{
    BotAuthentication, EventDispatcher, Gateway, HttpClient, HttpError, RestClient, Route,
    SerenityGateway, TransportError, CRITICAL, READY,
};

pub use state::{BotState, Lifecycle};

/// `GET /oauth2/applications/@me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /users/@me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotUser {
    pub id: String,
    pub username: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stops a running bot from anywhere
#[derive(Clone)]
pub struct StopHandle {
    events: Arc<EventDispatcher>,
}

impl StopHandle {
    pub fn stop(&self, reason: impl Into<String>) {
        self.events.dispatch(CRITICAL, Value::String(reason.into()));
    }
}

pub struct Bot {
    config: Config,
    authentication: BotAuthentication,
    http: Arc<dyn HttpClient>,
    gateway: Arc<dyn Gateway>,
    events: Arc<EventDispatcher>,
    registry: Arc<CommandRegistry>,
    defaults: CommandDefaults,
    lifecycle: Lifecycle,
    logger: Logger,
    application: Option<Application>,
    user: Option<BotUser>,
    registration: Option<RegistrationReport>,
    started_at: Option<DateTime<Utc>>,
}

impl Bot {
    /// A bot on the Discord REST API and a serenity gateway
    pub fn new(config: Config) -> Self {
        let http = Arc::new(RestClient::new());
        let gateway = Arc::new(SerenityGateway::new(
            config.token.clone(),
            config.intents,
            config.presence.clone(),
        ));
        Self::with_transport(config, http, gateway)
    }

    pub fn with_transport(
        config: Config,
        http: Arc<dyn HttpClient>,
        gateway: Arc<dyn Gateway>,
    ) -> Self {
        let logger = Logger::new("Bot", config.level_filter());
        let defaults = CommandDefaults::new(config.no_description_msg.clone(), logger.clone());
        Self {
            authentication: BotAuthentication::new(config.token.clone()),
            http,
            gateway,
            events: Arc::new(EventDispatcher::new()),
            registry: Arc::new(CommandRegistry::new(logger.child("Registry"))),
            defaults,
            lifecycle: Lifecycle::new(logger.child("Lifecycle")),
            logger,
            config,
            application: None,
            user: None,
            registration: None,
            started_at: None,
        }
    }

    /// Build a command with this bot's defaults and queue it for registration
    pub fn command(&mut self, builder: CommandBuilder) -> Result<(), CloudyError> {
        let command = builder.build(&self.defaults)?;
        self.add_command(command)
    }

    /// Queue an already built command.
    ///
    /// Only possible before the interaction listener is armed.
    pub fn add_command(&mut self, command: Command) -> Result<(), CloudyError> {
        self.registry_mut()?.add(command)
    }

    pub fn defaults(&self) -> &CommandDefaults {
        &self.defaults
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn events(&self) -> Arc<EventDispatcher> {
        Arc::clone(&self.events)
    }

    pub fn state(&self) -> BotState {
        self.lifecycle.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<BotState> {
        self.lifecycle.subscribe()
    }

    pub fn history(&self) -> &[BotState] {
        self.lifecycle.history()
    }

    pub fn application(&self) -> Option<&Application> {
        self.application.as_ref()
    }

    pub fn user(&self) -> Option<&BotUser> {
        self.user.as_ref()
    }

    pub fn registration(&self) -> Option<&RegistrationReport> {
        self.registration.as_ref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            events: Arc::clone(&self.events),
        }
    }

    /// 🛑 Signal a running bot to shut down
    pub fn stop(&self) {
        self.stop_handle().stop("Stop requested");
    }

    fn registry_mut(&mut self) -> Result<&mut CommandRegistry, CloudyError> {
        match Arc::get_mut(&mut self.registry) {
            Some(registry) => Ok(registry),
            None => Err(CloudyError::new(
                "Commands can't be changed once the interaction listener is armed",
                &self.logger,
            )),
        }
    }

    /// ⚡ Start the bot and run until a critical signal.
    pub async fn run(&mut self) -> Result<(), CloudyError> {
        if self.state() != BotState::Created {
            return Err(CloudyError::lifecycle(self.state(), BotState::Connecting, &self.logger));
        }

        // Armed before connecting so a stop during startup is not lost.
        let critical = self.events.wait_for(CRITICAL);

        if let Err(e) = self.start_up().await {
            self.close_transports().await;
            self.lifecycle.abort();
            return Err(e);
        }

        self.lifecycle.advance(BotState::Running)?;
        self.started_at = Some(Utc::now());
        self.logger.info("☁️ Cloudy is running!");

        let reason = match critical.await {
            Some(Value::String(reason)) => reason,
            Some(Value::Null) | None => "unknown".to_string(),
            Some(other) => other.to_string(),
        };
        self.logger.info("Cloudy is quitting...");
        self.logger.info(format!("Reason: {reason}"));

        self.lifecycle.advance(BotState::ShuttingDown)?;
        self.close_transports().await;
        self.logger.debug("Closing async loop...");
        self.lifecycle.advance(BotState::Stopped)?;
        Ok(())
    }

    async fn start_up(&mut self) -> Result<(), CloudyError> {
        self.lifecycle.advance(BotState::Connecting)?;
        self.connect().await?;

        self.lifecycle.advance(BotState::MetadataFetch)?;
        self.fetch_metadata().await?;

        self.lifecycle.advance(BotState::Registering)?;
        self.register_commands().await?;

        self.lifecycle.advance(BotState::ListenerArmed)?;
        self.arm_listener();
        Ok(())
    }

    async fn connect(&mut self) -> Result<(), CloudyError> {
        let ready_logger = self.logger.clone();
        self.events.add_listener(READY, move |_| {
            ready_logger.info("Shards are connected and READY!");
        });

        self.logger.debug("Shard manager connecting...");
        match self.gateway.connect(Arc::clone(&self.events)).await {
            Ok(()) => Ok(()),
            Err(TransportError::Unauthorized(message)) => {
                Err(CloudyError::unauthorized(message, &self.logger))
            }
            Err(TransportError::Gateway(message)) => Err(CloudyError::new(
                format!("Shard manager failed to connect: {message}"),
                &self.logger,
            )),
        }
    }

    async fn fetch_metadata(&mut self) -> Result<(), CloudyError> {
        let application: Application = self.get(Route::current_application()).await?;
        self.logger.debug("Application data requested!");

        let user: BotUser = self.get(Route::current_user()).await?;
        self.logger.debug("Bot's user object requested!");

        self.logger.info(format!(
            "Logged in as {} (application {})",
            user.username, application.id
        ));
        self.application = Some(application);
        self.user = Some(user);
        Ok(())
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, route: Route) -> Result<T, CloudyError> {
        let path = route.path.clone();
        let value = self
            .http
            .request(route, &self.authentication.headers(), None)
            .await
            .map_err(|e| self.http_error(e))?;
        serde_json::from_value(value).map_err(|e| {
            CloudyError::new(format!("Unexpected response from {path}: {e}"), &self.logger)
        })
    }

    fn http_error(&self, error: HttpError) -> CloudyError {
        match error {
            HttpError::Unauthorized { message } => CloudyError::unauthorized(message, &self.logger),
            other => CloudyError::http(other, &self.logger),
        }
    }

    async fn register_commands(&mut self) -> Result<(), CloudyError> {
        let application_id = match &self.application {
            Some(application) => application.id.clone(),
            None => {
                return Err(CloudyError::new(
                    "Application data must be fetched before registering commands",
                    &self.logger,
                ))
            }
        };
        let http = Arc::clone(&self.http);
        let authentication = self.authentication.clone();
        let guild_id = self.config.test_guild_id.clone();

        let report = self
            .registry_mut()?
            .register_all(http.as_ref(), &authentication, &application_id, guild_id.as_deref())
            .await?;
        self.registration = Some(report);
        Ok(())
    }

    fn arm_listener(&self) {
        let dispatcher = Arc::new(InteractionDispatcher::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.http),
            self.logger.child("Dispatcher"),
        ));
        dispatcher.attach(&self.events);
        self.logger.debug("Listening for interactions...");
    }

    async fn close_transports(&self) {
        self.logger.debug("Closing http client...");
        self.http.close().await;

        self.logger.debug("Closing shard manager...");
        self.gateway.close().await;
    }
}
