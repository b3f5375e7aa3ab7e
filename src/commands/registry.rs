//! Command registry
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 2.0.0: Pending / registered split with bulk overwrite registration
//! - 1.0.0: Initial implementation for handler dispatch

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use super::command::Command;
use super::droplet::snowflake;
use crate::core::{CloudyError, Logger};
use crate::transport::{BotAuthentication, HttpClient, HttpError, Route};

/// Outcome of matching a bulk overwrite response against pending commands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationReport {
    /// `(id, name)` of every command that is now dispatchable
    pub registered: Vec<(String, String)>,
    /// Submitted names Discord did not return; they stay pending
    pub unmatched: Vec<String>,
    /// Names Discord returned that were never submitted
    pub unexpected: Vec<String>,
}

impl RegistrationReport {
    pub fn is_complete(&self) -> bool {
        self.unmatched.is_empty() && self.unexpected.is_empty()
    }
}

/// Declared commands, before and after Discord assigns them ids.
///
/// Pending commands are keyed by name, registered ones by interaction id.
/// A command is only dispatchable once registered.
pub struct CommandRegistry {
    pending: BTreeMap<String, Command>,
    registered: HashMap<String, Command>,
    logger: Logger,
}

impl CommandRegistry {
    pub fn new(logger: Logger) -> Self {
        Self {
            pending: BTreeMap::new(),
            registered: HashMap::new(),
            logger,
        }
    }

    /// Queue a command for registration. Names must be unique.
    pub fn add(&mut self, command: Command) -> Result<(), CloudyError> {
        let taken = self.pending.contains_key(command.name())
            || self.registered.values().any(|c| c.name() == command.name());
        if taken {
            return Err(CloudyError::duplicate_command(command.name(), &self.logger));
        }
        self.logger
            .debug(format!("Command '{}' declared", command.name()));
        self.pending.insert(command.name().to_string(), command);
        Ok(())
    }

    /// Look up a registered command by its interaction id
    pub fn get(&self, id: &str) -> Option<&Command> {
        self.registered.get(id)
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.pending.contains_key(name)
    }

    pub fn pending(&self) -> impl Iterator<Item = &Command> {
        self.pending.values()
    }

    pub fn registered(&self) -> impl Iterator<Item = (&String, &Command)> {
        self.registered.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn registered_len(&self) -> usize {
        self.registered.len()
    }

    /// Total number of declared commands
    pub fn len(&self) -> usize {
        self.pending.len() + self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wire payloads of every pending command
    pub fn payloads(&self) -> Vec<Value> {
        self.pending.values().map(Command::to_payload).collect()
    }

    /// Register every pending command with one bulk overwrite call.
    ///
    /// Scoped to `guild_id` when given, global otherwise. The response is
    /// matched back by name; see [`CommandRegistry::apply_response`].
    pub async fn register_all(
        &mut self,
        http: &dyn HttpClient,
        auth: &BotAuthentication,
        application_id: &str,
        guild_id: Option<&str>,
    ) -> Result<RegistrationReport, CloudyError> {
        let route = match guild_id {
            Some(guild_id) => Route::guild_commands(application_id, guild_id),
            None => Route::global_commands(application_id),
        };

        let payloads = self.payloads();
        self.logger.debug(format!(
            "Registering {} command(s) via {route}...",
            payloads.len()
        ));

        let response = http
            .request(route, &auth.headers(), Some(Value::Array(payloads)))
            .await
            .map_err(|e| match e {
                HttpError::Unauthorized { message } => {
                    CloudyError::unauthorized(message, &self.logger)
                }
                other => CloudyError::http(other, &self.logger),
            })?;

        let report = self.apply_response(&response)?;
        match guild_id {
            Some(guild_id) => self.logger.info(format!(
                "Guild slash commands registered for guild {guild_id} ({} commands)",
                report.registered.len()
            )),
            None => self.logger.info(format!(
                "Global slash commands registered successfully ({} commands)",
                report.registered.len()
            )),
        }
        Ok(report)
    }

    /// Move pending commands whose name appears in `response` to registered.
    ///
    /// Unmatched commands stay pending and are reported with a warning.
    pub fn apply_response(&mut self, response: &Value) -> Result<RegistrationReport, CloudyError> {
        let entries = response.as_array().ok_or_else(|| {
            CloudyError::new(
                format!("Expected a command list from Discord, got: {response}"),
                &self.logger,
            )
        })?;

        let mut report = RegistrationReport::default();
        for entry in entries {
            let name = entry.get("name").and_then(Value::as_str);
            let id = entry.get("id").and_then(snowflake);
            let (name, id) = match (name, id) {
                (Some(name), Some(id)) => (name, id),
                _ => {
                    self.logger
                        .warn(format!("Ignoring malformed registration entry: {entry}"));
                    continue;
                }
            };

            match self.pending.remove(name) {
                Some(command) => {
                    self.logger
                        .debug(format!("Command '{name}' registered with id {id}"));
                    report.registered.push((id.clone(), name.to_string()));
                    self.registered.insert(id, command);
                }
                None => {
                    self.logger.warn(format!(
                        "Discord returned command '{name}' ({id}) which was not submitted"
                    ));
                    report.unexpected.push(name.to_string());
                }
            }
        }

        for name in self.pending.keys() {
            self.logger.warn(format!(
                "Command '{name}' was not acknowledged by Discord and cannot be invoked"
            ));
            report.unmatched.push(name.clone());
        }

        Ok(report)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new(Logger::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::callback::callback;
    use crate::commands::command::CommandDefaults;
    use crate::transport::testing::MockHttp;
    use reqwest::Method;
    use serde_json::json;

    fn command(name: &str) -> Command {
        Command::builder(callback(name, &["droplet"], |_, _| async { Ok(()) }))
            .build(&CommandDefaults::default())
            .unwrap()
    }

    fn registry_with(names: &[&str]) -> CommandRegistry {
        let mut registry = CommandRegistry::default();
        for name in names {
            registry.add(command(name)).unwrap();
        }
        registry
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = CommandRegistry::default();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_registry_add_pending() {
        let registry = registry_with(&["hello", "ping"]);
        assert_eq!(registry.pending_len(), 2);
        assert_eq!(registry.registered_len(), 0);
        assert!(registry.is_pending("hello"));
        assert!(registry.get("hello").is_none());
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = registry_with(&["hello"]);
        let result = registry.add(command("hello"));
        assert!(matches!(result, Err(CloudyError::DuplicateCommand { .. })));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_apply_response_matches_by_name() {
        let mut registry = registry_with(&["hello", "ping"]);
        let report = registry
            .apply_response(&json!([
                { "id": "222", "name": "ping", "type": 1 },
                { "id": "111", "name": "hello", "type": 1 }
            ]))
            .unwrap();

        assert!(report.is_complete());
        assert_eq!(registry.get("111").map(Command::name), Some("hello"));
        assert_eq!(registry.get("222").map(Command::name), Some("ping"));
        assert_eq!(registry.pending_len(), 0);
    }

    #[test]
    fn test_apply_response_leaves_missing_pending() {
        let mut registry = registry_with(&["hello", "ping"]);
        let report = registry
            .apply_response(&json!([{ "id": "111", "name": "hello" }]))
            .unwrap();

        assert_eq!(report.unmatched, vec!["ping"]);
        assert!(registry.is_pending("ping"));
        assert!(registry.registered().all(|(_, c)| c.name() != "ping"));
    }

    #[test]
    fn test_apply_response_reports_unexpected() {
        let mut registry = registry_with(&["hello"]);
        let report = registry
            .apply_response(&json!([
                { "id": "111", "name": "hello" },
                { "id": "333", "name": "stale" },
                { "name": "no-id" }
            ]))
            .unwrap();
        assert_eq!(report.unexpected, vec!["stale"]);
        assert_eq!(registry.registered_len(), 1);
    }

    #[test]
    fn test_apply_response_rejects_non_array() {
        let mut registry = registry_with(&["hello"]);
        assert!(registry.apply_response(&json!({"message": "nope"})).is_err());
        assert!(registry.is_pending("hello"));
    }

    #[tokio::test]
    async fn test_register_all_global() {
        let mut registry = registry_with(&["hello", "ping"]);
        let http = MockHttp::new().respond(json!([
            { "id": "111", "name": "hello" },
            { "id": "222", "name": "ping" }
        ]));

        let report = registry
            .register_all(&http, &BotAuthentication::new("tok"), "42", None)
            .await
            .unwrap();

        assert_eq!(report.registered.len(), 2);
        let requests = http.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].route.method, Method::PUT);
        assert_eq!(requests[0].route.path, "/applications/42/commands");
        assert_eq!(
            requests[0].headers.get("Authorization").map(String::as_str),
            Some("Bot tok")
        );

        let body = requests[0].body.clone().unwrap();
        let mut names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["hello", "ping"]);
    }

    #[tokio::test]
    async fn test_register_all_guild_scope() {
        let mut registry = registry_with(&["hello"]);
        let http = MockHttp::new().respond(json!([{ "id": "111", "name": "hello" }]));

        registry
            .register_all(&http, &BotAuthentication::new("tok"), "42", Some("7"))
            .await
            .unwrap();

        assert_eq!(http.requests()[0].route.path, "/applications/42/guilds/7/commands");
        assert_eq!(registry.get("111").map(Command::name), Some("hello"));
    }

    #[tokio::test]
    async fn test_register_all_http_error() {
        let mut registry = registry_with(&["hello"]);
        let http = MockHttp::new().fail(HttpError::Status {
            status: 400,
            message: "Invalid Form Body".to_string(),
        });

        let result = registry
            .register_all(&http, &BotAuthentication::new("tok"), "42", None)
            .await;

        assert!(matches!(result, Err(CloudyError::Http(HttpError::Status { status: 400, .. }))));
        assert!(registry.is_pending("hello"));
    }
}
