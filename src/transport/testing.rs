//! Scripted transport doubles shared by unit tests

use super::{
    EventDispatcher, Gateway, Headers, HttpClient, HttpError, Route, TransportError, CRITICAL,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One request as seen by [`MockHttp`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub route: Route,
    pub headers: Headers,
    pub body: Option<Value>,
}

/// HTTP client answering from a queue of canned responses.
///
/// Requests with no scripted response get `null`.
#[derive(Default)]
pub struct MockHttp {
    responses: Mutex<VecDeque<Result<Value, HttpError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    journal: Mutex<Option<Journal>>,
}

impl MockHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: Value) -> Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn fail(self, error: HttpError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn with_journal(self, journal: Journal) -> Self {
        *self.journal.lock().unwrap() = Some(journal);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn note(&self, entry: String) {
        if let Some(journal) = self.journal.lock().unwrap().as_ref() {
            journal.push(entry);
        }
    }
}

#[async_trait]
impl HttpClient for MockHttp {
    async fn request(
        &self,
        route: Route,
        headers: &Headers,
        body: Option<Value>,
    ) -> Result<Value, HttpError> {
        self.note(format!("http {route}"));
        self.requests.lock().unwrap().push(RecordedRequest {
            route,
            headers: headers.clone(),
            body,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Value::Null))
    }

    async fn close(&self) {
        self.note("http close".to_string());
    }
}

/// Gateway double that connects instantly (or fails) and exposes the
/// dispatcher it was handed so tests can inject events.
#[derive(Default)]
pub struct MockGateway {
    unauthorized: bool,
    critical: Option<String>,
    events: Mutex<Option<Arc<EventDispatcher>>>,
    journal: Mutex<Option<Journal>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unauthorized() -> Self {
        Self {
            unauthorized: true,
            ..Self::default()
        }
    }

    /// Connects, but reports the connection lost before returning
    pub fn critical_on_connect(reason: impl Into<String>) -> Self {
        Self {
            critical: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn with_journal(self, journal: Journal) -> Self {
        *self.journal.lock().unwrap() = Some(journal);
        self
    }

    pub fn events(&self) -> Option<Arc<EventDispatcher>> {
        self.events.lock().unwrap().clone()
    }

    fn note(&self, entry: &str) {
        if let Some(journal) = self.journal.lock().unwrap().as_ref() {
            journal.push(entry.to_string());
        }
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn connect(&self, events: Arc<EventDispatcher>) -> Result<(), TransportError> {
        self.note("gateway connect");
        if self.unauthorized {
            return Err(TransportError::Unauthorized("401: Unauthorized".to_string()));
        }
        if let Some(reason) = &self.critical {
            events.dispatch(CRITICAL, Value::String(reason.clone()));
        }
        *self.events.lock().unwrap() = Some(events);
        Ok(())
    }

    async fn close(&self) {
        self.note("gateway close");
    }
}

/// Shared, ordered log of transport activity
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}
