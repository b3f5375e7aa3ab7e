//! Bot lifecycle states
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0

use std::fmt;
use tokio::sync::watch;

use crate::core::{CloudyError, Logger};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BotState {
    Created,
    Connecting,
    MetadataFetch,
    Registering,
    ListenerArmed,
    Running,
    ShuttingDown,
    Stopped,
}

impl BotState {
    /// The only state this one may advance to
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Created => Some(Self::Connecting),
            Self::Connecting => Some(Self::MetadataFetch),
            Self::MetadataFetch => Some(Self::Registering),
            Self::Registering => Some(Self::ListenerArmed),
            Self::ListenerArmed => Some(Self::Running),
            Self::Running => Some(Self::ShuttingDown),
            Self::ShuttingDown => Some(Self::Stopped),
            Self::Stopped => None,
        }
    }

    /// Between the start of `run` and shutdown
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Created | Self::ShuttingDown | Self::Stopped)
    }
}

impl fmt::Display for BotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "Created",
            Self::Connecting => "Connecting",
            Self::MetadataFetch => "MetadataFetch",
            Self::Registering => "Registering",
            Self::ListenerArmed => "ListenerArmed",
            Self::Running => "Running",
            Self::ShuttingDown => "ShuttingDown",
            Self::Stopped => "Stopped",
        };
        f.write_str(name)
    }
}

/// Enforces strictly sequential transitions and publishes the current state
pub struct Lifecycle {
    state: watch::Sender<BotState>,
    history: Vec<BotState>,
    logger: Logger,
}

impl Lifecycle {
    pub fn new(logger: Logger) -> Self {
        let (state, _) = watch::channel(BotState::Created);
        Self {
            state,
            history: vec![BotState::Created],
            logger,
        }
    }

    pub fn current(&self) -> BotState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<BotState> {
        self.state.subscribe()
    }

    /// Every state entered so far, in order
    pub fn history(&self) -> &[BotState] {
        &self.history
    }

    pub fn advance(&mut self, to: BotState) -> Result<(), CloudyError> {
        let from = self.current();
        if from.next() != Some(to) {
            return Err(CloudyError::lifecycle(from, to, &self.logger));
        }
        self.enter(to);
        Ok(())
    }

    /// Jump to `Stopped` after a fatal startup error
    pub fn abort(&mut self) {
        if self.current() != BotState::Stopped {
            self.enter(BotState::Stopped);
        }
    }

    fn enter(&mut self, to: BotState) {
        self.logger.debug(format!("{} -> {to}", self.current()));
        self.history.push(to);
        self.state.send_replace(to);
    }
}
