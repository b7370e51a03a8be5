// Shared test doubles for unit tests inside the crate.

use crate::modules::background::core::commands::Command;
use crate::modules::background::core::events::Event;
use crate::modules::background::core::ports::{
    CommandProcessor, DataMigrationService, MigrationError, ProcessingError,
};
use crate::shared::core::session_id::SessionId;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::{Mutex, oneshot};

pub fn text_payload(raw: &str) -> Value {
    Value::String(raw.to_string())
}

/// Answers every command with the same outcome and records what it was asked.
pub struct ScriptedProcessor {
    outcome: Result<Event, ProcessingError>,
    delay: Duration,
    calls: Mutex<Vec<(SessionId, Command)>>,
}

impl ScriptedProcessor {
    pub fn replying(event: Event) -> Self {
        Self {
            outcome: Ok(event),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ProcessingError) -> Self {
        Self {
            outcome: Err(error),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub async fn calls(&self) -> Vec<(SessionId, Command)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl CommandProcessor for ScriptedProcessor {
    async fn process(
        &self,
        session_id: SessionId,
        command: Command,
    ) -> Result<Event, ProcessingError> {
        self.calls.lock().await.push((session_id, command));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone()
    }
}

/// Migration that only resolves once the test opens the gate.
pub struct GatedMigration {
    session_id: SessionId,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl GatedMigration {
    pub fn new(session_id: SessionId) -> (Self, oneshot::Sender<()>) {
        let (open, gate) = oneshot::channel();
        (
            Self {
                session_id,
                gate: Mutex::new(Some(gate)),
            },
            open,
        )
    }
}

#[async_trait]
impl DataMigrationService for GatedMigration {
    async fn migrate(&self) -> Result<SessionId, MigrationError> {
        let gate = self.gate.lock().await.take();
        if let Some(gate) = gate {
            gate.await
                .map_err(|_| MigrationError::Backend("gate dropped".into()))?;
        }
        Ok(self.session_id)
    }
}
