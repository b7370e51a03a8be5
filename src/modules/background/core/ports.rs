// Ports define what the background runner needs from the outside world, without implementing it.
//
// Purpose
// - Describe the collaborators of the runner as traits: migration, command processing,
//   the product updater alarm, service worker registration and push notifications.
//
// Boundaries
// - No concrete input or output here. Adapters implement these traits in the adapters layer.
//
// Testing guidance
// - Every port has an in memory implementation that can be toggled offline.

use crate::modules::background::core::commands::Command;
use crate::modules::background::core::events::Event;
use crate::shared::core::session_id::SessionId;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MigrationError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("migration timed out after {0} ms")]
    TimedOut(u128),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProcessingError {
    #[error("domain rejected: {0}")]
    Domain(String),

    #[error("backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceWorkerError {
    #[error("registration of {script_path} failed: {reason}")]
    Registration { script_path: String, reason: String },

    #[error("service worker registration timed out after {0} ms")]
    TimedOut(u128),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PushError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("enabling push notifications timed out after {0} ms")]
    TimedOut(u128),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceWorkerRegistration {
    pub script_path: String,
    pub scope: String,
}

#[async_trait]
pub trait DataMigrationService: Send + Sync {
    /// Migrates persisted state once and yields the session it belongs to.
    async fn migrate(&self) -> Result<SessionId, MigrationError>;
}

#[async_trait]
pub trait CommandProcessor: Send + Sync {
    async fn process(&self, session_id: SessionId, command: Command)
    -> Result<Event, ProcessingError>;
}

/// Fire-and-forget registration of the recurring product update check.
pub trait ProductUpdaterAlarm: Send + Sync {
    fn register(&self, session_id: SessionId);
}

#[async_trait]
pub trait ServiceWorkerRegistry: Send + Sync {
    async fn register(
        &self,
        script_path: &str,
    ) -> Result<ServiceWorkerRegistration, ServiceWorkerError>;
}

#[async_trait]
pub trait PushNotificationService: Send + Sync {
    async fn enable_notifications(&self, session_id: SessionId) -> Result<(), PushError>;
}
