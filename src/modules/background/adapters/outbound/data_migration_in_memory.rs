// In memory implementation of the DataMigrationService port.
//
// Purpose
// - Support runner tests and local runs without persisted extension storage.
//
// Responsibilities
// - Mint the session id on the first migration and hand the same one out afterwards.

use crate::modules::background::core::ports::{DataMigrationService, MigrationError};
use crate::shared::core::session_id::SessionId;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::info;

#[derive(Default)]
pub struct InMemoryDataMigration {
    migrated: Mutex<Option<SessionId>>,
    attempts: AtomicUsize,
    is_offline: bool,
    never_resolves: bool,
}

impl InMemoryDataMigration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from state that was already migrated for `session_id`.
    pub fn migrated_as(session_id: SessionId) -> Self {
        Self {
            migrated: Mutex::new(Some(session_id)),
            ..Self::default()
        }
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    pub fn toggle_hang(&mut self) {
        self.never_resolves = !self.never_resolves;
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub async fn migrated(&self) -> Option<SessionId> {
        *self.migrated.lock().await
    }
}

#[async_trait::async_trait]
impl DataMigrationService for InMemoryDataMigration {
    async fn migrate(&self) -> Result<SessionId, MigrationError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.is_offline {
            return Err(MigrationError::Backend("Migration storage offline".into()));
        }
        if self.never_resolves {
            std::future::pending::<()>().await;
        }

        let mut migrated = self.migrated.lock().await;
        if let Some(session_id) = *migrated {
            return Ok(session_id);
        }
        let session_id = SessionId::generate();
        *migrated = Some(session_id);
        info!(%session_id, "persisted state migrated");
        Ok(session_id)
    }
}
