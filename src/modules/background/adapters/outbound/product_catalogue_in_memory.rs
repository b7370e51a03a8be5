// In memory command processor backed by a per-session set of tracked products.
//
// Purpose
// - Give the background process a working CommandProcessor without remote storage.
//
// Responsibilities
// - Answer every Command with its matching Event.
// - Reject empty product ids, duplicate tracking and untracking unknown products.

use crate::modules::background::core::commands::Command;
use crate::modules::background::core::events::Event;
use crate::modules::background::core::ports::{CommandProcessor, ProcessingError};
use crate::shared::core::session_id::SessionId;
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryProductCatalogue {
    tracked: RwLock<HashMap<SessionId, BTreeSet<String>>>,
    delay_ms: AtomicU64,
    is_offline: bool,
}

impl InMemoryProductCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    pub fn set_delay_ms(&self, ms: u64) {
        self.delay_ms.store(ms, Ordering::SeqCst);
    }

    pub async fn tracked_for(&self, session_id: SessionId) -> Vec<String> {
        self.tracked
            .read()
            .await
            .get(&session_id)
            .map(|products| products.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn track(
        &self,
        session_id: SessionId,
        product_id: String,
    ) -> Result<Event, ProcessingError> {
        let product_id = normalize(product_id)?;
        let mut guard = self.tracked.write().await;
        if !guard.entry(session_id).or_default().insert(product_id.clone()) {
            return Err(ProcessingError::Domain(format!(
                "product {product_id} is already tracked"
            )));
        }
        Ok(Event::ProductTracked { product_id })
    }

    async fn untrack(
        &self,
        session_id: SessionId,
        product_id: String,
    ) -> Result<Event, ProcessingError> {
        let product_id = normalize(product_id)?;
        let mut guard = self.tracked.write().await;
        let removed = guard
            .get_mut(&session_id)
            .is_some_and(|products| products.remove(&product_id));
        if !removed {
            return Err(ProcessingError::Domain(format!(
                "product {product_id} is not tracked"
            )));
        }
        Ok(Event::ProductUntracked { product_id })
    }
}

fn normalize(product_id: String) -> Result<String, ProcessingError> {
    let trimmed = product_id.trim();
    if trimmed.is_empty() {
        return Err(ProcessingError::Domain("product id must not be empty".into()));
    }
    Ok(trimmed.to_string())
}

#[async_trait::async_trait]
impl CommandProcessor for InMemoryProductCatalogue {
    async fn process(
        &self,
        session_id: SessionId,
        command: Command,
    ) -> Result<Event, ProcessingError> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.is_offline {
            return Err(ProcessingError::Backend("Product catalogue offline".into()));
        }

        match command {
            Command::Ping => Ok(Event::Pong {}),
            Command::GetSession => Ok(Event::Session { session_id }),
            Command::TrackProduct { product_id } => self.track(session_id, product_id).await,
            Command::UntrackProduct { product_id } => self.untrack(session_id, product_id).await,
            Command::ListTrackedProducts => Ok(Event::TrackedProducts {
                product_ids: self.tracked_for(session_id).await,
            }),
            Command::CheckForUpdates => Ok(Event::UpdatesChecked {
                checked: self.tracked_for(session_id).await.len(),
                checked_at: Utc::now().timestamp_millis(),
            }),
        }
    }
}
