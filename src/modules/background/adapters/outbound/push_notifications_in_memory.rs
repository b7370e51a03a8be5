use crate::modules::background::core::ports::{PushError, PushNotificationService};
use crate::shared::core::session_id::SessionId;
use tokio::sync::Mutex;

/// Keeps the sessions push was enabled for; can be taken offline or made to stall.
#[derive(Default)]
pub struct InMemoryPushNotifications {
    enabled: Mutex<Vec<SessionId>>,
    is_offline: bool,
    never_resolves: bool,
}

impl InMemoryPushNotifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    pub fn toggle_hang(&mut self) {
        self.never_resolves = !self.never_resolves;
    }

    pub async fn enabled_for(&self) -> Vec<SessionId> {
        self.enabled.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl PushNotificationService for InMemoryPushNotifications {
    async fn enable_notifications(&self, session_id: SessionId) -> Result<(), PushError> {
        if self.is_offline {
            return Err(PushError::Backend("Push service offline".into()));
        }
        if self.never_resolves {
            std::future::pending::<()>().await;
        }
        let mut enabled = self.enabled.lock().await;
        if !enabled.contains(&session_id) {
            enabled.push(session_id);
        }
        Ok(())
    }
}
