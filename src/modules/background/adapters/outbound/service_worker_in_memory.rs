use crate::modules::background::core::ports::{
    ServiceWorkerError, ServiceWorkerRegistration, ServiceWorkerRegistry,
};
use tokio::sync::Mutex;

/// Records service worker registrations instead of talking to a browser.
#[derive(Default)]
pub struct InMemoryServiceWorkerRegistry {
    registrations: Mutex<Vec<String>>,
    is_offline: bool,
    never_resolves: bool,
}

impl InMemoryServiceWorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    pub fn toggle_hang(&mut self) {
        self.never_resolves = !self.never_resolves;
    }

    pub async fn registrations(&self) -> Vec<String> {
        self.registrations.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl ServiceWorkerRegistry for InMemoryServiceWorkerRegistry {
    async fn register(
        &self,
        script_path: &str,
    ) -> Result<ServiceWorkerRegistration, ServiceWorkerError> {
        if self.is_offline {
            return Err(ServiceWorkerError::Registration {
                script_path: script_path.to_string(),
                reason: "Service worker registry offline".into(),
            });
        }
        if self.never_resolves {
            std::future::pending::<()>().await;
        }
        self.registrations.lock().await.push(script_path.to_string());
        Ok(ServiceWorkerRegistration {
            script_path: script_path.to_string(),
            scope: "/".to_string(),
        })
    }
}
