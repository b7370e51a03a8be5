// Service worker registration followed by push notification enabling.
//
// Push is only enabled once the worker is registered. Each step is bounded by the same
// deadline. Failures are returned to the caller, which logs them once and carries on.

use crate::modules::background::core::ports::{
    PushError, PushNotificationService, ServiceWorkerError, ServiceWorkerRegistry,
};
use crate::shared::core::session_id::SessionId;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PushActivationError {
    #[error("service worker registration failed: {0}")]
    ServiceWorker(#[from] ServiceWorkerError),

    #[error("enabling push notifications failed: {0}")]
    Push(#[from] PushError),
}

pub async fn activate_push(
    service_workers: &dyn ServiceWorkerRegistry,
    push: &dyn PushNotificationService,
    script_path: &str,
    deadline: Duration,
    session_id: SessionId,
) -> Result<(), PushActivationError> {
    let registration = match timeout(deadline, service_workers.register(script_path)).await {
        Ok(result) => result,
        Err(_) => Err(ServiceWorkerError::TimedOut(deadline.as_millis())),
    }?;
    debug!(%session_id, scope = %registration.scope, "service worker registered");

    match timeout(deadline, push.enable_notifications(session_id)).await {
        Ok(result) => result?,
        Err(_) => return Err(PushError::TimedOut(deadline.as_millis()).into()),
    }
    Ok(())
}
