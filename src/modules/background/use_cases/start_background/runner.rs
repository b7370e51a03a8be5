// Background runner: startup sequencing of the extension's background process.
//
// Order
// - Migrate persisted state; the migration yields the session id.
// - Start answering extension messages for that session.
// - Register the product updater alarm.
// - Register the service worker and enable push notifications, off the critical path.
//
// A failed or stalled migration leaves the runner Degraded with nothing else started.
// Push activation failures are logged and never stop the runner.

use crate::modules::background::core::ports::{
    CommandProcessor, DataMigrationService, MigrationError, ProductUpdaterAlarm,
    PushNotificationService, ServiceWorkerRegistry,
};
use crate::modules::background::use_cases::bridge_message::envelope::InboundEnvelope;
use crate::modules::background::use_cases::bridge_message::handler::MessageBridge;
use crate::modules::background::use_cases::start_background::push_activation::{
    PushActivationError, activate_push,
};
use crate::modules::background::use_cases::start_background::status::RunnerStatus;
use crate::shared::core::session_id::SessionId;
use crate::shared::infrastructure::config::BackgroundConfig;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartupError {
    #[error("data migration failed: {0}")]
    Migration(#[from] MigrationError),
}

#[derive(Clone)]
pub struct RunnerServices {
    pub migration: Arc<dyn DataMigrationService>,
    pub processor: Arc<dyn CommandProcessor>,
    pub alarm: Arc<dyn ProductUpdaterAlarm>,
    pub service_workers: Arc<dyn ServiceWorkerRegistry>,
    pub push: Arc<dyn PushNotificationService>,
}

/// Handles to everything the runner started for a session.
pub struct BackgroundSession {
    pub session_id: SessionId,
    pub listener: JoinHandle<()>,
    pub push_activation: JoinHandle<Result<(), PushActivationError>>,
}

pub struct Runner {
    runtime: Handle,
    config: BackgroundConfig,
    services: RunnerServices,
    status: watch::Sender<RunnerStatus>,
}

impl Runner {
    pub fn new(runtime: Handle, config: BackgroundConfig, services: RunnerServices) -> Self {
        let (status, _) = watch::channel(RunnerStatus::Idle);
        Self {
            runtime,
            config,
            services,
            status,
        }
    }

    pub fn status(&self) -> watch::Receiver<RunnerStatus> {
        self.status.subscribe()
    }

    pub async fn start(
        &self,
        inbox: mpsc::Receiver<InboundEnvelope>,
    ) -> Result<BackgroundSession, StartupError> {
        self.status.send_replace(RunnerStatus::Migrating);
        let session_id = match self.migrate().await {
            Ok(session_id) => session_id,
            Err(err) => {
                error!(error = %err, "data migration failed, background features stay inactive");
                self.status.send_replace(RunnerStatus::Degraded {
                    reason: err.to_string(),
                });
                return Err(err.into());
            }
        };
        info!(%session_id, "data migration complete");

        let bridge = Arc::new(MessageBridge::new(
            session_id,
            Arc::clone(&self.services.processor),
            self.config.process_timeout,
            self.config.reply_placeholder.clone(),
        ));
        let listener = self
            .runtime
            .spawn(bridge.listen(inbox, self.runtime.clone()));

        self.services.alarm.register(session_id);

        let push_activation = self.runtime.spawn(Self::run_push_activation(
            Arc::clone(&self.services.service_workers),
            Arc::clone(&self.services.push),
            self.config.service_worker_path.clone(),
            self.config.push_timeout,
            session_id,
        ));

        self.status
            .send_replace(RunnerStatus::Running { session_id });
        Ok(BackgroundSession {
            session_id,
            listener,
            push_activation,
        })
    }

    async fn migrate(&self) -> Result<SessionId, MigrationError> {
        let deadline = self.config.migration_timeout;
        match timeout(deadline, self.services.migration.migrate()).await {
            Ok(result) => result,
            Err(_) => Err(MigrationError::TimedOut(deadline.as_millis())),
        }
    }

    async fn run_push_activation(
        service_workers: Arc<dyn ServiceWorkerRegistry>,
        push: Arc<dyn PushNotificationService>,
        script_path: String,
        deadline: std::time::Duration,
        session_id: SessionId,
    ) -> Result<(), PushActivationError> {
        let result = activate_push(
            service_workers.as_ref(),
            push.as_ref(),
            &script_path,
            deadline,
            session_id,
        )
        .await;
        match &result {
            Ok(()) => info!(%session_id, "push notifications enabled"),
            Err(err) => warn!(%session_id, error = %err, "push notifications unavailable"),
        }
        result
    }
}
