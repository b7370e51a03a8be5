use crate::modules::background::adapters::outbound::data_migration_in_memory::InMemoryDataMigration;
use crate::modules::background::adapters::outbound::product_catalogue_in_memory::InMemoryProductCatalogue;
use crate::modules::background::adapters::outbound::product_updater_alarm_interval::IntervalProductUpdaterAlarm;
use crate::modules::background::adapters::outbound::push_notifications_in_memory::InMemoryPushNotifications;
use crate::modules::background::adapters::outbound::service_worker_in_memory::InMemoryServiceWorkerRegistry;
use crate::modules::background::use_cases::start_background::runner::{Runner, RunnerServices};
use crate::shared::infrastructure::config::BackgroundConfig;
use std::sync::Arc;
use tokio::runtime::Handle;

#[derive(Clone)]
pub struct BackgroundState {
    pub config: BackgroundConfig,
    pub services: RunnerServices,
    pub catalogue: Arc<InMemoryProductCatalogue>,
}

impl BackgroundState {
    /// Wires every port to its in memory adapter.
    pub fn in_memory(config: BackgroundConfig, runtime: &Handle) -> Self {
        let catalogue = Arc::new(InMemoryProductCatalogue::new());
        let alarm = Arc::new(IntervalProductUpdaterAlarm::new(
            runtime.clone(),
            catalogue.clone(),
            config.alarm_period,
        ));
        let services = RunnerServices {
            migration: Arc::new(InMemoryDataMigration::new()),
            processor: catalogue.clone(),
            alarm,
            service_workers: Arc::new(InMemoryServiceWorkerRegistry::new()),
            push: Arc::new(InMemoryPushNotifications::new()),
        };
        Self {
            config,
            services,
            catalogue,
        }
    }

    pub fn runner(&self, runtime: Handle) -> Runner {
        Runner::new(runtime, self.config.clone(), self.services.clone())
    }
}
