// Product updater alarm backed by tokio intervals.
//
// Responsibilities
// - Keep one recurring task per registered session on the given runtime.
// - On every tick run CHECK_FOR_UPDATES through the command processor and log the outcome.
// - Registering a session again replaces its task. Dropping the alarm stops every task.

use crate::modules::background::core::commands::Command;
use crate::modules::background::core::ports::{CommandProcessor, ProductUpdaterAlarm};
use crate::shared::core::session_id::SessionId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

// Used for the first tick when `now + period` does not fit the clock.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

pub struct IntervalProductUpdaterAlarm {
    runtime: Handle,
    processor: Arc<dyn CommandProcessor>,
    period: Duration,
    tasks: Mutex<HashMap<SessionId, JoinHandle<()>>>,
}

impl IntervalProductUpdaterAlarm {
    pub fn new(runtime: Handle, processor: Arc<dyn CommandProcessor>, period: Duration) -> Self {
        Self {
            runtime,
            processor,
            period,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    pub fn registered(&self) -> Vec<SessionId> {
        let mut sessions: Vec<SessionId> = self.tasks().keys().copied().collect();
        sessions.sort();
        sessions
    }

    pub fn cancel(&self, session_id: SessionId) -> bool {
        match self.tasks().remove(&session_id) {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    fn tasks(&self) -> MutexGuard<'_, HashMap<SessionId, JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProductUpdaterAlarm for IntervalProductUpdaterAlarm {
    fn register(&self, session_id: SessionId) {
        let processor = Arc::clone(&self.processor);
        let period = self.period;
        let task = self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(first_tick(period), period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                debug!(%session_id, "product updater alarm fired");
                match processor.process(session_id, Command::CheckForUpdates).await {
                    Ok(event) => info!(%session_id, ?event, "product update check finished"),
                    Err(err) => warn!(%session_id, error = %err, "product update check failed"),
                }
            }
        });
        if let Some(previous) = self.tasks().insert(session_id, task) {
            previous.abort();
        }
        info!(%session_id, period_secs = period.as_secs(), "product updater alarm registered");
    }
}

fn first_tick(period: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(period).unwrap_or(now + FAR_FUTURE)
}

impl Drop for IntervalProductUpdaterAlarm {
    fn drop(&mut self) {
        for (_, task) in self.tasks().drain() {
            task.abort();
        }
    }
}
