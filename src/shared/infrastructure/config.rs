// Runtime configuration for the background process.
//
// Purpose
// - Collect every tunable of the runner in one place, read from the environment.
//
// Responsibilities
// - Provide defaults for every setting.
// - Reject malformed or zero durations instead of silently falling back.

use anyhow::{Context, bail};
use std::time::Duration;

pub const DEFAULT_SERVICE_WORKER_PATH: &str = "/service-worker.js";
pub const DEFAULT_REPLY_PLACEHOLDER: &str = "true";
pub const MAX_ALARM_PERIOD: Duration = Duration::from_secs(365 * 24 * 3_600);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundConfig {
    pub service_worker_path: String,
    pub migration_timeout: Duration,
    pub process_timeout: Duration,
    pub push_timeout: Duration,
    pub alarm_period: Duration,
    pub reply_placeholder: String,
    pub inbox_capacity: usize,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            service_worker_path: DEFAULT_SERVICE_WORKER_PATH.to_string(),
            migration_timeout: Duration::from_millis(30_000),
            process_timeout: Duration::from_millis(10_000),
            push_timeout: Duration::from_millis(10_000),
            alarm_period: Duration::from_secs(3_600),
            reply_placeholder: DEFAULT_REPLY_PLACEHOLDER.to_string(),
            inbox_capacity: 64,
        }
    }
}

impl BackgroundConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            service_worker_path: lookup("SERVICE_WORKER_PATH")
                .unwrap_or(defaults.service_worker_path),
            migration_timeout: duration(
                &lookup,
                "MIGRATION_TIMEOUT_MS",
                defaults.migration_timeout,
                Duration::from_millis,
            )?,
            process_timeout: duration(
                &lookup,
                "PROCESS_TIMEOUT_MS",
                defaults.process_timeout,
                Duration::from_millis,
            )?,
            push_timeout: duration(
                &lookup,
                "PUSH_TIMEOUT_MS",
                defaults.push_timeout,
                Duration::from_millis,
            )?,
            alarm_period: alarm_period(&lookup, defaults.alarm_period)?,
            reply_placeholder: lookup("REPLY_PLACEHOLDER").unwrap_or(defaults.reply_placeholder),
            inbox_capacity: positive(&lookup, "INBOX_CAPACITY", defaults.inbox_capacity as u64)?
                as usize,
        })
    }
}

fn duration(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
    unit: fn(u64) -> Duration,
) -> anyhow::Result<Duration> {
    match lookup(key) {
        Some(_) => Ok(unit(positive(lookup, key, 0)?)),
        None => Ok(default),
    }
}

fn alarm_period(
    lookup: &impl Fn(&str) -> Option<String>,
    default: Duration,
) -> anyhow::Result<Duration> {
    let period = duration(lookup, "ALARM_PERIOD_SECS", default, Duration::from_secs)?;
    if period > MAX_ALARM_PERIOD {
        bail!(
            "ALARM_PERIOD_SECS must be at most {} seconds",
            MAX_ALARM_PERIOD.as_secs()
        );
    }
    Ok(period)
}

fn positive(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> anyhow::Result<u64> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let value: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a positive integer, got {raw:?}"))?;
    if value == 0 {
        bail!("{key} must be greater than zero");
    }
    Ok(value)
}
