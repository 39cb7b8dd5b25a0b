//! Dispatcher/worker configuration.

use serde::{Deserialize, Serialize};

/// Background job dispatcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Shared secret expected in the `x-scheduler-secret` header of
    /// trigger requests.
    pub scheduler_secret: String,
    /// Default attempt ceiling for jobs enqueued without an explicit one.
    #[serde(default = "default_max_attempts")]
    pub default_max_attempts: i32,
    /// Whether the in-process cron ticker is enabled. Deployments with an
    /// external cron/webhook scheduler leave this off.
    #[serde(default)]
    pub ticker_enabled: bool,
    /// Cron expression for the in-process ticker (seconds granularity).
    #[serde(default = "default_tick_schedule")]
    pub tick_schedule: String,
    /// Whether completed stages fire the inline self-trigger so the next
    /// stage runs without waiting for the next scheduler tick. Meant for
    /// single-process dev/test deployments.
    #[serde(default)]
    pub inline_trigger: bool,
}

fn default_max_attempts() -> i32 {
    3
}

fn default_tick_schedule() -> String {
    // Every 10 seconds.
    "*/10 * * * * *".to_string()
}
