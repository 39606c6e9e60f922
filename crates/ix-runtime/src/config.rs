//! # Hub Configuration
//!
//! Runtime parameters for the registry, reaper and dispatcher. Every value
//! has a default and can be overridden from the environment.

use crate::errors::RuntimeError;
use ix_core::OutcomeAggregation;
use std::env;
use std::time::Duration;

/// Default reaper period.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Complete hub configuration.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Period between expiry sweeps.
    pub sweep_interval: Duration,
    /// Drop notifications from automated originators before scheduling.
    pub drop_automated: bool,
    /// Threads of the default rayon worker pool.
    pub worker_threads: usize,
    /// Aggregation policy hosts should apply to message elements they
    /// build through the hub.
    pub aggregation: OutcomeAggregation,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            drop_automated: true,
            worker_threads: default_worker_threads(),
            aggregation: OutcomeAggregation::default(),
        }
    }
}

impl HubConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `IX_SWEEP_INTERVAL_MS`: Reaper period in milliseconds (default: 1000)
    /// - `IX_DROP_AUTOMATED`: Drop automated senders (default: true)
    /// - `IX_WORKER_THREADS`: Dispatch threads (default: available parallelism)
    /// - `IX_AGGREGATION`: `last_wins` or `most_terminal` (default: last_wins)
    ///
    /// # Errors
    ///
    /// `RuntimeError::Config` for values that are present but malformed.
    pub fn from_env() -> Result<Self, RuntimeError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing keys keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RuntimeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("IX_SWEEP_INTERVAL_MS") {
            let millis: u64 = raw.trim().parse().map_err(|_| RuntimeError::Config {
                key: "IX_SWEEP_INTERVAL_MS",
                reason: format!("expected milliseconds, got {raw:?}"),
            })?;
            config.sweep_interval = Duration::from_millis(millis);
        }

        if let Some(raw) = lookup("IX_DROP_AUTOMATED") {
            config.drop_automated = parse_bool(&raw).ok_or_else(|| RuntimeError::Config {
                key: "IX_DROP_AUTOMATED",
                reason: format!("expected true/false, got {raw:?}"),
            })?;
        }

        if let Some(raw) = lookup("IX_WORKER_THREADS") {
            config.worker_threads = raw.trim().parse().map_err(|_| RuntimeError::Config {
                key: "IX_WORKER_THREADS",
                reason: format!("expected a thread count, got {raw:?}"),
            })?;
        }

        if let Some(raw) = lookup("IX_AGGREGATION") {
            config.aggregation = match raw.trim().to_lowercase().as_str() {
                "last_wins" => OutcomeAggregation::LastWins,
                "most_terminal" => OutcomeAggregation::MostTerminal,
                _ => {
                    return Err(RuntimeError::Config {
                        key: "IX_AGGREGATION",
                        reason: format!("expected last_wins or most_terminal, got {raw:?}"),
                    })
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the runtime cannot operate with.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.sweep_interval.is_zero() {
            return Err(RuntimeError::Config {
                key: "sweep_interval",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.worker_threads == 0 {
            return Err(RuntimeError::Config {
                key: "worker_threads",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn default_worker_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
