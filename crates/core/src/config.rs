//! Scheduling engine configuration.
//!
//! Parsed once at startup. Anything missing or malformed is a
//! [`CoreError::Configuration`]; the warning threshold has no default
//! because a wrong one silently hides due vehicles.

use std::time::Duration;

use crate::error::CoreError;
use crate::resolver::ConflictPolicy;
use crate::schedule::WarningThreshold;

pub const ENV_WARNING_THRESHOLD: &str = "WARNING_THRESHOLD";
pub const ENV_CONFLICT_POLICY: &str = "CONFLICT_POLICY";
pub const ENV_STORE_TIMEOUT_SECS: &str = "STORE_TIMEOUT_SECS";

/// Default per-call store timeout.
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub warning_threshold: WarningThreshold,
    pub conflict_policy: ConflictPolicy,
    pub store_timeout: Duration,
}

impl ScheduleConfig {
    /// Load from environment variables.
    ///
    /// | Env Var              | Default     |
    /// |----------------------|-------------|
    /// | `WARNING_THRESHOLD`  | (required)  |
    /// | `CONFLICT_POLICY`    | `overwrite` |
    /// | `STORE_TIMEOUT_SECS` | `10`        |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_threshold = lookup(ENV_WARNING_THRESHOLD).ok_or_else(|| {
            CoreError::Configuration(format!("{ENV_WARNING_THRESHOLD} must be set"))
        })?;
        let warning_threshold =
            WarningThreshold::from_str_value(&raw_threshold).map_err(CoreError::Configuration)?;

        let conflict_policy = match lookup(ENV_CONFLICT_POLICY) {
            Some(raw) => {
                ConflictPolicy::from_str_value(raw.trim()).map_err(CoreError::Configuration)?
            }
            None => ConflictPolicy::default(),
        };

        let store_timeout_secs = match lookup(ENV_STORE_TIMEOUT_SECS) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                CoreError::Configuration(format!(
                    "{ENV_STORE_TIMEOUT_SECS} must be a positive integer, got '{raw}'"
                ))
            })?,
            None => DEFAULT_STORE_TIMEOUT_SECS,
        };
        if store_timeout_secs == 0 {
            return Err(CoreError::Configuration(format!(
                "{ENV_STORE_TIMEOUT_SECS} must be greater than zero"
            )));
        }

        Ok(Self {
            warning_threshold,
            conflict_policy,
            store_timeout: Duration::from_secs(store_timeout_secs),
        })
    }
}
