use axum::http::HeaderValue;
use railfleet_core::config::ScheduleConfig;
use railfleet_core::error::CoreError;

/// Server configuration loaded from environment variables.
///
/// Server fields have defaults suitable for local development. The
/// scheduling section has a required warning threshold; see
/// [`ScheduleConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Scheduling engine settings.
    pub schedule: ScheduleConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_var(&lookup, "PORT", "3000")?;
        let cors_origins = parse_origins(
            &lookup("CORS_ORIGINS").unwrap_or_else(|| "http://localhost:5173".into()),
        )?;
        let request_timeout_secs: u64 = parse_var(&lookup, "REQUEST_TIMEOUT_SECS", "30")?;
        let schedule = ScheduleConfig::from_lookup(&lookup)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            schedule,
        })
    }
}

fn parse_var<T, F>(lookup: &F, name: &str, default: &str) -> Result<T, CoreError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name).unwrap_or_else(|| default.into());
    raw.trim().parse().map_err(|_| {
        CoreError::Configuration(format!(
            "{name} must be a valid {}, got '{raw}'",
            std::any::type_name::<T>()
        ))
    })
}

/// Split a comma-separated origin list. Any entry that is not a valid header
/// value rejects the whole list.
fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, CoreError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| {
                CoreError::Configuration(format!("Invalid CORS origin '{origin}': {e}"))
            })
        })
        .collect()
}
