//! Server configuration read from the environment.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use catalog_products::application::worker::WorkerConfig;
use serde::Serialize;

use crate::error::AppError;

/// Which half of the catalog this process serves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceRole {
    /// Accepts commands only; no read model.
    Command,
    /// Serves queries from a read model fed by the projection worker.
    Query,
    /// Both halves in one process.
    #[default]
    Combined,
}

impl ServiceRole {
    /// Whether command routes are mounted.
    #[must_use]
    pub fn serves_commands(self) -> bool {
        matches!(self, Self::Command | Self::Combined)
    }

    /// Whether query routes and the projection worker run.
    #[must_use]
    pub fn serves_queries(self) -> bool {
        matches!(self, Self::Query | Self::Combined)
    }

    /// Lower-case name as accepted in `SERVICE_ROLE`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Query => "query",
            Self::Combined => "combined",
        }
    }
}

impl fmt::Display for ServiceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "command" => Ok(Self::Command),
            "query" => Ok(Self::Query),
            "combined" => Ok(Self::Combined),
            other => Err(format!("expected command, query or combined, got {other:?}")),
        }
    }
}

/// Settings for one server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Interface to bind.
    pub host: String,
    /// TCP port to bind.
    pub port: u16,
    /// PostgreSQL event store; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Maximum pooled PostgreSQL connections.
    pub database_max_connections: u32,
    /// Routes and background work this process runs.
    pub role: ServiceRole,
    /// Projection worker polling.
    pub projection: WorkerConfig,
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a value does not parse, or if a split
    /// role is requested without a shared `DATABASE_URL`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let role: ServiceRole = parse_var(&lookup, "SERVICE_ROLE", ServiceRole::Combined)?;
        if role != ServiceRole::Combined && database_url.is_none() {
            return Err(AppError::Config(format!(
                "SERVICE_ROLE={role} requires DATABASE_URL; the in-memory store cannot be shared between processes"
            )));
        }

        let batch_size: usize = parse_var(&lookup, "PROJECTION_BATCH_SIZE", 256)?;
        if batch_size == 0 {
            return Err(AppError::Config(
                "PROJECTION_BATCH_SIZE must be at least 1".into(),
            ));
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var(&lookup, "PORT", 3000)?,
            database_url,
            database_max_connections: parse_var(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            role,
            projection: WorkerConfig {
                poll_interval: Duration::from_millis(parse_var(
                    &lookup,
                    "PROJECTION_POLL_INTERVAL_MS",
                    500,
                )?),
                batch_size,
            },
        })
    }

    /// Socket address built from `host` and `port`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the pair is not a valid address.
    pub fn bind_address(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} is invalid: {e}"))),
    }
}
