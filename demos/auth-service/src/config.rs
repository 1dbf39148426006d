//! Process configuration read from the environment.

use warden::prelude::SessionConfig;

const PORT: &str = "PORT";
const SERVICE_KEY: &str = "HARMONY_MICRO_SERVICES_KEY";
const SESSION_LIFETIME: &str = "SESSION_LIFETIME_SECS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is not a valid number: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub port: u16,
    pub service_key: String,
    pub session: SessionConfig,
}

impl ServiceConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads configuration through `lookup`.
    ///
    /// - `PORT` defaults to 8080
    /// - `HARMONY_MICRO_SERVICES_KEY` is required and must be non-empty
    /// - `SESSION_LIFETIME_SECS` defaults to 600
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let service_key = lookup(SERVICE_KEY)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::Missing(SERVICE_KEY))?;

        let port = parse_or(&lookup, PORT, 8080)?;
        let lifetime_secs =
            parse_or(&lookup, SESSION_LIFETIME, SessionConfig::default().lifetime_secs)?;

        Ok(Self {
            port,
            service_key,
            session: SessionConfig { lifetime_secs },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
