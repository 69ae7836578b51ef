use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CARROT_JWT_SECRET is unset or still a placeholder")]
    MissingSecret,
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Server settings read from `CARROT_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub session_hours: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parsed(&lookup, "CARROT_PORT", 3000)?;
        let session_hours = parsed(&lookup, "CARROT_SESSION_HOURS", 24)?;
        if session_hours <= 0 {
            return Err(ConfigError::Invalid {
                name: "CARROT_SESSION_HOURS",
                value: session_hours.to_string(),
            });
        }

        Ok(Self {
            jwt_secret: lookup("CARROT_JWT_SECRET").unwrap_or_default(),
            db_path: lookup("CARROT_DB_PATH").unwrap_or_else(|| "carrot.db".into()).into(),
            host: lookup("CARROT_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            session_hours,
        })
    }

    /// Only `serve` needs a signing secret; `migrate` runs without one.
    pub fn check_secret(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&self.jwt_secret.as_str()) {
            return Err(ConfigError::MissingSecret);
        }
        Ok(())
    }

    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        let value = format!("{}:{}", self.host, self.port);
        value
            .parse()
            .map_err(|_| ConfigError::Invalid { name: "CARROT_HOST", value })
    }
}

fn parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.db_path, PathBuf::from("carrot.db"));
        assert_eq!(config.port, 3000);
        assert_eq!(config.session_hours, 24);
        assert_eq!(config.addr().unwrap().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn placeholder_secret_is_rejected() {
        assert!(config(&[]).unwrap().check_secret().is_err());
        let placeholder = config(&[("CARROT_JWT_SECRET", "dev-secret-change-me")]).unwrap();
        assert!(placeholder.check_secret().is_err());
        let real = config(&[("CARROT_JWT_SECRET", "k3y-from-a-vault")]).unwrap();
        assert!(real.check_secret().is_ok());
    }

    #[test]
    fn invalid_numbers_are_reported() {
        assert!(matches!(
            config(&[("CARROT_PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "CARROT_PORT", .. })
        ));
        assert!(config(&[("CARROT_SESSION_HOURS", "0")]).is_err());
    }
}
