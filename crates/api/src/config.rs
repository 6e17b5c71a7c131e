//! Process configuration, read from environment variables.

use std::net::SocketAddr;

use chrono::Duration;
use innkeep_observability::LogFormat;
use thiserror::Error;

const DEV_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be set together with {1}")]
    Incomplete(&'static str, &'static str),
}

/// Credentials for an admin account created at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl core::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_issuer: String,
    pub token_ttl: Duration,
    pub token_leeway_secs: u64,
    pub seed_demo_data: bool,
    pub bootstrap_admin: Option<AdminCredentials>,
    pub log_format: LogFormat,
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("token_issuer", &self.token_issuer)
            .field("token_ttl", &self.token_ttl)
            .field("token_leeway_secs", &self.token_leeway_secs)
            .field("seed_demo_data", &self.seed_demo_data)
            .field("bootstrap_admin", &self.bootstrap_admin)
            .field("log_format", &self.log_format)
            .finish_non_exhaustive()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 7070)),
            jwt_secret: DEV_SECRET.to_string(),
            token_issuer: "innkeep".to_string(),
            token_ttl: Duration::minutes(30),
            token_leeway_secs: 0,
            seed_demo_data: false,
            bootstrap_admin: None,
            log_format: LogFormat::Json,
        }
    }
}

impl ApiConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Unset variables fall back to [`ApiConfig::default`]; set-but-invalid
    /// values are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(secret) = lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            config.jwt_secret = secret;
        }
        if let Some(raw) = lookup("INNKEEP_BIND") {
            config.bind_addr = parse("INNKEEP_BIND", &raw)?;
        }
        if let Some(raw) = lookup("TOKEN_ISSUER") {
            config.token_issuer = raw;
        }
        if let Some(raw) = lookup("TOKEN_TTL_SECS") {
            let secs: i64 = parse("TOKEN_TTL_SECS", &raw)?;
            if secs <= 0 {
                return Err(invalid("TOKEN_TTL_SECS", &raw, "must be positive"));
            }
            config.token_ttl = Duration::seconds(secs);
        }
        if let Some(raw) = lookup("TOKEN_LEEWAY_SECS") {
            config.token_leeway_secs = parse("TOKEN_LEEWAY_SECS", &raw)?;
        }
        if let Some(raw) = lookup("SEED_DEMO_DATA") {
            config.seed_demo_data = parse("SEED_DEMO_DATA", &raw)?;
        }
        if let Some(raw) = lookup("LOG_FORMAT") {
            config.log_format = parse("LOG_FORMAT", &raw)?;
        }

        config.bootstrap_admin = match (lookup("ADMIN_USERNAME"), lookup("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminCredentials { username, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Incomplete("ADMIN_USERNAME", "ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Incomplete("ADMIN_PASSWORD", "ADMIN_USERNAME")),
        };

        Ok(config)
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_SECRET
    }
}

fn parse<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| invalid(name, raw, e.to_string()))
}

fn invalid(name: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr.port(), 7070);
        assert!(cfg.uses_dev_secret());
        assert_eq!(cfg.token_ttl, Duration::minutes(30));
        assert!(!cfg.seed_demo_data);
        assert!(cfg.bootstrap_admin.is_none());
    }

    #[test]
    fn reads_all_variables() {
        let cfg = config(&[
            ("JWT_SECRET", "prod-secret"),
            ("INNKEEP_BIND", "127.0.0.1:9000"),
            ("TOKEN_ISSUER", "hotel-api"),
            ("TOKEN_TTL_SECS", "60"),
            ("TOKEN_LEEWAY_SECS", "5"),
            ("SEED_DEMO_DATA", "true"),
            ("LOG_FORMAT", "pretty"),
            ("ADMIN_USERNAME", "root"),
            ("ADMIN_PASSWORD", "hunter2"),
        ])
        .unwrap();

        assert_eq!(cfg.jwt_secret, "prod-secret");
        assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(cfg.token_issuer, "hotel-api");
        assert_eq!(cfg.token_ttl, Duration::seconds(60));
        assert_eq!(cfg.token_leeway_secs, 5);
        assert!(cfg.seed_demo_data);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert_eq!(cfg.bootstrap_admin.unwrap().username, "root");
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(matches!(
            config(&[("TOKEN_TTL_SECS", "soon")]),
            Err(ConfigError::Invalid { name: "TOKEN_TTL_SECS", .. })
        ));
        assert!(matches!(
            config(&[("TOKEN_TTL_SECS", "0")]),
            Err(ConfigError::Invalid { name: "TOKEN_TTL_SECS", .. })
        ));
        assert!(config(&[("SEED_DEMO_DATA", "yes please")]).is_err());
        assert!(config(&[("INNKEEP_BIND", "nowhere")]).is_err());
    }

    #[test]
    fn admin_credentials_come_in_pairs() {
        assert_eq!(
            config(&[("ADMIN_USERNAME", "root")]).unwrap_err(),
            ConfigError::Incomplete("ADMIN_USERNAME", "ADMIN_PASSWORD")
        );
    }

    #[test]
    fn debug_output_hides_secrets() {
        let cfg = config(&[
            ("JWT_SECRET", "prod-secret"),
            ("ADMIN_USERNAME", "root"),
            ("ADMIN_PASSWORD", "hunter2"),
        ])
        .unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("prod-secret"));
        assert!(!rendered.contains("hunter2"));
    }
}
