use std::{env, str::FromStr, time::Duration};

use chrono_tz::Tz;
use log::LevelFilter;
use thiserror::Error;

use crate::util::{
    HOST, PORT, VAR_ALADHAN_BASE_URL, VAR_DEFAULT_METHOD, VAR_FALLBACK_TIMEZONE,
    VAR_GEOLOCATION_BASE_URL, VAR_LOG_LEVEL, VAR_UPSTREAM_TIMEOUT_SECS,
};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_ALADHAN_BASE_URL: &str = "https://api.aladhan.com/v1";
const DEFAULT_GEOLOCATION_BASE_URL: &str = "https://ipapi.co";
const DEFAULT_FALLBACK_TIMEZONE: Tz = Tz::Asia__Jakarta;
const DEFAULT_METHOD: u32 = 2;
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid value for {var}: {value:?}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub aladhan_base_url: String,
    pub geolocation_base_url: String,
    /// Zone used when neither the caller nor the provider names one.
    pub fallback_timezone: Tz,
    /// Calculation method passed upstream when the caller gives none.
    pub default_method: u32,
    pub upstream_timeout: Duration,
    pub log_level: LevelFilter,
}

impl AppConfig {
    pub fn from_env() -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        Ok(AppConfig {
            host: lookup(HOST).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&lookup, PORT, DEFAULT_PORT)?,
            aladhan_base_url: base_url(lookup(VAR_ALADHAN_BASE_URL), DEFAULT_ALADHAN_BASE_URL),
            geolocation_base_url: base_url(lookup(VAR_GEOLOCATION_BASE_URL), DEFAULT_GEOLOCATION_BASE_URL),
            fallback_timezone: parse_or(&lookup, VAR_FALLBACK_TIMEZONE, DEFAULT_FALLBACK_TIMEZONE)?,
            default_method: parse_or(&lookup, VAR_DEFAULT_METHOD, DEFAULT_METHOD)?,
            upstream_timeout: Duration::from_secs(parse_or(
                &lookup,
                VAR_UPSTREAM_TIMEOUT_SECS,
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            )?),
            log_level: parse_or(&lookup, VAR_LOG_LEVEL, LevelFilter::Info)?,
        })
    }
}

fn parse_or<T, F>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError { var, value }),
        None => Ok(default),
    }
}

fn base_url(value: Option<String>, default: &str) -> String {
    value
        .as_deref()
        .unwrap_or(default)
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config(&[]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5000);
        assert_eq!(config.aladhan_base_url, "https://api.aladhan.com/v1");
        assert_eq!(config.geolocation_base_url, "https://ipapi.co");
        assert_eq!(config.fallback_timezone, Tz::Asia__Jakarta);
        assert_eq!(config.default_method, 2);
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            (PORT, "8080"),
            (VAR_ALADHAN_BASE_URL, "http://localhost:1234/v1/"),
            (VAR_FALLBACK_TIMEZONE, "Europe/Istanbul"),
            (VAR_DEFAULT_METHOD, "13"),
            (VAR_LOG_LEVEL, "debug"),
            (HOST, "  "),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.aladhan_base_url, "http://localhost:1234/v1");
        assert_eq!(config.fallback_timezone, Tz::Europe__Istanbul);
        assert_eq!(config.default_method, 13);
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            config(&[(VAR_FALLBACK_TIMEZONE, "Nowhere/Special")]).unwrap_err(),
            ConfigError { var: VAR_FALLBACK_TIMEZONE, value: "Nowhere/Special".to_string() }
        );
        assert_eq!(config(&[(PORT, "70000")]).unwrap_err().var, PORT);
        assert_eq!(config(&[(VAR_DEFAULT_METHOD, "-1")]).unwrap_err().var, VAR_DEFAULT_METHOD);
    }
}
