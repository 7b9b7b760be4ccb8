use crate::errors::ConfigError;
use chrono::{Datelike, Local};
use reqwest::Url;
use std::{env, str::FromStr, time::Duration};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port: u16,
    pub api_base_url: Url,
    pub request_timeout: Duration,
    pub initial_year: i32,
    pub initial_month: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup; unset keys fall back to
    /// defaults and the current local month.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let today = Local::now().date_naive();

        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let api_url = lookup("STATS_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_base_url = Url::parse(&api_url).map_err(|_| ConfigError::Invalid {
            name: "STATS_API_URL",
            value: api_url.clone(),
        })?;
        let timeout_secs = parse_or(&lookup, "STATS_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let initial_year = parse_or(&lookup, "DASHBOARD_YEAR", today.year())?;
        let initial_month = parse_or(&lookup, "DASHBOARD_MONTH", today.month())?;
        if !(1..=12).contains(&initial_month) {
            return Err(ConfigError::MonthOutOfRange(initial_month));
        }

        Ok(Self {
            port,
            api_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            initial_year,
            initial_month,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
