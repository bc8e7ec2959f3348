//! Environment-sourced configuration.
//!
//! Read once at startup and passed into each component by value; nothing below
//! the binary touches the process environment.

use anyhow::{Context, Result};
use chrono_tz::Tz;
use std::str::FromStr;
use std::time::Duration;

/// One day either side of `now`
const MAX_WINDOW_MINUTES: u64 = 24 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub init_schema: bool,
    pub openai_api_key: Option<String>,
    /// Empty selects the public OpenAI endpoint
    pub openai_base_url: String,
    pub openai_model: String,
    pub chat_api_url: String,
    pub email_api_url: String,
    pub phone_country_code: String,
    pub timezone: Tz,
    pub poll_interval: Duration,
    pub reconnect_backoff: Duration,
    pub window_minutes: i64,
    pub http_timeout: Duration,
    pub enrichment_timeout: Duration,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Missing or blank keys fall
    /// back to their defaults; malformed values are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let timezone_name = get_or("REMINDER_TIMEZONE", "Asia/Kolkata");
        let timezone = Tz::from_str(&timezone_name)
            .map_err(|e| anyhow::anyhow!("Invalid REMINDER_TIMEZONE '{}': {}", timezone_name, e))?;

        let window_minutes = parse_number(&get, "WINDOW_MINUTES", 1)?;
        if !(1..=MAX_WINDOW_MINUTES).contains(&window_minutes) {
            anyhow::bail!("WINDOW_MINUTES must be between 1 and {MAX_WINDOW_MINUTES}");
        }

        let poll_interval = parse_number(&get, "POLL_INTERVAL_SECS", 60)?;
        if poll_interval == 0 {
            anyhow::bail!("POLL_INTERVAL_SECS must be at least 1");
        }

        Ok(Config {
            database_path: get_or("DATABASE_PATH", "reminders.db"),
            init_schema: parse_flag(&get, "INIT_SCHEMA")?,
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get_or("OPENAI_BASE_URL", ""),
            openai_model: get_or("OPENAI_MODEL", "gpt-4o-mini"),
            chat_api_url: get_or("CHAT_API_URL", "http://localhost:3000/send-message"),
            email_api_url: get_or("EMAIL_API_URL", "http://localhost:8000/sendEmail"),
            phone_country_code: get_or("PHONE_COUNTRY_CODE", "91"),
            timezone,
            poll_interval: Duration::from_secs(poll_interval),
            reconnect_backoff: Duration::from_secs(parse_number(
                &get,
                "RECONNECT_BACKOFF_SECS",
                300,
            )?),
            window_minutes: window_minutes as i64,
            http_timeout: Duration::from_secs(parse_number(&get, "HTTP_TIMEOUT_SECS", 15)?),
            enrichment_timeout: Duration::from_secs(parse_number(
                &get,
                "ENRICHMENT_TIMEOUT_SECS",
                30,
            )?),
            log_level: get_or("LOG_LEVEL", "info"),
        })
    }
}

fn parse_number<G>(get: &G, key: &str, default: u64) -> Result<u64>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("Invalid {key} value '{raw}'")),
        None => Ok(default),
    }
}

fn parse_flag<G>(get: &G, key: &str) -> Result<bool>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key).map(|v| v.to_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(anyhow::anyhow!("Invalid {} value '{}'", key, other)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_path, "reminders.db");
        assert_eq!(config.chat_api_url, "http://localhost:3000/send-message");
        assert_eq!(config.email_api_url, "http://localhost:8000/sendEmail");
        assert_eq!(config.phone_country_code, "91");
        assert_eq!(config.timezone, chrono_tz::Asia::Kolkata);
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.reconnect_backoff, Duration::from_secs(300));
        assert_eq!(config.window_minutes, 1);
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.openai_base_url, "");
        assert!(!config.init_schema);
    }

    #[test]
    fn test_out_of_range_intervals_rejected() {
        assert!(config_from(&[("POLL_INTERVAL_SECS", "0")]).is_err());
        assert!(config_from(&[("WINDOW_MINUTES", "1441")]).is_err());
        assert!(config_from(&[("WINDOW_MINUTES", "18446744073709551615")]).is_err());

        let widest = config_from(&[("WINDOW_MINUTES", "1440"), ("POLL_INTERVAL_SECS", "1")])
            .unwrap();
        assert_eq!(widest.window_minutes, 1440);
        assert_eq!(widest.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DATABASE_PATH", "/var/lib/reminders.db"),
            ("OPENAI_API_KEY", "sk-test"),
            ("REMINDER_TIMEZONE", "Europe/Berlin"),
            ("POLL_INTERVAL_SECS", "30"),
            ("INIT_SCHEMA", "yes"),
        ])
        .unwrap();
        assert_eq!(config.database_path, "/var/lib/reminders.db");
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.timezone, chrono_tz::Europe::Berlin);
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert!(config.init_schema);
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        let config = config_from(&[("OPENAI_API_KEY", "   ")]).unwrap();
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(config_from(&[("REMINDER_TIMEZONE", "Mars/Olympus")]).is_err());
        assert!(config_from(&[("POLL_INTERVAL_SECS", "soon")]).is_err());
        assert!(config_from(&[("WINDOW_MINUTES", "0")]).is_err());
        assert!(config_from(&[("WINDOW_MINUTES", "-5")]).is_err());
        assert!(config_from(&[("INIT_SCHEMA", "maybe")]).is_err());
    }
}
