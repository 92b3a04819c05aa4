use std::time::Duration;

use anyhow::{anyhow, Context};
use tickerboard_core::DashboardConfig;
use tickerboard_market_data::{AlphaVantageConfig, Credential};

const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_STAGGER_MS: u64 = 1_000;

/// Runtime settings read from the environment (and `.env`, if present).
#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: Credential,
    pub base_url: String,
    pub timeout: Duration,
    pub stagger: Duration,
    pub stagger_credential_refresh: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let api_key = Credential::new(&lookup("TICKERBOARD_API_KEY").unwrap_or_default());
        let base_url = lookup("TICKERBOARD_BASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_ms = parse_millis(&lookup, "TICKERBOARD_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?;
        let stagger_ms = parse_millis(&lookup, "TICKERBOARD_STAGGER_MS", DEFAULT_STAGGER_MS)?;
        let stagger_credential_refresh = match lookup("TICKERBOARD_STAGGER_CREDENTIAL_REFRESH") {
            Some(value) => parse_flag(&value)
                .ok_or_else(|| anyhow!("TICKERBOARD_STAGGER_CREDENTIAL_REFRESH: expected a boolean, got '{}'", value))?,
            None => false,
        };

        Ok(Self {
            api_key,
            base_url,
            timeout: Duration::from_millis(timeout_ms),
            stagger: Duration::from_millis(stagger_ms),
            stagger_credential_refresh,
        })
    }

    pub fn provider(&self) -> AlphaVantageConfig {
        AlphaVantageConfig {
            base_url: self.base_url.clone(),
            timeout: self.timeout,
        }
    }

    pub fn dashboard(&self) -> DashboardConfig {
        DashboardConfig {
            stagger: self.stagger,
            stagger_credential_refresh: self.stagger_credential_refresh,
            initial_credential: self.api_key.clone(),
            ..Default::default()
        }
    }
}

fn parse_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> anyhow::Result<u64> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{}: expected milliseconds, got '{}'", key, value)),
        None => Ok(default),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
