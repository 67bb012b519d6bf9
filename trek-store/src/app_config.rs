use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use trek_catalog::FeePolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub availability: AvailabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Without a URL the service runs on in-memory stores
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

/// Operator fee policy
#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    #[serde(default = "default_service_fee_rate")]
    pub service_fee_rate: Decimal,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            service_fee_rate: default_service_fee_rate(),
            tax_rate: default_tax_rate(),
        }
    }
}

impl PricingConfig {
    pub fn fee_policy(&self) -> FeePolicy {
        FeePolicy {
            service_fee_rate: self.service_fee_rate,
            tax_rate: self.tax_rate,
        }
    }
}

fn default_service_fee_rate() -> Decimal {
    FeePolicy::operator().service_fee_rate
}

fn default_tax_rate() -> Decimal {
    FeePolicy::operator().tax_rate
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AvailabilityConfig {
    /// Upstream scheduling service; local schedule data is used when unset
    pub base_url: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Developer overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `TREK__SERVER__PORT=8080`
            .add_source(config::Environment::with_prefix("TREK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
