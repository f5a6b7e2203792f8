use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub db_gateway_url: String,
    pub db_api_key: String,
    pub db_timeout_secs: u64,
    pub id_allocation_attempts: u32,
    pub hospital_fee: f64,
    pub vat_rate: f64,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            db_gateway_url: env::var("HMS_DB_GATEWAY_URL")
                .unwrap_or_else(|_| {
                    warn!("HMS_DB_GATEWAY_URL not set, using empty value");
                    String::new()
                }),
            db_api_key: env::var("HMS_DB_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("HMS_DB_API_KEY not set, using empty value");
                    String::new()
                }),
            db_timeout_secs: parse_or("HMS_DB_TIMEOUT_SECS", 30),
            id_allocation_attempts: parse_or("HMS_ID_ALLOCATION_ATTEMPTS", 3),
            hospital_fee: parse_amount_or("HMS_HOSPITAL_FEE", 250.0),
            vat_rate: parse_amount_or("HMS_VAT_RATE", 0.0),
            port: parse_or("PORT", 3000),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.db_gateway_url.is_empty()
            && !self.db_api_key.is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_gateway_url: String::new(),
            db_api_key: String::new(),
            db_timeout_secs: 30,
            id_allocation_attempts: 3,
            hospital_fee: 250.0,
            vat_rate: 0.0,
            port: 3000,
        }
    }
}

fn parse_or<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

/// Money amounts and rates: finite and non-negative.
fn parse_amount_or(key: &str, default: f64) -> f64 {
    let value = parse_or(key, default);
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        warn!("{} must be a non-negative number, got {}, using default {}", key, value, default);
        default
    }
}
