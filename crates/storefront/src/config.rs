//! Environment configuration and back-office shop settings.

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde_json::Value;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidEnvVar { name: String, reason: String },
}

/// Static configuration loaded once at startup.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the commerce backend, without a trailing slash.
    pub api_base: String,
    /// Where the persisted cart lives on disk.
    pub cart_path: PathBuf,
    /// Settings used until `GET /admin/config` succeeds, and as the base
    /// the fetched settings are merged over.
    pub default_settings: ShopSettings,
}

impl StorefrontConfig {
    /// Loads configuration from the environment, reading `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_base = get_required_env("SUGARPLUM_API_BASE")?;
        let api_base = Url::parse(&api_base)
            .map_err(|e| ConfigError::InvalidEnvVar {
                name: "SUGARPLUM_API_BASE".to_owned(),
                reason: e.to_string(),
            })?
            .to_string()
            .trim_end_matches('/')
            .to_owned();

        let cart_path =
            PathBuf::from(get_env_or_default("SUGARPLUM_CART_PATH", "spc_cart_v1.json"));

        let mut default_settings = ShopSettings::default();
        if let Some(rate) = get_optional_decimal("SUGARPLUM_SHIPPING_FLAT_RATE")? {
            default_settings.shipping_flat_rate = rate;
        }
        if let Some(threshold) = get_optional_decimal("SUGARPLUM_FREE_SHIPPING_THRESHOLD")? {
            default_settings.free_shipping_threshold = threshold;
        }

        Ok(Self {
            api_base,
            cart_path,
            default_settings,
        })
    }
}

fn get_required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_owned()))
}

fn get_env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

fn get_optional_decimal(name: &str) -> Result<Option<Decimal>, ConfigError> {
    match std::env::var(name) {
        Err(_) => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                name: name.to_owned(),
                reason: e.to_string(),
            }),
    }
}

/// Pricing knobs managed in the back office and fetched from
/// `GET /admin/config`. All dollar amounts.
#[derive(Debug, Clone, PartialEq)]
pub struct ShopSettings {
    pub shipping_flat_rate: Decimal,
    /// Subtotals at or above this ship free. Zero disables free shipping.
    pub free_shipping_threshold: Decimal,
    /// Fraction applied to subtotal plus shipping, e.g. `0.03`.
    pub convenience_fee_rate: Decimal,
    /// Fraction applied to the subtotal for shoppers in `taxable_region`.
    pub tax_rate: Decimal,
    /// Region code tax applies to, e.g. `"MO"`. `None` means no tax anywhere.
    pub taxable_region: Option<String>,
}

impl Default for ShopSettings {
    fn default() -> Self {
        Self {
            shipping_flat_rate: Decimal::new(695, 2),
            free_shipping_threshold: Decimal::new(75, 0),
            convenience_fee_rate: Decimal::ZERO,
            tax_rate: Decimal::ZERO,
            taxable_region: None,
        }
    }
}

impl ShopSettings {
    /// Overlays fields present in an `/admin/config` body onto `base`.
    ///
    /// The endpoint predates any schema: numbers sometimes arrive as
    /// strings, and absent or malformed fields keep their base value rather
    /// than failing the whole fetch.
    pub fn from_value(base: &Self, body: &Value) -> Self {
        let mut out = base.clone();
        if let Some(rate) = decimal_field(body, "shippingFlatRate") {
            out.shipping_flat_rate = rate;
        }
        if let Some(threshold) = decimal_field(body, "freeShippingThreshold") {
            out.free_shipping_threshold = threshold;
        }
        if let Some(rate) = decimal_field(body, "convenienceFeeRate") {
            out.convenience_fee_rate = rate;
        }
        if let Some(rate) = decimal_field(body, "taxRate") {
            out.tax_rate = rate;
        }
        if let Some(region) = body.get("taxableRegion") {
            out.taxable_region = region
                .as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned);
        }
        out
    }
}

fn decimal_field(body: &Value, key: &str) -> Option<Decimal> {
    match body.get(key)? {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
