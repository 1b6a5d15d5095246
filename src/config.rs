use crate::error::PaygateError;
use crate::models::{Network, PaymentTerms};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Loose option bag accepted by the gate factory.
///
/// Mirrors the JSON shape `{ price, assetCode, issuer?, network, destination, memo? }`.
/// Nothing here is trusted until [`PaygateOptions::validate`] has run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaygateOptions {
    pub price: Option<String>,
    pub asset_code: Option<String>,
    pub issuer: Option<String>,
    pub network: Option<String>,
    pub destination: Option<String>,
    pub memo: Option<String>,
}

impl PaygateOptions {
    /// Reads `{prefix}PRICE`, `{prefix}ASSET_CODE`, `{prefix}ISSUER`,
    /// `{prefix}NETWORK`, `{prefix}DESTINATION` and `{prefix}MEMO`.
    pub fn from_env(prefix: &str) -> Self {
        let var = |name: &str| std::env::var(format!("{}{}", prefix, name)).ok();

        Self {
            price: var("PRICE"),
            asset_code: var("ASSET_CODE"),
            issuer: var("ISSUER"),
            network: var("NETWORK"),
            destination: var("DESTINATION"),
            memo: var("MEMO"),
        }
    }

    pub fn validate(&self) -> Result<PaymentTerms, PaygateError> {
        let present = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let price = present(&self.price);
        let asset_code = present(&self.asset_code);
        let network = present(&self.network);
        let destination = present(&self.destination);

        let missing: Vec<&str> = [
            ("price", price.is_none()),
            ("assetCode", asset_code.is_none()),
            ("network", network.is_none()),
            ("destination", destination.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        let (Some(price), Some(asset_code), Some(network), Some(destination)) =
            (price, asset_code, network, destination)
        else {
            return Err(PaygateError::Config(format!(
                "missing required option(s): {}",
                missing.join(", ")
            )));
        };

        let network: Network = network.parse().map_err(PaygateError::Config)?;

        match price.parse::<f64>() {
            Ok(p) if p.is_finite() && p >= 0.0 => {}
            _ => return Err(PaygateError::Config(format!("Invalid price: {}", price))),
        }

        Ok(PaymentTerms {
            amount: price,
            asset_code,
            issuer: present(&self.issuer),
            network,
            destination,
            memo: present(&self.memo),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,

    // Payment terms for protected routes
    pub paygate: PaygateOptions,

    // Horizon (ledger explorer)
    pub horizon_url: Option<String>,
    pub horizon_timeout: Duration,

    // Replay protection, off unless a TTL is set
    pub redis_url: Option<String>,
    pub receipt_ttl: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT")?,

            paygate: PaygateOptions::from_env("PAYGATE_"),

            horizon_url: std::env::var("HORIZON_URL").ok(),
            horizon_timeout: Duration::from_secs(
                std::env::var("HORIZON_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .context("Invalid HORIZON_TIMEOUT_SECS")?,
            ),

            redis_url: std::env::var("REDIS_URL").ok(),
            receipt_ttl: std::env::var("RECEIPT_TTL_SECS")
                .ok()
                .map(|v| v.parse().map(Duration::from_secs))
                .transpose()
                .context("Invalid RECEIPT_TTL_SECS")?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.horizon_url {
            if !url.starts_with("http") {
                bail!("HORIZON_URL must be HTTP(S) URL");
            }
        }

        if self.horizon_timeout.is_zero() {
            bail!("HORIZON_TIMEOUT_SECS must be positive");
        }

        if matches!(self.receipt_ttl, Some(ttl) if ttl.is_zero()) {
            bail!("RECEIPT_TTL_SECS must be positive");
        }

        self.paygate
            .validate()
            .context("Invalid PAYGATE_* configuration")?;

        tracing::info!("Configuration validated");

        Ok(())
    }
}
