use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const TESTNET_HORIZON: &str = "https://horizon-testnet.stellar.org";
const MAINNET_HORIZON: &str = "https://horizon.stellar.org";

/// Stellar network a payment is expected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Testnet,
    Mainnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
        }
    }

    /// Base URL of the public Horizon instance for this network.
    pub fn horizon_url(&self) -> &'static str {
        match self {
            Network::Testnet => TESTNET_HORIZON,
            Network::Mainnet => MAINNET_HORIZON,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            other => Err(format!("Unknown network: {}", other)),
        }
    }
}

/// Price, asset and destination a protected resource requires.
///
/// Built once from validated configuration (see
/// [`PaygateOptions::validate`](crate::config::PaygateOptions::validate))
/// or parsed from a 402 response on the client side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTerms {
    pub amount: String,
    pub asset_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    pub network: Network,
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl PaymentTerms {
    /// Lumens are expected when the code is "XLM" (or empty) and no issuer is set.
    pub fn expects_native(&self) -> bool {
        (self.asset_code.is_empty() || self.asset_code == "XLM") && self.issuer.is_none()
    }

    /// Required amount as a float. Comparison is float based, never fixed point.
    pub fn required_amount(&self) -> Option<f64> {
        self.amount.trim().parse::<f64>().ok()
    }
}

/// Proof of payment the client attaches to its retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub transaction_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl PaymentReceipt {
    pub fn new(transaction_hash: impl Into<String>) -> Self {
        Self {
            transaction_hash: transaction_hash.into(),
            timestamp: Some(Utc::now().to_rfc3339()),
        }
    }

    pub fn without_timestamp(transaction_hash: impl Into<String>) -> Self {
        Self {
            transaction_hash: transaction_hash.into(),
            timestamp: None,
        }
    }
}
