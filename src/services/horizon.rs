use crate::error::LedgerError;
use crate::models::{LedgerOperation, LedgerTransaction, Network, OperationPage};
use anyhow::Result;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Operations fetched per transaction when looking for the payment.
/// A payment past this index is not seen.
pub const OPERATIONS_PAGE_LIMIT: u32 = 20;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin read-only client over the Horizon REST API.
#[derive(Clone, Debug)]
pub struct HorizonClient {
    client: reqwest::Client,
    base_url_override: Option<String>,
}

impl HorizonClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url_override: None,
        })
    }

    /// Send every request to `base_url` regardless of network.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn base_url(&self, network: Network) -> &str {
        self.base_url_override
            .as_deref()
            .unwrap_or_else(|| network.horizon_url())
    }

    pub async fn transaction(
        &self,
        network: Network,
        hash: &str,
    ) -> Result<LedgerTransaction, LedgerError> {
        let url = format!("{}/transactions/{}", self.base_url(network), hash);
        self.get_json(&url).await
    }

    pub async fn operations(
        &self,
        network: Network,
        hash: &str,
    ) -> Result<Vec<LedgerOperation>, LedgerError> {
        let url = format!(
            "{}/transactions/{}/operations?limit={}",
            self.base_url(network),
            hash,
            OPERATIONS_PAGE_LIMIT
        );
        let page: OperationPage = self.get_json(&url).await?;
        Ok(page.into_records())
    }

    pub async fn ping(&self, network: Network) -> bool {
        match self.client.get(self.base_url(network)).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!("Horizon ping failed: {}", e);
                false
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, LedgerError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(LedgerError::Status {
                status: response.status(),
                url: url.to_string(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}
