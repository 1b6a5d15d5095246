use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use stellar_paygate::{
    client::{fetch_with_payment, PaymentHandler},
    models::{PaymentReceipt, PaymentTerms},
};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Uses `PAYMENT_TX_HASH` when set, otherwise asks for the hash of a
/// payment made from a wallet.
struct ManualPayment {
    preset_hash: Option<String>,
}

#[async_trait]
impl PaymentHandler for ManualPayment {
    async fn pay(&self, terms: &PaymentTerms) -> Result<Option<PaymentReceipt>> {
        println!("Payment required:");
        println!("   Amount:      {} {}", terms.amount, terms.asset_code);
        if let Some(issuer) = &terms.issuer {
            println!("   Issuer:      {}", issuer);
        }
        println!("   Network:     {}", terms.network);
        println!("   Destination: {}", terms.destination);
        if let Some(memo) = &terms.memo {
            println!("   Memo:        {}", memo);
        }
        println!();

        if let Some(hash) = &self.preset_hash {
            println!("Using PAYMENT_TX_HASH {}", hash);
            return Ok(Some(PaymentReceipt::new(hash.clone())));
        }

        println!("Send the payment from your wallet, then paste the transaction hash (empty to abort):");
        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .context("Failed to read transaction hash")?;

        let hash = line.trim();
        if hash.is_empty() {
            return Ok(None);
        }
        Ok(Some(PaymentReceipt::new(hash)))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();

    let url = std::env::var("PAYGATE_URL")
        .unwrap_or_else(|_| "http://localhost:8080/api/premium".to_string());
    let handler = ManualPayment {
        preset_hash: std::env::var("PAYMENT_TX_HASH").ok(),
    };

    println!("Stellar Paygate Client");
    println!("======================");
    println!("Resource: {}", url);
    println!();

    let client = Client::new();
    let request = client.get(&url).build()?;
    let response = fetch_with_payment(&client, request, Some(&handler)).await?;

    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if status.is_success() {
        println!("[SUCCESS] {}", status);
    } else {
        println!("[FAILED] {}", status);
    }
    println!("{}", serde_json::to_string_pretty(&body)?);

    Ok(())
}
