use crate::error::PaygateError;
use crate::middleware::responder::{
    AMOUNT_HEADER, ASSET_CODE_HEADER, DESTINATION_HEADER, ISSUER_HEADER, MEMO_HEADER,
    NETWORK_HEADER, TIMESTAMP_HEADER, TRANSACTION_HASH_HEADER,
};
use crate::models::{PaymentReceipt, PaymentTerms};
use anyhow::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use reqwest::{header::HeaderMap, header::HeaderValue, Client, Request, Response, StatusCode};

/// Pays the terms of a 402 and returns the receipt, or `None` to give up.
#[async_trait]
pub trait PaymentHandler: Send + Sync {
    async fn pay(&self, terms: &PaymentTerms) -> Result<Option<PaymentReceipt>>;
}

#[async_trait]
impl<F> PaymentHandler for F
where
    F: Fn(PaymentTerms) -> BoxFuture<'static, Result<Option<PaymentReceipt>>> + Send + Sync,
{
    async fn pay(&self, terms: &PaymentTerms) -> Result<Option<PaymentReceipt>> {
        self(terms.clone()).await
    }
}

/// Reads payment terms from 402 response headers. `None` if any required
/// header is missing or the network is unknown.
pub fn terms_from_headers(headers: &HeaderMap) -> Option<PaymentTerms> {
    let get = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    Some(PaymentTerms {
        amount: get(AMOUNT_HEADER)?,
        asset_code: get(ASSET_CODE_HEADER)?,
        issuer: get(ISSUER_HEADER),
        network: get(NETWORK_HEADER)?.parse().ok()?,
        destination: get(DESTINATION_HEADER)?,
        memo: get(MEMO_HEADER),
    })
}

/// Sends `request`; on 402 asks `on_payment_needed` to pay and retries once
/// with the receipt attached.
///
/// The original 402 is returned untouched when its terms are incomplete or
/// the handler declines. A 402 on the retry is returned as-is.
pub async fn fetch_with_payment(
    client: &Client,
    request: Request,
    on_payment_needed: Option<&dyn PaymentHandler>,
) -> Result<Response, PaygateError> {
    let retry = request.try_clone();
    let response = client.execute(request).await?;

    if response.status() != StatusCode::PAYMENT_REQUIRED {
        return Ok(response);
    }

    let Some(terms) = terms_from_headers(response.headers()) else {
        tracing::warn!("402 response without complete payment terms");
        return Ok(response);
    };

    let handler = on_payment_needed.ok_or(PaygateError::MissingPaymentHandler)?;

    tracing::info!(
        amount = %terms.amount,
        asset = %terms.asset_code,
        network = %terms.network,
        destination = %terms.destination,
        "Payment required"
    );

    let Some(receipt) = handler.pay(&terms).await.map_err(PaygateError::PaymentHandler)? else {
        tracing::info!("Payment handler declined to pay");
        return Ok(response);
    };

    let mut retry = retry.ok_or(PaygateError::RequestNotReplayable)?;
    attach_receipt(retry.headers_mut(), &receipt)?;

    tracing::info!(tx_hash = %receipt.transaction_hash, "Retrying with payment receipt");
    Ok(client.execute(retry).await?)
}

fn attach_receipt(headers: &mut HeaderMap, receipt: &PaymentReceipt) -> Result<(), PaygateError> {
    let encode = |value: &str| {
        HeaderValue::from_str(value)
            .map_err(|e| PaygateError::PaymentHandler(anyhow::anyhow!("Unusable receipt: {}", e)))
    };

    headers.insert(TRANSACTION_HASH_HEADER, encode(&receipt.transaction_hash)?);
    if let Some(timestamp) = &receipt.timestamp {
        headers.insert(TIMESTAMP_HEADER, encode(timestamp)?);
    }
    Ok(())
}
