use crate::models::{PaymentRequiredBody, PaymentTerms};
use axum::{
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

pub const AMOUNT_HEADER: &str = "X-402-Amount";
pub const ASSET_CODE_HEADER: &str = "X-402-Asset-Code";
pub const ISSUER_HEADER: &str = "X-402-Issuer";
pub const NETWORK_HEADER: &str = "X-402-Network";
pub const DESTINATION_HEADER: &str = "X-402-Destination";
pub const MEMO_HEADER: &str = "X-402-Memo";
pub const TRANSACTION_HASH_HEADER: &str = "X-402-Transaction-Hash";
pub const TIMESTAMP_HEADER: &str = "X-402-Timestamp";

/// A fully formed 402 challenge, independent of any framework.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequired {
    pub status_code: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: PaymentRequiredBody,
}

/// Builds the challenge for `terms`. Issuer and memo appear only when configured.
pub fn build_payment_required(terms: &PaymentTerms) -> PaymentRequired {
    let mut headers = vec![
        (AMOUNT_HEADER, terms.amount.clone()),
        (ASSET_CODE_HEADER, terms.asset_code.clone()),
        (NETWORK_HEADER, terms.network.to_string()),
        (DESTINATION_HEADER, terms.destination.clone()),
    ];
    if let Some(issuer) = &terms.issuer {
        headers.push((ISSUER_HEADER, issuer.clone()));
    }
    if let Some(memo) = &terms.memo {
        headers.push((MEMO_HEADER, memo.clone()));
    }

    PaymentRequired {
        status_code: StatusCode::PAYMENT_REQUIRED.as_u16(),
        headers,
        body: PaymentRequiredBody {
            error: "Payment Required".to_string(),
            amount: terms.amount.clone(),
            asset_code: terms.asset_code.clone(),
            issuer: terms.issuer.clone(),
            network: terms.network,
            destination: terms.destination.clone(),
            memo: terms.memo.clone(),
        },
    }
}

impl IntoResponse for PaymentRequired {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::PAYMENT_REQUIRED, Json(self.body)).into_response();

        for (name, value) in self.headers {
            // from_bytes normalises the name to lowercase.
            match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().insert(name, value);
                }
                _ => tracing::warn!("Skipping unencodable {} header", name),
            }
        }

        response
    }
}
