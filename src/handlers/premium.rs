use crate::{
    middleware::PaidRequest,
    models::{ApiResponse, PaymentReceipt},
};
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug)]
pub struct PremiumContent {
    pub message: String,
    pub transaction_hash: String,
}

/// Behind `paygate_middleware`; the receipt arrives through the extensions.
pub async fn premium_content(
    Extension(receipt): Extension<PaymentReceipt>,
) -> Json<ApiResponse<PremiumContent>> {
    Json(ApiResponse {
        success: true,
        data: PremiumContent {
            message: "Thanks for paying. Here is the premium content.".to_string(),
            transaction_hash: receipt.transaction_hash,
        },
        timestamp: Utc::now(),
        request_id: Uuid::new_v4().to_string(),
    })
}

/// Gated by the extractor alone.
pub async fn premium_receipt(PaidRequest(receipt): PaidRequest) -> Json<ApiResponse<PaymentReceipt>> {
    Json(ApiResponse {
        success: true,
        data: receipt,
        timestamp: Utc::now(),
        request_id: Uuid::new_v4().to_string(),
    })
}
