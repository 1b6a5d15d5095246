use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Network;

/// JSON body of a 402 response. Field order and names are part of the wire contract.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequiredBody {
    pub error: String,
    pub amount: String,
    pub asset_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    pub network: Network,
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub network: Network,
    pub horizon: bool,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct GateStats {
    pub allowed: u64,
    pub challenged: u64,
    pub missing_receipt: u64,
    pub verification_failed: u64,
    pub replay_rejected: u64,
    pub uptime_seconds: u64,
}
