//! Read-only views over Horizon JSON. Only the fields the verifier reads
//! are modelled; everything else in the payload is ignored.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerTransaction {
    pub successful: bool,
    #[serde(default)]
    pub memo_type: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerOperation {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub asset_code: Option<String>,
    #[serde(default)]
    pub asset_issuer: Option<String>,
}

impl LedgerOperation {
    pub fn is_payment(&self) -> bool {
        self.type_ == "payment"
    }

    pub fn is_native(&self) -> bool {
        self.asset_type.as_deref() == Some("native")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationPage {
    #[serde(rename = "_embedded")]
    pub embedded: EmbeddedRecords,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddedRecords {
    #[serde(default)]
    pub records: Vec<LedgerOperation>,
}

impl OperationPage {
    pub fn into_records(self) -> Vec<LedgerOperation> {
        self.embedded.records
    }
}
