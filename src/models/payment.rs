use serde::{Deserialize, Serialize};

/// Outcome of checking one receipt against the ledger.
///
/// Never cached: every gated request re-verifies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(reason.into()),
        }
    }

    pub fn reason(&self) -> &str {
        self.error.as_deref().unwrap_or("Payment verified")
    }
}
