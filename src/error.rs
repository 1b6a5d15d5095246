use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaygateError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server requires payment but no payment handler was supplied; pass one to fetch_with_payment")]
    MissingPaymentHandler,

    #[error("Request body cannot be cloned for the paid retry")]
    RequestNotReplayable,

    #[error("Payment handler failed: {0}")]
    PaymentHandler(anyhow::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Receipt store error: {0}")]
    Store(String),
}

/// Failures talking to the ledger explorer. The verifier folds every one of
/// these into an invalid result; none of them escape the gate.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Horizon returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("Horizon request timed out: {0}")]
    Timeout(String),

    #[error("Horizon request failed: {0}")]
    Transport(String),

    #[error("Unexpected Horizon payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for LedgerError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LedgerError::Timeout(e.to_string())
        } else if e.is_decode() {
            LedgerError::Decode(e.to_string())
        } else {
            LedgerError::Transport(e.to_string())
        }
    }
}
