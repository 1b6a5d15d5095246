use crate::models::{LedgerOperation, LedgerTransaction, PaymentTerms, VerificationResult};
use crate::services::horizon::HorizonClient;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Decides whether a claimed transaction satisfies the payment terms.
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    async fn verify(&self, transaction_hash: &str, terms: &PaymentTerms) -> VerificationResult;
}

/// Verifies receipts by looking the transaction up on Horizon.
///
/// Two sequential reads per call: the transaction, then its first page of
/// operations. Nothing is cached, so the result only changes if the ledger does.
#[derive(Clone, Debug)]
pub struct HorizonVerifier {
    horizon: HorizonClient,
}

impl HorizonVerifier {
    pub fn new(horizon: HorizonClient) -> Self {
        Self { horizon }
    }

    pub fn horizon(&self) -> &HorizonClient {
        &self.horizon
    }
}

#[async_trait]
impl PaymentVerifier for HorizonVerifier {
    async fn verify(&self, transaction_hash: &str, terms: &PaymentTerms) -> VerificationResult {
        // The hash ends up in a URL path.
        if hex::decode(transaction_hash).is_err() {
            return VerificationResult::invalid(format!(
                "Malformed transaction hash: {}",
                transaction_hash
            ));
        }

        let tx = match self.horizon.transaction(terms.network, transaction_hash).await {
            Ok(tx) => tx,
            Err(e) => return VerificationResult::invalid(format!("Transaction lookup failed: {}", e)),
        };

        if !tx.successful {
            return VerificationResult::invalid("Transaction was not successful");
        }

        if let Some(required) = terms.memo.as_deref() {
            match decode_memo(&tx) {
                Some(memo) if memo == required => {}
                Some(memo) => {
                    return VerificationResult::invalid(format!(
                        "Memo mismatch: expected {:?}, found {:?}",
                        required, memo
                    ))
                }
                None => return VerificationResult::invalid("Transaction carries no memo"),
            }
        }

        let operations = match self.horizon.operations(terms.network, transaction_hash).await {
            Ok(ops) => ops,
            Err(e) => return VerificationResult::invalid(format!("Operations lookup failed: {}", e)),
        };

        let Some(required) = terms.required_amount() else {
            return VerificationResult::invalid(format!("Invalid required amount: {}", terms.amount));
        };

        let found = operations
            .iter()
            .filter(|op| op.is_payment() && op.to.as_deref() == Some(terms.destination.as_str()))
            .any(|op| amount_covers(op, required) && asset_matches(op, terms));

        if found {
            tracing::info!(
                tx_hash = transaction_hash,
                amount = %terms.amount,
                asset = %terms.asset_code,
                "Payment verified"
            );
            VerificationResult::ok()
        } else {
            VerificationResult::invalid(format!(
                "No matching payment of at least {} {} to {} found",
                terms.amount, terms.asset_code, terms.destination
            ))
        }
    }
}

/// Text memos come back base64 encoded; other memo types are compared as-is.
fn decode_memo(tx: &LedgerTransaction) -> Option<String> {
    let memo = tx.memo.as_deref()?;

    if tx.memo_type.as_deref() == Some("text") {
        if let Some(text) = STANDARD
            .decode(memo)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
        {
            return Some(text);
        }
    }

    Some(memo.to_string())
}

fn amount_covers(op: &LedgerOperation, required: f64) -> bool {
    op.amount
        .as_deref()
        .and_then(|a| a.trim().parse::<f64>().ok())
        .is_some_and(|paid| paid >= required)
}

fn asset_matches(op: &LedgerOperation, terms: &PaymentTerms) -> bool {
    if terms.expects_native() {
        return op.is_native();
    }

    !op.is_native()
        && op.asset_code.as_deref() == Some(terms.asset_code.as_str())
        && op.asset_issuer.as_deref() == terms.issuer.as_deref()
}
