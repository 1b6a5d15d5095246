use crate::config::PaygateOptions;
use crate::error::PaygateError;
use crate::middleware::responder::{
    build_payment_required, PaymentRequired, TIMESTAMP_HEADER, TRANSACTION_HASH_HEADER,
};
use crate::models::{PaymentReceipt, PaymentTerms};
use crate::services::{GateAnalytics, PaymentVerifier, ReceiptStore};
use axum::http::HeaderMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Framework-neutral request headers with lowercase keys.
#[derive(Debug, Clone, Default)]
pub struct RequestHeaders(HashMap<String, String>);

impl RequestHeaders {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

impl From<&HeaderMap> for RequestHeaders {
    fn from(headers: &HeaderMap) -> Self {
        Self::from_pairs(
            headers
                .iter()
                .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str(), v.to_string()))),
        )
    }
}

/// What the gate decided for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Allow(PaymentReceipt),
    Challenge(PaymentRequired),
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allow(_))
    }
}

/// Turns a receipt header into an allow/challenge decision.
///
/// Terms are validated once in [`Paygate::new`]; per-request work is a header
/// lookup plus one verifier call. Verification reasons are logged and never
/// sent to the client.
#[derive(Clone)]
pub struct Paygate {
    terms: PaymentTerms,
    verifier: Arc<dyn PaymentVerifier>,
    receipts: Option<Arc<dyn ReceiptStore>>,
    analytics: Option<Arc<GateAnalytics>>,
}

impl Paygate {
    pub fn new(
        options: &PaygateOptions,
        verifier: Arc<dyn PaymentVerifier>,
    ) -> Result<Self, PaygateError> {
        let terms = options.validate()?;

        tracing::info!(
            price = %terms.amount,
            asset = %terms.asset_code,
            network = %terms.network,
            destination = %terms.destination,
            "Paygate configured"
        );

        Ok(Self {
            terms,
            verifier,
            receipts: None,
            analytics: None,
        })
    }

    /// Makes each transaction hash good for a single allowed request.
    pub fn with_receipts(mut self, receipts: Arc<dyn ReceiptStore>) -> Self {
        self.receipts = Some(receipts);
        self
    }

    pub fn with_analytics(mut self, analytics: Arc<GateAnalytics>) -> Self {
        self.analytics = Some(analytics);
        self
    }

    pub fn terms(&self) -> &PaymentTerms {
        &self.terms
    }

    pub fn challenge(&self) -> PaymentRequired {
        build_payment_required(&self.terms)
    }

    pub async fn gate(&self, headers: &RequestHeaders) -> GateDecision {
        let Some(hash) = headers
            .get(TRANSACTION_HASH_HEADER)
            .map(str::trim)
            .filter(|h| !h.is_empty())
        else {
            tracing::debug!("No payment receipt, issuing 402");
            self.record(GateAnalytics::record_missing_receipt);
            return GateDecision::Challenge(self.challenge());
        };

        let result = self.verifier.verify(hash, &self.terms).await;
        if !result.valid {
            tracing::warn!(tx_hash = hash, reason = result.reason(), "Payment rejected");
            self.record(GateAnalytics::record_verification_failed);
            return GateDecision::Challenge(self.challenge());
        }

        if let Some(receipts) = &self.receipts {
            match receipts.consume(hash).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(tx_hash = hash, "Receipt already used");
                    self.record(GateAnalytics::record_replay_rejected);
                    return GateDecision::Challenge(self.challenge());
                }
                Err(e) => {
                    tracing::error!(tx_hash = hash, "Receipt store unavailable: {}", e);
                    self.record(GateAnalytics::record_verification_failed);
                    return GateDecision::Challenge(self.challenge());
                }
            }
        }

        tracing::info!(tx_hash = hash, "Payment accepted");
        self.record(GateAnalytics::record_allowed);

        GateDecision::Allow(PaymentReceipt {
            transaction_hash: hash.to_string(),
            timestamp: headers.get(TIMESTAMP_HEADER).map(str::to_string),
        })
    }

    fn record(&self, counter: fn(&GateAnalytics)) {
        if let Some(analytics) = &self.analytics {
            counter(analytics);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VerificationResult;
    use crate::services::CacheReceiptStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct StubVerifier {
        valid: bool,
        calls: AtomicUsize,
    }

    impl StubVerifier {
        fn new(valid: bool) -> Arc<Self> {
            Arc::new(Self {
                valid,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PaymentVerifier for StubVerifier {
        async fn verify(&self, _hash: &str, _terms: &PaymentTerms) -> VerificationResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.valid {
                VerificationResult::ok()
            } else {
                VerificationResult::invalid("stub says no")
            }
        }
    }

    fn options() -> PaygateOptions {
        PaygateOptions {
            price: Some("1".to_string()),
            asset_code: Some("XLM".to_string()),
            network: Some("testnet".to_string()),
            destination: Some("GDEST".to_string()),
            ..Default::default()
        }
    }

    fn with_hash(name: &str, hash: &str) -> RequestHeaders {
        RequestHeaders::from_pairs([(name, hash)])
    }

    #[test]
    fn construction_fails_without_required_options() {
        let verifier = StubVerifier::new(true);
        let mut opts = options();
        opts.asset_code = None;
        assert!(Paygate::new(&opts, verifier).is_err());
    }

    #[tokio::test]
    async fn missing_or_blank_hash_never_reaches_verifier() {
        let verifier = StubVerifier::new(true);
        let gate = Paygate::new(&options(), verifier.clone()).unwrap();

        for headers in [
            RequestHeaders::default(),
            with_hash("x-402-transaction-hash", "   "),
            with_hash("X-402-Other", "abc123"),
        ] {
            assert!(!gate.gate(&headers).await.is_allowed());
        }
        assert_eq!(verifier.calls(), 0);
    }

    #[tokio::test]
    async fn header_lookup_ignores_case() {
        let verifier = StubVerifier::new(true);
        let gate = Paygate::new(&options(), verifier.clone()).unwrap();

        for name in ["X-402-Transaction-Hash", "x-402-transaction-hash", "X-402-TRANSACTION-HASH"] {
            assert!(gate.gate(&with_hash(name, "abc123")).await.is_allowed());
        }
        assert_eq!(verifier.calls(), 3);
    }

    #[tokio::test]
    async fn invalid_payment_yields_challenge_with_terms() {
        let gate = Paygate::new(&options(), StubVerifier::new(false)).unwrap();

        match gate.gate(&with_hash("x-402-transaction-hash", "abc123")).await {
            GateDecision::Challenge(challenge) => {
                assert_eq!(challenge.status_code, 402);
                assert_eq!(challenge.body.amount, "1");
                assert_eq!(challenge.body.destination, "GDEST");
            }
            other => panic!("expected challenge, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn allow_carries_receipt() {
        let gate = Paygate::new(&options(), StubVerifier::new(true)).unwrap();
        let headers = RequestHeaders::from_pairs([
            ("X-402-Transaction-Hash", " abc123 "),
            ("X-402-Timestamp", "2026-01-01T00:00:00Z"),
        ]);

        assert_eq!(
            gate.gate(&headers).await,
            GateDecision::Allow(PaymentReceipt {
                transaction_hash: "abc123".to_string(),
                timestamp: Some("2026-01-01T00:00:00Z".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn same_receipt_replays_without_store() {
        let gate = Paygate::new(&options(), StubVerifier::new(true)).unwrap();
        let headers = with_hash("x-402-transaction-hash", "abc123");

        assert!(gate.gate(&headers).await.is_allowed());
        assert!(gate.gate(&headers).await.is_allowed());
    }

    #[tokio::test]
    async fn receipt_store_makes_hash_single_use() {
        let analytics = Arc::new(GateAnalytics::new());
        let gate = Paygate::new(&options(), StubVerifier::new(true))
            .unwrap()
            .with_receipts(Arc::new(CacheReceiptStore::in_memory(Duration::from_secs(60))))
            .with_analytics(analytics.clone());
        let headers = with_hash("x-402-transaction-hash", "abc123");

        assert!(gate.gate(&headers).await.is_allowed());
        assert!(!gate.gate(&headers).await.is_allowed());

        let stats = analytics.snapshot();
        assert_eq!(stats.allowed, 1);
        assert_eq!(stats.replay_rejected, 1);
    }

    #[tokio::test]
    async fn rejected_payment_does_not_burn_receipt() {
        let store = Arc::new(CacheReceiptStore::in_memory(Duration::from_secs(60)));
        let failing = Paygate::new(&options(), StubVerifier::new(false))
            .unwrap()
            .with_receipts(store.clone());
        let headers = with_hash("x-402-transaction-hash", "abc123");
        assert!(!failing.gate(&headers).await.is_allowed());

        let passing = Paygate::new(&options(), StubVerifier::new(true))
            .unwrap()
            .with_receipts(store);
        assert!(passing.gate(&headers).await.is_allowed());
    }
}
