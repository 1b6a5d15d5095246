pub mod analytics;
pub mod horizon;
pub mod receipts;
pub mod verifier;

pub use analytics::GateAnalytics;
pub use horizon::{HorizonClient, OPERATIONS_PAGE_LIMIT};
pub use receipts::{CacheReceiptStore, ReceiptStore};
pub use verifier::{HorizonVerifier, PaymentVerifier};
