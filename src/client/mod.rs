pub mod payment;

pub use payment::{fetch_with_payment, terms_from_headers, PaymentHandler};
