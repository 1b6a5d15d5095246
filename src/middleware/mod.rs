pub mod adapters;
pub mod paygate;
pub mod responder;

pub use adapters::{gate_request, paygate_middleware, PaidRequest};
pub use paygate::{GateDecision, Paygate, RequestHeaders};
pub use responder::{build_payment_required, PaymentRequired};
