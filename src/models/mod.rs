pub mod ledger;
pub mod payment;
pub mod response;
pub mod terms;

pub use ledger::*;
pub use payment::*;
pub use response::*;
pub use terms::*;
