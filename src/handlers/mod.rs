pub mod health;
pub mod premium;
pub mod stats;

pub use health::*;
pub use premium::*;
pub use stats::*;

use crate::{
    middleware::{paygate_middleware, Paygate},
    services::{GateAnalytics, HorizonClient},
};
use axum::{extract::FromRef, middleware as axum_middleware, routing::get, Router};
use std::sync::Arc;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub paygate: Arc<Paygate>,
    pub analytics: Arc<GateAnalytics>,
    pub horizon: HorizonClient,
}

pub fn router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/api/premium", get(premium_content))
        .layer(axum_middleware::from_fn_with_state(
            state.paygate.clone(),
            paygate_middleware,
        ));

    Router::new()
        // Public endpoints (no payment required)
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        // Protected endpoints (payment required)
        .route("/api/premium/receipt", get(premium_receipt))
        .merge(gated)
        .with_state(state)
}
