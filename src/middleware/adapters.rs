//! Bindings from axum onto [`Paygate::gate`]. These only translate request
//! and response shapes; the decision itself always comes from the gate.

use crate::middleware::paygate::{GateDecision, Paygate, RequestHeaders};
use crate::middleware::responder::PaymentRequired;
use crate::models::PaymentReceipt;
use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Route middleware, for `axum::middleware::from_fn_with_state`.
///
/// On success the receipt is stored in the request extensions, where
/// handlers (or [`PaidRequest`]) can pick it up.
pub async fn paygate_middleware(
    State(gate): State<Arc<Paygate>>,
    mut request: Request,
    next: Next,
) -> Response {
    let span = tracing::info_span!(
        "paygate",
        request_id = %Uuid::new_v4(),
        path = %request.uri().path()
    );

    let decision = gate
        .gate(&RequestHeaders::from(request.headers()))
        .instrument(span)
        .await;

    match decision {
        GateDecision::Allow(receipt) => {
            request.extensions_mut().insert(receipt);
            next.run(request).await
        }
        GateDecision::Challenge(challenge) => challenge.into_response(),
    }
}

/// Handler-level binding: a handler taking `PaidRequest` only runs once paid.
///
/// Reuses a receipt already accepted by [`paygate_middleware`] instead of
/// verifying twice.
#[derive(Debug, Clone)]
pub struct PaidRequest(pub PaymentReceipt);

#[async_trait]
impl<S> FromRequestParts<S> for PaidRequest
where
    Arc<Paygate>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = PaymentRequired;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(receipt) = parts.extensions.get::<PaymentReceipt>() {
            return Ok(PaidRequest(receipt.clone()));
        }

        let gate = Arc::<Paygate>::from_ref(state);
        match gate.gate(&RequestHeaders::from(&parts.headers)).await {
            GateDecision::Allow(receipt) => {
                parts.extensions.insert(receipt.clone());
                Ok(PaidRequest(receipt))
            }
            GateDecision::Challenge(challenge) => Err(challenge),
        }
    }
}

/// Plain request/response binding for services that are not built on axum
/// routing: hands the request back when paid, or the 402 response to send.
pub async fn gate_request<B>(
    gate: &Paygate,
    mut request: axum::http::Request<B>,
) -> Result<axum::http::Request<B>, Response> {
    match gate.gate(&RequestHeaders::from(request.headers())).await {
        GateDecision::Allow(receipt) => {
            request.extensions_mut().insert(receipt);
            Ok(request)
        }
        GateDecision::Challenge(challenge) => Err(challenge.into_response()),
    }
}
