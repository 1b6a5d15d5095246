use crate::{models::GateStats, services::GateAnalytics};
use axum::{extract::State, Json};
use std::sync::Arc;

pub async fn get_stats(State(analytics): State<Arc<GateAnalytics>>) -> Json<GateStats> {
    Json(analytics.snapshot())
}
