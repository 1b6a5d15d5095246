use anyhow::Result;
use stellar_paygate::{
    config::Config,
    handlers::{router, AppState},
    middleware::Paygate,
    services::*,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting Stellar Paygate v{}", env!("CARGO_PKG_VERSION"));

    // Initialize services
    let mut horizon = HorizonClient::new(config.horizon_timeout)?;
    if let Some(url) = &config.horizon_url {
        tracing::info!("Using Horizon override: {}", url);
        horizon = horizon.with_base_url(url.clone());
    }
    let verifier = Arc::new(HorizonVerifier::new(horizon.clone()));
    let analytics = Arc::new(GateAnalytics::new());

    // Refuses to start on incomplete payment terms
    let mut paygate = Paygate::new(&config.paygate, verifier)?.with_analytics(analytics.clone());

    match config.receipt_ttl {
        Some(ttl) => {
            tracing::info!("Single-use receipts enabled (ttl: {}s)", ttl.as_secs());
            let store = CacheReceiptStore::new(config.redis_url.as_deref(), ttl).await;
            paygate = paygate.with_receipts(Arc::new(store));
        }
        None => tracing::warn!("RECEIPT_TTL_SECS unset: a verified receipt can be replayed"),
    }

    let state = AppState {
        paygate: Arc::new(paygate),
        analytics,
        horizon,
    };

    // Build router
    let app = router(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Protected resource: http://{}/api/premium", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl+c: {}", e);
    }
    tracing::info!("Shutting down gracefully...");
}
