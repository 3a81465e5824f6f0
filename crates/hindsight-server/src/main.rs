use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::info;

use hindsight_core::reconciler::Reconciler;
use hindsight_types::events::InboundEvent;

mod gateway;
use gateway::GatewayTransport;

type SharedReconciler = Arc<Reconciler<GatewayTransport>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hindsight=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path = std::env::var("HINDSIGHT_DB_PATH").unwrap_or_else(|_| "hindsight.db".into());
    let host = std::env::var("HINDSIGHT_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("HINDSIGHT_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let gateway_url = std::env::var("HINDSIGHT_GATEWAY_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8081".into());
    let gateway_token = std::env::var("HINDSIGHT_GATEWAY_TOKEN").ok();

    // Init database
    let db = Arc::new(hindsight_db::Database::open(&PathBuf::from(&db_path))?);

    // Reconciler over the bridge's send API
    let transport = GatewayTransport::new(gateway_url, gateway_token)?;
    let reconciler: SharedReconciler = Arc::new(Reconciler::new(db, transport));

    // Routes
    let app = Router::new()
        .route("/events", post(receive_event))
        .route_layer(middleware::from_fn(require_webhook_token))
        .route("/healthz", get(healthz))
        .with_state(reconciler)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Hindsight listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// The bridge delivers one event per request. The handler outcome is logged
/// by the reconciler; the bridge only needs to know the event was accepted.
async fn receive_event(
    State(reconciler): State<SharedReconciler>,
    Json(event): Json<InboundEvent>,
) -> StatusCode {
    reconciler.handle_event(event).await;
    StatusCode::ACCEPTED
}

async fn healthz() -> &'static str {
    "ok"
}

/// Shared-secret check for the bridge webhook. Open when no token is
/// configured (local development).
async fn require_webhook_token(req: Request, next: Next) -> Result<Response, StatusCode> {
    let Ok(expected) = std::env::var("HINDSIGHT_WEBHOOK_TOKEN") else {
        return Ok(next.run(req).await);
    };

    let presented = req
        .headers()
        .get("x-gateway-token")
        .and_then(|v| v.to_str().ok());

    if presented == Some(expected.as_str()) {
        Ok(next.run(req).await)
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}
