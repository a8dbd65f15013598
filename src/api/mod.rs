// REST API endpoints for the action runtime

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::RuntimeResponse;
use crate::runtime::{RuntimeStatus, SharedRuntime};
use crate::types::{ConditionDescriptor, InvokeRequest, LoadPddlRequest, RegisterRequest};

pub type AppState = SharedRuntime;

/// One POST route per runtime operation, plus health and status.
///
/// Operation outcomes travel in the `{success, message}` body; the HTTP
/// status only reflects whether the request could be decoded.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(status))
        .route("/load_pddl", post(load_pddl))
        .route("/create_plan", post(create_plan))
        .route("/register_action", post(register_action))
        .route("/register_condition", post(register_condition))
        .route("/run_action", post(run_action))
        .route("/run_plan", post(run_plan))
        .route("/observe", post(observe))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Serve the REST API on `bind` until the listener fails.
pub async fn serve(state: AppState, bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("REST API listening on http://{}", bind);
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}

async fn health_check() -> Result<Json<Value>, StatusCode> {
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

async fn status(State(state): State<AppState>) -> Json<RuntimeStatus> {
    Json(state.lock().await.status())
}

async fn load_pddl(
    State(state): State<AppState>,
    Json(request): Json<LoadPddlRequest>,
) -> Json<RuntimeResponse> {
    let mut runtime = state.lock().await;
    Json(
        runtime
            .load_pddl(request.domain, request.problem, &request.filepath)
            .into(),
    )
}

async fn create_plan(State(state): State<AppState>) -> Json<RuntimeResponse> {
    let mut runtime = state.lock().await;
    Json(runtime.create_plan().await.into())
}

async fn register_action(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Json<RuntimeResponse> {
    let mut runtime = state.lock().await;
    Json(runtime.register_action(&request.name, &request.target).into())
}

async fn register_condition(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Json<RuntimeResponse> {
    let mut runtime = state.lock().await;
    Json(runtime.register_condition(&request.name, &request.target).into())
}

async fn run_action(
    State(state): State<AppState>,
    Json(request): Json<InvokeRequest>,
) -> Json<RuntimeResponse> {
    let runtime = state.lock().await;
    let result = runtime.run_action(&request.name, &request.args).await;
    Json(RuntimeResponse {
        success: result.success,
        message: result.message,
    })
}

async fn run_plan(State(state): State<AppState>) -> Json<RuntimeResponse> {
    let mut runtime = state.lock().await;
    let response = match runtime.run_plan().await {
        Ok(report) => RuntimeResponse {
            success: report.success(),
            message: report.message,
        },
        Err(e) => e.into(),
    };
    Json(response)
}

async fn observe(
    State(state): State<AppState>,
    Json(condition): Json<ConditionDescriptor>,
) -> Result<Json<Value>, StatusCode> {
    let runtime = state.lock().await;
    let body = match runtime.observe(&condition).await {
        Ok(observation) => serde_json::to_value(observation),
        Err(e) => serde_json::to_value(RuntimeResponse::from(e)),
    }
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(body))
}
