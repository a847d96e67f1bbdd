use std::sync::Arc;

use anyhow::{Error, Result};
use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    admin::{AdminSendRequest, AdminSendResponse, AdminSender},
    clients::health::HealthChecker,
    config::Config,
    error::AlertError,
    models::{health::HealthStatus, response::ApiResponse},
};

pub const USER_ID_HEADER: &str = "x-user-id";

pub struct AppState {
    pub health_checker: HealthChecker,
    pub admin: AdminSender,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/notifications", post(send_notification))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(config: &Config, state: Arc<AppState>) -> Result<(), Error> {
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "API server started");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_checker.check_all().await;

    let status_code = match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

async fn send_notification(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<AdminSendRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AdminSendResponse>>, AlertError> {
    let Json(request) =
        payload.map_err(|e| AlertError::Validation(format!("Invalid request body: {}", e.body_text())))?;

    let caller_id = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok());

    let response = state.admin.send(caller_id, request).await?;

    Ok(Json(ApiResponse::success(
        response,
        "Notification sent".to_string(),
    )))
}
