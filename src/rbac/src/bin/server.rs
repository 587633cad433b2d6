//! # Access Decision HTTP Server
//!
//! Serves access decisions for a set of roles loaded from a JSON file.
//!
//! ## Endpoints
//!
//! - `POST /v1/check` - Access check
//! - `GET /v1/roles` - Loaded roles
//! - `GET /health` - Health check
//!
//! ## Configuration
//!
//! Environment variables:
//! - `PORT` - HTTP server port (default: 8080)
//! - `RBAC_ROLES_FILE` - JSON array of role records (required)
//! - `RBAC_STRICT` - Reject malformed rules at load (default: false)
//! - `RBAC_SYSTEM_NAMESPACE` - System call frame glob (default: `procedure/system/**`)
//! - `RUST_LOG` - Log level (default: info)

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
    serve,
};
use cretoai_rbac::{AutoAttach, CallChain, RbacConfig, RoleRegistry, User};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Shared application state
#[derive(Clone)]
struct AppState {
    registry: Arc<RoleRegistry>,
    start_time: std::time::Instant,
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// Application error type
#[derive(Debug)]
enum AppError {
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Access check request
#[derive(Debug, Deserialize)]
struct CheckRequest {
    /// Absent for anonymous callers
    #[serde(default)]
    user: Option<User>,
    path: String,
    permission: String,
    /// Active call chain, innermost first
    #[serde(default)]
    chain: CallChain,
}

/// Access check response
#[derive(Debug, Serialize)]
struct CheckResponse {
    allowed: bool,
    decision: String,
    /// Roles that granted the permission
    roles: Vec<String>,
}

/// Role listing entry
#[derive(Debug, Serialize)]
struct RoleSummary {
    id: String,
    name: String,
    auto: AutoAttach,
    rules: usize,
}

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    uptime_seconds: u64,
    roles: usize,
    version: String,
}

/// POST /v1/check - Check access
async fn check_access(
    State(state): State<AppState>,
    Json(req): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, AppError> {
    if req.path.trim().is_empty() || req.permission.trim().is_empty() {
        return Err(AppError::BadRequest(
            "path and permission are required".to_string(),
        ));
    }

    let roles: Vec<String> = state
        .registry
        .granting_roles(req.user.as_ref(), &req.path, &req.permission, &req.chain)
        .map(|role| role.id().to_string())
        .collect();
    let allowed = !roles.is_empty();

    info!(
        user = req.user.as_ref().map(|u| u.id.as_str()).unwrap_or("<anonymous>"),
        path = %req.path,
        permission = %req.permission,
        depth = req.chain.len(),
        "Access decision: {}",
        if allowed { "ALLOW" } else { "DENY" }
    );

    Ok(Json(CheckResponse {
        allowed,
        decision: if allowed { "allow".to_string() } else { "deny".to_string() },
        roles,
    }))
}

/// GET /v1/roles - List loaded roles
async fn list_roles(State(state): State<AppState>) -> Json<Vec<RoleSummary>> {
    let roles = state
        .registry
        .roles()
        .iter()
        .map(|role| RoleSummary {
            id: role.id().to_string(),
            name: role.name().to_string(),
            auto: role.auto(),
            rules: role.rules().len(),
        })
        .collect();

    Json(roles)
}

/// GET /health - Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        roles: state.registry.len(),
        version: cretoai_rbac::VERSION.to_string(),
    })
}

/// Create the HTTP router with all endpoints
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http()
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/v1/check", post(check_access))
        .route("/v1/roles", get(list_roles))
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(trace)
                .layer(cors)
        )
        .with_state(state)
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }

    info!("Starting graceful shutdown");
}

/// Main server entrypoint
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CretoAI RBAC Server v{}", cretoai_rbac::VERSION);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let roles_file = std::env::var("RBAC_ROLES_FILE")
        .context("RBAC_ROLES_FILE must point to a JSON array of role records")?;

    let config = RbacConfig::from_env()?;

    info!("Configuration:");
    info!("  Port: {}", port);
    info!("  Roles file: {}", roles_file);
    info!("  Strict loading: {}", config.strict);
    info!("  System namespace: {}", config.system_namespace);

    let registry = RoleRegistry::from_path(&roles_file, &config)
        .with_context(|| format!("failed to load roles from {}", roles_file))?;

    let state = AppState {
        registry: Arc::new(registry),
        start_time: std::time::Instant::now(),
    };

    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server shut down gracefully");
    Ok(())
}
