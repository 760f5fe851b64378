use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method, Uri},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::DocumentStore;
use crate::error::ApiError;
use crate::handlers;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::Resource;

/// Shared, read-only state cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        // Public
        .route("/", get(root).fallback(method_not_allowed))
        .route("/health", get(handlers::health::health).fallback(method_not_allowed))
        .merge(auth_routes())
        .merge(delivery_routes())
        .merge(resource_routes())
        .fallback(no_route)
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new().route(
        "/api/auth/whoami",
        get(handlers::auth::whoami).fallback(method_not_allowed),
    )
}

fn delivery_routes() -> Router<AppState> {
    use handlers::delivery;

    Router::new()
        // Non-delivery resources answer 404
        .route(
            "/api/:resource/:id/cancel",
            post(delivery::cancel).fallback(method_not_allowed),
        )
        .route(
            "/api/:resource/:id/complete",
            post(delivery::complete).fallback(method_not_allowed),
        )
}

fn resource_routes() -> Router<AppState> {
    use handlers::resource;

    Router::new()
        // Collection-level operations
        .route(
            "/api/:resource",
            get(resource::list)
                .post(resource::create)
                .fallback(method_not_allowed),
        )
        // Document-level operations
        .route(
            "/api/:resource/:id",
            get(resource::show)
                .put(resource::update)
                .delete(resource::delete)
                .fallback(method_not_allowed),
        )
}

/// Permissive when no origins are configured
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

async fn no_route(method: Method, uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {} {}", method, uri.path()))
}

async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::method_not_allowed(format!("Method {} not allowed on {}", method, uri.path()))
}

async fn root() -> ApiResult<Value> {
    let resources: Vec<&str> = Resource::ALL.iter().map(|r| r.slug()).collect();

    Ok(ApiResponse::success(
        json!({
            "name": "BizOps API",
            "version": env!("CARGO_PKG_VERSION"),
            "resources": resources,
            "endpoints": {
                "health": "/health (public)",
                "list": "GET /api/:resource?page=&limit=&lowStock=&critical=&search=",
                "document": "GET|PUT|DELETE /api/:resource/:id",
                "create": "POST /api/:resource",
                "deliveries": "POST /api/deliveries/:id/cancel, POST /api/deliveries/:id/complete",
                "session": "GET /api/auth/whoami",
            }
        }),
        "BizOps API",
    ))
}
