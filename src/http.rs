//! HTTP surface for the catalog.
//!
//! | Method | Path | Body |
//! |---|---|---|
//! | GET | `/api/products` | every product |
//! | GET | `/api/products/filter` | products matching the query-string predicates |
//! | GET | `/api/products/suggest?q=` | at most ten product names |
//! | GET | `/api/products/facets` | distinct values per filterable column |
//! | GET | `/api/products/:name` | one product, 404 when unknown |
//! | GET | `/health` | liveness plus catalog counters |
//!
//! Catalog reads are public. The catalog is loaded before the listener binds.
//! A product name containing `/` must be sent percent-encoded (`%2F`) in the
//! detail path; the segment is decoded before lookup.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::error::{CatalogError, Result};
use crate::query::ProductFilter;
use crate::storage::memory::Catalog;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(catalog: Catalog, config: ServerConfig) -> Self {
        Self {
            catalog: Arc::new(catalog),
            config: Arc::new(config),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    q: Option<String>,
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/api/products", get(list_handler))
        .route("/api/products/filter", get(filter_handler))
        .route("/api/products/suggest", get(suggest_handler))
        .route("/api/products/facets", get(facets_handler))
        .route("/api/products/:name", get(detail_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Load the catalog, bind, and serve until Ctrl+C or SIGTERM.
pub async fn serve(config: ServerConfig) -> Result<()> {
    info!("Loading product catalog...");
    let csv_path = config.csv_path.clone();
    let catalog = tokio::task::spawn_blocking(move || Catalog::load_or_empty(&csv_path))
        .await
        .map_err(|e| CatalogError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;

    let state = AppState::new(catalog, config);
    let address = state.config.bind_address();
    let app = router(state.clone());

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!(
        products = state.catalog.len(),
        "Server running on {}",
        address
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(24 * 60 * 60));

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| warn!("Ignoring invalid CORS origin {origin}: {e}"))
                .ok()
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

async fn list_handler(State(state): State<AppState>) -> Response {
    Json(state.catalog.list()).into_response()
}

async fn filter_handler(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    debug!("Filter parameters: {:?}", params);
    let filter = ProductFilter::from_params(params);
    let result = state.catalog.filter(&filter);
    debug!("Filter returned {} products", result.total_matches);

    Json(result.items).into_response()
}

async fn suggest_handler(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Response {
    Json(state.catalog.suggest(params.q.as_deref())).into_response()
}

async fn facets_handler(State(state): State<AppState>) -> Response {
    Json(state.catalog.facets()).into_response()
}

async fn detail_handler(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.catalog.find_by_name(&name) {
        Some(product) => Json(product).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Product not found: {}", name) })),
        )
            .into_response(),
    }
}

async fn health_handler(State(state): State<AppState>) -> Response {
    let metadata = state.catalog.metadata();
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "products": state.catalog.len(),
        "source": metadata.source_path.as_ref().map(|p| p.display().to_string()),
        "load": metadata.load,
    }))
    .into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn app(cors_origins: Vec<String>) -> Router {
        let config = ServerConfig {
            cors_origins,
            ..ServerConfig::default()
        };
        router(AppState::new(Catalog::new(), config))
    }

    async fn preflight(app: Router, origin: &str) -> Response {
        app.oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/products")
                .header("origin", origin)
                .header("access-control-request-method", "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin_by_default() {
        let response = preflight(app(Vec::new()), "https://example.com").await;
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_origin_list_skips_invalid_entries() {
        let origins = vec!["https://hteng.co.kr".to_string(), "bad\norigin".to_string()];

        let response = preflight(app(origins.clone()), "https://hteng.co.kr").await;
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "https://hteng.co.kr"
        );

        let response = preflight(app(origins), "https://evil.example").await;
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }

    #[test]
    fn test_state_shares_catalog() {
        let state = AppState::new(Catalog::new(), ServerConfig::default());
        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.catalog, &cloned.catalog));
    }
}
