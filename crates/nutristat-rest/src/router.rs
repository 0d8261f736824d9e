//! Main application router.

use crate::{
    controllers::{health_controller, jobs_controller, stats_controller, system_controller},
    middleware::logging_middleware,
    state::AppState,
};
use axum::{http::HeaderValue, middleware, Router};
use nutristat_config::ServerConfig;
use nutristat_data::Aggregation;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// A route served by the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub path: String,
    pub method: &'static str,
}

impl RouteInfo {
    fn new(path: impl Into<String>, method: &'static str) -> Self {
        Self {
            path: path.into(),
            method,
        }
    }
}

/// Every route the router serves, in listing order.
pub fn defined_routes() -> Vec<RouteInfo> {
    let mut routes = vec![RouteInfo::new("/api/post_endpoint", "POST")];
    routes.push(RouteInfo::new("/api/get_results/<job_id>", "GET"));
    routes.extend(
        Aggregation::ALL
            .into_iter()
            .map(|a| RouteInfo::new(format!("/api{}", stats_controller::route_path(a)), "POST")),
    );
    routes.push(RouteInfo::new("/api/graceful_shutdown", "GET"));
    routes.push(RouteInfo::new("/api/jobs", "GET"));
    routes.push(RouteInfo::new("/api/num_jobs", "GET"));
    routes.push(RouteInfo::new("/", "GET"));
    routes.push(RouteInfo::new("/index", "GET"));
    routes.push(RouteInfo::new("/health", "GET"));
    routes.push(RouteInfo::new("/live", "GET"));
    routes
}

/// Creates the main application router.
pub fn create_router(state: AppState, server_config: &ServerConfig) -> Router {
    let cors = create_cors_layer(server_config);

    let api_router = Router::new()
        .merge(stats_controller::router())
        .merge(jobs_controller::router())
        .merge(system_controller::router());

    let timed = Router::new()
        .merge(health_controller::router())
        .merge(system_controller::index_router())
        .nest("/api", api_router)
        .layer(TimeoutLayer::new(server_config.request_timeout()));

    let router = Router::new()
        .merge(timed)
        .merge(system_controller::shutdown_router())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(logging_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CompressionLayer::new()),
        );

    info!(routes = defined_routes().len(), "Router created");
    router
}

/// Creates a CORS layer based on server configuration.
fn create_cors_layer(server_config: &ServerConfig) -> CorsLayer {
    if !server_config.cors_enabled {
        return CorsLayer::new();
    }

    if server_config.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<_> = server_config
        .cors_origins
        .iter()
        .filter_map(|o| o.parse::<HeaderValue>().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defined_routes_cover_every_aggregation() {
        let routes = defined_routes();
        for aggregation in Aggregation::ALL {
            let path = format!("/api/{}", aggregation.as_str());
            assert!(routes.iter().any(|r| r.path == path && r.method == "POST"));
        }
        assert!(routes.iter().any(|r| r.path == "/api/graceful_shutdown"));
    }

    #[test]
    fn test_cors_layer_variants() {
        let mut config = ServerConfig::default();
        let _ = create_cors_layer(&config);

        config.cors_origins = vec!["http://localhost:3000".to_string()];
        let _ = create_cors_layer(&config);

        config.cors_enabled = false;
        let _ = create_cors_layer(&config);
    }
}
