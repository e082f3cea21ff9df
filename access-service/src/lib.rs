pub mod config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{
    http::{header, HeaderValue, Method, Request},
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AccessConfig;
use crate::services::Backend;

#[derive(Clone)]
pub struct AppState {
    pub config: AccessConfig,
    pub backend: Arc<dyn Backend>,
    /// Prometheus handle; `None` when no recorder was installed (tests)
    pub metrics: Option<PrometheusHandle>,
}

pub fn build_router(state: AppState) -> Router {
    let org_routes = Router::new()
        .route("/app/:org_slug", get(handlers::pages::org_home))
        .route("/app/:org_slug/dashboard", get(handlers::pages::dashboard))
        .route("/app/:org_slug/cases", get(handlers::pages::cases))
        .route(
            "/app/:org_slug/cases/protection",
            get(handlers::pages::protection_cases),
        )
        .route(
            "/app/:org_slug/finance/approvals",
            get(handlers::pages::finance_approvals),
        );

    let api_routes = Router::new()
        .route("/api/roles", get(handlers::api::list_roles))
        .route(
            "/api/orgs/:org_slug/context",
            get(handlers::api::get_context),
        )
        .route(
            "/api/orgs/:org_slug/permissions/check",
            get(handlers::api::check),
        )
        .route(
            "/api/orgs/:org_slug/assignable-roles",
            get(handlers::api::assignable_roles),
        );

    let allowed_origins: Vec<HeaderValue> = state
        .config
        .security
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e);
                None
            }
        })
        .collect();

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route("/unauthorized", get(handlers::pages::unauthorized))
        .route("/app", get(handlers::pages::org_selection))
        .route("/app/new", get(handlers::pages::new_organization))
        .route("/superadmin", get(handlers::pages::super_admin_home))
        .merge(org_routes)
        .merge(api_routes)
        .with_state(state.clone())
        // Session, organization and membership gate for every request
        .layer(from_fn_with_state(
            state.clone(),
            middleware::access_middleware,
        ))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_credentials(true)
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::COOKIE]),
        )
}
