//! HTTP API server with observability for the checkout domain.
//!
//! Provides REST endpoints for customers, products and orders, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use domain::{
    EventKind, EventNotifier, LogWhenCustomerIsCreated, SendEmailWhenProductIsCreated,
    SendMessageWhenAddressChanges,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::{AppState, CheckoutStore};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: CheckoutStore>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/customers", post(routes::customers::create::<S>))
        .route("/customers/{id}", get(routes::customers::get::<S>))
        .route(
            "/customers/{id}/address",
            put(routes::customers::change_address::<S>),
        )
        .route(
            "/products",
            post(routes::products::create::<S>).get(routes::products::list::<S>),
        )
        .route(
            "/orders",
            post(routes::orders::create::<S>).get(routes::orders::list::<S>),
        )
        .route(
            "/orders/{id}",
            get(routes::orders::get::<S>)
                .put(routes::orders::update::<S>)
                .delete(routes::orders::delete::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Builds the notifier with the handlers the application ships with.
pub fn default_notifier() -> EventNotifier {
    let mut notifier = EventNotifier::new();
    notifier.register(
        EventKind::CustomerCreated,
        Arc::new(LogWhenCustomerIsCreated::First),
    );
    notifier.register(
        EventKind::CustomerCreated,
        Arc::new(LogWhenCustomerIsCreated::Second),
    );
    notifier.register(
        EventKind::CustomerAddressChanged,
        Arc::new(SendMessageWhenAddressChanges),
    );
    notifier.register(
        EventKind::ProductCreated,
        Arc::new(SendEmailWhenProductIsCreated),
    );
    notifier
}

/// Creates the default application state over `store`.
pub fn create_default_state<S: CheckoutStore>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState::new(store, default_notifier()))
}
