// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, catalog, events, results},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (events, tests, results, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (quiz service, outbox, config).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let event_routes = Router::new()
        .route("/", post(events::handle_event))
        .route("/outbox", get(events::drain_outbox))
        .layer(auth.clone());

    let test_routes = Router::new()
        .route("/", get(catalog::list_tests))
        .route("/{code}/document", get(catalog::get_document))
        // Protected: submissions are attributed to the caller
        .merge(
            Router::new()
                .route("/{code}/submissions", post(catalog::submit_answers))
                .layer(auth.clone()),
        );

    let result_routes = Router::new()
        .route("/leaderboard", get(results::get_leaderboard))
        .merge(
            Router::new()
                .route("/me", get(results::my_results))
                .layer(auth.clone()),
        );

    let admin_routes = Router::new()
        .route("/keys", post(admin::register_key))
        .route("/documents", post(admin::upload_document))
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn_with_state(state.clone(), admin_middleware))
        .layer(auth);

    Router::new()
        .route("/api/commands", get(events::list_commands))
        .nest("/api/events", event_routes)
        .nest("/api/tests", test_routes)
        .nest("/api/results", result_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
