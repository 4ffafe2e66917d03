use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(app_state: AppState) -> Router {
    let access_routes = Router::new()
        .route(
            "/api/identities/{identity_id}/access",
            get(handlers::access::access_decision_handler),
        )
        .route(
            "/api/identities/{identity_id}/access/{module}",
            get(handlers::access::effective_actions_handler),
        )
        .route(
            "/api/identities/{identity_id}/roles",
            get(handlers::access::role_check_handler),
        )
        .route(
            "/api/identities/{identity_id}/invalidate",
            post(handlers::access::invalidate_handler),
        );

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(access_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
