pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod validate;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/health", get(handlers::health))
        .merge(auth_routes())
        // Protected
        .merge(note_routes(state.clone()))
        .merge(tenant_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(handlers::auth::login))
}

fn note_routes(state: AppState) -> Router<AppState> {
    use handlers::notes;

    Router::new()
        .route("/notes", post(notes::create_note).get(notes::list_notes))
        .route(
            "/notes/:id",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        // Layers run bottom-up: bearer auth first, then the optional
        // identity revalidation.
        .layer(from_fn_with_state(
            state.clone(),
            middleware::validate_identity_middleware,
        ))
        .layer(from_fn_with_state(state, middleware::auth_middleware))
}

fn tenant_routes(state: AppState) -> Router<AppState> {
    use handlers::tenants;

    Router::new()
        .route("/tenants/:slug/upgrade", post(tenants::upgrade_tenant))
        .route("/tenants/:slug/invite", post(tenants::invite_user))
        .route("/tenants/:slug/users", get(tenants::list_tenant_users))
        .layer(from_fn(middleware::require_admin))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::validate_identity_middleware,
        ))
        .layer(from_fn_with_state(state, middleware::auth_middleware))
}
