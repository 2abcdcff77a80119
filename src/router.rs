use axum::{
    routing::{get, post},
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn,
};
use tower_http::{
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tower_sessions::{MemoryStore, SessionManagerLayer};
use tower_sessions::cookie::SameSite;
use crate::{handlers, middleware, state::AppState};

pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.upload.max_file_size;

    // Session store setup
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_name("session");

    Router::new()
        // Auth routes
        .route("/register", post(handlers::handle_register))
        .route("/login", post(handlers::handle_login))
        .route("/logout", post(handlers::handle_logout))
        .route("/directory", get(handlers::directory_usage))
        .route("/profile", get(handlers::serve_profile))

        // Working set routes
        .route(
            "/samples",
            get(handlers::list_samples)
                .post(handlers::upload_samples)
                .delete(handlers::clear_samples),
        )
        .route("/samples/selection", post(handlers::select_all_samples))
        .route("/samples/delete", post(handlers::delete_selected_samples))
        .route("/samples/:sample_id", axum::routing::delete(handlers::delete_sample))
        .route("/samples/:sample_id/toggle", post(handlers::toggle_sample))
        .route("/samples/:sample_id/crop", post(handlers::crop_sample))
        .route("/analyze", post(handlers::analyze_samples))

        // History routes
        .route("/history", get(handlers::list_history).delete(handlers::clear_history))
        .route("/history/delete", post(handlers::delete_records))
        .route("/history/:record_id", get(handlers::get_record))
        .route("/history/:record_id/image", get(handlers::get_record_image))

        // Add middleware
        .layer(from_fn(middleware::require_auth))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())

        // Upload limits from config
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body))

        // Add state
        .with_state(state)
}
