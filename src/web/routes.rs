use axum::{
    Router,
    routing::{get, post, put},
    extract::DefaultBodyLimit,
};

use crate::web::handlers::{
    api::{health_check, api_not_found},
    session::{
        create_session,
        delete_session,
        session_status,
        update_params,
        preview,
        upload_logo,
        delete_logo,
        get_canvas,
        export,
    },
    static_files::serve_index,
};
use crate::web::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let body_limit = state.config.render.body_limit();

    // API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(session_status).delete(delete_session))
        .route("/sessions/:id/params", put(update_params))
        .route("/sessions/:id/preview", post(preview))
        .route("/sessions/:id/logo", post(upload_logo).delete(delete_logo))
        .route("/sessions/:id/canvas", get(get_canvas))
        .route("/sessions/:id/export", post(export))
        .fallback(api_not_found)
        .with_state(state);

    // Everything else gets the single-page UI
    let static_routes = Router::new()
        .fallback(serve_index);

    // Combine routes
    Router::new()
        .nest("/api", api_routes)
        .merge(static_routes)
        .layer(DefaultBodyLimit::max(body_limit))
}
