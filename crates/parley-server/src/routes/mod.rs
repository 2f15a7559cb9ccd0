pub mod chat;
pub mod health;

use crate::state::AppState;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the router with every route and the shared layers
pub fn configure(state: AppState) -> Router {
    // The chat page calls us straight from the browser
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(chat::routes(state))
        .merge(health::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
