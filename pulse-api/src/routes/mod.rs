//! API route definitions

mod chat;
mod health;
mod news;
mod users;

use axum::Router;

use crate::AppState;

/// Create all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(news::routes())
        .merge(chat::routes())
        .merge(users::routes())
}
