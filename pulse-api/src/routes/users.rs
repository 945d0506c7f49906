//! User account and read-article endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::error;

use pulse_core::{NewUser, ProfileUpdate};
use pulse_services::ProfileStoreError;

use crate::AppState;

/// Request body for marking an article as read
#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub url: String,
}

/// Create user routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user).patch(update_user))
        .route(
            "/users/{id}/read-articles",
            post(mark_read).get(list_read_articles),
        )
}

fn store_error_response(e: ProfileStoreError) -> axum::response::Response {
    match e {
        ProfileStoreError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": format!("User not found: {}", id)
            })),
        )
            .into_response(),
        ProfileStoreError::DuplicateEmail(email) => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({
                "error": format!("Email already registered: {}", email)
            })),
        )
            .into_response(),
        e => {
            error!("Profile store error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "Profile store error"
                })),
            )
                .into_response()
        }
    }
}

/// POST /users - Create a user account
async fn create_user(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> impl IntoResponse {
    if !(1..=10).contains(&new_user.k) {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "k must be between 1 and 10"
            })),
        )
            .into_response();
    }

    match state.profile_store.create_user(&new_user) {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(e) => store_error_response(e),
    }
}

/// GET /users/{id} - Fetch a user account
async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    match state.profile_store.get_user(&id) {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(e) => store_error_response(e),
    }
}

/// PATCH /users/{id} - Apply a partial profile update
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> impl IntoResponse {
    if let Some(k) = update.k {
        if !(1..=10).contains(&k) {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "k must be between 1 and 10"
                })),
            )
                .into_response();
        }
    }

    match state.profile_store.update_user(&id, &update) {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(e) => store_error_response(e),
    }
}

/// POST /users/{id}/read-articles - Mark an article as read
async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<MarkReadRequest>,
) -> impl IntoResponse {
    // Reject unknown users rather than writing orphan rows
    if let Err(e) = state.profile_store.get_user(&id) {
        return store_error_response(e);
    }

    match state.profile_store.mark_read(&id, &request.url) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ok" })),
        )
            .into_response(),
        Err(e) => store_error_response(e),
    }
}

/// GET /users/{id}/read-articles - List the user's read article URLs
async fn list_read_articles(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(e) = state.profile_store.get_user(&id) {
        return store_error_response(e);
    }

    match state.profile_store.list_read_urls(&id) {
        Ok(urls) => (
            StatusCode::OK,
            Json(serde_json::json!({ "read_articles": urls })),
        )
            .into_response(),
        Err(e) => store_error_response(e),
    }
}
