//! Contextual news chat endpoints

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tracing::error;

use pulse_core::{Article, UserProfile};

use crate::AppState;

/// Request body for a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// User's chat message
    pub message: String,
    /// Current news articles for context; replaces the stored context
    pub news_context: Option<Vec<Article>>,
    /// User profile for personalization
    pub user_profile: Option<UserProfile>,
}

/// Create chat routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/chat/reset", post(reset_chat))
}

/// POST /chat - Chat with the assistant about the displayed articles
async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    let Some(chat_service) = &state.chat_service else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "error": "Chat service not configured. Please set OPENAI_API_KEY."
            })),
        )
            .into_response();
    };

    if request.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "message must not be empty"
            })),
        )
            .into_response();
    }

    match chat_service
        .chat(
            &request.message,
            request.news_context,
            request.user_profile.as_ref(),
        )
        .await
    {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => {
            error!("Chat request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": format!("Chat error: {}", e)
                })),
            )
                .into_response()
        }
    }
}

/// POST /chat/reset - Reset the chat conversation history
async fn reset_chat(State(state): State<AppState>) -> impl IntoResponse {
    let Some(chat_service) = &state.chat_service else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "error": "Chat service not configured. Please set OPENAI_API_KEY."
            })),
        )
            .into_response();
    };

    chat_service.reset().await;
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "success",
            "message": "Chat conversation reset"
        })),
    )
        .into_response()
}
