//! News and personalization endpoints

use std::collections::HashSet;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use pulse_core::{Article, UserProfile};
use pulse_services::ProfileStoreError;

use crate::AppState;

/// Query parameters for direct pipeline access
#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    /// Interest to fetch articles for
    pub interest: String,
    /// Maximum number of articles
    pub limit: Option<usize>,
}

/// Request body for personalized news, optionally scoped to a stored user
/// whose read articles are excluded.
#[derive(Debug, Deserialize)]
pub struct PersonalizedNewsRequest {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub user_id: Option<String>,
}

/// Request body for personalizing a single headline
#[derive(Debug, Deserialize)]
pub struct PersonalizeHeadlineRequest {
    pub article: Article,
    pub user_profile: UserProfile,
    pub interest: Option<String>,
}

#[derive(Debug, Serialize)]
struct RecommendedInterests {
    recommended_interests: Vec<String>,
}

/// Create news routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/news", get(get_news_for_interest))
        .route("/recommend-interests", post(recommend_interests))
        .route("/personalized-news", post(personalized_news))
        .route("/generate-notifications", post(generate_notifications))
        .route("/personalize-headline", post(personalize_headline))
}

fn llm_unavailable() -> axum::response::Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({
            "error": "LLM service not configured. Please set OPENAI_API_KEY."
        })),
    )
        .into_response()
}

fn bad_k() -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "error": "k must be between 1 and 10"
        })),
    )
        .into_response()
}

/// GET /news?interest=..&limit=.. - Run the aggregation pipeline directly
async fn get_news_for_interest(
    State(state): State<AppState>,
    Query(params): Query<NewsQuery>,
) -> impl IntoResponse {
    if params.interest.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "interest must not be empty"
            })),
        )
            .into_response();
    }

    let limit = params.limit.unwrap_or(5);
    let articles = state
        .news_service
        .fetch_news_for_interest(&params.interest, limit)
        .await;

    (StatusCode::OK, Json(articles)).into_response()
}

/// POST /recommend-interests - Rank the profile's interests with the LLM
async fn recommend_interests(
    State(state): State<AppState>,
    Json(profile): Json<UserProfile>,
) -> impl IntoResponse {
    let Some(llm) = &state.llm else {
        return llm_unavailable();
    };
    if !profile.k_in_range() {
        return bad_k();
    }

    match llm.rank_interests(&profile).await {
        Ok(recommended_interests) => (
            StatusCode::OK,
            Json(RecommendedInterests {
                recommended_interests,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to rank interests: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": format!("Failed to rank interests: {}", e)
                })),
            )
                .into_response()
        }
    }
}

/// POST /personalized-news - Ranked interests with personalized articles
async fn personalized_news(
    State(state): State<AppState>,
    Json(request): Json<PersonalizedNewsRequest>,
) -> impl IntoResponse {
    let Some(personalizer) = &state.personalizer else {
        return llm_unavailable();
    };
    if !request.profile.k_in_range() {
        return bad_k();
    }

    // A stored user's read articles are excluded from the response
    let read_urls: HashSet<String> = match &request.user_id {
        Some(user_id) => match state.profile_store.list_read_urls(user_id) {
            Ok(urls) => urls.into_iter().collect(),
            Err(ProfileStoreError::NotFound(_)) => HashSet::new(),
            Err(e) => {
                error!("Failed to load read articles: {}", e);
                HashSet::new()
            }
        },
        None => HashSet::new(),
    };

    match personalizer
        .personalized_news(&request.profile, &read_urls)
        .await
    {
        Ok(news) => (StatusCode::OK, Json(news)).into_response(),
        Err(e) => {
            error!("Failed to build personalized news: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": format!("Failed to build personalized news: {}", e)
                })),
            )
                .into_response()
        }
    }
}

/// POST /generate-notifications - Impact-ranked notification digest
async fn generate_notifications(
    State(state): State<AppState>,
    Json(profile): Json<UserProfile>,
) -> impl IntoResponse {
    let Some(personalizer) = &state.personalizer else {
        return llm_unavailable();
    };
    if !profile.k_in_range() {
        return bad_k();
    }

    match personalizer.notifications(&profile).await {
        Ok(digest) => (StatusCode::OK, Json(digest)).into_response(),
        Err(e) => {
            error!("Failed to generate notifications: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": format!("Failed to generate notifications: {}", e)
                })),
            )
                .into_response()
        }
    }
}

/// POST /personalize-headline - Rewrite one headline for personal impact
async fn personalize_headline(
    State(state): State<AppState>,
    Json(request): Json<PersonalizeHeadlineRequest>,
) -> impl IntoResponse {
    let Some(llm) = &state.llm else {
        return llm_unavailable();
    };

    let interest = request.interest.as_deref().unwrap_or("general");

    match llm
        .personalize_headline(&request.user_profile, interest, &request.article)
        .await
    {
        Ok(headline) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "personalized_headline": headline,
                "original_headline": request.article.title,
            })),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to personalize headline: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": format!("Failed to personalize headline: {}", e)
                })),
            )
                .into_response()
        }
    }
}
