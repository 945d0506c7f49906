//! Newspulse API Server
//!
//! HTTP API that personalizes news for a user profile: LLM-ranked
//! interests, per-interest article aggregation, impact headlines,
//! notification digests, and a contextual news chat.

mod routes;

use axum::{
    http::{header, Method},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pulse_llm::{ChatService, LlmClient};
use pulse_news::TopicTable;
use pulse_services::{NewsPipelineConfig, NewsService, Personalizer, ProfileStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub news_service: Arc<NewsService>,
    pub profile_store: Arc<ProfileStore>,
    /// LLM-backed services (optional - require OPENAI_API_KEY)
    pub llm: Option<Arc<LlmClient>>,
    pub personalizer: Option<Arc<Personalizer>>,
    pub chat_service: Option<Arc<ChatService>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,pulse_api=debug")),
        )
        .init();

    info!("Starting Newspulse API");

    // Initialize the aggregation pipeline
    let news_service = Arc::new(NewsService::new(
        TopicTable::builtin(),
        NewsPipelineConfig::default(),
    ));
    info!("News service initialized (curated RSS topic table)");

    // Initialize the profile store
    let db_path =
        std::env::var("PROFILE_DB_PATH").unwrap_or_else(|_| "data/profiles.db".to_string());
    info!("Initializing profile store at: {}", db_path);
    let profile_store =
        Arc::new(ProfileStore::new(&db_path).expect("Failed to initialize profile store"));

    // Initialize LLM-backed services (optional - require OPENAI_API_KEY)
    let (llm, personalizer, chat_service) = if std::env::var("OPENAI_API_KEY").is_ok() {
        let mut client = LlmClient::new()?;
        if let Ok(model) = std::env::var("PULSE_LLM_MODEL") {
            client = client.with_model(&model);
        }

        let chat_service = Arc::new(ChatService::new(client.clone()));
        let llm = Arc::new(client);
        let personalizer = Arc::new(Personalizer::new(
            Arc::clone(&llm),
            Arc::clone(&news_service),
        ));

        info!("LLM services initialized (ranking, personalization, chat)");
        (Some(llm), Some(personalizer), Some(chat_service))
    } else {
        info!("OPENAI_API_KEY not set - LLM-backed endpoints will return 503");
        (None, None, None)
    };

    let state = AppState {
        news_service,
        profile_store,
        llm,
        personalizer,
        chat_service,
    };

    // Configure CORS for frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // Build router
    let app = Router::new()
        .merge(routes::api_routes())
        .layer(cors)
        .with_state(state);

    // Start server
    let port = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
