use clap::Parser;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;

use backend::storage::{JsonFileStorage, LeagueStorage, MemoryStorage};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = backend::Config::parse();

    let registry = tracing_subscriber::Registry::default()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target().contains("backend") || meta.target().contains("scoring")
        }));
    tracing::subscriber::set_global_default(registry)?;

    tracing::info!("Starting...");

    let storage: Box<dyn LeagueStorage> = if config.in_memory {
        tracing::warn!("Keeping the league in memory only");
        Box::new(MemoryStorage::new())
    } else {
        tracing::info!(path = ?config.data_file, "Using league document");
        Box::new(JsonFileStorage::new(&config.data_file))
    };

    // Refuse to start on a document that cannot be read back.
    let ledger = storage.load().await?;
    tracing::info!(
        matches = ledger.matches().len(),
        players = ledger.players().len(),
        "Loaded league"
    );

    for folder in [&config.upload_dir, &config.static_dir] {
        if !tokio::fs::try_exists(folder).await.unwrap_or(false) {
            tokio::fs::create_dir_all(folder).await?;
        }
    }

    let recognizer = backend::recognition::Recognizer::new(config.gemini_api_key.clone());
    if !recognizer.is_available() {
        tracing::warn!("GEMINI_API_KEY is not set, screenshot recognition is disabled");
    }

    let state = backend::AppState::new(storage, recognizer)
        .with_folders(&config.upload_dir, &config.export_dir)
        .with_env_file(&config.env_file);

    let router = axum::Router::new()
        .nest("/api", backend::api::router(std::sync::Arc::new(state)))
        .fallback_service(tower_http::services::ServeDir::new(&config.static_dir));

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    tracing::info!("Listening on {}", config.listen);
    axum::serve(listener, router).await?;

    Ok(())
}
