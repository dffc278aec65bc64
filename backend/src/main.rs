//! Weather override platform - server binary

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weather_override_backend::{create_app, AppState, Config, OverrideStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "wo_server=debug,weather_override_backend=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Weather Override Server");
    tracing::info!("Environment: {}", config.environment);

    // Open the override log; a missing or corrupt file starts empty
    let store = OverrideStore::open(&config.store.path).await;

    let addr = config.bind_address();
    let app = create_app(AppState::new(store, config));

    // Start server
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
