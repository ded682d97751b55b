//! Crop Advisor - Backend Server

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crop_advisor_backend::{config, create_app, db, AppState, ModelBundle};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "crop_server=debug,crop_advisor_backend=debug,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Crop Advisor Server");
    tracing::info!("Environment: {}", config.environment);

    // Open the history database and apply migrations
    tracing::info!("Opening database {}", config.database.url);
    let db_pool = db::init_database(&config.database).await?;

    // Load fitted models; failures leave the server in degraded mode
    let models = ModelBundle::load(&config.models);
    if !models.is_ready() {
        tracing::warn!("Running in degraded mode: predictions are disabled");
    }

    // Create application state
    let state = AppState {
        db: db_pool,
        models: Arc::new(models),
        config: Arc::new(config.clone()),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr = config.bind_address();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
