use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use suzstar_auth::JwtService;
use suzstar_database::{create_pool, run_migrations};
use suzstar_website::{
    build_app, config::WebsiteConfig, notifications::Notifier, services::AppState, storage::FileStore,
    templates::TemplateEngine,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "suzstar_website=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = WebsiteConfig::from_env();

    // Create database connection pool
    let db_pool = create_pool(&config.database).await?;

    // Run migrations
    run_migrations(&db_pool).await?;

    let templates = Arc::new(TemplateEngine::new()?);
    let notifier = Notifier::from_config(&config.email, templates.clone())?;
    let file_store = FileStore::new(&config.storage.media_root, &config.storage.media_url);

    let app_state = AppState {
        db_pool,
        jwt_service: JwtService::new(&config.jwt),
        notifier,
        templates,
        file_store,
        config: Arc::new(config.clone()),
    };

    let app = build_app(app_state);

    // Start the server
    let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;

    tracing::info!(
        address = %config.server.bind_address(),
        email_enabled = config.email.enabled,
        "Suzstar Counseling website listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
