use std::sync::Arc;

use anyhow::{Context, Result};
use freshfit::api::{create_routes, AppState};
use freshfit::auth::{AuthService, JwtService, StoreDirectory};
use freshfit::config::{run_migrations, AppConfig, DatabaseConfig};
use freshfit::store::{DocumentStore, InMemoryStore, PgDocumentStore};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    // RUST_LOG wins over LOG_LEVEL when both are set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store: Arc<dyn DocumentStore> = match DatabaseConfig::from_env()? {
        Some(database) => {
            let pool = database
                .create_pool()
                .await
                .context("failed to connect to the document database")?;
            run_migrations(&pool).await?;
            info!("Using PostgreSQL document store");
            Arc::new(PgDocumentStore::new(pool))
        }
        None => {
            if config.is_production() {
                anyhow::bail!("DATABASE_URL must be set in production");
            }
            warn!("DATABASE_URL not set, using in-memory document store");
            Arc::new(InMemoryStore::new())
        }
    };

    let directory = Arc::new(StoreDirectory::new(store.clone()));
    let auth_service = AuthService::new(JwtService::new(&config.token_secret), directory);
    let app = create_routes(AppState::new(auth_service, store));

    let address = config.server_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Fresh&Fit server starting on http://{}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
