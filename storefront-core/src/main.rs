use std::sync::Arc;

use dotenv::dotenv;
use storefront_core::config::Config;
use storefront_core::db;
use storefront_core::store::Stores;
use storefront_core::{router, AppState};
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(LevelFilter::INFO.into());

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    info!("Starting storefront core server...");

    let config = Config::from_env();
    let addr = format!("{}:{}", config.server_host, config.server_port);

    // The pool connects lazily, so the server comes up even while the
    // database is unreachable; with demo login enabled the back office
    // stays available through the outage.
    let (stores, pool) = match config.database_url.as_deref() {
        Some(url) => {
            let pool = db::create_pool(url)?;
            (Stores::postgres(pool.clone()), Some(pool))
        }
        None => {
            warn!("DATABASE_URL not set; serving the seeded in-memory catalog");
            (Stores::in_memory(), None)
        }
    };

    if config.demo_login_enabled {
        warn!("Demo login is enabled; disable DEMO_LOGIN_ENABLED outside demos");
    }

    let state = AppState {
        stores,
        config: Arc::new(config),
        pool,
    };

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", addr, e))?;

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
